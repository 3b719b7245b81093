//! Frame position planning.
//!
//! Positions are normalized (0.0 = start, 1.0 = end). They are converted to
//! timestamps on a fixed grid of [`FRAME_STEP`] seconds so that two requested
//! positions never decode the same picture.

use crate::error::{FormcheckError, Result};
use tracing::warn;

/// Timestamp grid resolution in seconds.
pub const FRAME_STEP: f64 = 0.1;

/// Upper bound on frames per call.
pub const MAX_FRAMES: u32 = 30;

/// First and last position of the count-based plan.
const SPAN_START: f64 = 0.2;
const SPAN_END: f64 = 0.8;

/// How the caller asked for frames.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleRequest {
    /// Evenly spaced frames strictly inside the video.
    Count(u32),
    /// Exactly these normalized positions (any order).
    Positions(Vec<f64>),
}

/// One frame to decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Normalized position that produced this frame.
    pub position: f64,
    /// Grid-aligned timestamp in seconds.
    pub at_seconds: f64,
}

/// Ordered frames to decode, ascending by position.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePlan {
    pub points: Vec<SamplePoint>,
    /// Frames asked for before short-media reduction.
    pub requested: usize,
}

impl SamplePlan {
    /// Whether short media forced fewer frames than requested.
    pub fn was_reduced(&self) -> bool {
        self.points.len() < self.requested
    }

    pub fn positions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.position).collect()
    }
}

/// Evenly spaced positions for `count` frames.
///
/// A single frame sits at the midpoint; otherwise frames span 20%..80% so
/// neither the first nor the last frame lands on a black boundary frame.
/// Five frames give 20/35/50/65/80%.
pub fn even_positions(count: u32) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.5],
        n => {
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| SPAN_START + (SPAN_END - SPAN_START) * i as f64 / last)
                .collect()
        }
    }
}

/// Largest count-based plan whose frames all fall on distinct grid instants.
pub fn max_distinct_frames(duration: f64) -> u32 {
    if duration <= 0.0 {
        return 0;
    }
    let span_ticks = to_tick((SPAN_END - SPAN_START) * duration);
    (span_ticks + 1).min(MAX_FRAMES as u64) as u32
}

/// Build the decode plan for a video of `duration` seconds.
///
/// Count-based requests are shrunk up front to [`max_distinct_frames`];
/// explicit positions are sorted and any position that lands on an instant
/// already taken is dropped. Both cases keep the first occurrence.
pub fn plan_samples(duration: f64, request: &SampleRequest) -> Result<SamplePlan> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(FormcheckError::FrameExtraction(
            "zero-duration media".to_string(),
        ));
    }

    let (positions, requested) = match request {
        SampleRequest::Count(count) => {
            let usable = (*count).min(max_distinct_frames(duration)).max(1);
            if usable < *count {
                warn!(
                    "Video is {:.2}s long, reducing frame count from {} to {}",
                    duration, count, usable
                );
            }
            (even_positions(usable), *count as usize)
        }
        SampleRequest::Positions(positions) => {
            let mut sorted = positions.clone();
            sorted.sort_by(|a, b| a.total_cmp(b));
            (sorted, positions.len())
        }
    };

    let last_tick = if duration > FRAME_STEP {
        to_tick(duration - FRAME_STEP)
    } else {
        0
    };

    let mut points: Vec<SamplePoint> = Vec::with_capacity(positions.len());
    let mut previous_tick = None;

    for position in positions {
        let tick = to_tick(position * duration).min(last_tick);
        if previous_tick == Some(tick) {
            continue;
        }
        previous_tick = Some(tick);
        points.push(SamplePoint {
            position,
            at_seconds: tick as f64 * FRAME_STEP,
        });
    }

    if points.len() < requested {
        warn!(
            "Sampling {} distinct frame(s) instead of {} from {:.2}s of video",
            points.len(),
            requested,
            duration
        );
    }

    Ok(SamplePlan { points, requested })
}

/// Grid index for a timestamp; the epsilon absorbs float error such as 12.0 / 0.1.
fn to_tick(seconds: f64) -> u64 {
    (seconds / FRAME_STEP + 1e-9).floor().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_default_five_positions() {
        let positions = even_positions(5);
        let expected = [0.2, 0.35, 0.5, 0.65, 0.8];
        assert_eq!(positions.len(), 5);
        for (got, want) in positions.iter().zip(expected) {
            assert!(approx(*got, want), "{got} != {want}");
        }
    }

    #[test]
    fn test_even_positions_are_strictly_interior() {
        for n in 1..=MAX_FRAMES {
            let positions = even_positions(n);
            assert_eq!(positions.len(), n as usize);
            assert!(positions.iter().all(|p| *p > 0.0 && *p < 1.0));
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(even_positions(1), vec![0.5]);
        assert!(even_positions(0).is_empty());
    }

    #[test]
    fn test_count_plan_on_long_video() {
        let plan = plan_samples(60.0, &SampleRequest::Count(5)).unwrap();
        let seconds: Vec<f64> = plan.points.iter().map(|p| p.at_seconds).collect();
        let expected = [12.0, 21.0, 30.0, 39.0, 48.0];

        assert!(!plan.was_reduced());
        for (got, want) in seconds.iter().zip(expected) {
            assert!(approx(*got, want), "{got} != {want}");
        }
        assert!(seconds.windows(2).all(|w| w[0] < w[1]));
        assert!(seconds.iter().all(|s| *s > 0.0 && *s < 60.0));
    }

    #[test]
    fn test_explicit_positions_are_sorted() {
        let plan = plan_samples(10.0, &SampleRequest::Positions(vec![0.9, 0.1, 0.5])).unwrap();
        assert_eq!(plan.positions(), vec![0.1, 0.5, 0.9]);
        assert!(approx(plan.points[0].at_seconds, 1.0));
        assert!(approx(plan.points[1].at_seconds, 5.0));
        assert!(approx(plan.points[2].at_seconds, 9.0));
    }

    #[test]
    fn test_end_position_is_clamped_inside_video() {
        let plan = plan_samples(10.0, &SampleRequest::Positions(vec![0.0, 1.0])).unwrap();
        assert_eq!(plan.points.len(), 2);
        assert!(approx(plan.points[0].at_seconds, 0.0));
        assert!(approx(plan.points[1].at_seconds, 9.9));
    }

    #[test]
    fn test_short_video_reduces_count() {
        // 0.3s of video leaves room for only two grid instants between 20% and 80%
        assert_eq!(max_distinct_frames(0.3), 2);

        let plan = plan_samples(0.3, &SampleRequest::Count(5)).unwrap();
        assert_eq!(plan.points.len(), 2);
        assert_eq!(plan.requested, 5);
        assert!(plan.was_reduced());

        let seconds: Vec<f64> = plan.points.iter().map(|p| p.at_seconds).collect();
        assert!(seconds.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tiny_video_keeps_one_frame() {
        let plan = plan_samples(0.05, &SampleRequest::Count(5)).unwrap();
        assert_eq!(plan.points.len(), 1);
        assert_eq!(plan.points[0].position, 0.5);
        assert!(approx(plan.points[0].at_seconds, 0.0));
    }

    #[test]
    fn test_colliding_positions_are_dropped() {
        let plan = plan_samples(
            1.0,
            &SampleRequest::Positions(vec![0.50, 0.52, 0.55, 0.9]),
        )
        .unwrap();
        assert_eq!(plan.positions(), vec![0.50, 0.9]);
        assert_eq!(plan.requested, 4);
    }

    #[test]
    fn test_zero_duration_is_an_error() {
        let err = plan_samples(0.0, &SampleRequest::Count(5)).unwrap_err();
        assert!(err.to_string().contains("zero-duration"));

        assert!(plan_samples(f64::NAN, &SampleRequest::Count(5)).is_err());
    }

    #[test]
    fn test_max_distinct_is_capped() {
        assert_eq!(max_distinct_frames(0.0), 0);
        assert_eq!(max_distinct_frames(3600.0), MAX_FRAMES);
    }
}
