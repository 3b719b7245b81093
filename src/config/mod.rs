//! Configuration module for Formcheck.
//!
//! Handles loading and saving application settings.

mod settings;

pub use settings::{
    AgentSettings, DownloadSettings, FrameSettings, GeneralSettings, ImageDetailLevel, Settings,
    VisionSettings,
};
