//! CLI module for Formcheck.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_size, truncate, Output};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Formcheck - sports technique analysis from video
///
/// Downloads a video, samples still frames from it, and asks a vision model
/// for coaching feedback on the technique shown.
#[derive(Parser, Debug)]
#[command(name = "formcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FORMCHECK_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tool schemas as JSON
    Schemas,

    /// Execute a single tool and print its JSON result
    Call {
        /// Tool name (e.g., "extract_video_frames")
        tool: String,

        /// JSON object with the tool arguments (defaults to an empty object)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Run the full download, extract, analyze chain on a video
    Analyze {
        /// YouTube video URL
        url: String,

        /// What to look for in the technique
        #[arg(short, long, default_value = "Analyze the technique and suggest improvements")]
        prompt: String,

        /// Sport shown in the video (e.g., "tennis", "golf")
        #[arg(short, long)]
        sport: Option<String>,

        /// Number of frames to sample
        #[arg(short, long)]
        frames: Option<u32>,

        /// Directory the video is downloaded into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Let an AI agent drive the tools to complete a task
    Agent {
        /// The task for the agent (e.g., "Critique my golf swing")
        task: String,

        /// Video URL to work on (optional)
        #[arg(short, long)]
        url: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
