//! Formcheck - sports technique analysis from video
//!
//! A CLI tool and library that turns a YouTube link into coaching feedback by
//! chaining three tools: download the video, sample still frames, and have a
//! vision model critique the technique shown in them.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `media` - Video download and frame sampling backends
//! - `vision` - Vision model critique backend
//! - `tools` - Tool schemas, results, registry and executor
//! - `orchestrator` - Fixed download, extract, analyze chain
//! - `agent` - LLM agent that drives the tools itself
//!
//! # Example
//!
//! ```rust,no_run
//! use formcheck::config::Settings;
//! use formcheck::orchestrator::{ChainRequest, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings);
//!
//!     let request = ChainRequest::new(
//!         "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!         "Critique the serve motion",
//!     );
//!     let report = orchestrator.run_chain(&request).await;
//!     if let Some(analysis) = report.analysis() {
//!         println!("{}", analysis);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod openai;
pub mod orchestrator;
pub mod tools;
pub mod vision;

pub use error::{FormcheckError, Result};
