//! CLI command implementations.

mod agent;
mod analyze;
mod call;
mod config;
mod doctor;
mod schemas;

pub use agent::run_agent;
pub use analyze::run_analyze;
pub use call::run_call;
pub use config::run_config;
pub use doctor::run_doctor;
pub use schemas::run_schemas;
