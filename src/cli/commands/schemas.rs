//! Schemas command - print the tool contract.

use crate::tools::tool_schemas;
use anyhow::Result;

/// Print every tool schema as a JSON array, in chain order.
pub fn run_schemas() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(tool_schemas())?);
    Ok(())
}
