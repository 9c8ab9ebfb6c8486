//! adl_options: adlconfig.json parsing and compiler options.
//!
//! Parses adlconfig.json documents into [`AdlConfig`] and provides the
//! [`CompilerOptions`] the compiler driver hands to the checker.

use serde::{Deserialize, Serialize};

/// Options controlling a checker run, matching the `compilerOptions` object
/// of adlconfig.json.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Report decorator failures as diagnostics instead of aborting the run.
    /// Editors and language services set this.
    pub design_time_build: bool,
    /// Cap on the number of diagnostics returned from a check.
    pub max_diagnostics: Option<usize>,
}

/// The adlconfig.json file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdlConfig {
    pub compiler_options: CompilerOptions,
    /// Source file names for the host to load, in order.
    pub files: Vec<String>,
}

/// Parse an adlconfig.json document from a string.
pub fn parse_config(content: &str) -> Result<AdlConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse an adlconfig.json file from a path.
pub fn parse_config_file(path: &str) -> Result<AdlConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok(config)
}
