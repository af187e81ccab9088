//! Reading `lintpool.config.json` files.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde_json::Value;

use super::object::ConfigObject;
use crate::HostError;

/// Config file names looked up in each directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["lintpool.config.json", "lintpool.config.jsonc"];

const SCHEMA_JSON: &str = include_str!("../../schemas/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Reads and validates a config file.
pub fn read_config_file(path: &Path) -> Result<Vec<ConfigObject>, HostError> {
    let content = fs::read_to_string(path).map_err(|e| {
        HostError::config(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    parse_config(&content)
        .map_err(|e| HostError::config(format!("{} (in {})", error_message(e), path.display())))
}

/// Parses config text: JSON with comments and trailing commas.
pub fn parse_config(content: &str) -> Result<Vec<ConfigObject>, HostError> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| HostError::config(format!("Failed to parse config: {}", e)))?
        .unwrap_or(Value::Array(Vec::new()));

    let schema = CONFIG_SCHEMA.get_or_init(|| {
        let schema_json: Value =
            serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
        Validator::new(&schema_json).expect("Invalid config schema compilation")
    });

    if let Err(e) = schema.validate(&value) {
        return Err(HostError::config(format!(
            "Config validation failed: {} at {}",
            e,
            e.instance_path()
        )));
    }

    serde_json::from_value(value).map_err(|e| HostError::config(format!("Invalid config: {}", e)))
}

fn error_message(error: HostError) -> String {
    match error {
        HostError::Config(message) => message,
        other => other.to_string(),
    }
}
