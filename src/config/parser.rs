use crate::config::types::{Config, OutputConfig};
use crate::config::validation::validate;
use crate::extract::{document_schema, Schema};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use paper_trawl::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Crawling {} pages", config.search.pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is logged at startup so a results file can be traced back to
/// the exact configuration that produced it.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Successfully loaded configuration and its hash
/// * `Err(ConfigError)` - Failed to load or parse the configuration
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Loads and validates an extraction schema from a JSON file
///
/// # Arguments
///
/// * `path` - Path to the JSON schema file
///
/// # Returns
///
/// * `Ok(Schema)` - Successfully loaded and validated schema
/// * `Err(ConfigError)` - Failed to read, parse, or validate the schema
pub fn load_schema(path: &Path) -> Result<Schema, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let schema: Schema = serde_json::from_str(&content)?;
    schema
        .validate()
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    Ok(schema)
}

/// Returns the configured schema, or the built-in document schema
pub fn resolve_schema(output: &OutputConfig) -> Result<Schema, ConfigError> {
    match &output.schema_path {
        Some(path) => {
            tracing::info!("Loading extraction schema from {}", path);
            load_schema(Path::new(path))
        }
        None => Ok(document_schema()),
    }
}
