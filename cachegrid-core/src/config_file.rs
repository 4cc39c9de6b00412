//! Declarative configuration loading from YAML, TOML, and environment variables.
//!
//! Only plain settings can be loaded this way. Externalizers, annotated types
//! and the fallback marshaller are code and are added to the returned
//! builder afterwards.
//!
//! # Supported Formats
//!
//! - **YAML** (requires `config-file` feature): `SerializationConfigBuilder::from_yaml("marshaller.yaml")`
//! - **TOML** (requires `config-file` feature): `SerializationConfigBuilder::from_toml("marshaller.toml")`
//! - **Environment Variables** (always available): `SerializationConfigBuilder::from_env()`
//!
//! # Example YAML
//!
//! ```yaml
//! initial-buffer-size: 1024
//! max-doubling-size: 8388608
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SerializationConfigBuilder};

/// File-based marshaller settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileSerializationConfig {
    /// Initial size of output buffers in bytes.
    pub initial_buffer_size: Option<usize>,
    /// Buffer size in bytes up to which output buffers double.
    pub max_doubling_size: Option<usize>,
}

impl From<FileSerializationConfig> for SerializationConfigBuilder {
    fn from(file: FileSerializationConfig) -> Self {
        SerializationConfigBuilder::new().apply_file_config(file)
    }
}

impl SerializationConfigBuilder {
    /// Applies the settings present in `file`.
    pub fn apply_file_config(mut self, file: FileSerializationConfig) -> Self {
        if let Some(size) = file.initial_buffer_size {
            self = self.initial_buffer_size(size);
        }
        if let Some(size) = file.max_doubling_size {
            self = self.max_doubling_size(size);
        }
        self
    }

    /// Loads settings from a YAML file.
    ///
    /// Requires the `config-file` feature.
    #[cfg(feature = "config-file")]
    pub fn from_yaml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!("failed to read YAML config file: {e}"))
        })?;
        let file_config: FileSerializationConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("failed to parse YAML config: {e}")))?;
        Ok(file_config.into())
    }

    /// Loads settings from a TOML file.
    ///
    /// Requires the `config-file` feature.
    #[cfg(feature = "config-file")]
    pub fn from_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!("failed to read TOML config file: {e}"))
        })?;
        let file_config: FileSerializationConfig = toml_crate::from_str(&content)
            .map_err(|e| ConfigError::new(format!("failed to parse TOML config: {e}")))?;
        Ok(file_config.into())
    }

    /// Loads settings from environment variables.
    ///
    /// | Variable | Setting |
    /// |----------|---------|
    /// | `CACHEGRID_INITIAL_BUFFER_SIZE` | initial buffer size in bytes |
    /// | `CACHEGRID_MAX_DOUBLING_SIZE` | max doubling size in bytes |
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but is not a valid size.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file_config = FileSerializationConfig {
            initial_buffer_size: parse_size("CACHEGRID_INITIAL_BUFFER_SIZE", &lookup)?,
            max_doubling_size: parse_size("CACHEGRID_MAX_DOUBLING_SIZE", &lookup)?,
        };
        Ok(file_config.into())
    }
}

fn parse_size(
    name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<usize>, ConfigError> {
    lookup(name)
        .map(|val| {
            val.trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::new(format!("invalid value for {name}: {e}")))
        })
        .transpose()
}
