//! Identity crypto service configuration.
//!
//! Loaded from environment variables or a TOML file; every field has a
//! default so both sources may be partial.

use serde::Deserialize;
use shared_crypto::HashAlgorithm;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the channel policy governing who may read (and gossip) on a channel.
pub const CHANNEL_APPLICATION_READERS: &str = "/Channel/Application/Readers";

/// Name of the channel policy governing who may sign blocks.
pub const BLOCK_VALIDATION: &str = "/Channel/Orderer/BlockValidation";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// An environment variable holds an unusable value
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Identity crypto service configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityCryptoConfig {
    /// Algorithm used to derive PKI-IDs from serialized identities
    pub pki_id_algorithm: HashAlgorithm,
    /// Algorithm blocks use to commit to their data
    pub block_data_hash_algorithm: HashAlgorithm,
    /// Channel policy consulted by `verify_by_channel`
    pub reader_policy: String,
    /// Channel policy consulted by `verify_block`
    pub block_validation_policy: String,
}

impl Default for IdentityCryptoConfig {
    fn default() -> Self {
        Self {
            pki_id_algorithm: HashAlgorithm::Sha256,
            block_data_hash_algorithm: HashAlgorithm::Sha256,
            reader_policy: CHANNEL_APPLICATION_READERS.to_string(),
            block_validation_policy: BLOCK_VALIDATION.to_string(),
        }
    }
}

impl IdentityCryptoConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MCS_PKI_ID_ALGORITHM`: sha256 | sha3-256 | blake3 (default: sha256)
    /// - `MCS_BLOCK_HASH_ALGORITHM`: same values (default: sha256)
    /// - `MCS_READER_POLICY`: reader policy name (default: /Channel/Application/Readers)
    /// - `MCS_BLOCK_POLICY`: block validation policy name (default: /Channel/Orderer/BlockValidation)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            pki_id_algorithm: algorithm_var("MCS_PKI_ID_ALGORITHM")?
                .unwrap_or(defaults.pki_id_algorithm),
            block_data_hash_algorithm: algorithm_var("MCS_BLOCK_HASH_ALGORITHM")?
                .unwrap_or(defaults.block_data_hash_algorithm),
            reader_policy: env::var("MCS_READER_POLICY").unwrap_or(defaults.reader_policy),
            block_validation_policy: env::var("MCS_BLOCK_POLICY")
                .unwrap_or(defaults.block_validation_policy),
        })
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// ```toml
    /// pki_id_algorithm = "sha256"
    /// block_data_hash_algorithm = "sha256"
    /// reader_policy = "/Channel/Application/Readers"
    /// block_validation_policy = "/Channel/Orderer/BlockValidation"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn algorithm_var(key: &str) -> Result<Option<HashAlgorithm>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IdentityCryptoConfig::default();

        assert_eq!(config.pki_id_algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.reader_policy, "/Channel/Application/Readers");
        assert_eq!(config.block_validation_policy, "/Channel/Orderer/BlockValidation");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = IdentityCryptoConfig::from_toml_str(
            r#"
            pki_id_algorithm = "blake3"
            reader_policy = "/Channel/Readers"
            "#,
        )
        .unwrap();

        assert_eq!(config.pki_id_algorithm, HashAlgorithm::Blake3);
        assert_eq!(config.reader_policy, "/Channel/Readers");
        assert_eq!(config.block_data_hash_algorithm, HashAlgorithm::Sha256);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = IdentityCryptoConfig::from_toml_str("reader_polcy = \"typo\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let result = IdentityCryptoConfig::from_toml_str("pki_id_algorithm = \"md5\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = IdentityCryptoConfig::load("/nonexistent/mcs.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_from_env_defaults_and_overrides() {
        // Only this test touches MCS_* variables.
        env::remove_var("MCS_PKI_ID_ALGORITHM");
        env::set_var("MCS_BLOCK_POLICY", "/Custom/BlockValidation");
        let config = IdentityCryptoConfig::from_env().unwrap();
        assert_eq!(config.pki_id_algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.block_validation_policy, "/Custom/BlockValidation");

        env::set_var("MCS_PKI_ID_ALGORITHM", "whirlpool");
        let result = IdentityCryptoConfig::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        env::remove_var("MCS_PKI_ID_ALGORITHM");
        env::remove_var("MCS_BLOCK_POLICY");
    }
}
