// In: src/config.rs

//! The single source of truth for all kmercode encoding configuration.
//!
//! `KmerCodeConfig` is created once at the application boundary (e.g., from a
//! JSON file) and handed down to the encoder. The values the decoder must
//! mirror exactly (dictionary cap, parity) are copied into the artifact's
//! metadata, so decode never relies on a second, independently configured copy.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::KmerCodeError;

//==================================================================================
// I. Constants
//==================================================================================

/// Default number of Reed-Solomon parity symbols appended to every block.
pub const DEFAULT_PARITY_SYMBOLS: usize = 64;

/// Default ceiling on the number of entries in the LZW dictionary.
pub const DEFAULT_MAX_DICT_SIZE: usize = 1 << 20;

/// Largest dictionary whose codes still fit in a 4-byte code.
pub const MAX_SUPPORTED_DICT_SIZE: usize = 1 << 32;

/// The RS code works over GF(2^8), so a codeword holds at most 255 symbols.
pub const MAX_CODEWORD_LEN: usize = 255;

//==================================================================================
// II. The Unified KmerCodeConfig
//==================================================================================

/// The single, unified configuration for an encode run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct KmerCodeConfig {
    /// Parity symbols per ECC block. Up to `parity_symbols / 2` corrupted
    /// symbols per block are correctable.
    #[serde(default = "default_parity_symbols")]
    pub parity_symbols: usize,

    /// Ceiling on LZW dictionary growth, shared by compressor and decompressor.
    #[serde(default = "default_max_dict_size")]
    pub max_dict_size: usize,

    /// If true, ECC blocks are protected and repaired on the rayon thread pool.
    #[serde(default)]
    pub parallel_blocks: bool,

    /// Optional top-N cap applied to the vocabulary before it is used.
    #[serde(default)]
    pub vocabulary_limit: Option<usize>,
}

impl Default for KmerCodeConfig {
    fn default() -> Self {
        Self {
            parity_symbols: default_parity_symbols(),
            max_dict_size: default_max_dict_size(),
            parallel_blocks: false,
            vocabulary_limit: None,
        }
    }
}

impl KmerCodeConfig {
    /// Parses and validates a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, KmerCodeError> {
        let config: KmerCodeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KmerCodeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every field against the limits the pipeline can honour.
    pub fn validate(&self) -> Result<(), KmerCodeError> {
        if self.parity_symbols >= MAX_CODEWORD_LEN {
            return Err(KmerCodeError::InvalidConfig(format!(
                "parity_symbols must be below {}, got {}",
                MAX_CODEWORD_LEN, self.parity_symbols
            )));
        }
        if self.max_dict_size < 256 || self.max_dict_size > MAX_SUPPORTED_DICT_SIZE {
            return Err(KmerCodeError::InvalidConfig(format!(
                "max_dict_size must be within 256..={}, got {}",
                MAX_SUPPORTED_DICT_SIZE, self.max_dict_size
            )));
        }
        if let Some(limit) = self.vocabulary_limit {
            if limit < 2 {
                return Err(KmerCodeError::InvalidConfig(format!(
                    "vocabulary_limit must be at least 2, got {}",
                    limit
                )));
            }
        }
        Ok(())
    }
}

/// Provides the default for `parity_symbols` for serde.
fn default_parity_symbols() -> usize {
    DEFAULT_PARITY_SYMBOLS
}

/// Provides the default for `max_dict_size` for serde.
fn default_max_dict_size() -> usize {
    DEFAULT_MAX_DICT_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = KmerCodeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, KmerCodeConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config =
            KmerCodeConfig::from_json_str(r#"{"parity_symbols": 16, "parallel_blocks": true}"#)
                .unwrap();
        assert_eq!(config.parity_symbols, 16);
        assert!(config.parallel_blocks);
        assert_eq!(config.max_dict_size, DEFAULT_MAX_DICT_SIZE);
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let err = KmerCodeConfig::from_json_str(r#"{"parity_symbols": 255}"#).unwrap_err();
        assert!(matches!(err, KmerCodeError::InvalidConfig(_)));

        let err = KmerCodeConfig::from_json_str(r#"{"max_dict_size": 100}"#).unwrap_err();
        assert!(matches!(err, KmerCodeError::InvalidConfig(_)));

        let err = KmerCodeConfig::from_json_str(r#"{"vocabulary_limit": 1}"#).unwrap_err();
        assert!(matches!(err, KmerCodeError::InvalidConfig(_)));
    }
}
