//! The metadata record that pairs with every encoded token sequence.
//!
//! `ArtifactMetadata` is the persisted, possibly incomplete document. Decode
//! never reads it directly: `resolve` checks it against the decode-time
//! vocabulary and turns it into a complete `ResolvedParams`, inferring what
//! can be inferred and failing on what cannot.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_DICT_SIZE;
use crate::error::KmerCodeError;
use crate::kernels::bitpack::MAX_FIELD_WIDTH;
use crate::kernels::code_pack::MAX_CODE_BYTE_WIDTH;
use crate::vocabulary::{field_width_for, Vocabulary};

/// The current version of the metadata document.
pub const METADATA_FORMAT_VERSION: u16 = 1;

/// The persisted metadata document.
///
/// Older artifacts used different key names; they are accepted as aliases.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    #[serde(default = "default_format_version")]
    pub format_version: u16,

    /// Bytes per packed LZW code (1..=4).
    #[serde(default, alias = "byte_length")]
    pub code_byte_width: Option<usize>,

    /// Bits per token field. Recomputed from the vocabulary when absent.
    #[serde(
        default,
        alias = "bit_per_kmer",
        alias = "bits_per_entry",
        skip_serializing_if = "Option::is_none"
    )]
    pub bits_per_token_id: Option<usize>,

    /// Size of the vocabulary the artifact was encoded against.
    #[serde(default, alias = "top_n_kmers")]
    pub vocabulary_size: Option<usize>,

    #[serde(default, alias = "ecc_symbols")]
    pub ecc_parity_symbols_per_block: Option<usize>,

    /// LZW dictionary ceiling used at encode time; decode must apply the same one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dict_size: Option<usize>,

    /// Exact length of the ECC-protected byte stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_len: Option<usize>,

    /// Length of the original input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_len: Option<usize>,
}

fn default_format_version() -> u16 {
    METADATA_FORMAT_VERSION
}

/// Every parameter decode needs, fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParams {
    pub code_byte_width: usize,
    pub field_width: usize,
    pub vocabulary_size: usize,
    pub parity_symbols: usize,
    pub max_dict_size: usize,
    pub protected_len: Option<usize>,
    pub original_len: Option<usize>,
}

impl ArtifactMetadata {
    /// Builds the complete record written by the encoder.
    pub fn from_params(params: &ResolvedParams) -> Self {
        Self {
            format_version: METADATA_FORMAT_VERSION,
            code_byte_width: Some(params.code_byte_width),
            bits_per_token_id: Some(params.field_width),
            vocabulary_size: Some(params.vocabulary_size),
            ecc_parity_symbols_per_block: Some(params.parity_symbols),
            max_dict_size: Some(params.max_dict_size),
            protected_len: params.protected_len,
            original_len: params.original_len,
        }
    }

    /// Checks the record against `vocabulary` and fills in inferable fields.
    pub fn resolve(&self, vocabulary: &Vocabulary) -> Result<ResolvedParams, KmerCodeError> {
        if self.format_version > METADATA_FORMAT_VERSION {
            return Err(KmerCodeError::UnsupportedFormat(self.format_version));
        }

        let code_byte_width = self
            .code_byte_width
            .filter(|w| (1..=MAX_CODE_BYTE_WIDTH).contains(w))
            .ok_or(KmerCodeError::MissingMetadata("code_byte_width"))?;

        let parity_symbols = self
            .ecc_parity_symbols_per_block
            .ok_or(KmerCodeError::MissingMetadata("ecc_parity_symbols_per_block"))?;

        let vocabulary_size = match self.vocabulary_size {
            Some(expected) if expected != vocabulary.len() => {
                return Err(KmerCodeError::VocabularyMismatch {
                    expected,
                    actual: vocabulary.len(),
                });
            }
            Some(expected) => expected,
            None => {
                log::warn!(
                    "metadata has no vocabulary_size; trusting the supplied vocabulary ({} tokens)",
                    vocabulary.len()
                );
                vocabulary.len()
            }
        };

        let required_width = field_width_for(vocabulary_size);
        let field_width = match self.bits_per_token_id {
            Some(width) if width > MAX_FIELD_WIDTH => {
                return Err(KmerCodeError::MissingMetadata("bits_per_token_id"));
            }
            Some(width) if width < required_width => {
                return Err(KmerCodeError::VocabularyMismatch {
                    expected: 1usize << width.min(usize::BITS as usize - 1),
                    actual: vocabulary_size,
                });
            }
            Some(width) => width,
            None => {
                log::warn!(
                    "metadata has no bits_per_token_id; recomputed {} from vocabulary size {}",
                    required_width,
                    vocabulary_size
                );
                required_width
            }
        };

        Ok(ResolvedParams {
            code_byte_width,
            field_width,
            vocabulary_size,
            parity_symbols,
            max_dict_size: self.max_dict_size.unwrap_or(DEFAULT_MAX_DICT_SIZE),
            protected_len: self.protected_len,
            original_len: self.original_len,
        })
    }

    pub fn to_json(&self) -> Result<String, KmerCodeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, KmerCodeError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(n: usize) -> Vocabulary {
        let tokens: Vec<String> = (0..n)
            .map(|i| {
                (0..6)
                    .map(|shift| b"ACGT"[(i >> (2 * shift)) & 3] as char)
                    .collect()
            })
            .collect();
        Vocabulary::from_tokens(tokens).unwrap()
    }

    fn complete(n: usize) -> ArtifactMetadata {
        ArtifactMetadata::from_params(&ResolvedParams {
            code_byte_width: 2,
            field_width: field_width_for(n),
            vocabulary_size: n,
            parity_symbols: 64,
            max_dict_size: DEFAULT_MAX_DICT_SIZE,
            protected_len: Some(300),
            original_len: Some(120),
        })
    }

    #[test]
    fn test_complete_record_resolves_unchanged() {
        let meta = complete(16);
        let params = meta.resolve(&vocab(16)).unwrap();
        assert_eq!(params.field_width, 4);
        assert_eq!(params.code_byte_width, 2);
        assert_eq!(params.protected_len, Some(300));
        assert_eq!(ArtifactMetadata::from_params(&params), meta);
    }

    #[test]
    fn test_json_roundtrip_uses_canonical_keys() {
        let json = complete(16).to_json().unwrap();
        assert!(json.contains("\"bits_per_token_id\""));
        assert!(json.contains("\"ecc_parity_symbols_per_block\""));
        assert_eq!(ArtifactMetadata::from_json(&json).unwrap(), complete(16));
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let legacy = r#"{"byte_length": 3, "bit_per_kmer": 5, "top_n_kmers": 32, "ecc_symbols": 64}"#;
        let meta = ArtifactMetadata::from_json(legacy).unwrap();
        let params = meta.resolve(&vocab(32)).unwrap();
        assert_eq!(params.code_byte_width, 3);
        assert_eq!(params.field_width, 5);
        assert_eq!(params.parity_symbols, 64);
        assert_eq!(params.max_dict_size, DEFAULT_MAX_DICT_SIZE);
        assert_eq!(params.protected_len, None);
    }

    #[test]
    fn test_missing_width_is_recomputed_from_vocabulary() {
        let mut meta = complete(16);
        meta.bits_per_token_id = None;
        let params = meta.resolve(&vocab(16)).unwrap();
        assert_eq!(params.field_width, 4);
    }

    #[test]
    fn test_vocabulary_size_disagreement_fails() {
        let err = complete(16).resolve(&vocab(12)).unwrap_err();
        assert!(matches!(
            err,
            KmerCodeError::VocabularyMismatch {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn test_width_too_narrow_for_vocabulary_fails() {
        let mut meta = complete(16);
        meta.bits_per_token_id = Some(3);
        assert!(matches!(
            meta.resolve(&vocab(16)).unwrap_err(),
            KmerCodeError::VocabularyMismatch { .. }
        ));
    }

    #[test]
    fn test_unrecoverable_fields_are_reported() {
        let mut meta = complete(16);
        meta.code_byte_width = None;
        assert!(matches!(
            meta.resolve(&vocab(16)).unwrap_err(),
            KmerCodeError::MissingMetadata("code_byte_width")
        ));

        let mut meta = complete(16);
        meta.code_byte_width = Some(5);
        assert!(matches!(
            meta.resolve(&vocab(16)).unwrap_err(),
            KmerCodeError::MissingMetadata("code_byte_width")
        ));

        let mut meta = complete(16);
        meta.ecc_parity_symbols_per_block = None;
        assert!(matches!(
            meta.resolve(&vocab(16)).unwrap_err(),
            KmerCodeError::MissingMetadata("ecc_parity_symbols_per_block")
        ));
    }
}
