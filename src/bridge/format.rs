// In: src/bridge/format.rs

//! Defines the on-disk layout of an encoded artifact.
//!
//! An artifact is a triple of JSON files sharing one path prefix:
//! `<prefix>_tokens.json`, `<prefix>_metadata.json` and `<prefix>_vocabulary.json`.
//! The token and metadata files are always written together; mixing files from
//! two different encode runs is not detectable in general and must not be done.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

//==================================================================================
// I. File Naming
//==================================================================================

pub const TOKENS_SUFFIX: &str = "_tokens.json";
pub const METADATA_SUFFIX: &str = "_metadata.json";
pub const VOCABULARY_SUFFIX: &str = "_vocabulary.json";

/// The current version of the token sequence document.
pub const TOKENS_FORMAT_VERSION: u16 = 1;

/// The three files that make up one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub tokens: PathBuf,
    pub metadata: PathBuf,
    pub vocabulary: PathBuf,
}

impl ArtifactPaths {
    pub fn from_prefix<P: AsRef<Path>>(prefix: P) -> Self {
        let prefix = prefix.as_ref();
        Self {
            tokens: with_suffix(prefix, TOKENS_SUFFIX),
            metadata: with_suffix(prefix, METADATA_SUFFIX),
            vocabulary: with_suffix(prefix, VOCABULARY_SUFFIX),
        }
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = prefix.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

//==================================================================================
// II. On-Disk Documents
//==================================================================================

/// The persisted token sequence, in emission order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenSequenceDocument {
    #[serde(default = "default_tokens_version")]
    pub format_version: u16,
    pub tokens: Vec<String>,
}

fn default_tokens_version() -> u16 {
    TOKENS_FORMAT_VERSION
}

/// A summary of one `encode_file` run.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    pub input_bytes: usize,
    pub token_count: usize,
    pub vocabulary_size: usize,
    pub bits_per_token_id: usize,
    pub code_byte_width: usize,
    pub protected_bytes: usize,
    #[serde(skip)]
    pub paths: ArtifactPaths,
}
