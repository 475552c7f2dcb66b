//! In-memory forms of an encoded artifact and of a decode result.
//!
//! A token sequence is only meaningful together with the metadata it was
//! produced with, so the two always travel as one `EncodedArtifact`.

use serde::{Deserialize, Serialize};

use crate::pipeline::metadata::ArtifactMetadata;

/// The output of `encode`: the token sequence and its paired metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub tokens: Vec<String>,
    pub metadata: ArtifactMetadata,
}

impl EncodedArtifact {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// The output of a successful `decode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    /// The recovered bytes.
    pub data: Vec<u8>,
    /// Tokens absent from the vocabulary that were zero-filled.
    pub degraded_tokens: usize,
    /// Symbols the ECC layer corrected across all blocks.
    pub repaired_symbols: usize,
}
