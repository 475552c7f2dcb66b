// In: src/error.rs

//! This module defines the single, unified error type for the entire kmercode library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KmerCodeError {
    // =========================================================================
    // === Pipeline Errors (the encode/decode failure taxonomy)
    // =========================================================================
    /// The decompressor saw a code that is neither a known dictionary entry
    /// nor the single valid "next" entry.
    #[error("Invalid dictionary code {code} (next available id is {next_id})")]
    InvalidCode { code: u32, next_id: u32 },

    /// A token was looked up that the vocabulary does not contain.
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// A field value has no token assigned to it.
    #[error("Token id {id} is outside the vocabulary (size {vocabulary_size})")]
    UnknownId { id: u32, vocabulary_size: usize },

    /// A block carries more corrupted symbols than its parity can correct.
    #[error("ECC block {block} is uncorrectable")]
    UncorrectableBlock { block: usize },

    /// A compressed code would need more than four bytes.
    #[error("Compressed code {max_code} does not fit in 4 bytes")]
    ByteWidthOverflow { max_code: u64 },

    /// A required metadata field is absent and cannot be inferred.
    #[error("Required metadata field '{0}' is missing or invalid")]
    MissingMetadata(&'static str),

    /// The vocabulary supplied at decode time is not the one the artifact was encoded with.
    #[error("Vocabulary mismatch: metadata expects {expected}, vocabulary provides {actual}")]
    VocabularyMismatch { expected: usize, actual: usize },

    /// Wraps a fatal decode failure together with the number of tokens that
    /// were zero-filled before the failure surfaced.
    #[error("Decode failed after {degraded_tokens} degraded token(s): {source}")]
    DecodeFailed {
        degraded_tokens: usize,
        #[source]
        source: Box<KmerCodeError>,
    },

    // =========================================================================
    // === Vocabulary & Configuration Errors
    // =========================================================================
    #[error("Invalid token '{0}': tokens must be non-empty and use only A, C, G, T")]
    InvalidToken(String),

    #[error("Token '{0}' appears more than once")]
    DuplicateToken(String),

    #[error("Token '{token}' has length {actual}, expected {expected}")]
    TokenLengthMismatch {
        token: String,
        expected: usize,
        actual: usize,
    },

    #[error("Vocabulary must contain at least two tokens, found {0}")]
    EmptyVocabulary(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported on-disk format version {0}")]
    UnsupportedFormat(u16),

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error("Buffer length mismatch: expected a multiple of {0}, got {1}")]
    BufferMismatch(usize, usize),

    #[error("Stream truncated: expected {expected} bytes, found {actual}")]
    TruncatedStream { expected: usize, actual: usize },

    #[error("Decoded length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Malformed ECC block: {0}")]
    MalformedBlock(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g., file not found).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while reading or writing artifacts.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl KmerCodeError {
    /// Returns the degraded-token count carried by a decode failure, if any.
    pub fn degraded_tokens(&self) -> Option<usize> {
        match self {
            KmerCodeError::DecodeFailed {
                degraded_tokens, ..
            } => Some(*degraded_tokens),
            _ => None,
        }
    }

    /// Strips a `DecodeFailed` wrapper and returns the underlying failure kind.
    pub fn root_cause(&self) -> &KmerCodeError {
        match self {
            KmerCodeError::DecodeFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
