//! This file is the root of the `kmercode` Rust crate.
//!
//! kmercode turns arbitrary bytes into a sequence of fixed-length k-mer tokens
//! and back: LZW compression, fixed-width code packing, block Reed-Solomon
//! protection, and bit-field slicing against a fixed token vocabulary. Its
//! responsibilities here are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`pipeline`, `kernels`, etc.).
//! 2.  Re-exporting the small public surface most callers need.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod pipeline;
pub mod vocabulary;

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use bridge::{decode_file, encode_file, load_artifact, save_artifact};
pub use config::KmerCodeConfig;
pub use error::KmerCodeError;
pub use observability::enable_verbose_logging;
pub use pipeline::{decode_tokens, encode_bytes, ArtifactMetadata, DecodeReport, EncodedArtifact};
pub use vocabulary::Vocabulary;
