// In: src/pipeline/mod.rs

//! The encode/decode engine.
//!
//! `orchestrator` chains the kernels in order; `metadata` is the contract that
//! lets decode reproduce every encode-time decision; `artifact` holds the
//! in-memory results. File persistence lives one layer up, in `bridge`.

pub mod artifact;
pub mod metadata;
pub mod orchestrator;

pub use artifact::{DecodeReport, EncodedArtifact};
pub use metadata::{ArtifactMetadata, ResolvedParams};
pub use orchestrator::{decode_tokens, encode_bytes};
