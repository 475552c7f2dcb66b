// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the file-level facade of the kmercode library. It wraps the pure,
// in-memory `pipeline` engine with reading the input, persisting the artifact triple
// and writing the recovered output.
//
// Data Flow (Encode):
//
//   1. [Stateless API (encode_file)]        -> Reads raw bytes, applies vocabulary_limit
//         |
//         `-> calls ->
//
//   2. [Pipeline Engine (pipeline::orchestrator)] -> Returns `EncodedArtifact`
//         |
//         `-> a. `save_artifact` writes `<prefix>_tokens.json` + `<prefix>_metadata.json`
//         |
//         `-> b. `Vocabulary::save` writes `<prefix>_vocabulary.json`
//
// Data Flow (Decode):
//
//   1. [Stateless API (decode_file)]        -> `load_artifact` + `Vocabulary::load`, caller's config
//         |
//         `-> calls ->
//
//   2. [Pipeline Engine (pipeline::orchestrator)] -> Returns `DecodeReport`
//         |
//         `-> writes `report.data` to the output path, returns the report
//
// ====================================================================================
pub mod format;
pub mod stateless_api;

pub use format::{ArtifactPaths, EncodeSummary};
pub use stateless_api::{decode_file, encode_file, load_artifact, save_artifact};

#[cfg(test)]
mod tests;
