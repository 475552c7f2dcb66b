//! The pure, stateless transforms composed by the `pipeline` orchestrator.
//!
//! Each sub-module is one stage of the byte <-> token path. None of them know
//! about vocabularies or metadata; the orchestrator passes every parameter in.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Stage 1: Dictionary Compression
pub mod lzw;

/// Stage 2: Fixed-Width Code Packing
pub mod code_pack;

/// Stage 3: Error Correction
pub mod gf256;
pub mod reed_solomon;
pub mod block_ecc;

/// Stage 4: Bit Fields
pub mod bitpack;

// Kernels are called through their full path (e.g. `kernels::lzw::compress`)
// by the orchestrator; nothing is re-exported here.
