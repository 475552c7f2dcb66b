// In: src/pipeline/orchestrator.rs

//! The pure, in-memory encode/decode orchestrator.
//!
//! Encode: bytes -> LZW codes -> fixed-width packing -> block ECC -> bitstream
//! -> fixed-width fields -> tokens. Decode runs the same stages in mirror
//! order. Every parameter decode needs is captured in `ArtifactMetadata`, so
//! the two directions never depend on independently configured constants.

use bitvec::prelude::*;

use crate::config::KmerCodeConfig;
use crate::error::KmerCodeError;
use crate::kernels::block_ecc::BlockEcc;
use crate::kernels::{bitpack, code_pack, lzw};
use crate::pipeline::artifact::{DecodeReport, EncodedArtifact};
use crate::pipeline::metadata::{ArtifactMetadata, ResolvedParams};
use crate::vocabulary::Vocabulary;

//==================================================================================
// 1. Encode
//==================================================================================

/// Encodes `input` into a token sequence over `vocabulary`.
///
/// # Errors
/// `ByteWidthOverflow` if a code needs more than four bytes, and `UnknownId`
/// if a field value has no token, which can only happen when the vocabulary
/// size is not a power of two.
pub fn encode_bytes(
    input: &[u8],
    vocabulary: &Vocabulary,
    config: &KmerCodeConfig,
) -> Result<EncodedArtifact, KmerCodeError> {
    config.validate()?;
    if !vocabulary.is_fully_addressable() {
        log::warn!(
            "vocabulary size {} is not a power of two; some field values have no token",
            vocabulary.len()
        );
    }

    // 1. Dictionary compression.
    let codes = lzw::compress(input, config.max_dict_size);
    let max_code = codes.iter().copied().max().unwrap_or(0);

    // 2. Fixed-width code packing.
    let code_byte_width = code_pack::min_byte_width(max_code as u64)?;
    let packed = code_pack::pack(&codes, code_byte_width)?;
    crate::log_metric!(
        "event"="lzw_compress",
        "input_bytes"=input.len(),
        "codes"=codes.len(),
        "max_code"=max_code,
        "code_byte_width"=code_byte_width
    );

    // 3. Block ECC.
    let ecc = BlockEcc::new(config.parity_symbols, config.parallel_blocks)?;
    let protected = ecc.protect(&packed)?;

    // 4. Bitstream -> fields -> tokens.
    let field_width = vocabulary.field_width();
    let bits = bitpack::to_bitstream(&protected);
    let fields = bitpack::slice_fields(&bits, field_width)?;
    let tokens = fields
        .iter()
        .map(|&id| vocabulary.id_to_token(id).map(str::to_owned))
        .collect::<Result<Vec<_>, _>>()?;
    crate::log_metric!(
        "event"="tokenize",
        "protected_bytes"=protected.len(),
        "field_width"=field_width,
        "tokens"=tokens.len()
    );

    let params = ResolvedParams {
        code_byte_width,
        field_width,
        vocabulary_size: vocabulary.len(),
        parity_symbols: config.parity_symbols,
        max_dict_size: config.max_dict_size,
        protected_len: Some(protected.len()),
        original_len: Some(input.len()),
    };
    log::info!(
        "Encoded {} bytes into {} tokens ({} bits per token, {} parity symbols per block)",
        input.len(),
        tokens.len(),
        field_width,
        config.parity_symbols
    );

    Ok(EncodedArtifact {
        tokens,
        metadata: ArtifactMetadata::from_params(&params),
    })
}

//==================================================================================
// 2. Decode
//==================================================================================

/// Decodes a token sequence back into the original bytes.
///
/// Encoding parameters come from `metadata` only; `config` contributes
/// execution options (`parallel_blocks`). Tokens missing from the vocabulary
/// are replaced by all-zero fields and counted; the ECC layer absorbs them
/// while the corruption stays within capacity.
///
/// # Errors
/// Metadata problems are returned directly. Any failure after token mapping
/// is wrapped in `DecodeFailed`, which carries the degraded-token count.
pub fn decode_tokens<S: AsRef<str>>(
    tokens: &[S],
    vocabulary: &Vocabulary,
    metadata: &ArtifactMetadata,
    config: &KmerCodeConfig,
) -> Result<DecodeReport, KmerCodeError> {
    let params = metadata.resolve(vocabulary)?;

    let mut degraded_tokens = 0;
    let fields: Vec<u32> = tokens
        .iter()
        .map(|token| {
            vocabulary.lookup(token.as_ref()).unwrap_or_else(|| {
                degraded_tokens += 1;
                0
            })
        })
        .collect();
    if degraded_tokens > 0 {
        log::warn!(
            "{} of {} tokens are not in the vocabulary and were zero-filled",
            degraded_tokens,
            tokens.len()
        );
    }

    let (data, repaired_symbols) =
        decode_fields(&fields, &params, config).map_err(|source| {
            KmerCodeError::DecodeFailed {
                degraded_tokens,
                source: Box::new(source),
            }
        })?;

    log::info!(
        "Decoded {} tokens into {} bytes ({} degraded tokens, {} repaired symbols)",
        tokens.len(),
        data.len(),
        degraded_tokens,
        repaired_symbols
    );
    Ok(DecodeReport {
        data,
        degraded_tokens,
        repaired_symbols,
    })
}

/// Every decode stage after token lookup. Returns the bytes and the repaired symbol count.
fn decode_fields(
    fields: &[u32],
    params: &ResolvedParams,
    config: &KmerCodeConfig,
) -> Result<(Vec<u8>, usize), KmerCodeError> {
    // 1. Fields -> bitstream -> whole bytes. Trailing pad bits are dropped.
    let bits = bitpack::from_fields(fields, params.field_width)?;
    let available = bits.len() / 8;
    let bytes = bitpack::to_bytes(&bits[..available * 8]);

    // 2. Block ECC repair over exactly the protected stream.
    let ecc = BlockEcc::new(params.parity_symbols, config.parallel_blocks)?;
    let protected_len = match params.protected_len {
        Some(expected) if expected > available => {
            return Err(KmerCodeError::TruncatedStream {
                expected,
                actual: available,
            });
        }
        Some(expected) => expected,
        None => infer_protected_len(&bits, fields.len(), params, &ecc)?,
    };
    let outcome = ecc.repair(&bytes[..protected_len])?;

    // 3. Unpack and decompress.
    let codes = code_pack::unpack(&outcome.data, params.code_byte_width)?;
    let hint = params
        .original_len
        .unwrap_or(outcome.data.len() * 2)
        .min(outcome.data.len().saturating_mul(64));
    let data = lzw::decompress(&codes, params.max_dict_size, hint)?;
    crate::log_metric!(
        "event"="lzw_decompress",
        "codes"=codes.len(),
        "output_bytes"=data.len()
    );

    if let Some(expected) = params.original_len {
        if data.len() != expected {
            return Err(KmerCodeError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
    }
    Ok((data, outcome.repaired_symbols))
}

/// Recovers the protected stream length for metadata that does not record it.
///
/// `n` fields of `w` bits could have come from any length `p` with
/// `ceil(8p / w) == n`; for `w > 8` that is more than one length. A candidate
/// survives only if `protect` can emit it, its data splits into whole codes,
/// and every bit after it is zero padding. Anything but a single survivor is
/// reported rather than guessed: a zero appended to a codeword is still a
/// codeword, so the ECC layer cannot settle it.
fn infer_protected_len(
    bits: &BitSlice<u8, Msb0>,
    token_count: usize,
    params: &ResolvedParams,
    ecc: &BlockEcc,
) -> Result<usize, KmerCodeError> {
    if token_count == 0 {
        return Ok(0);
    }
    let lowest = (token_count - 1) * params.field_width / 8 + 1;
    let highest = bits.len() / 8;
    let candidates: Vec<usize> = (lowest..=highest)
        .filter(|&len| bitpack::field_count(len * 8, params.field_width) == token_count)
        .filter(|&len| ecc.is_protected_len(len))
        .filter(|&len| ecc.data_len(len) % params.code_byte_width == 0)
        .filter(|&len| bits[len * 8..].not_any())
        .collect();

    match candidates.as_slice() {
        [len] => Ok(*len),
        _ => {
            log::warn!(
                "cannot recover protected_len from {} tokens of {} bits: candidates {:?}",
                token_count,
                params.field_width,
                candidates
            );
            Err(KmerCodeError::MissingMetadata("protected_len"))
        }
    }
}
