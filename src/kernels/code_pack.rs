//! This module contains the kernels for fixed-width code packing.
//!
//! LZW codes are written as big-endian integers that all share one byte width,
//! the smallest width (1 to 4 bytes) that holds the largest code in the stream.
//! The width travels in the artifact metadata so the decoder can re-slice the
//! repaired byte stream into the same codes.

use crate::error::KmerCodeError;

/// Widest code the packer will emit.
pub const MAX_CODE_BYTE_WIDTH: usize = 4;

/// Returns the minimum number of bytes needed to hold `max_code`, never less than one.
pub fn min_byte_width(max_code: u64) -> Result<usize, KmerCodeError> {
    let bits = (u64::BITS - max_code.leading_zeros()) as usize;
    let width = bits.div_ceil(8).max(1);
    if width > MAX_CODE_BYTE_WIDTH {
        return Err(KmerCodeError::ByteWidthOverflow { max_code });
    }
    Ok(width)
}

/// Writes every code as `byte_width` big-endian bytes.
pub fn pack(codes: &[u32], byte_width: usize) -> Result<Vec<u8>, KmerCodeError> {
    if byte_width == 0 || byte_width > MAX_CODE_BYTE_WIDTH {
        return Err(KmerCodeError::MissingMetadata("code_byte_width"));
    }
    let mut output = Vec::with_capacity(codes.len() * byte_width);
    for &code in codes {
        if min_byte_width(code as u64)? > byte_width {
            return Err(KmerCodeError::ByteWidthOverflow {
                max_code: code as u64,
            });
        }
        output.extend_from_slice(&code.to_be_bytes()[MAX_CODE_BYTE_WIDTH - byte_width..]);
    }
    Ok(output)
}

/// Re-slices a byte stream into `byte_width`-byte big-endian codes.
pub fn unpack(bytes: &[u8], byte_width: usize) -> Result<Vec<u32>, KmerCodeError> {
    if byte_width == 0 || byte_width > MAX_CODE_BYTE_WIDTH {
        return Err(KmerCodeError::MissingMetadata("code_byte_width"));
    }
    if bytes.len() % byte_width != 0 {
        return Err(KmerCodeError::BufferMismatch(byte_width, bytes.len()));
    }
    Ok(bytes
        .chunks_exact(byte_width)
        .map(|chunk| chunk.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
        .collect())
}
