//! This module contains the pure kernels that move between byte streams,
//! bitstreams and fixed-width token fields.
//!
//! Bits are ordered most significant first, both within a byte and within a
//! field, so a field is simply the next `field_width` bits of the stream read
//! as a big-endian unsigned integer. The stream is logically zero-extended at
//! its tail: a final short field is padded with zero bits.

use bitvec::prelude::*;

use crate::error::KmerCodeError;

/// Widest field the packer supports (ids are `u32`).
pub const MAX_FIELD_WIDTH: usize = 32;

/// The bitstream representation shared by every function in this module.
pub type Bitstream = BitVec<u8, Msb0>;

fn check_width(field_width: usize) -> Result<(), KmerCodeError> {
    if field_width == 0 || field_width > MAX_FIELD_WIDTH {
        return Err(KmerCodeError::InvalidConfig(format!(
            "field width must be within 1..={}, got {}",
            MAX_FIELD_WIDTH, field_width
        )));
    }
    Ok(())
}

/// Views a byte stream as a bitstream, most significant bit first.
pub fn to_bitstream(bytes: &[u8]) -> Bitstream {
    BitVec::from_slice(bytes)
}

/// Packs a bitstream back into bytes. A trailing partial byte is zero-padded.
pub fn to_bytes(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            let value = chunk
                .iter()
                .by_vals()
                .fold(0u8, |acc, bit| (acc << 1) | bit as u8);
            value << (8 - chunk.len())
        })
        .collect()
}

/// Number of fields needed to cover `bit_len` bits.
pub fn field_count(bit_len: usize, field_width: usize) -> usize {
    bit_len.div_ceil(field_width)
}

/// Reads consecutive `field_width`-bit big-endian integers, zero-padding the final field.
pub fn slice_fields(
    bits: &BitSlice<u8, Msb0>,
    field_width: usize,
) -> Result<Vec<u32>, KmerCodeError> {
    check_width(field_width)?;
    let fields = bits
        .chunks(field_width)
        .map(|chunk| {
            let value = chunk
                .iter()
                .by_vals()
                .fold(0u64, |acc, bit| (acc << 1) | bit as u64);
            (value << (field_width - chunk.len())) as u32
        })
        .collect();
    Ok(fields)
}

/// Concatenates the `field_width`-bit representation of every value.
///
/// # Errors
/// Returns `InvalidConfig` for an unsupported width and `UnknownId` when a
/// value does not fit in `field_width` bits.
pub fn from_fields(fields: &[u32], field_width: usize) -> Result<Bitstream, KmerCodeError> {
    check_width(field_width)?;
    let mut bits = Bitstream::with_capacity(fields.len() * field_width);
    for &value in fields {
        if field_width < MAX_FIELD_WIDTH && (value as u64) >> field_width != 0 {
            return Err(KmerCodeError::UnknownId {
                id: value,
                vocabulary_size: 1usize << field_width,
            });
        }
        for shift in (0..field_width).rev() {
            bits.push((value >> shift) & 1 == 1);
        }
    }
    Ok(bits)
}
