//! This module contains the kernel for adaptive dictionary (LZW) compression.
//!
//! This is the first transform of the encode pipeline. It turns raw bytes into a
//! stream of integer codes, each naming an entry in a dictionary that both sides
//! grow in lockstep. The dictionaries are explicit, caller-owned tables scoped to
//! a single invocation, and both carry the same growth ceiling: an encoder and
//! decoder built from the same `max_dict_size` always agree on every entry.

use hashbrown::HashMap;

use crate::error::KmerCodeError;

/// Number of single-byte entries every dictionary starts with.
const ALPHABET_SIZE: u32 = 256;

//==================================================================================
// 1. Dictionary Tables
//==================================================================================

/// The encode-side table: byte sequence -> code.
#[derive(Debug)]
pub struct EncodeDictionary {
    entries: HashMap<Vec<u8>, u32>,
    next_id: u32,
    max_size: usize,
}

impl EncodeDictionary {
    /// Creates a table seeded with the 256 single-byte entries.
    pub fn new(max_size: usize) -> Self {
        let mut entries = HashMap::with_capacity(4096);
        for byte in 0..=255u8 {
            entries.insert(vec![byte], byte as u32);
        }
        Self {
            entries,
            next_id: ALPHABET_SIZE,
            max_size,
        }
    }

    /// The id the next inserted entry will receive.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    fn lookup(&self, sequence: &[u8]) -> Option<u32> {
        self.entries.get(sequence).copied()
    }

    /// Inserts `sequence` unless the table has reached its ceiling.
    fn grow(&mut self, sequence: Vec<u8>) {
        if (self.next_id as usize) < self.max_size && self.next_id < u32::MAX {
            self.entries.insert(sequence, self.next_id);
            self.next_id += 1;
        }
    }
}

/// The decode-side table: code -> byte sequence.
#[derive(Debug)]
pub struct DecodeDictionary {
    entries: Vec<Vec<u8>>,
    max_size: usize,
}

impl DecodeDictionary {
    /// Creates a table seeded with the 256 single-byte entries.
    pub fn new(max_size: usize) -> Self {
        let mut entries = Vec::with_capacity(4096);
        for byte in 0..=255u8 {
            entries.push(vec![byte]);
        }
        Self { entries, max_size }
    }

    /// The id the next inserted entry will receive.
    pub fn next_id(&self) -> u32 {
        self.entries.len() as u32
    }

    fn can_grow(&self) -> bool {
        self.entries.len() < self.max_size && self.entries.len() < u32::MAX as usize
    }

    /// Mirrors `EncodeDictionary::grow`: same ceiling, same trigger.
    fn grow(&mut self, sequence: Vec<u8>) {
        if self.can_grow() {
            self.entries.push(sequence);
        }
    }
}

//==================================================================================
// 2. Core Logic (The "Engine")
//==================================================================================

/// Compresses `input` using a caller-supplied dictionary.
pub fn compress_with(dictionary: &mut EncodeDictionary, input: &[u8]) -> Vec<u32> {
    let mut codes = Vec::with_capacity(input.len() / 2 + 1);
    let mut current: Vec<u8> = Vec::new();
    let mut current_code = 0u32;

    for &byte in input {
        current.push(byte);
        match dictionary.lookup(&current) {
            Some(code) => current_code = code,
            None => {
                // `current` minus its last byte matched on the previous step.
                codes.push(current_code);
                dictionary.grow(std::mem::replace(&mut current, vec![byte]));
                current_code = byte as u32;
            }
        }
    }

    if !current.is_empty() {
        codes.push(current_code);
    }
    codes
}

/// Decompresses `codes` using a caller-supplied dictionary.
pub fn decompress_with(
    dictionary: &mut DecodeDictionary,
    codes: &[u32],
    output_length_hint: usize,
) -> Result<Vec<u8>, KmerCodeError> {
    let mut output = Vec::with_capacity(output_length_hint);
    let Some((&first, rest)) = codes.split_first() else {
        return Ok(output);
    };

    let mut previous = dictionary
        .entries
        .get(first as usize)
        .cloned()
        .ok_or(KmerCodeError::InvalidCode {
            code: first,
            next_id: dictionary.next_id(),
        })?;
    output.extend_from_slice(&previous);

    for &code in rest {
        let next_id = dictionary.next_id();
        let entry = if let Some(known) = dictionary.entries.get(code as usize) {
            known.clone()
        } else if code == next_id && dictionary.can_grow() {
            // The encoder referenced the entry it inserted on its previous step.
            let mut synthesized = previous.clone();
            synthesized.push(previous[0]);
            synthesized
        } else {
            return Err(KmerCodeError::InvalidCode { code, next_id });
        };

        output.extend_from_slice(&entry);
        let mut grown = previous;
        grown.push(entry[0]);
        dictionary.grow(grown);
        previous = entry;
    }

    Ok(output)
}

//==================================================================================
// 3. Public API
//==================================================================================

/// Compresses `input` into LZW codes with a fresh dictionary capped at `max_dict_size`.
pub fn compress(input: &[u8], max_dict_size: usize) -> Vec<u32> {
    let mut dictionary = EncodeDictionary::new(max_dict_size);
    compress_with(&mut dictionary, input)
}

/// Restores the bytes behind `codes` with a fresh dictionary capped at `max_dict_size`.
pub fn decompress(
    codes: &[u32],
    max_dict_size: usize,
    output_length_hint: usize,
) -> Result<Vec<u8>, KmerCodeError> {
    let mut dictionary = DecodeDictionary::new(max_dict_size);
    decompress_with(&mut dictionary, codes, output_length_hint)
}

//==================================================================================
// 4. Unit Tests
//==================================================================================
