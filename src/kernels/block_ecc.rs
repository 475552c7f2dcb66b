//! This module contains the block-wise ECC layer.
//!
//! A byte stream is cut into non-overlapping blocks of `255 - parity` data
//! bytes and every block is turned into its own Reed-Solomon codeword. The
//! final block carries only the bytes present (no padding), so its codeword is
//! shorter. Blocks share no state, so corruption in one never spreads to
//! another, and both directions can run on the rayon pool.

use rayon::prelude::*;

use crate::config::MAX_CODEWORD_LEN;
use crate::error::KmerCodeError;
use crate::kernels::reed_solomon::ReedSolomon;

/// The result of repairing a protected stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    /// The data symbols of every block, concatenated.
    pub data: Vec<u8>,
    /// How many symbols were corrected across all blocks.
    pub repaired_symbols: usize,
}

#[derive(Debug, Clone)]
pub struct BlockEcc {
    codec: ReedSolomon,
    parallel: bool,
}

impl BlockEcc {
    pub fn new(parity_symbols: usize, parallel: bool) -> Result<Self, KmerCodeError> {
        Ok(Self {
            codec: ReedSolomon::new(parity_symbols)?,
            parallel,
        })
    }

    pub fn parity_symbols(&self) -> usize {
        self.codec.parity()
    }

    /// Data bytes carried by every full block.
    pub fn data_symbols_per_block(&self) -> usize {
        MAX_CODEWORD_LEN - self.codec.parity()
    }

    /// Length of the protected stream produced for `data_len` input bytes.
    pub fn protected_len(&self, data_len: usize) -> usize {
        let per_block = self.data_symbols_per_block();
        let full_blocks = data_len / per_block;
        let remainder = data_len % per_block;
        let tail = if remainder == 0 {
            0
        } else {
            remainder + self.codec.parity()
        };
        full_blocks * MAX_CODEWORD_LEN + tail
    }

    /// True when `len` is a length `protect` can produce: every trailing
    /// fragment must hold at least one data symbol after its parity.
    pub fn is_protected_len(&self, len: usize) -> bool {
        let remainder = len % MAX_CODEWORD_LEN;
        remainder == 0 || remainder > self.codec.parity()
    }

    /// Data bytes carried by a protected stream of `protected_len` bytes.
    pub fn data_len(&self, protected_len: usize) -> usize {
        let full_blocks = protected_len / MAX_CODEWORD_LEN;
        let remainder = protected_len % MAX_CODEWORD_LEN;
        full_blocks * self.data_symbols_per_block() + remainder.saturating_sub(self.codec.parity())
    }

    /// Appends parity to every block of `bytes`.
    pub fn protect(&self, bytes: &[u8]) -> Result<Vec<u8>, KmerCodeError> {
        let per_block = self.data_symbols_per_block();
        let codewords: Vec<Vec<u8>> = if self.parallel {
            bytes
                .par_chunks(per_block)
                .map(|block| self.codec.encode(block))
                .collect::<Result<_, _>>()?
        } else {
            bytes
                .chunks(per_block)
                .map(|block| self.codec.encode(block))
                .collect::<Result<_, _>>()?
        };

        let mut output = Vec::with_capacity(self.protected_len(bytes.len()));
        for codeword in codewords {
            output.extend_from_slice(&codeword);
        }
        crate::log_metric!(
            "event"="ecc_protect",
            "data_bytes"=bytes.len(),
            "blocks"=bytes.len().div_ceil(per_block),
            "protected_bytes"=output.len()
        );
        Ok(output)
    }

    /// Corrects every block and returns the concatenated data symbols.
    ///
    /// # Errors
    /// `UncorrectableBlock` names the first block whose corruption exceeds
    /// `parity / 2` symbols. `MalformedBlock` is returned when the trailing
    /// fragment is too short to hold any data.
    pub fn repair(&self, bytes: &[u8]) -> Result<RepairOutcome, KmerCodeError> {
        let repaired: Vec<(Vec<u8>, usize)> = if self.parallel {
            bytes
                .par_chunks(MAX_CODEWORD_LEN)
                .enumerate()
                .map(|(index, block)| self.repair_block(index, block))
                .collect::<Result<_, _>>()?
        } else {
            bytes
                .chunks(MAX_CODEWORD_LEN)
                .enumerate()
                .map(|(index, block)| self.repair_block(index, block))
                .collect::<Result<_, _>>()?
        };

        let mut data = Vec::with_capacity(bytes.len());
        let mut repaired_symbols = 0;
        for (block, fixed) in repaired {
            data.extend_from_slice(&block);
            repaired_symbols += fixed;
        }
        crate::log_metric!(
            "event"="ecc_repair",
            "protected_bytes"=bytes.len(),
            "data_bytes"=data.len(),
            "repaired_symbols"=repaired_symbols
        );
        Ok(RepairOutcome {
            data,
            repaired_symbols,
        })
    }

    fn repair_block(&self, index: usize, block: &[u8]) -> Result<(Vec<u8>, usize), KmerCodeError> {
        if block.len() <= self.codec.parity() {
            return Err(KmerCodeError::MalformedBlock(format!(
                "block {} has {} symbols, needs more than {} parity symbols",
                index,
                block.len(),
                self.codec.parity()
            )));
        }
        self.codec.correct(block).map_err(|_| {
            log::warn!("ECC block {} exceeds correction capacity", index);
            KmerCodeError::UncorrectableBlock { block: index }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample_bytes(len: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.random()).collect()
    }

    #[test]
    fn test_default_block_geometry() {
        let ecc = BlockEcc::new(64, false).unwrap();
        assert_eq!(ecc.data_symbols_per_block(), 191);
        assert_eq!(ecc.protected_len(0), 0);
        assert_eq!(ecc.protected_len(191), 255);
        assert_eq!(ecc.protected_len(192), 255 + 1 + 64);
        assert_eq!(ecc.protected_len(400), 2 * 255 + 18 + 64);
        for data_len in [0, 1, 190, 191, 192, 400, 1000] {
            let protected_len = ecc.protected_len(data_len);
            assert!(ecc.is_protected_len(protected_len));
            assert_eq!(ecc.data_len(protected_len), data_len);
        }
        assert!(!ecc.is_protected_len(255 + 64));
    }

    #[test]
    fn test_protect_repair_multi_block() {
        let ecc = BlockEcc::new(64, false).unwrap();
        let data = sample_bytes(1000, 1);
        let protected = ecc.protect(&data).unwrap();
        assert_eq!(protected.len(), ecc.protected_len(data.len()));

        let outcome = ecc.repair(&protected).unwrap();
        assert_eq!(outcome.data, data);
        assert_eq!(outcome.repaired_symbols, 0);
    }

    #[test]
    fn test_short_final_block_is_not_padded() {
        let ecc = BlockEcc::new(2, false).unwrap();
        let protected = ecc.protect(&[0, 65, 1, 0, 0, 65]).unwrap();
        assert_eq!(protected.len(), 8);
        assert_eq!(&protected[..6], &[0, 65, 1, 0, 0, 65]);
    }

    #[test]
    fn test_every_block_corrects_independently() {
        let ecc = BlockEcc::new(16, false).unwrap();
        let data = sample_bytes(239 * 3 + 50, 2);
        let mut protected = ecc.protect(&data).unwrap();

        // Eight errors in each of the four blocks, including the short tail.
        for block_start in (0..protected.len()).step_by(MAX_CODEWORD_LEN) {
            for offset in 0..8 {
                protected[block_start + offset * 3] ^= 0xA5;
            }
        }
        let outcome = ecc.repair(&protected).unwrap();
        assert_eq!(outcome.data, data);
        assert_eq!(outcome.repaired_symbols, 32);
    }

    #[test]
    fn test_uncorrectable_block_is_named() {
        let ecc = BlockEcc::new(4, false).unwrap();
        let data = sample_bytes(251 * 2, 3);
        let mut protected = ecc.protect(&data).unwrap();

        // Block 0 stays within capacity, block 1 is overwhelmed.
        protected[10] ^= 1;
        for offset in 0..5 {
            protected[MAX_CODEWORD_LEN + offset] ^= 0xFF;
        }
        match ecc.repair(&protected) {
            Err(KmerCodeError::UncorrectableBlock { block }) => assert_eq!(block, 1),
            Ok(outcome) => assert_ne!(outcome.data, data),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = BlockEcc::new(32, false).unwrap();
        let parallel = BlockEcc::new(32, true).unwrap();
        let data = sample_bytes(10_000, 4);

        let protected = sequential.protect(&data).unwrap();
        assert_eq!(parallel.protect(&data).unwrap(), protected);

        let mut corrupted = protected.clone();
        corrupted[300] ^= 0x42;
        corrupted[9_000] ^= 0x17;
        assert_eq!(
            parallel.repair(&corrupted).unwrap(),
            sequential.repair(&corrupted).unwrap()
        );
    }

    #[test]
    fn test_fragment_shorter_than_parity_is_malformed() {
        let ecc = BlockEcc::new(8, false).unwrap();
        let mut protected = ecc.protect(&sample_bytes(247, 5)).unwrap();
        protected.extend_from_slice(&[0, 0, 0]);
        assert!(ecc.is_protected_len(255));
        assert!(!ecc.is_protected_len(protected.len()));
        let err = ecc.repair(&protected).unwrap_err();
        assert!(matches!(err, KmerCodeError::MalformedBlock(_)));
    }
}
