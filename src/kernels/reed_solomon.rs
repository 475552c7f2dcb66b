//! This module contains a systematic Reed-Solomon codec over GF(2^8).
//!
//! A codeword is the data symbols followed by `parity` check symbols, at most
//! 255 symbols in total. Up to `parity / 2` corrupted symbols at unknown
//! positions are corrected using Berlekamp-Massey to find the error locator,
//! a Chien search to find the positions, and Forney's formula for the
//! magnitudes. The generator's roots are alpha^0 .. alpha^(parity - 1).

use crate::config::MAX_CODEWORD_LEN;
use crate::error::KmerCodeError;
use crate::kernels::gf256::{self, alpha_pow, div, mul, poly_eval, poly_eval_ascending};

/// Returned when a codeword holds more errors than its parity can locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyErrors;

/// A Reed-Solomon code with a fixed number of parity symbols.
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    parity: usize,
    generator: Vec<u8>,
}

impl ReedSolomon {
    pub fn new(parity: usize) -> Result<Self, KmerCodeError> {
        if parity >= MAX_CODEWORD_LEN {
            return Err(KmerCodeError::InvalidConfig(format!(
                "parity_symbols must be below {}, got {}",
                MAX_CODEWORD_LEN, parity
            )));
        }
        let mut generator = vec![1u8];
        for i in 0..parity {
            generator = gf256::poly_mul(&generator, &[1, alpha_pow(i as i64)]);
        }
        Ok(Self { parity, generator })
    }

    pub fn parity(&self) -> usize {
        self.parity
    }

    /// Largest number of corrupted symbols a codeword can carry and still be repaired.
    pub fn correction_capacity(&self) -> usize {
        self.parity / 2
    }

    /// Returns `data` followed by its parity symbols.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, KmerCodeError> {
        if data.len() + self.parity > MAX_CODEWORD_LEN {
            return Err(KmerCodeError::MalformedBlock(format!(
                "{} data symbols plus {} parity symbols exceed the {}-symbol codeword",
                data.len(),
                self.parity,
                MAX_CODEWORD_LEN
            )));
        }

        // Polynomial long division of data(x) * x^parity by the monic generator.
        let mut codeword = vec![0u8; data.len() + self.parity];
        codeword[..data.len()].copy_from_slice(data);
        for i in 0..data.len() {
            let coef = codeword[i];
            if coef == 0 {
                continue;
            }
            for (j, &g) in self.generator.iter().enumerate().skip(1) {
                codeword[i + j] ^= mul(g, coef);
            }
        }
        codeword[..data.len()].copy_from_slice(data);
        Ok(codeword)
    }

    /// Evaluates the received word at each generator root.
    pub fn syndromes(&self, codeword: &[u8]) -> Vec<u8> {
        (0..self.parity)
            .map(|j| poly_eval(codeword, alpha_pow(j as i64)))
            .collect()
    }

    /// Returns the data portion of `codeword` after correcting it, plus the
    /// number of symbols that were repaired.
    pub fn correct(&self, codeword: &[u8]) -> Result<(Vec<u8>, usize), TooManyErrors> {
        let n = codeword.len();
        if n <= self.parity || n > MAX_CODEWORD_LEN {
            return Err(TooManyErrors);
        }
        let data_len = n - self.parity;

        let syndromes = self.syndromes(codeword);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok((codeword[..data_len].to_vec(), 0));
        }

        let (locator, errors) = self.find_error_locator(&syndromes)?;
        let positions = find_error_positions(&locator, n);
        if positions.len() != errors {
            return Err(TooManyErrors);
        }

        let evaluator = error_evaluator(&syndromes, &locator, self.parity);
        let derivative = formal_derivative(&locator);

        let mut repaired = codeword.to_vec();
        for &index in &positions {
            let power = (n - 1 - index) as i64;
            let x = alpha_pow(power);
            let x_inv = alpha_pow(-power);
            let denominator = poly_eval_ascending(&derivative, x_inv);
            if denominator == 0 {
                return Err(TooManyErrors);
            }
            let numerator = mul(x, poly_eval_ascending(&evaluator, x_inv));
            repaired[index] ^= div(numerator, denominator);
        }

        // A miscorrection would leave a word that is still not a codeword.
        if self.syndromes(&repaired).iter().any(|&s| s != 0) {
            return Err(TooManyErrors);
        }

        repaired.truncate(data_len);
        Ok((repaired, positions.len()))
    }

    /// Berlekamp-Massey. Returns the locator (lowest degree first) and its degree.
    fn find_error_locator(&self, syndromes: &[u8]) -> Result<(Vec<u8>, usize), TooManyErrors> {
        let mut locator = vec![1u8];
        let mut previous = vec![1u8];
        let mut errors = 0usize;
        let mut shift = 1usize;
        let mut previous_discrepancy = 1u8;

        for r in 0..syndromes.len() {
            let mut discrepancy = syndromes[r];
            for i in 1..locator.len().min(r + 1) {
                discrepancy ^= mul(locator[i], syndromes[r - i]);
            }
            if discrepancy == 0 {
                shift += 1;
                continue;
            }

            let coef = div(discrepancy, previous_discrepancy);
            let mut updated = locator.clone();
            if updated.len() < previous.len() + shift {
                updated.resize(previous.len() + shift, 0);
            }
            for (i, &p) in previous.iter().enumerate() {
                updated[i + shift] ^= mul(coef, p);
            }

            if 2 * errors <= r {
                errors = r + 1 - errors;
                previous = std::mem::replace(&mut locator, updated);
                previous_discrepancy = discrepancy;
                shift = 1;
            } else {
                locator = updated;
                shift += 1;
            }
        }

        while locator.len() > 1 && locator[locator.len() - 1] == 0 {
            locator.pop();
        }
        let degree = locator.len() - 1;
        if degree == 0 || degree != errors || 2 * errors > self.parity {
            return Err(TooManyErrors);
        }
        Ok((locator, degree))
    }
}

/// Chien search: indices (into the received word) whose inverse locator root vanishes.
fn find_error_positions(locator: &[u8], n: usize) -> Vec<usize> {
    (0..n)
        .filter(|&index| {
            let power = (n - 1 - index) as i64;
            poly_eval_ascending(locator, alpha_pow(-power)) == 0
        })
        .collect()
}

/// Omega(x) = S(x) * Lambda(x) mod x^parity, lowest degree first.
fn error_evaluator(syndromes: &[u8], locator: &[u8], parity: usize) -> Vec<u8> {
    let mut evaluator = vec![0u8; parity];
    for (k, slot) in evaluator.iter_mut().enumerate() {
        for (j, &l) in locator.iter().enumerate().take(k + 1) {
            *slot ^= mul(syndromes[k - j], l);
        }
    }
    evaluator
}

/// In characteristic two only the odd-degree terms survive differentiation.
fn formal_derivative(locator: &[u8]) -> Vec<u8> {
    (1..locator.len())
        .map(|j| if j % 2 == 1 { locator[j] } else { 0 })
        .collect()
}
