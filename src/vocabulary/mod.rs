//! The token vocabulary: a fixed, ordered, bidirectional mapping between dense
//! ids and k-mer tokens.
//!
//! Ids follow the enumeration order of the source tokens. That order is part of
//! the artifact contract: it is persisted verbatim and never regenerated, since
//! the field width and every emitted id depend on it. A `Vocabulary` is
//! immutable after construction and can be shared freely between threads.

use std::path::Path;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::error::KmerCodeError;

/// The current version of the on-disk vocabulary document.
pub const VOCABULARY_FORMAT_VERSION: u16 = 1;

/// Bases a token may contain.
pub const ALPHABET: [u8; 4] = *b"ACGT";

fn is_base(byte: u8) -> bool {
    ALPHABET.contains(&byte)
}

//==================================================================================
// I. The Vocabulary
//==================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: HashMap<String, u32>,
    token_length: usize,
}

impl Vocabulary {
    /// Builds a vocabulary from distinct, equal-length tokens over {A, C, G, T}.
    /// Ids are assigned in enumeration order.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, KmerCodeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        let mut ids: HashMap<String, u32> = HashMap::new();
        let mut token_length = 0;

        for token in tokens {
            let token: String = token.into();
            if token.is_empty() || !token.bytes().all(is_base) {
                return Err(KmerCodeError::InvalidToken(token));
            }
            if ordered.is_empty() {
                token_length = token.len();
            } else if token.len() != token_length {
                return Err(KmerCodeError::TokenLengthMismatch {
                    expected: token_length,
                    actual: token.len(),
                    token,
                });
            }
            if ids.contains_key(&token) {
                return Err(KmerCodeError::DuplicateToken(token));
            }
            if ordered.len() >= u32::MAX as usize {
                return Err(KmerCodeError::InvalidConfig(
                    "vocabulary exceeds the u32 id space".to_string(),
                ));
            }
            ids.insert(token.clone(), ordered.len() as u32);
            ordered.push(token);
        }

        if ordered.len() < 2 {
            return Err(KmerCodeError::EmptyVocabulary(ordered.len()));
        }

        Ok(Self {
            tokens: ordered,
            ids,
            token_length,
        })
    }

    /// Collects every distinct length-`k` window of `sequence` in order of
    /// first occurrence. Input is case-folded and windows touching any base
    /// outside {A, C, G, T} (e.g. `N`) are skipped. FASTA header lines (`>`)
    /// are dropped, so records are joined as one sequence.
    pub fn from_sequence(sequence: &str, k: usize) -> Result<Self, KmerCodeError> {
        if k == 0 {
            return Err(KmerCodeError::InvalidConfig(
                "token length must be at least 1".to_string(),
            ));
        }
        let bases: Vec<u8> = sequence
            .lines()
            .filter(|line| !line.starts_with('>'))
            .flat_map(str::bytes)
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase())
            .collect();

        let mut seen: HashSet<&[u8]> = HashSet::new();
        let mut ordered: Vec<String> = Vec::new();
        for window in bases.windows(k) {
            if !window.iter().copied().all(is_base) {
                continue;
            }
            if seen.insert(window) {
                // Every byte is one of ACGT, so this is valid UTF-8.
                ordered.push(String::from_utf8_lossy(window).into_owned());
            }
        }
        log::info!(
            "Collected {} distinct {}-mers from {} bases",
            ordered.len(),
            k,
            bases.len()
        );
        Self::from_tokens(ordered)
    }

    /// Keeps only the first `limit` ids. A power-of-two size makes every field
    /// value addressable.
    pub fn truncated(&self, limit: usize) -> Result<Self, KmerCodeError> {
        if limit >= self.tokens.len() {
            return Ok(self.clone());
        }
        Self::from_tokens(self.tokens[..limit].iter().cloned())
    }

    /// Number of tokens, `N`.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Length `k` shared by every token.
    pub fn token_length(&self) -> usize {
        self.token_length
    }

    /// Bits needed to address every id: `ceil(log2(N))`, never less than one.
    pub fn field_width(&self) -> usize {
        field_width_for(self.tokens.len())
    }

    /// True when every `field_width`-bit value names a token.
    pub fn is_fully_addressable(&self) -> bool {
        self.tokens.len().is_power_of_two()
    }

    pub fn id_to_token(&self, id: u32) -> Result<&str, KmerCodeError> {
        self.tokens
            .get(id as usize)
            .map(String::as_str)
            .ok_or(KmerCodeError::UnknownId {
                id,
                vocabulary_size: self.tokens.len(),
            })
    }

    pub fn token_to_id(&self, token: &str) -> Result<u32, KmerCodeError> {
        self.lookup(token)
            .ok_or_else(|| KmerCodeError::UnknownToken(token.to_string()))
    }

    /// Non-failing lookup used by the decoder's zero-fill policy.
    pub fn lookup(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    /// Tokens in id order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    //==============================================================================
    // Persistence
    //==============================================================================

    pub fn to_document(&self) -> VocabularyDocument {
        VocabularyDocument {
            format_version: VOCABULARY_FORMAT_VERSION,
            token_length: self.token_length,
            tokens: self.tokens.clone(),
        }
    }

    pub fn from_document(document: VocabularyDocument) -> Result<Self, KmerCodeError> {
        if document.format_version != VOCABULARY_FORMAT_VERSION {
            return Err(KmerCodeError::UnsupportedFormat(document.format_version));
        }
        let vocabulary = Self::from_tokens(document.tokens)?;
        if vocabulary.token_length != document.token_length {
            return Err(KmerCodeError::TokenLengthMismatch {
                token: vocabulary.tokens[0].clone(),
                expected: document.token_length,
                actual: vocabulary.token_length,
            });
        }
        Ok(vocabulary)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), KmerCodeError> {
        let json = serde_json::to_string(&self.to_document())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KmerCodeError> {
        let text = std::fs::read_to_string(path)?;
        let document: VocabularyDocument = serde_json::from_str(&text)?;
        Self::from_document(document)
    }
}

/// `ceil(log2(n))`, never less than one.
pub fn field_width_for(vocabulary_size: usize) -> usize {
    let max_id = vocabulary_size.saturating_sub(1);
    ((usize::BITS - max_id.leading_zeros()) as usize).max(1)
}

//==================================================================================
// II. On-Disk Document
//==================================================================================

/// The persisted form of a vocabulary. `tokens` is stored in id order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VocabularyDocument {
    pub format_version: u16,
    pub token_length: usize,
    pub tokens: Vec<String>,
}
