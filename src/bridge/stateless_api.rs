// In: src/bridge/stateless_api.rs

use std::path::Path;

use crate::bridge::format::{
    ArtifactPaths, EncodeSummary, TokenSequenceDocument, TOKENS_FORMAT_VERSION,
};
use crate::config::KmerCodeConfig;
use crate::error::KmerCodeError;
use crate::pipeline::{self, ArtifactMetadata, DecodeReport, EncodedArtifact};
use crate::vocabulary::Vocabulary;

/// Encodes the file at `input` and writes the artifact triple under `output_prefix`.
///
/// The vocabulary actually used (after any `vocabulary_limit`) is the one
/// persisted, so the triple is self-contained.
pub fn encode_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    vocabulary: &Vocabulary,
    config: &KmerCodeConfig,
    output_prefix: Q,
) -> Result<EncodeSummary, KmerCodeError> {
    config.validate()?;
    let bytes = std::fs::read(input.as_ref())?;

    let limited;
    let vocabulary = match config.vocabulary_limit {
        Some(limit) if limit < vocabulary.len() => {
            limited = vocabulary.truncated(limit)?;
            log::info!(
                "Vocabulary capped at the first {} of {} tokens",
                limit,
                vocabulary.len()
            );
            &limited
        }
        _ => vocabulary,
    };

    let artifact = pipeline::encode_bytes(&bytes, vocabulary, config)?;
    let paths = ArtifactPaths::from_prefix(output_prefix);
    save_artifact(&artifact, &paths)?;
    vocabulary.save(&paths.vocabulary)?;

    Ok(EncodeSummary {
        input_bytes: bytes.len(),
        token_count: artifact.token_count(),
        vocabulary_size: vocabulary.len(),
        bits_per_token_id: vocabulary.field_width(),
        code_byte_width: artifact.metadata.code_byte_width.unwrap_or_default(),
        protected_bytes: artifact.metadata.protected_len.unwrap_or_default(),
        paths,
    })
}

/// Decodes the artifact triple under `prefix` and writes the recovered bytes to `output`.
///
/// Encoding parameters come from the persisted metadata; only the execution
/// options of `config` (`parallel_blocks`) are used.
pub fn decode_file<P: AsRef<Path>, Q: AsRef<Path>>(
    prefix: P,
    output: Q,
    config: &KmerCodeConfig,
) -> Result<DecodeReport, KmerCodeError> {
    let paths = ArtifactPaths::from_prefix(prefix);
    let artifact = load_artifact(&paths)?;
    let vocabulary = Vocabulary::load(&paths.vocabulary)?;

    let report = pipeline::decode_tokens(
        &artifact.tokens,
        &vocabulary,
        &artifact.metadata,
        config,
    )?;
    std::fs::write(output.as_ref(), &report.data)?;
    Ok(report)
}

/// Writes the token sequence and its metadata. Both files are always written together.
pub fn save_artifact(
    artifact: &EncodedArtifact,
    paths: &ArtifactPaths,
) -> Result<(), KmerCodeError> {
    let document = TokenSequenceDocument {
        format_version: TOKENS_FORMAT_VERSION,
        tokens: artifact.tokens.clone(),
    };
    std::fs::write(&paths.tokens, serde_json::to_string(&document)?)?;
    std::fs::write(&paths.metadata, artifact.metadata.to_json()?)?;
    Ok(())
}

pub fn load_artifact(paths: &ArtifactPaths) -> Result<EncodedArtifact, KmerCodeError> {
    let document: TokenSequenceDocument =
        serde_json::from_str(&std::fs::read_to_string(&paths.tokens)?)?;
    if document.format_version > TOKENS_FORMAT_VERSION {
        return Err(KmerCodeError::UnsupportedFormat(document.format_version));
    }
    let metadata = ArtifactMetadata::from_json(&std::fs::read_to_string(&paths.metadata)?)?;
    Ok(EncodedArtifact {
        tokens: document.tokens,
        metadata,
    })
}
