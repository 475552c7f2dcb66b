use super::*;
use crate::bridge::format::TokenSequenceDocument;
use crate::config::KmerCodeConfig;
use crate::error::KmerCodeError;
use crate::vocabulary::Vocabulary;
use std::path::Path;

const REFERENCE: &str = "ACGTTGCAACGGTACCATGAACGTNNNNACGTTTGACCATGGCATTACGATCGGATCCAGT";

fn reference_vocabulary() -> Vocabulary {
    Vocabulary::from_sequence(REFERENCE, 3).unwrap()
}

fn write_input(dir: &Path, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join("input.bin");
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_file_roundtrip_writes_the_artifact_triple() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), b"the quick brown fox jumps over the lazy dog");
    let vocabulary = reference_vocabulary().truncated(16).unwrap();
    let prefix = dir.path().join("fox");

    let summary =
        encode_file(&input, &vocabulary, &KmerCodeConfig::default(), &prefix).unwrap();
    assert_eq!(summary.input_bytes, 43);
    assert_eq!(summary.vocabulary_size, 16);
    assert_eq!(summary.bits_per_token_id, 4);
    assert_eq!(summary.token_count, summary.protected_bytes * 2);
    assert!(summary.paths.tokens.exists());
    assert!(summary.paths.metadata.exists());
    assert!(summary.paths.vocabulary.exists());

    let output = dir.path().join("fox.out");
    let report = decode_file(&prefix, &output, &KmerCodeConfig::default()).unwrap();
    assert_eq!(report.degraded_tokens, 0);
    assert_eq!(
        std::fs::read(&output).unwrap(),
        b"the quick brown fox jumps over the lazy dog"
    );
}

#[test]
fn test_vocabulary_limit_is_applied_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), b"GATTACA GATTACA GATTACA");
    let vocabulary = reference_vocabulary();
    assert!(vocabulary.len() > 8);
    let config = KmerCodeConfig {
        vocabulary_limit: Some(8),
        ..KmerCodeConfig::default()
    };
    let prefix = dir.path().join("limited");

    let summary = encode_file(&input, &vocabulary, &config, &prefix).unwrap();
    assert_eq!(summary.vocabulary_size, 8);

    let persisted = Vocabulary::load(&summary.paths.vocabulary).unwrap();
    assert_eq!(persisted.tokens(), &vocabulary.tokens()[..8]);

    let output = dir.path().join("limited.out");
    decode_file(&prefix, &output, &KmerCodeConfig::default()).unwrap();
    assert_eq!(std::fs::read(&output).unwrap(), b"GATTACA GATTACA GATTACA");
}

#[test]
fn test_edited_token_file_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0..600u32).map(|i| (i * 7 % 251) as u8).collect();
    let input = write_input(dir.path(), &payload);
    let vocabulary = reference_vocabulary().truncated(32).unwrap();
    let prefix = dir.path().join("edited");
    let summary =
        encode_file(&input, &vocabulary, &KmerCodeConfig::default(), &prefix).unwrap();

    let mut artifact = load_artifact(&summary.paths).unwrap();
    artifact.tokens[3] = "NNN".to_string();
    artifact.tokens[200] = "XYZ".to_string();
    save_artifact(&artifact, &summary.paths).unwrap();

    let output = dir.path().join("edited.out");
    let report = decode_file(&prefix, &output, &KmerCodeConfig::default()).unwrap();
    assert_eq!(report.degraded_tokens, 2);
    assert_eq!(std::fs::read(&output).unwrap(), payload);
}

#[test]
fn test_missing_artifact_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = decode_file(
        dir.path().join("absent"),
        dir.path().join("out"),
        &KmerCodeConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, KmerCodeError::Io(_)));
}

#[test]
fn test_artifact_from_a_newer_writer_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::from_prefix(dir.path().join("future"));
    let document = TokenSequenceDocument {
        format_version: 7,
        tokens: vec!["ACG".to_string()],
    };
    std::fs::write(&paths.tokens, serde_json::to_string(&document).unwrap()).unwrap();
    std::fs::write(&paths.metadata, "{}").unwrap();

    assert!(matches!(
        load_artifact(&paths).unwrap_err(),
        KmerCodeError::UnsupportedFormat(7)
    ));
}

#[test]
fn test_parallel_decode_of_a_multi_block_file() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0..4000u32).map(|i| (i * 13 % 241) as u8).collect();
    let input = write_input(dir.path(), &payload);
    let vocabulary = reference_vocabulary();
    let config = KmerCodeConfig {
        parallel_blocks: true,
        ..KmerCodeConfig::default()
    };
    let prefix = dir.path().join("parallel");
    let summary = encode_file(&input, &vocabulary, &config, &prefix).unwrap();
    assert!(summary.protected_bytes > 255);

    let mut artifact = load_artifact(&summary.paths).unwrap();
    artifact.tokens[10] = "NNN".to_string();
    let last = artifact.tokens.len() - 10;
    artifact.tokens[last] = "NNN".to_string();
    save_artifact(&artifact, &summary.paths).unwrap();

    let output = dir.path().join("parallel.out");
    let report = decode_file(&prefix, &output, &config).unwrap();
    assert_eq!(report.degraded_tokens, 2);
    assert_eq!(std::fs::read(&output).unwrap(), payload);
}
