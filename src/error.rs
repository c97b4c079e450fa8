//! typed failures at the edges of the engine
//!
//! The pure stages never fail; everything here is raised either while a
//! record is being constructed/stored or by an external collaborator.

use thiserror::Error;

/// Rejections raised while building or storing an emotion record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record id must not be empty")]
    EmptyId,
    #[error("strength {0} is outside 0.0..=1.0")]
    StrengthOutOfRange(f64),
    #[error("depth must be a finite number")]
    NonFiniteDepth,
    #[error("unknown emotion category `{0}`")]
    UnknownCategory(String),
    #[error("annotation is {len} characters, at most {max} allowed")]
    AnnotationTooLong { len: usize, max: usize },
    #[error("record `{0}` already exists with different contents")]
    ConflictingId(String),
}

/// Failures of the text → category/strength classification service.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("classifier returned an unknown category `{0}`")]
    InvalidCategory(String),
    #[error("classifier returned strength {0} outside 0.0..=1.0")]
    StrengthOutOfRange(f64),
    #[error("classifier unreachable: {0}")]
    Transport(String),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("record source unavailable: {0}")]
    Unavailable(String),
    #[error("record source returned an invalid record: {0}")]
    Rejected(#[from] RecordError),
}

/// Failures loading or validating `EngineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}
