//! Error types for corpus loading and engine queries.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Unresolved points and identifiers are never errors; they come back as
/// [`RegionRecord::Null`](crate::models::RegionRecord::Null). Errors are `Clone`
/// so a failed background load can be handed to every waiting caller.
#[derive(Debug, Clone, Error)]
pub enum GeoError {
    #[error("boundary corpus directory not found: {}", .0.display())]
    CorpusMissing(PathBuf),

    #[error("no admin*.json files in boundary corpus directory {}", .0.display())]
    CorpusEmpty(PathBuf),

    #[error("failed to read corpus file {}: {reason}", path.display())]
    CorpusFile { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("engine failed to initialize: {0}")]
    Init(Arc<GeoError>),

    #[error("background task aborted: {0}")]
    Aborted(String),

    #[error("invalid admin level {0}, expected 0, 1 or 2")]
    InvalidLevel(u8),

    #[error("coordinate row {index} has {len} components, expected 2")]
    InvalidCoordinate { index: usize, len: usize },
}

impl GeoError {
    pub(crate) fn corpus_file(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        GeoError::CorpusFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that stop the engine from starting at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GeoError::CorpusMissing(_)
                | GeoError::CorpusEmpty(_)
                | GeoError::CorpusFile { .. }
                | GeoError::Config(_)
                | GeoError::Init(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
