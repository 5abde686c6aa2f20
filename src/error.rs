// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocuError {
    /// A raw artifact (typically a scenario's steps) is absent.
    /// Recoverable: the aggregator skips the affected scenario and
    /// continues the build.
    #[error("resource not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("could not marshal {}: {source}", path.display())]
    Marshal {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("could not unmarshal {}: {source}", path.display())]
    Unmarshal {
        source: serde_json::Error,
        path: PathBuf,
    },
}

pub type Result<T> = std::result::Result<T, DocuError>;

impl DocuError {
    /// Attaches a path to an `std::io::Error`.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        DocuError::Io {
            source,
            path: path.into(),
        }
    }

    /// Returns true for the recoverable missing-resource case.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocuError::NotFound { .. })
    }
}

// Allow `?` on std::io::Error by converting to DocuError::Io with unknown path.
impl From<std::io::Error> for DocuError {
    fn from(source: std::io::Error) -> Self {
        DocuError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors during derived-file sweeps
impl From<walkdir::Error> for DocuError {
    fn from(e: walkdir::Error) -> Self {
        let path = e
            .path()
            .map_or_else(|| PathBuf::from("<unknown>"), PathBuf::from);
        match e.into_io_error() {
            Some(source) => DocuError::Io { source, path },
            None => DocuError::Io {
                source: std::io::Error::other("filesystem loop detected"),
                path,
            },
        }
    }
}
