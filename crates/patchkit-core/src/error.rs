use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure reported by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {details}")]
    Request { details: String },
    #[error("server responded with HTTP {status}")]
    Status { status: u16 },
    #[error("failed to read response body: {details}")]
    Body { details: String },
}

impl TransportError {
    pub fn request<E>(error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Request {
            details: error.to_string(),
        }
    }

    pub fn body<E>(error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Body {
            details: error.to_string(),
        }
    }
}

/// Broad class of an [`UpdateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetching the manifest or a file failed.
    Transport,
    /// Downloaded bytes do not match the descriptor.
    Integrity,
    /// Writing, renaming or launching on the local machine failed.
    Persistence,
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to download {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
    #[error("size mismatch for {name}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },
    #[error("hash mismatch for {name}: expected {expected}, got {actual}")]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to relaunch {}: {source}", path.display())]
    Relaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download worker stopped unexpectedly: {details}")]
    Worker { details: String },
}

impl UpdateError {
    pub(crate) fn transport(url: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn rename(from: &Path, to: &Path, source: std::io::Error) -> Self {
        Self::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::SizeMismatch { .. } | Self::HashMismatch { .. } => ErrorKind::Integrity,
            Self::Write { .. }
            | Self::Rename { .. }
            | Self::Relaunch { .. }
            | Self::Worker { .. } => ErrorKind::Persistence,
        }
    }
}

/// How an update run ended when it did not fail.
///
/// `RestartRequired` is deliberately a value rather than an error: callers
/// must stop the current run and hand over to the relaunched process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// Outdated files were replaced and the current process may continue.
    Updated,
    /// Every file already matched the manifest, or no manifest was available.
    NothingToDo,
    /// The running executable was replaced; the current run must end.
    RestartRequired,
}

impl Outcome {
    #[must_use]
    pub fn requires_restart(self) -> bool {
        matches!(self, Self::RestartRequired)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{ErrorKind, Outcome, TransportError, UpdateError};

    #[test]
    fn kinds_follow_failure_class() {
        let transport = UpdateError::transport(
            "https://example.invalid/a.dll",
            TransportError::Status { status: 404 },
        );
        let size = UpdateError::SizeMismatch {
            name: "a.dll".to_string(),
            expected: 10,
            actual: 9,
        };
        let write = UpdateError::write(
            Path::new("/tmp/a.dll"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert_eq!(size.kind(), ErrorKind::Integrity);
        assert_eq!(write.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn transport_display_includes_url_and_cause() {
        let error = UpdateError::transport(
            "https://example.invalid/a.dll",
            TransportError::Status { status: 503 },
        );
        assert_eq!(
            error.to_string(),
            "failed to download https://example.invalid/a.dll: server responded with HTTP 503"
        );
    }

    #[test]
    fn only_restart_outcome_requires_restart() {
        assert!(Outcome::RestartRequired.requires_restart());
        assert!(!Outcome::Updated.requires_restart());
        assert!(!Outcome::NothingToDo.requires_restart());
    }
}
