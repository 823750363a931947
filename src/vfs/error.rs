use thiserror::Error;

/// Failures of the virtual filesystem operations.
///
/// Every variant names the logical path (relative to the base root) it
/// concerns. None of them is transient, so callers should not retry.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The path, or the member inside an archive, does not exist.
    #[error("{path}: not found")]
    NotFound { path: String },

    /// The archive file could not be opened or its structure is invalid.
    #[error("{path}: unreadable archive: {reason}")]
    ArchiveUnreadable { path: String, reason: String },

    /// Enumerating a directory failed (permission denied, I/O error).
    #[error("{path}: cannot list directory")]
    ListingUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: not a directory")]
    NotADirectory { path: String },

    #[error("{path}: is a directory")]
    IsADirectory { path: String },
}

impl VfsError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        VfsError::NotFound { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<String>, err: anyhow::Error) -> Self {
        VfsError::ArchiveUnreadable {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }

    /// True for the failures a caller should present as "does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VfsError::NotFound { .. } | VfsError::ArchiveUnreadable { .. }
        )
    }
}
