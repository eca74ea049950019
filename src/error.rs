//! Error types for tagmail
//!
//! One enum covers the whole run. Variants split into fatal (abort the run,
//! nonzero exit) and recoverable (logged, accumulated into the run report).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tagmail operations
pub type Result<T> = std::result::Result<T, TagmailError>;

/// Error type for tagmail operations
#[derive(Error, Debug)]
pub enum TagmailError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail root missing or not a directory
    #[error("Mail root not found: {0}")]
    PathNotFound(PathBuf),

    /// External query failed or returned unparseable output
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Expected source file absent during copy-in (recoverable)
    #[error("No existing source file for message {0}")]
    SourceMissing(String),

    /// Copy/delete/tag mutation failed for one message or mailbox (recoverable)
    #[error("Mutation failed for {target}: {reason}")]
    MutationFailed { target: String, reason: String },

    /// The external reindex step failed; post-phase state is unknown
    #[error("Reindex failed: {0}")]
    ReindexFailed(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from the notmuch wrapper crate
    #[error("notmuch error: {0}")]
    Notmuch(#[from] notmuch_cli::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TagmailError {
    /// Whether this error aborts the run.
    ///
    /// Per-message failures are reported and skipped; anything that leaves
    /// tag-state or filesystem-state untrustworthy aborts.
    pub fn is_fatal(&self) -> bool {
        match self {
            TagmailError::SourceMissing(_) => false,
            TagmailError::MutationFailed { .. } => false,
            TagmailError::Config(_)
            | TagmailError::PathNotFound(_)
            | TagmailError::QueryFailed(_)
            | TagmailError::ReindexFailed(_)
            | TagmailError::Io(_)
            | TagmailError::Notmuch(_)
            | TagmailError::Yaml(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_classification() {
        assert!(!TagmailError::SourceMissing("id".into()).is_fatal());
        assert!(!TagmailError::MutationFailed {
            target: "work/INBOX".into(),
            reason: "permission denied".into(),
        }
        .is_fatal());
        assert!(TagmailError::PathNotFound(PathBuf::from("/nope")).is_fatal());
        assert!(TagmailError::QueryFailed("boom".into()).is_fatal());
        assert!(TagmailError::ReindexFailed("boom".into()).is_fatal());
    }

    #[test]
    fn test_display_names_target() {
        let err = TagmailError::MutationFailed {
            target: "work/Archive".into(),
            reason: "disk full".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("work/Archive"));
        assert!(msg.contains("disk full"));
    }
}
