use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to the user.
    ///
    /// Internal is never a guarantee that the failure was not caused by
    /// the user, only that the code cannot tell.
    Internal,

    /// The user provided invalid input (a short passphrase, a damaged
    /// artifact, the wrong passphrase) or asked for something impossible.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Passphrase is shorter than the minimum accepted length.
    WeakPassphrase,
    /// The OS entropy source could not supply a nonce.
    RandomSourceUnavailable,
    /// The artifact text is not valid padded standard base64.
    MalformedEncoding,
    /// The decoded artifact is too short to hold a nonce and a tag.
    TruncatedArtifact,
    /// Tag verification failed: wrong passphrase, tampering, or corruption.
    AuthenticationFailed,
    /// Passphrase could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// The passphrase and its confirmation did not match.
    PassphraseMismatch,
    /// Unexpected state reached within sealfile logic.
    InternalInvariant,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SealfileError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Code consuming errors MUST handle
    /// the absence of a kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SealfileError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving
    /// the original as source. Category and kind carry over.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }

    /// Process exit code for this error: 2 for user errors, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.category {
            ErrorCategory::User => 2,
            _ => 1,
        }
    }

    /// The message followed by every message in the source chain,
    /// separated by `": "`.
    pub fn chain_message(&self) -> String {
        let mut out = self.msg.clone();
        let mut next = StdError::source(self);
        while let Some(err) = next {
            out.push_str(": ");
            out.push_str(&err.to_string());
            next = err.source();
        }
        out
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SealfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_kind_and_category() {
        let err = SealfileError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "bad tag",
        )
        .with_context("failed to open");

        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.message(), "failed to open");
        assert!(err.source_error().is_some());
    }

    #[test]
    fn test_chain_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SealfileError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            "failed to read from a.txt",
            io,
        )
        .with_context("encryption failed");

        assert_eq!(
            err.chain_message(),
            "encryption failed: failed to read from a.txt: no such file"
        );
    }

    #[test]
    fn test_exit_codes() {
        let user = SealfileError::new(ErrorCategory::User, "user");
        let internal = SealfileError::new(ErrorCategory::Internal, "internal");
        assert_eq!(user.exit_code(), 2);
        assert_eq!(internal.exit_code(), 1);
    }
}
