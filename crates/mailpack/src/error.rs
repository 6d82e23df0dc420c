//! Error types for packaging operations.

use crate::crypto::{AuthError, CryptoError};

/// Result type alias for packaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Packaging error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Session key generation or token encryption failed.
    #[error("Encryption failed for {email}: {source}")]
    Crypto {
        /// Recipient whose package could not be built.
        email: String,
        /// Provider error.
        #[source]
        source: CryptoError,
    },

    /// Password verification exchange failed.
    #[error("Password proof failed for {email}: {source}")]
    AuthProof {
        /// Recipient whose package could not be built.
        email: String,
        /// Provider error.
        #[source]
        source: AuthError,
    },

    /// No resolved send preferences for a recipient.
    #[error("No send preferences for recipient: {0}")]
    MissingPreferences(String),

    /// Password protected delivery requested but the message has no password.
    #[error("Message has no password for outside-encrypted recipient: {0}")]
    MissingPassword(String),

    /// Recipient already bound into a package.
    #[error("Recipient already packaged: {0}")]
    DuplicateRecipient(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a crypto failure for a recipient.
    #[must_use]
    pub fn crypto(email: impl Into<String>, source: CryptoError) -> Self {
        Self::Crypto {
            email: email.into(),
            source,
        }
    }

    /// Creates a password proof failure for a recipient.
    #[must_use]
    pub fn auth_proof(email: impl Into<String>, source: AuthError) -> Self {
        Self::AuthProof {
            email: email.into(),
            source,
        }
    }

    /// Returns the recipient the error belongs to, if any.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        match self {
            Self::Crypto { email, .. }
            | Self::AuthProof { email, .. }
            | Self::MissingPreferences(email)
            | Self::MissingPassword(email)
            | Self::DuplicateRecipient(email) => Some(email.as_str()),
            Self::Config(_) | Self::Json(_) => None,
        }
    }

    /// Returns true if a recipient's package could not be built and the
    /// send must be reported as failed for that recipient.
    #[must_use]
    pub const fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::Crypto { .. } | Self::AuthProof { .. } | Self::MissingPassword(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_is_reported() {
        let err = Error::auth_proof("a@example.com", AuthError::Network("timeout".into()));
        assert_eq!(err.recipient(), Some("a@example.com"));
        assert!(err.is_delivery_failure());
        assert_eq!(
            err.to_string(),
            "Password proof failed for a@example.com: Network error: timeout"
        );
    }

    #[test]
    fn precondition_errors_are_not_delivery_failures() {
        let err = Error::MissingPreferences("b@example.com".into());
        assert_eq!(err.recipient(), Some("b@example.com"));
        assert!(!err.is_delivery_failure());

        let err = Error::Config("bad".into());
        assert_eq!(err.recipient(), None);
    }

    #[test]
    fn source_is_chained() {
        use std::error::Error as _;

        let err = Error::crypto("c@example.com", CryptoError::Encryption("bad key".into()));
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Encryption failed: bad key"));
    }
}
