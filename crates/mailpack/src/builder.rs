//! Scheme builders.
//!
//! One builder per delivery scheme. Each reads the recipient's preferences
//! and the message and returns the recipient's [`RecipientPackage`]. Only
//! the outside-encryption builder talks to collaborators; the others are
//! plain functions.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::crypto::{
    AuthProvider, Credentials, CryptoProvider, EncryptRequest, SessionKeyAlgorithm,
};
use crate::error::{Error, Result};
use crate::package::{OutsidePackage, RecipientPackage};
use crate::types::{OutgoingMessage, SendPreferences};

/// Builds a native encryption fragment.
#[must_use]
pub fn build_internal(prefs: &SendPreferences, message: &OutgoingMessage) -> RecipientPackage {
    RecipientPackage::Internal {
        public_key: prefs.primary_key().cloned(),
        signature: message.all_attachments_signed(),
    }
}

/// Builds a PGP/MIME fragment, or a clear-signed MIME fragment when the
/// recipient does not get encryption.
#[must_use]
pub fn build_pgp_mime(prefs: &SendPreferences) -> RecipientPackage {
    if prefs.encrypt {
        RecipientPackage::PgpMime {
            public_key: prefs.primary_key().cloned(),
        }
    } else {
        RecipientPackage::ClearSignedMime {
            signature: prefs.sign,
        }
    }
}

/// Builds a PGP/Inline fragment, or a clear fragment when the recipient
/// does not get encryption.
#[must_use]
pub fn build_pgp_inline(prefs: &SendPreferences, message: &OutgoingMessage) -> RecipientPackage {
    if prefs.encrypt {
        RecipientPackage::PgpInline {
            public_key: prefs.primary_key().cloned(),
            signature: message.all_attachments_signed(),
        }
    } else {
        RecipientPackage::Clear {
            signature: prefs.sign,
        }
    }
}

/// Builds a cleartext fragment.
#[must_use]
pub const fn build_clear() -> RecipientPackage {
    RecipientPackage::Clear { signature: false }
}

/// Builds a password protected fragment for `email`.
///
/// A fresh session key is encoded as the recipient token. The token is then
/// encrypted under the message password while the password is registered
/// with the verification exchange; both run concurrently.
///
/// # Errors
///
/// Returns [`Error::MissingPassword`] if the message has no password,
/// [`Error::Crypto`] if key generation or encryption fails and
/// [`Error::AuthProof`] if the verification exchange fails. No fragment is
/// produced in any of these cases.
pub async fn build_outside(
    email: &str,
    message: &OutgoingMessage,
    crypto: &dyn CryptoProvider,
    auth: &dyn AuthProvider,
    algorithm: SessionKeyAlgorithm,
) -> Result<RecipientPackage> {
    let password = message
        .password
        .as_ref()
        .ok_or_else(|| Error::MissingPassword(email.to_string()))?;

    let session_key = crypto
        .generate_session_key(algorithm)
        .await
        .map_err(|e| Error::crypto(email, e))
        .inspect_err(|e| tracing::error!(email, error = %e, "Session key generation failed"))?;
    let token = STANDARD.encode(&session_key);

    let passwords = [password];
    let encrypt = async {
        crypto
            .encrypt_message(EncryptRequest {
                data: &token,
                public_keys: &[],
                passwords: &passwords,
            })
            .await
            .map_err(|e| Error::crypto(email, e))
    };
    let verify = async {
        auth.get_verify(Credentials { password })
            .await
            .map_err(|e| Error::auth_proof(email, e))
    };

    let (encrypted, proof) = tokio::try_join!(encrypt, verify)
        .inspect_err(|e| tracing::error!(email, error = %e, "Outside encryption failed"))?;

    tracing::debug!(email, algorithm = algorithm.as_str(), "Built outside package");

    Ok(RecipientPackage::EncryptedOutside(OutsidePackage {
        auth: proof,
        password_hint: message.password_hint.clone(),
        token,
        enc_token: encrypted.data,
        signature: message.all_attachments_signed(),
    }))
}
