//! Contracts for the cryptographic and password-proof collaborators.
//!
//! The packaging stage never implements primitives itself. Session key
//! generation, message encryption and the zero-knowledge password exchange
//! are reached through [`CryptoProvider`] and [`AuthProvider`].

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::types::PublicKey;

/// Symmetric algorithm for generated session keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKeyAlgorithm {
    /// AES with a 256-bit key.
    #[default]
    Aes256,
    /// AES with a 128-bit key.
    Aes128,
}

impl SessionKeyAlgorithm {
    /// Returns the `OpenPGP` algorithm name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aes256 => "aes256",
            Self::Aes128 => "aes128",
        }
    }

    /// Returns the key length in bytes.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes256 => 32,
            Self::Aes128 => 16,
        }
    }
}

/// Errors reported by a [`CryptoProvider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Session key generation failed.
    #[error("Session key generation failed: {0}")]
    SessionKey(String),

    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),
}

/// Errors reported by an [`AuthProvider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The exchange could not reach the server.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with something unexpected.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The password was refused (expired, too weak, malformed).
    #[error("Password rejected: {0}")]
    Rejected(String),
}

/// Input to [`CryptoProvider::encrypt_message`].
#[derive(Debug)]
pub struct EncryptRequest<'a> {
    /// Cleartext to encrypt.
    pub data: &'a str,
    /// Public keys to encrypt to.
    pub public_keys: &'a [PublicKey],
    /// Passwords to encrypt to.
    pub passwords: &'a [&'a SecretString],
}

/// Output of [`CryptoProvider::encrypt_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    /// Armored ciphertext.
    pub data: String,
}

/// Credentials for the password verification exchange.
#[derive(Debug)]
pub struct Credentials<'a> {
    /// Password being registered.
    pub password: &'a SecretString,
}

/// Proof returned by the password verification exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthProof {
    /// Proof protocol version.
    pub version: u8,
    /// Identifier of the modulus the verifier was computed against.
    #[serde(rename = "ModulusID")]
    pub modulus_id: String,
    /// Base64 salt.
    pub salt: String,
    /// Base64 verifier.
    pub verifier: String,
}

/// Symmetric key generation and `OpenPGP` encryption.
#[async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Generates a fresh session key for `algorithm`.
    async fn generate_session_key(
        &self,
        algorithm: SessionKeyAlgorithm,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Encrypts `request.data` to the given keys and passwords.
    async fn encrypt_message(
        &self,
        request: EncryptRequest<'_>,
    ) -> Result<EncryptedMessage, CryptoError>;
}

/// Zero-knowledge password registration.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Computes a verifier for the password and returns the proof the
    /// server needs to authenticate external readers later.
    async fn get_verify(&self, credentials: Credentials<'_>) -> Result<AuthProof, AuthError>;
}
