//! Resolved per-recipient send preferences.

use std::collections::HashMap;
use std::fmt;

use super::format::MimeType;

/// Preferences for every recipient, keyed by email address.
pub type SendPreferencesMap = HashMap<String, SendPreferences>;

/// An armored `OpenPGP` public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    fingerprint: String,
    armored: String,
}

impl PublicKey {
    /// Creates a public key from its fingerprint and armored form.
    #[must_use]
    pub fn new(fingerprint: impl Into<String>, armored: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            armored: armored.into(),
        }
    }

    /// Returns the key fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns the armored key.
    #[must_use]
    pub fn armored(&self) -> &str {
        &self.armored
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.fingerprint).finish()
    }
}

/// Delivery scheme negotiated for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PgpScheme {
    /// Native encryption between internal addresses.
    Internal,
    /// PGP/MIME to an external key.
    PgpMime,
    /// PGP/Inline to an external key.
    PgpInline,
    /// Password protected delivery.
    Outside,
    /// No PGP at all.
    #[default]
    Clear,
}

/// Send preferences for a single recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendPreferences {
    /// Encrypt the message for this recipient.
    pub encrypt: bool,
    /// Sign the message for this recipient.
    pub sign: bool,
    /// Negotiated scheme.
    pub pgp_scheme: PgpScheme,
    /// Preferred body type.
    pub mime_type: MimeType,
    /// Recipient keys, most preferred first. Only the first one is used.
    pub public_keys: Vec<PublicKey>,
}

impl SendPreferences {
    /// Creates preferences for the given scheme with everything else off.
    #[must_use]
    pub fn new(pgp_scheme: PgpScheme) -> Self {
        Self {
            pgp_scheme,
            ..Self::default()
        }
    }

    /// Sets the encrypt toggle.
    #[must_use]
    pub const fn encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Sets the sign toggle.
    #[must_use]
    pub const fn sign(mut self, sign: bool) -> Self {
        self.sign = sign;
        self
    }

    /// Sets the preferred body type.
    #[must_use]
    pub const fn mime_type(mut self, mime_type: MimeType) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Adds a public key.
    #[must_use]
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_keys.push(key);
        self
    }

    /// Returns the key the message will be encrypted to.
    #[must_use]
    pub fn primary_key(&self) -> Option<&PublicKey> {
        self.public_keys.first()
    }
}
