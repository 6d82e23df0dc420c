//! Recipient fragments, top-level packages and the package aggregator.
//!
//! A [`PackageSet`] holds one [`TopLevelPackage`] per [`RenderFormat`].
//! Fragments are bound into it one at a time by [`PackageSet::bind`]; the
//! router drains builders on a single task, so binds never interleave.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::crypto::AuthProof;
use crate::error::{Error, Result};
use crate::types::{CapabilityMask, PublicKey, RenderFormat, SchemeFlag};

/// Password protected delivery material for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutsidePackage {
    /// Password verification proof.
    pub auth: AuthProof,
    /// Hint shown next to the password prompt.
    pub password_hint: Option<String>,
    /// Base64 session key token, shown to the reader once unlocked.
    pub token: String,
    /// The token encrypted under the message password.
    pub enc_token: String,
    /// Whether every attachment is signed.
    pub signature: bool,
}

/// Per-recipient package fragment produced by a scheme builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientPackage {
    /// Native encryption.
    Internal {
        /// Key the body session key is encrypted to.
        public_key: Option<PublicKey>,
        /// Whether every attachment is signed.
        signature: bool,
    },
    /// PGP/MIME encryption. Signing is carried inside the MIME envelope.
    PgpMime {
        /// Key the message is encrypted to.
        public_key: Option<PublicKey>,
    },
    /// Clear-signed (or unsigned) MIME.
    ClearSignedMime {
        /// Whether the MIME tree is signed.
        signature: bool,
    },
    /// PGP/Inline encryption.
    PgpInline {
        /// Key the message is encrypted to.
        public_key: Option<PublicKey>,
        /// Whether every attachment is signed.
        signature: bool,
    },
    /// Password protected delivery.
    EncryptedOutside(OutsidePackage),
    /// Cleartext.
    Clear {
        /// Whether an inline signature is attached.
        signature: bool,
    },
}

impl RecipientPackage {
    /// Returns the scheme flag this fragment contributes to its package.
    #[must_use]
    pub const fn scheme_flag(&self) -> SchemeFlag {
        match self {
            Self::Internal { .. } => SchemeFlag::Internal,
            Self::PgpMime { .. } => SchemeFlag::PgpMime,
            Self::ClearSignedMime { .. } => SchemeFlag::ClearSignedMime,
            Self::PgpInline { .. } => SchemeFlag::PgpInline,
            Self::EncryptedOutside(_) => SchemeFlag::EncryptedOutside,
            Self::Clear { .. } => SchemeFlag::Clear,
        }
    }

    /// Returns whether the fragment is marked as signed.
    ///
    /// PGP/MIME fragments carry no signature field and report `false`.
    #[must_use]
    pub const fn signature(&self) -> bool {
        match self {
            Self::Internal { signature, .. }
            | Self::ClearSignedMime { signature }
            | Self::PgpInline { signature, .. }
            | Self::Clear { signature } => *signature,
            Self::EncryptedOutside(outside) => outside.signature,
            Self::PgpMime { .. } => false,
        }
    }

    /// Returns the recipient key the sealing pass encrypts to.
    #[must_use]
    pub const fn public_key(&self) -> Option<&PublicKey> {
        match self {
            Self::Internal { public_key, .. }
            | Self::PgpMime { public_key }
            | Self::PgpInline { public_key, .. } => public_key.as_ref(),
            Self::ClearSignedMime { .. } | Self::EncryptedOutside(_) | Self::Clear { .. } => None,
        }
    }

    /// Returns the outside-encryption material, if any.
    #[must_use]
    pub const fn outside(&self) -> Option<&OutsidePackage> {
        match self {
            Self::EncryptedOutside(outside) => Some(outside),
            _ => None,
        }
    }
}

// Public keys stay in memory for the sealing pass and are not part of the
// wire form.
impl Serialize for RecipientPackage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("Type", &self.scheme_flag())?;
        if !matches!(self, Self::PgpMime { .. }) {
            map.serialize_entry("Signature", &u8::from(self.signature()))?;
        }
        if let Self::EncryptedOutside(outside) = self {
            map.serialize_entry("Token", &outside.token)?;
            map.serialize_entry("EncToken", &outside.enc_token)?;
            map.serialize_entry("Auth", &outside.auth)?;
            if let Some(hint) = &outside.password_hint {
                map.serialize_entry("PasswordHint", hint)?;
            }
        }
        map.end()
    }
}

/// Recipients sharing one rendering format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopLevelPackage {
    addresses: BTreeMap<String, RecipientPackage>,
    mask: CapabilityMask,
}

impl TopLevelPackage {
    /// Returns the fragments keyed by recipient email.
    #[must_use]
    pub const fn addresses(&self) -> &BTreeMap<String, RecipientPackage> {
        &self.addresses
    }

    /// Returns the fragment for a recipient.
    #[must_use]
    pub fn get(&self, email: &str) -> Option<&RecipientPackage> {
        self.addresses.get(email)
    }

    /// Returns the union of the bound fragments' scheme flags.
    #[must_use]
    pub const fn capability_mask(&self) -> CapabilityMask {
        self.mask
    }

    /// Returns the number of recipients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns true if no recipient is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Top-level packages keyed by rendering format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    packages: BTreeMap<RenderFormat, TopLevelPackage>,
}

impl PackageSet {
    /// Creates an empty set. Packages are created on first bind.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set with an empty package for each given format.
    #[must_use]
    pub fn with_formats(formats: impl IntoIterator<Item = RenderFormat>) -> Self {
        Self {
            packages: formats
                .into_iter()
                .map(|format| (format, TopLevelPackage::default()))
                .collect(),
        }
    }

    /// Binds a recipient fragment into the package for `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRecipient`] if the email is already bound
    /// into any package of this set.
    pub fn bind(
        &mut self,
        email: impl Into<String>,
        format: RenderFormat,
        fragment: RecipientPackage,
    ) -> Result<()> {
        let email = email.into();
        if let Some(existing) = self.format_of(&email) {
            tracing::warn!(%email, %existing, %format, "Recipient bound twice");
            return Err(Error::DuplicateRecipient(email));
        }

        let flag = fragment.scheme_flag();
        let package = self.packages.entry(format).or_default();
        package.addresses.insert(email.clone(), fragment);
        package.mask |= flag;

        tracing::debug!(%email, %format, %flag, mask = package.mask.bits(), "Bound recipient");
        Ok(())
    }

    /// Returns the package for a format.
    #[must_use]
    pub fn get(&self, format: RenderFormat) -> Option<&TopLevelPackage> {
        self.packages.get(&format)
    }

    /// Returns the format a recipient is bound under.
    #[must_use]
    pub fn format_of(&self, email: &str) -> Option<RenderFormat> {
        self.packages
            .iter()
            .find(|(_, package)| package.addresses.contains_key(email))
            .map(|(format, _)| *format)
    }

    /// Returns the fragment bound for a recipient.
    #[must_use]
    pub fn recipient(&self, email: &str) -> Option<&RecipientPackage> {
        self.packages.values().find_map(|package| package.get(email))
    }

    /// Iterates over every package, including empty slots.
    pub fn iter(&self) -> impl Iterator<Item = (RenderFormat, &TopLevelPackage)> {
        self.packages.iter().map(|(format, package)| (*format, package))
    }

    /// Iterates over packages that have at least one recipient.
    pub fn non_empty(&self) -> impl Iterator<Item = (RenderFormat, &TopLevelPackage)> {
        self.iter().filter(|(_, package)| !package.is_empty())
    }

    /// Returns the number of bound recipients across all packages.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.packages.values().map(TopLevelPackage::len).sum()
    }

    /// Returns true if no recipient is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipient_count() == 0
    }

    /// Serializes the non-empty packages to the API's JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WirePackage<'a> {
    #[serde(rename = "MIMEType")]
    mime_type: RenderFormat,
    #[serde(rename = "Type")]
    mask: CapabilityMask,
    addresses: &'a BTreeMap<String, RecipientPackage>,
}

impl Serialize for PackageSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for (format, package) in self.non_empty() {
            seq.serialize_element(&WirePackage {
                mime_type: format,
                mask: package.mask,
                addresses: &package.addresses,
            })?;
        }
        seq.end()
    }
}
