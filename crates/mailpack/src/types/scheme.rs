//! Scheme flags and the capability mask.
//!
//! Every package carries a `Type` bitmask on the wire. Each recipient
//! fragment contributes exactly one flag, and a top-level package ORs the
//! flags of everything bound into it.
//!
//! | Flag                 | Bit | Meaning                                  |
//! |----------------------|-----|------------------------------------------|
//! | [`Internal`]         | 1   | native public-key encryption             |
//! | [`EncryptedOutside`] | 2   | password protected external delivery     |
//! | [`Clear`]            | 4   | cleartext                                |
//! | [`PgpInline`]        | 8   | PGP/Inline encrypted                     |
//! | [`PgpMime`]          | 16  | PGP/MIME encrypted                       |
//! | [`ClearSignedMime`]  | 32  | clear-signed MIME (provisional constant) |
//!
//! [`Internal`]: SchemeFlag::Internal
//! [`EncryptedOutside`]: SchemeFlag::EncryptedOutside
//! [`Clear`]: SchemeFlag::Clear
//! [`PgpInline`]: SchemeFlag::PgpInline
//! [`PgpMime`]: SchemeFlag::PgpMime
//! [`ClearSignedMime`]: SchemeFlag::ClearSignedMime

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Serialize, Serializer};

/// A single scheme identifier. Each variant owns a distinct bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum SchemeFlag {
    /// Native end-to-end encryption to an internal address.
    Internal = 1,
    /// Password protected delivery to an external address.
    EncryptedOutside = 1 << 1,
    /// No encryption.
    Clear = 1 << 2,
    /// PGP/Inline encryption.
    PgpInline = 1 << 3,
    /// PGP/MIME encryption.
    PgpMime = 1 << 4,
    /// Clear-signed MIME.
    ///
    /// Not an official package type yet; the value is provisional until the
    /// API publishes one.
    ClearSignedMime = 1 << 5,
}

impl SchemeFlag {
    /// All flags, lowest bit first.
    pub const ALL: [Self; 6] = [
        Self::Internal,
        Self::EncryptedOutside,
        Self::Clear,
        Self::PgpInline,
        Self::PgpMime,
        Self::ClearSignedMime,
    ];

    /// Returns the raw bit value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Returns a short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::EncryptedOutside => "encrypted-outside",
            Self::Clear => "clear",
            Self::PgpInline => "pgp-inline",
            Self::PgpMime => "pgp-mime",
            Self::ClearSignedMime => "clear-signed-mime",
        }
    }
}

impl fmt::Display for SchemeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchemeFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

/// Bitwise union of scheme flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilityMask(u32);

impl CapabilityMask {
    /// Creates an empty mask.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Adds a flag to the mask.
    pub const fn insert(&mut self, flag: SchemeFlag) {
        self.0 |= flag.bits();
    }

    /// Returns true if the flag is set.
    #[must_use]
    pub const fn contains(self, flag: SchemeFlag) -> bool {
        self.0 & flag.bits() != 0
    }

    /// Returns true if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the set flags, lowest bit first.
    pub fn iter(self) -> impl Iterator<Item = SchemeFlag> {
        SchemeFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl From<SchemeFlag> for CapabilityMask {
    fn from(flag: SchemeFlag) -> Self {
        Self(flag.bits())
    }
}

impl BitOr<SchemeFlag> for CapabilityMask {
    type Output = Self;

    fn bitor(mut self, rhs: SchemeFlag) -> Self {
        self.insert(rhs);
        self
    }
}

impl BitOr for SchemeFlag {
    type Output = CapabilityMask;

    fn bitor(self, rhs: Self) -> CapabilityMask {
        CapabilityMask::from(self) | rhs
    }
}

impl BitOrAssign<SchemeFlag> for CapabilityMask {
    fn bitor_assign(&mut self, rhs: SchemeFlag) {
        self.insert(rhs);
    }
}

impl FromIterator<SchemeFlag> for CapabilityMask {
    fn from_iter<I: IntoIterator<Item = SchemeFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |mask, flag| mask | flag)
    }
}

impl Serialize for CapabilityMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}
