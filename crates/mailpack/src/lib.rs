//! # mailpack
//!
//! Per-recipient send package assembly for end-to-end encrypted email.
//!
//! Before a composed message is sealed and submitted, every recipient needs
//! a package fragment describing how the message reaches them: native
//! encryption, PGP/MIME, PGP/Inline, password protected delivery or
//! cleartext. Fragments sharing a rendering format are grouped into one
//! top-level package whose `Type` is the union of their scheme flags.
//!
//! ## Features
//!
//! - **Exhaustive routing**: one [`route`] decision per recipient, a closed
//!   set of builders
//! - **Concurrent builders**: password protected packages run their
//!   provider calls concurrently, bounded by [`PackagingConfig`]
//! - **Order independent aggregation**: fragments are bound on a single
//!   task, so the resulting [`PackageSet`] never depends on completion order
//! - **No silent downgrade**: a failed password package is an error, never
//!   a cleartext fallback
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mailpack::{Packager, PackageSet, OutgoingMessage, SendPreferences, PgpScheme};
//!
//! # async fn run(crypto: Arc<dyn mailpack::CryptoProvider>, auth: Arc<dyn mailpack::AuthProvider>) -> mailpack::Result<()> {
//! let packager = Packager::new(crypto, auth);
//!
//! let mut preferences = mailpack::SendPreferencesMap::new();
//! preferences.insert("friend@proton.me".into(), SendPreferences::new(PgpScheme::Internal));
//!
//! let message = OutgoingMessage::new();
//! let mut packages = PackageSet::new();
//! packager
//!     .attach_sub_packages(&mut packages, &message, &["friend@proton.me"], &preferences)
//!     .await?;
//!
//! println!("{}", packages.to_json()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`builder`]: one builder per delivery scheme
//! - [`crypto`]: contracts for the crypto and password-proof collaborators
//! - [`package`]: fragments, top-level packages and the aggregator
//! - [`router`]: recipient routing and concurrent dispatch
//! - [`types`]: preferences, message view, flags and formats

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod builder;
mod config;
pub mod crypto;
mod error;
pub mod package;
pub mod router;
pub mod types;

pub use config::{DEFAULT_MAX_IN_FLIGHT, FailurePolicy, MAX_IN_FLIGHT, PackagingConfig};
pub use crypto::{
    AuthError, AuthProof, AuthProvider, Credentials, CryptoError, CryptoProvider, EncryptRequest,
    EncryptedMessage, SessionKeyAlgorithm,
};
pub use error::{Error, Result};
pub use package::{OutsidePackage, PackageSet, RecipientPackage, TopLevelPackage};
pub use router::{Builder, Packager, Route, route};
pub use types::{
    Attachment, CapabilityMask, MimeType, OutgoingMessage, PgpScheme, PublicKey, RenderFormat,
    SchemeFlag, SendPreferences, SendPreferencesMap,
};
