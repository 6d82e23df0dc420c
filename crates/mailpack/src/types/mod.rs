//! Core packaging types.

mod format;
mod message;
mod preferences;
mod scheme;

pub use format::{MimeType, RenderFormat};
pub use message::{Attachment, OutgoingMessage};
pub use preferences::{PgpScheme, PublicKey, SendPreferences, SendPreferencesMap};
pub use scheme::{CapabilityMask, SchemeFlag};
