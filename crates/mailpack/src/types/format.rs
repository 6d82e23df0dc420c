//! Rendering formats of top-level packages.

use std::fmt;

use serde::{Serialize, Serializer};

/// MIME rendering format shared by every recipient of a top-level package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderFormat {
    /// `text/html` body.
    Html,
    /// `text/plain` body.
    Plain,
    /// Full `multipart/mixed` MIME tree, used for PGP/MIME.
    Mime,
}

impl RenderFormat {
    /// All known formats.
    pub const ALL: [Self; 3] = [Self::Html, Self::Plain, Self::Mime];

    /// Returns the MIME type string.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Plain => "text/plain",
            Self::Mime => "multipart/mixed",
        }
    }
}

impl From<MimeType> for RenderFormat {
    fn from(mime_type: MimeType) -> Self {
        match mime_type {
            MimeType::Html => Self::Html,
            MimeType::Plain => Self::Plain,
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl Serialize for RenderFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.mime_type())
    }
}

/// Body MIME type a recipient prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MimeType {
    /// HTML body.
    #[default]
    Html,
    /// Plain text body.
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_strings() {
        assert_eq!(RenderFormat::Html.mime_type(), "text/html");
        assert_eq!(RenderFormat::Plain.mime_type(), "text/plain");
        assert_eq!(RenderFormat::Mime.mime_type(), "multipart/mixed");
    }

    #[test]
    fn from_mime_type() {
        assert_eq!(RenderFormat::from(MimeType::Html), RenderFormat::Html);
        assert_eq!(RenderFormat::from(MimeType::Plain), RenderFormat::Plain);
    }
}
