//! Read-only view of the composed message.

use secrecy::SecretString;

/// An attachment of the outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    /// File name.
    pub name: String,
    /// Armored detached signature, if the attachment was signed.
    pub signature: Option<String>,
}

impl Attachment {
    /// Creates an unsigned attachment.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: None,
        }
    }

    /// Sets the detached signature.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Returns true if the attachment carries a signature.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// The composed message as seen by the packaging stage.
#[derive(Debug, Default)]
pub struct OutgoingMessage {
    /// Attachments in compose order.
    pub attachments: Vec<Attachment>,
    /// Shared password for outside-encrypted delivery.
    pub password: Option<SecretString>,
    /// Hint shown to external recipients next to the password prompt.
    pub password_hint: Option<String>,
}

impl OutgoingMessage {
    /// Creates a message without attachments or password.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Protects the message with a password for external recipients.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Sets the password hint.
    #[must_use]
    pub fn with_password_hint(mut self, hint: impl Into<String>) -> Self {
        self.password_hint = Some(hint.into());
        self
    }

    /// Returns true if every attachment is signed. Vacuously true without
    /// attachments.
    #[must_use]
    pub fn all_attachments_signed(&self) -> bool {
        self.attachments.iter().all(Attachment::is_signed)
    }

    /// Returns true if recipients without keys get password protected
    /// delivery instead of cleartext.
    #[must_use]
    pub const fn is_outside_encrypted(&self) -> bool {
        self.password.is_some()
    }
}
