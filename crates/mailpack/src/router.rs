//! Recipient dispatch.
//!
//! [`route`] decides, per recipient, which builder runs and which top-level
//! package the fragment lands in. [`Packager::attach_sub_packages`] runs the
//! builders concurrently and binds each fragment as it completes.
//!
//! ```text
//! recipients ──route()──→ builders (concurrent) ──→ single bind loop ──→ PackageSet
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;

use crate::builder::{build_clear, build_internal, build_outside, build_pgp_inline, build_pgp_mime};
use crate::config::{FailurePolicy, MAX_IN_FLIGHT, PackagingConfig};
use crate::crypto::{AuthProvider, CryptoProvider};
use crate::error::{Error, Result};
use crate::package::{PackageSet, RecipientPackage};
use crate::types::{
    MimeType, OutgoingMessage, PgpScheme, RenderFormat, SendPreferences, SendPreferencesMap,
};

/// Scheme builder selected for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builder {
    /// [`build_internal`].
    Internal,
    /// [`build_pgp_mime`].
    PgpMime,
    /// [`build_pgp_inline`].
    PgpInline,
    /// [`build_outside`].
    Outside,
    /// [`build_clear`].
    Clear,
}

/// Where a recipient goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    /// Builder to run.
    pub builder: Builder,
    /// Package the fragment is bound into.
    pub format: RenderFormat,
}

impl Route {
    const fn new(builder: Builder, format: RenderFormat) -> Self {
        Self { builder, format }
    }
}

/// Selects the builder and target package for a recipient.
///
/// `outside_encrypted` is a property of the message, so every recipient of
/// the same message takes the same branch for `Outside`/`Clear` schemes.
#[must_use]
pub const fn route(prefs: &SendPreferences, outside_encrypted: bool) -> Route {
    let preferred = match prefs.mime_type {
        MimeType::Html => RenderFormat::Html,
        MimeType::Plain => RenderFormat::Plain,
    };

    match prefs.pgp_scheme {
        PgpScheme::Internal => Route::new(Builder::Internal, preferred),
        PgpScheme::PgpMime if !prefs.sign && !prefs.encrypt => {
            Route::new(Builder::Clear, RenderFormat::Html)
        }
        PgpScheme::PgpMime => Route::new(Builder::PgpMime, RenderFormat::Mime),
        PgpScheme::PgpInline => Route::new(Builder::PgpInline, RenderFormat::Plain),
        PgpScheme::Outside | PgpScheme::Clear if outside_encrypted => {
            Route::new(Builder::Outside, preferred)
        }
        PgpScheme::Outside | PgpScheme::Clear => Route::new(Builder::Clear, preferred),
    }
}

/// Builds and binds recipient packages.
#[derive(Clone)]
pub struct Packager {
    crypto: Arc<dyn CryptoProvider>,
    auth: Arc<dyn AuthProvider>,
    config: PackagingConfig,
}

impl std::fmt::Debug for Packager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Packager {
    /// Creates a packager with the default configuration.
    #[must_use]
    pub fn new(crypto: Arc<dyn CryptoProvider>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            crypto,
            auth,
            config: PackagingConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PackagingConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PackagingConfig {
        &self.config
    }

    /// Builds a fragment for every recipient in `emails` and binds it into
    /// `packages`.
    ///
    /// Duplicate emails are packaged once. Builders run concurrently and
    /// fragments are bound in completion order; the resulting set does not
    /// depend on that order.
    ///
    /// With [`FailurePolicy::WaitAll`] every builder settles and every
    /// success is bound before the first failure is returned. With
    /// [`FailurePolicy::FailFast`] the first failure is returned at once;
    /// fragments bound before it stay bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPreferences`] or [`Error::DuplicateRecipient`]
    /// before anything is dispatched if a recipient has no preferences or is
    /// already bound in `packages`. Otherwise returns the first builder or
    /// bind failure.
    pub async fn attach_sub_packages<S: AsRef<str>>(
        &self,
        packages: &mut PackageSet,
        message: &OutgoingMessage,
        emails: &[S],
        preferences: &SendPreferencesMap,
    ) -> Result<()> {
        let recipients = resolve_recipients(emails, preferences, packages)?;
        let outside_encrypted = message.is_outside_encrypted();
        let total = recipients.len();

        let tasks = recipients.into_iter().map(|(email, prefs)| {
            let route = route(prefs, outside_encrypted);
            tracing::debug!(
                email,
                builder = ?route.builder,
                format = %route.format,
                "Routing recipient"
            );
            async move {
                let result = self.build(email, route.builder, prefs, message).await;
                (email, route.format, result)
            }
        });

        let mut completed =
            stream::iter(tasks).buffer_unordered(self.config.max_in_flight.clamp(1, MAX_IN_FLIGHT));

        let mut first_error = None;
        let mut failed = 0usize;
        while let Some((email, format, result)) = completed.next().await {
            let Err(err) = result.and_then(|fragment| packages.bind(email, format, fragment))
            else {
                continue;
            };

            failed += 1;
            if self.config.failure_policy == FailurePolicy::FailFast {
                tracing::warn!(email, error = %err, "Aborting packaging, in-flight builders dropped");
                return Err(err);
            }
            first_error.get_or_insert(err);
        }

        match first_error {
            Some(err) => {
                tracing::warn!(total, failed, "Packaging finished with failures");
                Err(err)
            }
            None => {
                tracing::info!(
                    recipients = total,
                    packages = packages.non_empty().count(),
                    "Packaging complete"
                );
                Ok(())
            }
        }
    }

    async fn build(
        &self,
        email: &str,
        builder: Builder,
        prefs: &SendPreferences,
        message: &OutgoingMessage,
    ) -> Result<RecipientPackage> {
        match builder {
            Builder::Internal => Ok(build_internal(prefs, message)),
            Builder::PgpMime => Ok(build_pgp_mime(prefs)),
            Builder::PgpInline => Ok(build_pgp_inline(prefs, message)),
            Builder::Outside => {
                build_outside(
                    email,
                    message,
                    self.crypto.as_ref(),
                    self.auth.as_ref(),
                    self.config.session_key_algorithm,
                )
                .await
            }
            Builder::Clear => Ok(build_clear()),
        }
    }
}

/// De-duplicates `emails` (first occurrence wins) and pairs each with its
/// preferences. Recipients already bound in `packages` are rejected.
fn resolve_recipients<'a, S: AsRef<str>>(
    emails: &'a [S],
    preferences: &'a SendPreferencesMap,
    packages: &PackageSet,
) -> Result<Vec<(&'a str, &'a SendPreferences)>> {
    let mut seen = HashSet::new();
    emails
        .iter()
        .map(AsRef::as_ref)
        .filter(|email| seen.insert(*email))
        .map(|email| {
            if packages.format_of(email).is_some() {
                return Err(Error::DuplicateRecipient(email.to_string()));
            }
            preferences
                .get(email)
                .map(|prefs| (email, prefs))
                .ok_or_else(|| Error::MissingPreferences(email.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn prefs(scheme: PgpScheme, mime_type: MimeType, encrypt: bool, sign: bool) -> SendPreferences {
        SendPreferences::new(scheme)
            .mime_type(mime_type)
            .encrypt(encrypt)
            .sign(sign)
    }

    mod route_tests {
        use super::*;

        #[test]
        fn internal_follows_mime_type() {
            let html = route(&prefs(PgpScheme::Internal, MimeType::Html, true, true), false);
            assert_eq!(html, Route::new(Builder::Internal, RenderFormat::Html));

            let plain = route(&prefs(PgpScheme::Internal, MimeType::Plain, true, true), true);
            assert_eq!(plain, Route::new(Builder::Internal, RenderFormat::Plain));
        }

        #[test]
        fn pgp_mime_without_sign_or_encrypt_is_clear_html() {
            let r = route(&prefs(PgpScheme::PgpMime, MimeType::Plain, false, false), false);
            assert_eq!(r, Route::new(Builder::Clear, RenderFormat::Html));
        }

        #[test]
        fn pgp_mime_goes_to_mime_package() {
            for (encrypt, sign) in [(true, true), (true, false), (false, true)] {
                let r = route(&prefs(PgpScheme::PgpMime, MimeType::Html, encrypt, sign), false);
                assert_eq!(r, Route::new(Builder::PgpMime, RenderFormat::Mime));
            }
        }

        #[test]
        fn pgp_inline_is_always_plain() {
            for mime_type in [MimeType::Html, MimeType::Plain] {
                let r = route(&prefs(PgpScheme::PgpInline, mime_type, true, true), false);
                assert_eq!(r, Route::new(Builder::PgpInline, RenderFormat::Plain));
            }
        }

        #[test]
        fn outside_and_clear_follow_message_password() {
            for scheme in [PgpScheme::Outside, PgpScheme::Clear] {
                let eo = route(&prefs(scheme, MimeType::Html, false, false), true);
                assert_eq!(eo, Route::new(Builder::Outside, RenderFormat::Html));

                let clear = route(&prefs(scheme, MimeType::Plain, false, false), false);
                assert_eq!(clear, Route::new(Builder::Clear, RenderFormat::Plain));
            }
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn duplicates_are_dropped() {
            let mut map = SendPreferencesMap::new();
            map.insert("a@example.com".into(), SendPreferences::default());
            map.insert("b@example.com".into(), SendPreferences::default());

            let emails = ["a@example.com", "b@example.com", "a@example.com"];
            let resolved = resolve_recipients(&emails, &map, &PackageSet::new()).unwrap();
            let order: Vec<_> = resolved.iter().map(|(email, _)| *email).collect();
            assert_eq!(order, vec!["a@example.com", "b@example.com"]);
        }

        #[test]
        fn missing_preferences_fail() {
            let map = SendPreferencesMap::new();
            let err = resolve_recipients(&["nobody@example.com"], &map, &PackageSet::new())
                .unwrap_err();
            assert!(matches!(err, Error::MissingPreferences(email) if email == "nobody@example.com"));
        }

        #[test]
        fn already_bound_recipient_fails() {
            let mut map = SendPreferencesMap::new();
            map.insert("a@example.com".into(), SendPreferences::default());

            let mut packages = PackageSet::new();
            packages
                .bind("a@example.com", RenderFormat::Html, build_clear())
                .unwrap();

            let err = resolve_recipients(&["a@example.com"], &map, &packages).unwrap_err();
            assert!(matches!(err, Error::DuplicateRecipient(email) if email == "a@example.com"));
        }
    }
}
