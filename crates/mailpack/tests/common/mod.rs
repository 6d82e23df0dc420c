//! Fake collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use mailpack::{
    AuthError, AuthProof, AuthProvider, Credentials, CryptoError, CryptoProvider, EncryptRequest,
    EncryptedMessage, Packager, PackagingConfig, PublicKey, SessionKeyAlgorithm,
};

/// Password the fake auth provider treats as expired.
pub const EXPIRED_PASSWORD: &str = "expired";

/// Installs a test subscriber once. Set `RUST_LOG=mailpack=debug` to see
/// routing and bind events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic crypto provider.
#[derive(Debug, Default)]
pub struct FakeCrypto {
    fail_session_key: bool,
    fail_encrypt: bool,
    session_keys: AtomicUsize,
}

impl FakeCrypto {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_session_key() -> Self {
        Self {
            fail_session_key: true,
            ..Self::default()
        }
    }

    pub fn failing_encrypt() -> Self {
        Self {
            fail_encrypt: true,
            ..Self::default()
        }
    }

    pub fn session_keys_generated(&self) -> usize {
        self.session_keys.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CryptoProvider for FakeCrypto {
    async fn generate_session_key(
        &self,
        algorithm: SessionKeyAlgorithm,
    ) -> Result<Vec<u8>, CryptoError> {
        self.session_keys.fetch_add(1, Ordering::SeqCst);
        if self.fail_session_key {
            return Err(CryptoError::SessionKey("entropy source unavailable".into()));
        }
        Ok(vec![0x42; algorithm.key_len()])
    }

    async fn encrypt_message(
        &self,
        request: EncryptRequest<'_>,
    ) -> Result<EncryptedMessage, CryptoError> {
        if self.fail_encrypt {
            return Err(CryptoError::Encryption("password packet rejected".into()));
        }
        let passwords: Vec<&str> = request
            .passwords
            .iter()
            .map(|p| p.expose_secret())
            .collect();
        Ok(EncryptedMessage {
            data: format!(
                "-----BEGIN PGP MESSAGE-----\n{}:{}\n-----END PGP MESSAGE-----",
                passwords.join(","),
                request.data
            ),
        })
    }
}

/// Password verification provider with per-call failures and delays.
///
/// Calls are numbered from zero in the order they start.
#[derive(Debug, Default)]
pub struct FakeAuth {
    calls: AtomicUsize,
    fail_calls: HashSet<usize>,
    delays: HashMap<usize, Duration>,
    yields: HashMap<usize, usize>,
}

impl FakeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `n`th call with a network error.
    pub fn fail_call(mut self, n: usize) -> Self {
        self.fail_calls.insert(n);
        self
    }

    /// Sleeps before answering the `n`th call.
    pub fn delay_call(mut self, n: usize, delay: Duration) -> Self {
        self.delays.insert(n, delay);
        self
    }

    /// Yields to the scheduler `count` times before answering the `n`th call.
    pub fn yield_call(mut self, n: usize, count: usize) -> Self {
        self.yields.insert(n, count);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn get_verify(&self, credentials: Credentials<'_>) -> Result<AuthProof, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&n).copied() {
            tokio::time::sleep(delay).await;
        }
        for _ in 0..self.yields.get(&n).copied().unwrap_or_default() {
            tokio::task::yield_now().await;
        }

        if credentials.password.expose_secret() == EXPIRED_PASSWORD {
            return Err(AuthError::Rejected("password expired".into()));
        }
        if self.fail_calls.contains(&n) {
            return Err(AuthError::Network("connection reset".into()));
        }

        Ok(AuthProof {
            version: 4,
            modulus_id: "modulus-1".into(),
            salt: "c2FsdA==".into(),
            verifier: "dmVyaWZpZXI=".into(),
        })
    }
}

pub fn packager(crypto: FakeCrypto, auth: FakeAuth) -> (Packager, Arc<FakeCrypto>, Arc<FakeAuth>) {
    packager_with_config(crypto, auth, PackagingConfig::default())
}

pub fn packager_with_config(
    crypto: FakeCrypto,
    auth: FakeAuth,
    config: PackagingConfig,
) -> (Packager, Arc<FakeCrypto>, Arc<FakeAuth>) {
    let crypto = Arc::new(crypto);
    let auth = Arc::new(auth);
    let packager = Packager::new(crypto.clone(), auth.clone()).with_config(config);
    (packager, crypto, auth)
}

pub fn key(fingerprint: &str) -> PublicKey {
    PublicKey::new(
        fingerprint,
        format!("-----BEGIN PGP PUBLIC KEY BLOCK-----\n{fingerprint}\n-----END PGP PUBLIC KEY BLOCK-----"),
    )
}
