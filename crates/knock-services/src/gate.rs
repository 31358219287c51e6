//! Auth gate: per-request admission decision.
//!
//! A request is admitted if it carries the cookie for its identity's current
//! session. Otherwise it must present the shared secret as `key`, which
//! mints a fresh session. The cookie is always checked first.

use std::sync::Arc;

use thiserror::Error;

use knock_core::{CookieName, SecretVerifier, TokenError, VerifyError};

use crate::session::SessionStore;

/// Outcome of a successful decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Valid session cookie; forward unchanged.
    Admit,
    /// Valid key; forward and hand the client this new session token.
    Issue { token: String },
}

/// Error categories, as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    CredentialMissing,
    CredentialInvalid,
    VerificationFailure,
    RandomnessFailure,
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("no session cookie and no key")]
    NoCredentials,
    #[error("invalid session cookie and no key")]
    InvalidCookie,
    #[error("wrong key")]
    WrongKey,
    #[error("key verification failed: {0}")]
    Verification(#[source] VerifyError),
    #[error("key verification task failed: {0}")]
    VerificationTask(#[source] tokio::task::JoinError),
    #[error("session creation failed: {0}")]
    Randomness(#[source] TokenError),
}

impl GateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GateError::NoCredentials => ErrorCategory::CredentialMissing,
            GateError::InvalidCookie | GateError::WrongKey => ErrorCategory::CredentialInvalid,
            GateError::Verification(_) | GateError::VerificationTask(_) => {
                ErrorCategory::VerificationFailure
            }
            GateError::Randomness(_) => ErrorCategory::RandomnessFailure,
        }
    }

    /// Whether this is the client's fault (retry with a key) rather than ours.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::CredentialMissing | ErrorCategory::CredentialInvalid
        )
    }
}

pub struct AuthGate {
    store: SessionStore,
    verifier: Arc<dyn SecretVerifier>,
    secret_hash: String,
    cookie_name: CookieName,
}

impl AuthGate {
    pub fn new(
        store: SessionStore,
        verifier: Arc<dyn SecretVerifier>,
        secret_hash: impl Into<String>,
        cookie_name: CookieName,
    ) -> Self {
        Self {
            store,
            verifier,
            secret_hash: secret_hash.into(),
            cookie_name,
        }
    }

    pub fn cookie_name(&self) -> &CookieName {
        &self.cookie_name
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Decide whether the request from `identity` gets through.
    pub async fn decide(
        &self,
        identity: &str,
        cookie: Option<&str>,
        key: Option<&str>,
    ) -> Result<Decision, GateError> {
        let cookie_invalid = match cookie {
            Some(presented) => {
                if self.store.lookup(identity).await.as_deref() == Some(presented) {
                    tracing::debug!(identity, "admitted by session cookie");
                    return Ok(Decision::Admit);
                }
                true
            }
            None => false,
        };

        let Some(key) = key else {
            return Err(if cookie_invalid {
                GateError::InvalidCookie
            } else {
                GateError::NoCredentials
            });
        };

        // Verification is CPU-bound; run it on the blocking pool.
        let verifier = Arc::clone(&self.verifier);
        let candidate = key.to_owned();
        let secret_hash = self.secret_hash.clone();
        let verdict =
            tokio::task::spawn_blocking(move || verifier.verify(&candidate, &secret_hash))
                .await
                .map_err(|e| {
                    tracing::error!(identity, error = %e, "key verification task failed");
                    GateError::VerificationTask(e)
                })?;

        match verdict {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(identity, "wrong key presented");
                return Err(GateError::WrongKey);
            }
            Err(e) => {
                tracing::error!(identity, error = %e, "key verification failed");
                return Err(GateError::Verification(e));
            }
        }

        let token = self.store.create(identity).await.map_err(|e| {
            tracing::error!(identity, error = %e, "failed to mint session token");
            GateError::Randomness(e)
        })?;
        tracing::info!(identity, replaced_cookie = cookie_invalid, "session issued");
        Ok(Decision::Issue { token })
    }
}
