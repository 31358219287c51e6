//! knock-core — configuration, tokens, cookie naming, and secret verification.
//! All other knock crates depend on this one.

pub mod config;
pub mod cookie;
pub mod identity;
pub mod secret;
pub mod token;

pub use config::{ConfigError, KnockConfig};
pub use cookie::CookieName;
pub use identity::client_identity;
pub use secret::{Argon2Verifier, SecretVerifier, VerifyError};
pub use token::TokenError;

/// Version logged at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
