//! Random token generation for session tokens and the cookie name suffix.
//!
//! Every character is drawn uniformly from `[A-Za-z0-9]` using the operating
//! system CSPRNG. Bytes are rejection-sampled so the alphabet's 62 symbols
//! stay equally likely.

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Alphabet tokens are drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a session token.
pub const SESSION_TOKEN_LEN: usize = 33;

/// Length of the random suffix appended to the cookie name prefix.
pub const COOKIE_SUFFIX_LEN: usize = 16;

/// Largest multiple of 62 that fits in a byte. Bytes at or above it are rejected.
const REJECT_FROM: u8 = (256 - 256 % ALPHABET.len()) as u8;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("secure random source unavailable: {0}")]
    Randomness(#[from] rand::Error),
}

/// Generate a string of exactly `length` alphanumeric characters.
pub fn random_token(length: usize) -> Result<String, TokenError> {
    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 64];

    while out.len() < length {
        OsRng.try_fill_bytes(&mut buf)?;
        for &b in buf.iter().filter(|&&b| b < REJECT_FROM) {
            if out.len() == length {
                break;
            }
            out.push(ALPHABET[(b as usize) % ALPHABET.len()] as char);
        }
    }

    Ok(out)
}

/// Generate a new session token.
pub fn session_token() -> Result<String, TokenError> {
    random_token(SESSION_TOKEN_LEN)
}
