//! Session cookie naming, parsing, and `Set-Cookie` formatting.

use std::fmt;

use crate::token::{random_token, TokenError, COOKIE_SUFFIX_LEN};

/// Default fixed part of the cookie name.
pub const DEFAULT_COOKIE_PREFIX: &str = "knockknock_";

/// Process-lifetime cookie name: a fixed prefix plus a random suffix.
///
/// Generated once at startup and never changed afterwards, so a restart
/// invalidates every cookie handed out by the previous process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieName(String);

impl CookieName {
    pub fn generate(prefix: &str) -> Result<Self, TokenError> {
        let suffix = random_token(COOKIE_SUFFIX_LEN)?;
        Ok(Self(format!("{prefix}{suffix}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Find this cookie's value in a `Cookie` request header value.
    pub fn find_in<'a>(&self, header: &'a str) -> Option<&'a str> {
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == self.0).then(|| value.trim())
        })
    }

    /// `Set-Cookie` value for a freshly issued session.
    ///
    /// No `Max-Age`: the server-side sweep governs the real lifetime.
    pub fn set_cookie(&self, token: &str) -> String {
        format!("{}={token}; Path=/; HttpOnly; Secure", self.0)
    }
}

impl fmt::Display for CookieName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
