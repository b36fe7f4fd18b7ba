//! Token types for platform authentication.

use std::fmt;

/// An access token attached as a bearer credential to resource requests.
///
/// # Security
///
/// Never logged or displayed in Debug output. Treat as opaque.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no token is configured (logged out).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token exchanged for a new token pair when the access token
/// expires.
///
/// # Security
///
/// Never logged or displayed in Debug output. Treat as opaque.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RefreshToken(pub(crate) String);

impl RefreshToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in grant and revocation requests.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no token is configured (logged out).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}
