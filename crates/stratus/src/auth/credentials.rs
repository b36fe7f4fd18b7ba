//! The stored credential set for one logical client.

use super::tokens::{AccessToken, RefreshToken};

/// The username and token pair owned by one [`AuthSession`].
///
/// A credential set is either fully empty (logged out) or fully populated;
/// every mutation goes through [`Credentials::set`] or [`Credentials::clear`]
/// so a token never exists without its refresh counterpart.
///
/// [`AuthSession`]: super::AuthSession
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    username: String,
    access_token: AccessToken,
    refresh_token: RefreshToken,
}

impl Credentials {
    /// Create a populated credential set, e.g. restored from disk.
    pub fn new(
        username: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            access_token: AccessToken::new(access_token),
            refresh_token: RefreshToken::new(refresh_token),
        }
    }

    /// An empty (logged out) credential set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the username, empty when logged out.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the access token string, e.g. for persistence.
    ///
    /// # Security
    ///
    /// Handle the returned value carefully; it authorizes requests.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Returns the refresh token string, e.g. for persistence.
    ///
    /// # Security
    ///
    /// Handle the returned value carefully; it can mint new access tokens.
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.as_str()
    }

    /// True when no tokens are configured.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty() && self.refresh_token.is_empty()
    }

    /// Replace the username and both tokens in one step.
    pub(crate) fn set(
        &mut self,
        username: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) {
        self.username = username.into();
        self.set_tokens(access_token, refresh_token);
    }

    /// Replace the token pair, keeping the username.
    pub(crate) fn set_tokens(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) {
        self.access_token = AccessToken::new(access_token);
        self.refresh_token = RefreshToken::new(refresh_token);
    }

    /// Invalidate everything, returning to the logged-out state.
    pub(crate) fn clear(&mut self) {
        self.username.clear();
        self.access_token = AccessToken::default();
        self.refresh_token = RefreshToken::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_have_no_tokens() {
        let creds = Credentials::empty();
        assert!(creds.is_empty());
        assert_eq!(creds.username(), "");
    }

    #[test]
    fn set_populates_the_whole_pair() {
        let mut creds = Credentials::empty();
        creds.set("alice", "acc", "ref");
        assert!(!creds.is_empty());
        assert_eq!(creds.username(), "alice");
        assert_eq!(creds.access_token(), "acc");
        assert_eq!(creds.refresh_token(), "ref");
    }

    #[test]
    fn clear_returns_to_logged_out() {
        let mut creds = Credentials::new("alice", "acc", "ref");
        creds.clear();
        assert!(creds.is_empty());
        assert_eq!(creds.username(), "");
        assert_eq!(creds.access_token(), "");
    }

    #[test]
    fn debug_hides_token_values() {
        let creds = Credentials::new("alice", "acc-3f2a9c", "ref-77b0d1");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("acc-3f2a9c"));
        assert!(!debug.contains("ref-77b0d1"));
    }
}
