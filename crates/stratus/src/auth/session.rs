//! Session management for authenticated platform operations.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, instrument};

use crate::error::Error;
use crate::types::ApiUrl;

use super::Credentials;

/// An authenticated connection to the platform: one credential pair, one
/// upstream host.
///
/// Sessions are cheap to clone (they share an internal `Arc`) and safe to
/// use from many tasks at once. The token pair is updated atomically under a
/// lock, and the one-time startup verification runs exactly once no matter
/// how many operations race into it.
///
/// # Example
///
/// ```no_run
/// use stratus::{ApiUrl, AuthSession};
///
/// # async fn example() -> Result<(), stratus::Error> {
/// let api = ApiUrl::new("https://api.stratus.run")?;
/// let identity = ApiUrl::new("https://identity.stratus.run")?;
/// let session = AuthSession::new("my-client-id", api, identity);
///
/// let credentials = session.login("alice", "hunter2").await?;
/// println!("logged in as {}", credentials.username());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client_id: String,
    api: ApiUrl,
    identity: ApiUrl,
    http: reqwest::Client,
    credentials: RwLock<Credentials>,
    verified: OnceCell<Result<(), Error>>,
}

/// Wire shape of the identity server's token grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

struct TokenPair {
    access_token: String,
    refresh_token: String,
}

impl AuthSession {
    /// Create a logged-out session. Call [`login`](Self::login) before
    /// issuing resource requests.
    pub fn new(client_id: impl Into<String>, api: ApiUrl, identity: ApiUrl) -> Self {
        Self::with_credentials(client_id, api, identity, Credentials::empty())
    }

    /// Create a session from persisted credentials without re-authenticating.
    ///
    /// The caller is responsible for the tokens being plausible;
    /// [`ensure_verified`](Self::ensure_verified) checks them against the
    /// server on first use.
    pub fn with_credentials(
        client_id: impl Into<String>,
        api: ApiUrl,
        identity: ApiUrl,
        credentials: Credentials,
    ) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stratus/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            inner: Arc::new(SessionInner {
                client_id: client_id.into(),
                api,
                identity,
                http,
                credentials: RwLock::new(credentials),
                verified: OnceCell::new(),
            }),
        }
    }

    /// Returns the resource API base URL.
    pub fn api(&self) -> &ApiUrl {
        &self.inner.api
    }

    /// Returns the identity server base URL.
    pub fn identity(&self) -> &ApiUrl {
        &self.inner.identity
    }

    /// Returns a snapshot of the current credentials.
    pub async fn credentials(&self) -> Credentials {
        self.inner.credentials.read().await.clone()
    }

    /// True once the one-time verification has run and succeeded.
    pub fn is_verified(&self) -> bool {
        matches!(self.inner.verified.get(), Some(Ok(())))
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Returns the current access token, read at call time so a refreshed
    /// token is picked up by the next request.
    pub(crate) async fn access_token(&self) -> String {
        self.inner
            .credentials
            .read()
            .await
            .access_token()
            .to_string()
    }

    /// Verify the session against the API root, exactly once.
    ///
    /// The first call performs the check: with no access token configured it
    /// fails with [`Error::MissingToken`]; otherwise it issues an
    /// authenticated GET against the API root, treating 200 as verified and
    /// 401 as a cue to [`refresh`](Self::refresh) and then treat the session
    /// as verified. Any other status fails with [`Error::UnexpectedStatus`].
    ///
    /// Concurrent first callers all await the single execution and observe
    /// the same outcome. The outcome — success or failure — is cached for the
    /// lifetime of the session: a transient failure during the first check is
    /// replayed to every later caller, and retrying requires constructing a
    /// new session.
    #[instrument(skip(self), fields(api = %self.inner.api))]
    pub async fn ensure_verified(&self) -> Result<(), Error> {
        self.inner
            .verified
            .get_or_init(|| self.verify())
            .await
            .clone()
    }

    async fn verify(&self) -> Result<(), Error> {
        let token = self.access_token().await;
        if token.is_empty() {
            return Err(Error::MissingToken);
        }

        debug!("verifying access token against API root");
        let response = self
            .inner
            .http
            .get(self.inner.api.endpoint(""))
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {
                debug!("access token accepted");
                Ok(())
            }
            401 => {
                debug!("access token expired, attempting refresh");
                self.refresh().await
            }
            status => Err(Error::UnexpectedStatus { status }),
        }
    }

    /// Exchange a password grant for a token pair and store it.
    ///
    /// Returns a snapshot of the stored credentials on success. On failure
    /// the previously stored credentials are left untouched.
    ///
    /// # Errors
    ///
    /// [`Error::AuthenticationFailed`] when the identity server rejects the
    /// grant, carrying the server-provided description when one is present.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Credentials, Error> {
        info!("requesting password grant");

        let response = self
            .inner
            .http
            .post(self.inner.identity.endpoint("oauth/token/"))
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.inner.client_id.as_str()),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        let pair = Self::token_pair(response).await?;

        let mut credentials = self.inner.credentials.write().await;
        credentials.set(username, pair.access_token, pair.refresh_token);
        debug!("credentials stored");
        Ok(credentials.clone())
    }

    /// Exchange the stored refresh token for a new token pair, replacing
    /// both tokens in place.
    ///
    /// On failure the stored tokens are left untouched.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), Error> {
        info!("requesting refresh grant");

        let refresh_token = {
            let credentials = self.inner.credentials.read().await;
            credentials.refresh_token().to_string()
        };

        let response = self
            .inner
            .http
            .post(self.inner.identity.endpoint("oauth/token/"))
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.inner.client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await?;

        let pair = Self::token_pair(response).await?;

        let mut credentials = self.inner.credentials.write().await;
        credentials.set_tokens(pair.access_token, pair.refresh_token);
        debug!("token pair replaced");
        Ok(())
    }

    /// Revoke the refresh token and clear the stored credentials.
    ///
    /// Returns the (now empty) credentials snapshot so callers can persist
    /// the logged-out state.
    ///
    /// # Errors
    ///
    /// [`Error::RevocationFailed`] on any non-200 response; the stored
    /// credentials are left untouched in that case.
    #[instrument(skip(self))]
    pub async fn revoke(&self) -> Result<Credentials, Error> {
        info!("revoking token pair");

        let refresh_token = {
            let credentials = self.inner.credentials.read().await;
            credentials.refresh_token().to_string()
        };

        let response = self
            .inner
            .http
            .post(self.inner.identity.endpoint("oauth/revoke_token/"))
            .form(&[
                ("client_id", self.inner.client_id.as_str()),
                ("token", refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::RevocationFailed { status });
        }

        let mut credentials = self.inner.credentials.write().await;
        credentials.clear();
        debug!("credentials cleared");
        Ok(credentials.clone())
    }

    /// Classify an identity server response into a token pair or an error.
    async fn token_pair(response: reqwest::Response) -> Result<TokenPair, Error> {
        if response.status().as_u16() == 401 {
            return Err(Error::AuthenticationFailed {
                description: "invalid credentials".to_string(),
            });
        }

        let payload: TokenResponse = response.json().await?;

        if let Some(error) = payload.error {
            return Err(Error::AuthenticationFailed {
                description: payload.error_description.unwrap_or(error),
            });
        }

        match (payload.access_token, payload.refresh_token) {
            (Some(access_token), Some(refresh_token))
                if !access_token.is_empty() && !refresh_token.is_empty() =>
            {
                Ok(TokenPair {
                    access_token,
                    refresh_token,
                })
            }
            _ => Err(Error::Decode {
                message: "token response missing access or refresh token".to_string(),
            }),
        }
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("client_id", &self.inner.client_id)
            .field("api", &self.inner.api)
            .field("identity", &self.inner.identity)
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> AuthSession {
        AuthSession::new(
            "client-id",
            ApiUrl::new("https://api.stratus.run").unwrap(),
            ApiUrl::new("https://identity.stratus.run").unwrap(),
        )
    }

    #[test]
    fn debug_hides_credentials() {
        let session = test_session();
        let debug = format!("{:?}", session);
        assert!(debug.contains("client-id"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn missing_token_rejected_without_network() {
        let session = test_session();
        let result = session.ensure_verified().await;
        assert!(matches!(result, Err(Error::MissingToken)));
        assert!(!session.is_verified());
    }

    #[tokio::test]
    async fn missing_token_outcome_is_cached() {
        let session = test_session();
        assert!(matches!(
            session.ensure_verified().await,
            Err(Error::MissingToken)
        ));
        // The once-cell replays the first outcome even though credentials
        // have since been populated.
        {
            let mut credentials = session.inner.credentials.write().await;
            credentials.set("alice", "acc", "ref");
        }
        assert!(matches!(
            session.ensure_verified().await,
            Err(Error::MissingToken)
        ));
    }
}
