//! The top-level client: one session, one shared executor, facade accessors.

use crate::auth::{AuthSession, Credentials};
use crate::resources::{Builds, Deployments, Hosts, Logs, Services, Sites};
use crate::rest::ResourceClient;
use crate::types::ApiUrl;

/// Connection settings for one logical client.
#[derive(Clone, Debug)]
pub struct Config {
    /// OAuth client identifier registered with the identity server.
    pub client_id: String,
    /// Resource API base URL.
    pub api_url: ApiUrl,
    /// Identity server base URL.
    pub identity_url: ApiUrl,
}

impl Config {
    pub fn new(client_id: impl Into<String>, api_url: ApiUrl, identity_url: ApiUrl) -> Self {
        Self {
            client_id: client_id.into(),
            api_url,
            identity_url,
        }
    }
}

/// Entry point to the platform API.
///
/// Cheap to clone; all clones share one [`AuthSession`] and one underlying
/// HTTP client.
///
/// # Example
///
/// ```no_run
/// use stratus::{ApiUrl, Client, Config};
///
/// # async fn example() -> Result<(), stratus::Error> {
/// let config = Config::new(
///     "my-client-id",
///     ApiUrl::new("https://api.stratus.run")?,
///     ApiUrl::new("https://identity.stratus.run")?,
/// );
/// let client = Client::new(config);
/// client.session().login("alice", "hunter2").await?;
/// client.ensure_verified().await?;
///
/// for site in client.sites().list().await? {
///     println!("{:?}", site.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    session: AuthSession,
    rest: ResourceClient,
}

impl Client {
    /// Create a logged-out client.
    pub fn new(config: Config) -> Self {
        Self::with_credentials(config, Credentials::empty())
    }

    /// Create a client from persisted credentials.
    pub fn with_credentials(config: Config, credentials: Credentials) -> Self {
        let session = AuthSession::with_credentials(
            config.client_id,
            config.api_url,
            config.identity_url,
            credentials,
        );
        let rest = ResourceClient::new(session.clone());
        Self { session, rest }
    }

    /// Returns the authentication session.
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Verify the session against the API, exactly once per client.
    ///
    /// See [`AuthSession::ensure_verified`].
    pub async fn ensure_verified(&self) -> Result<(), crate::Error> {
        self.session.ensure_verified().await
    }

    /// Site operations.
    pub fn sites(&self) -> Sites {
        Sites::new(self.rest.clone())
    }

    /// Service operations.
    pub fn services(&self) -> Services {
        Services::new(self.rest.clone())
    }

    /// Build operations.
    pub fn builds(&self) -> Builds {
        Builds::new(self.rest.clone())
    }

    /// Deployment operations.
    pub fn deployments(&self) -> Deployments {
        Deployments::new(self.rest.clone())
    }

    /// Hostname operations.
    pub fn hosts(&self) -> Hosts {
        Hosts::new(self.rest.clone())
    }

    /// Log queries.
    pub fn logs(&self) -> Logs {
        Logs::new(self.rest.clone())
    }
}
