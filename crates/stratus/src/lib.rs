//! stratus - Client library for the Stratus platform API
//!
//! The library authenticates against the platform's identity server, issues
//! typed CRUD requests against REST resources (sites, services, builds,
//! deployments, hostnames, logs), and hands typed records back to callers.
//! All requests flow through one [`AuthSession`], which verifies the access
//! token exactly once on first use and refreshes it transparently when it
//! has expired.
//!
//! # Example
//!
//! ```no_run
//! use stratus::{ApiUrl, Client, Config};
//!
//! # async fn example() -> Result<(), stratus::Error> {
//! let config = Config::new(
//!     "my-client-id",
//!     ApiUrl::new("https://api.stratus.run")?,
//!     ApiUrl::new("https://identity.stratus.run")?,
//! );
//! let client = Client::new(config);
//! client.session().login("alice", "hunter2").await?;
//! client.ensure_verified().await?;
//!
//! let site = client.sites().get("primary").await?;
//! println!("{:?}", site.key);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod resources;
pub mod rest;
pub mod types;
pub mod wait;

// Re-export primary types at crate root for convenience
pub use auth::{AuthSession, Credentials};
pub use client::{Client, Config};
pub use error::Error;
pub use resources::{
    Build, Builds, Deployment, Deployments, HostName, Hosts, LogPage, LogQuery, LogRecord, Logs,
    Service, Services, Site, Sites,
};
pub use rest::{ResourceClient, ResponseMeta};
pub use types::{ApiUrl, Field};
pub use wait::{POLL_INTERVAL, wait_for};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
