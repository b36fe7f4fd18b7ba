//! Typed resource facades.
//!
//! Thin per-resource surfaces that map domain verbs onto [`ResourceClient`]
//! calls. Records fetched through a facade carry a handle back to it, so
//! chained operations (`wait`, `restart`, `add_user`, …) work without the
//! record owning the client; hand-built records have no handle and those
//! operations fail with [`Error::Detached`].
//!
//! [`ResourceClient`]: crate::rest::ResourceClient
//! [`Error::Detached`]: crate::error::Error::Detached

mod builds;
mod deployments;
mod hosts;
mod logs;
mod services;
mod sites;

pub use builds::{Build, Builds};
pub use deployments::{Deployment, Deployments};
pub use hosts::{HostName, Hosts};
pub use logs::{LogPage, LogQuery, LogRecord, Logs, PAGE_TOKEN_HEADER};
pub use services::{Service, Services};
pub use sites::{Site, SiteMember, SiteMemberUser, Sites};

use url::Url;

use crate::error::Error;
use crate::types::Field;

/// Parse a record's self URL, failing when the field was never populated.
pub(crate) fn record_url(field: &Field<String>, name: &'static str) -> Result<Url, Error> {
    let raw = field.value().ok_or(Error::MissingField { name })?;
    parse_url(raw)
}

pub(crate) fn parse_url(raw: &str) -> Result<Url, Error> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
