//! Hostnames attached to an instance.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;
use crate::rest::ResourceClient;
use crate::types::Field;

use super::{parse_url, record_url};

/// Facade for the `hosts/` endpoints.
#[derive(Clone, Debug)]
pub struct Hosts {
    rest: ResourceClient,
}

/// A hostname record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HostName {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub instance: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub host: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub keypair: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,

    #[serde(skip)]
    handle: Option<Hosts>,
}

impl Hosts {
    pub(crate) fn new(rest: ResourceClient) -> Self {
        Self { rest }
    }

    async fn find_one(&self, url: url::Url) -> Result<HostName, Error> {
        let (mut host, _) = self.rest.get::<HostName>(url).await?;
        host.handle = Some(self.clone());
        Ok(host)
    }

    /// Attach a hostname, returning the server's view of the record.
    #[instrument(skip(self, host))]
    pub async fn create(&self, host: HostName) -> Result<HostName, Error> {
        let url = self.rest.endpoint("hosts/");
        let mut created: HostName = self.rest.post(url, &host).await?;
        created.handle = Some(self.clone());
        Ok(created)
    }

    /// Look up a hostname by instance URL and host string.
    #[instrument(skip(self))]
    pub async fn get(&self, instance_url: &str, host: &str) -> Result<HostName, Error> {
        let mut url = self.rest.endpoint("hosts/find/");
        url.query_pairs_mut()
            .append_pair("instance", instance_url)
            .append_pair("host", host);
        self.find_one(url).await
    }

    /// Fetch a hostname from its self URL.
    #[instrument(skip(self))]
    pub async fn get_from_url(&self, host_url: &str) -> Result<HostName, Error> {
        self.find_one(parse_url(host_url)?).await
    }

    /// List hostnames, optionally filtered by instance URL.
    #[instrument(skip(self))]
    pub async fn list(&self, instance_url: Option<&str>) -> Result<Vec<HostName>, Error> {
        let mut url = self.rest.endpoint("hosts/");
        if let Some(instance_url) = instance_url {
            url.query_pairs_mut().append_pair("instance", instance_url);
        }
        let (mut hosts, _) = self.rest.get::<Vec<HostName>>(url).await?;
        for host in &mut hosts {
            host.handle = Some(self.clone());
        }
        Ok(hosts)
    }

    /// Partially update a hostname: only present fields are sent.
    #[instrument(skip(self, host))]
    pub async fn update(&self, host: &HostName) -> Result<(), Error> {
        let url = record_url(&host.url, "host")?;
        let mut body = host.clone();
        body.url = Field::Absent;
        body.handle = None;
        self.rest.patch_empty(url, &body).await
    }

    /// Detach a hostname by its self URL.
    #[instrument(skip(self))]
    pub async fn delete(&self, host_url: &str) -> Result<(), Error> {
        self.rest.delete(parse_url(host_url)?).await
    }
}

impl HostName {
    fn handle(&self) -> Result<&Hosts, Error> {
        self.handle.as_ref().ok_or(Error::Detached)
    }

    /// Detach the TLS keypair from this hostname.
    ///
    /// Sends an explicit `null` so the server clears the association — the
    /// one place the codec's present-with-null state is required.
    #[instrument(skip(self))]
    pub async fn detach_keypair(&self) -> Result<(), Error> {
        #[derive(Debug, Serialize)]
        struct KeyPairPatch {
            keypair: Field<String>,
        }

        let handle = self.handle()?;
        let url = record_url(&self.url, "host")?;
        handle
            .rest
            .patch_empty(
                url,
                &KeyPairPatch {
                    keypair: Field::Null,
                },
            )
            .await
    }
}
