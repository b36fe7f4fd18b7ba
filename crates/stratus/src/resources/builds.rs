//! Builds: source snapshots turned into deployable artifacts.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;
use crate::rest::ResourceClient;
use crate::types::Field;

use super::record_url;

/// Facade for the `builds/` endpoints.
#[derive(Clone, Debug)]
pub struct Builds {
    rest: ResourceClient,
}

/// A build record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Build {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub site: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub instance: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub label: Field<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Field::is_absent")]
    pub git_ref: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub sha: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub buildpack_url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub creator: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,

    #[serde(skip)]
    handle: Option<Builds>,
}

impl Builds {
    pub(crate) fn new(rest: ResourceClient) -> Self {
        Self { rest }
    }

    /// List builds, optionally filtered by site or instance URL.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        site_url: Option<&str>,
        instance_url: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Build>, Error> {
        let mut url = self.rest.endpoint("builds/");
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(site_url) = site_url {
                pairs.append_pair("site", site_url);
            }
            if let Some(instance_url) = instance_url {
                pairs.append_pair("instance", instance_url);
            }
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        let (mut builds, _) = self.rest.get::<Vec<Build>>(url).await?;
        for build in &mut builds {
            build.handle = Some(self.clone());
        }
        Ok(builds)
    }

    /// Create a build, returning the server's view of the record.
    ///
    /// The returned record's URL is the pre-signed upload target for
    /// [`Build::perform`].
    #[instrument(skip(self, build))]
    pub async fn create(&self, build: Build) -> Result<Build, Error> {
        let url = self.rest.endpoint("builds/");
        let mut created: Build = self.rest.post(url, &build).await?;
        created.handle = Some(self.clone());
        Ok(created)
    }
}

impl Build {
    fn handle(&self) -> Result<&Builds, Error> {
        self.handle.as_ref().ok_or(Error::Detached)
    }

    /// Upload the source tarball and start the build.
    ///
    /// Streams `blob` (a tar archive) to the build's pre-signed URL and
    /// returns the endpoint to attach to for build output.
    #[instrument(skip(self, blob))]
    pub async fn perform(&self, blob: impl Into<reqwest::Body>) -> Result<String, Error> {
        let handle = self.handle()?;
        let url = record_url(&self.url, "build")?;
        handle.rest.put_archive(url, blob.into()).await
    }
}
