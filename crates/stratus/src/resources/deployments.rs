//! Deployments: a build placed onto a service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;
use crate::rest::ResourceClient;
use crate::types::Field;
use crate::wait::wait_for;

use super::services::Services;

/// How long [`Deployment::wait`] polls before giving up.
const DEPLOY_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Facade for the `deployments/` endpoints.
#[derive(Clone, Debug)]
pub struct Deployments {
    rest: ResourceClient,
}

/// A deployment record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub service: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub build: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub creator: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,

    #[serde(skip)]
    handle: Option<Deployments>,
}

impl Deployments {
    pub(crate) fn new(rest: ResourceClient) -> Self {
        Self { rest }
    }

    /// List deployments, optionally filtered by site URL.
    #[instrument(skip(self))]
    pub async fn list(&self, site_url: Option<&str>) -> Result<Vec<Deployment>, Error> {
        let mut url = self.rest.endpoint("deployments/");
        if let Some(site_url) = site_url {
            url.query_pairs_mut().append_pair("site", site_url);
        }
        let (mut deployments, _) = self.rest.get::<Vec<Deployment>>(url).await?;
        for deployment in &mut deployments {
            deployment.handle = Some(self.clone());
        }
        Ok(deployments)
    }

    /// Create a deployment, returning the server's view of the record.
    #[instrument(skip(self, deployment))]
    pub async fn create(&self, deployment: Deployment) -> Result<Deployment, Error> {
        let url = self.rest.endpoint("deployments/");
        let mut created: Deployment = self.rest.post(url, &deployment).await?;
        created.handle = Some(self.clone());
        Ok(created)
    }
}

impl Deployment {
    fn handle(&self) -> Result<&Deployments, Error> {
        self.handle.as_ref().ok_or(Error::Detached)
    }

    /// Block until the deployed service reports `running`, for up to
    /// fifteen minutes.
    ///
    /// Polls the deployment's service: `"running"` completes the wait,
    /// `"deploying"` keeps polling, and any other state aborts with
    /// [`Error::UnknownState`].
    #[instrument(skip(self))]
    pub async fn wait(&self) -> Result<(), Error> {
        let handle = self.handle()?;
        let service_url = self
            .service
            .value()
            .ok_or(Error::MissingField { name: "service" })?
            .clone();
        let services = Services::new(handle.rest.clone());

        wait_for(DEPLOY_TIMEOUT, || {
            let services = services.clone();
            let service_url = service_url.clone();
            async move {
                let service = services.get_from_url(&service_url).await?;
                match service.state.value().map(String::as_str) {
                    Some("running") => Ok(true),
                    Some("deploying") => Ok(false),
                    other => Err(Error::UnknownState {
                        state: other.unwrap_or("").to_string(),
                    }),
                }
            }
        })
        .await
    }
}
