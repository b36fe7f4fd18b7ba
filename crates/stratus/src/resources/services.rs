//! Services: the runnable units inside an instance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;
use crate::rest::ResourceClient;
use crate::types::Field;

use super::{parse_url, record_url};

/// Facade for the `services/` endpoints.
#[derive(Clone, Debug)]
pub struct Services {
    rest: ResourceClient,
}

/// A service record.
///
/// `version` and `open_ports` are honored on create only; `desired_state`
/// and `desired_replicas` on update only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub instance: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub kind: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub image: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub size: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub replicas: Field<u32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub network: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub volume: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub state: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub env: Field<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub web_url: Field<String>,

    // create only
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub version: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub open_ports: Field<String>,

    // update only
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub desired_state: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub desired_replicas: Field<u32>,

    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,

    #[serde(skip)]
    handle: Option<Services>,
}

impl Services {
    pub(crate) fn new(rest: ResourceClient) -> Self {
        Self { rest }
    }

    async fn find_one(&self, url: url::Url) -> Result<Service, Error> {
        let (mut service, _) = self.rest.get::<Service>(url).await?;
        service.handle = Some(self.clone());
        Ok(service)
    }

    /// Create a service, returning the server's view of the record.
    #[instrument(skip(self, service))]
    pub async fn create(&self, service: Service) -> Result<Service, Error> {
        let url = self.rest.endpoint("services/");
        let mut created: Service = self.rest.post(url, &service).await?;
        created.handle = Some(self.clone());
        Ok(created)
    }

    /// Look up a service by instance URL and name.
    #[instrument(skip(self))]
    pub async fn get(&self, instance_url: &str, name: &str) -> Result<Service, Error> {
        let mut url = self.rest.endpoint("services/find/");
        url.query_pairs_mut()
            .append_pair("instance", instance_url)
            .append_pair("name", name);
        self.find_one(url).await
    }

    /// Fetch a service from its self URL.
    #[instrument(skip(self))]
    pub async fn get_from_url(&self, service_url: &str) -> Result<Service, Error> {
        self.find_one(parse_url(service_url)?).await
    }

    /// List services, optionally filtered by instance URL.
    #[instrument(skip(self))]
    pub async fn list(&self, instance_url: Option<&str>) -> Result<Vec<Service>, Error> {
        let mut url = self.rest.endpoint("services/");
        if let Some(instance_url) = instance_url {
            url.query_pairs_mut().append_pair("instance", instance_url);
        }
        let (mut services, _) = self.rest.get::<Vec<Service>>(url).await?;
        for service in &mut services {
            service.handle = Some(self.clone());
        }
        Ok(services)
    }

    /// Partially update a service: only present fields are sent.
    ///
    /// The record's own URL field is cleared from the payload before
    /// patching.
    #[instrument(skip(self, service))]
    pub async fn update(&self, service: &Service) -> Result<(), Error> {
        let url = record_url(&service.url, "service")?;
        let mut body = service.clone();
        body.url = Field::Absent;
        body.handle = None;
        self.rest.patch_empty(url, &body).await
    }

    /// Delete a service by its self URL.
    #[instrument(skip(self))]
    pub async fn delete(&self, service_url: &str) -> Result<(), Error> {
        self.rest.delete(parse_url(service_url)?).await
    }
}

#[derive(Debug, Serialize)]
struct DesiredPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    desired_state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desired_replicas: Option<u32>,
}

impl Service {
    fn handle(&self) -> Result<&Services, Error> {
        self.handle.as_ref().ok_or(Error::Detached)
    }

    async fn patch_desired(&self, patch: DesiredPatch<'_>) -> Result<(), Error> {
        let handle = self.handle()?;
        let url = record_url(&self.url, "service")?;
        handle.rest.patch_empty(url, &patch).await
    }

    /// Ask the platform to restart this service.
    pub async fn restart(&self) -> Result<(), Error> {
        self.set_state("restarted").await
    }

    /// Set the desired state of this service.
    pub async fn set_state(&self, state: &str) -> Result<(), Error> {
        self.patch_desired(DesiredPatch {
            desired_state: Some(state),
            desired_replicas: None,
        })
        .await
    }

    /// Set the desired replica count of this service.
    pub async fn set_replicas(&self, replicas: u32) -> Result<(), Error> {
        self.patch_desired(DesiredPatch {
            desired_state: None,
            desired_replicas: Some(replicas),
        })
        .await
    }

    /// Run a one-off command in this service's environment.
    ///
    /// Returns the endpoint to attach to for the command's I/O.
    #[instrument(skip(self))]
    pub async fn run(&self, command: &[String], size: Option<&str>) -> Result<String, Error> {
        #[derive(Debug, Serialize)]
        struct RunRequest<'a> {
            command: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            size: Option<&'a str>,
        }

        #[derive(Debug, Deserialize)]
        struct RunResponse {
            endpoint: String,
        }

        let handle = self.handle()?;
        let raw = self
            .url
            .value()
            .ok_or(Error::MissingField { name: "service" })?;
        let url = parse_url(&format!("{raw}run/"))?;

        let response: RunResponse = handle
            .rest
            .post(
                url,
                &RunRequest {
                    command: command.join(" "),
                    size,
                },
            )
            .await?;
        Ok(response.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_patch_serializes_single_field() {
        let patch = DesiredPatch {
            desired_state: Some("restarted"),
            desired_replicas: None,
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"desired_state": "restarted"})
        );
    }

    #[test]
    fn record_round_trip_keeps_absent_fields_absent() {
        let service: Service =
            serde_json::from_value(json!({"name": "web", "state": "running"})).unwrap();
        assert_eq!(service.replicas, Field::Absent);
        let payload = serde_json::to_value(&service).unwrap();
        assert_eq!(payload, json!({"name": "web", "state": "running"}));
    }

    #[test]
    fn detached_record_cannot_patch() {
        let service = Service {
            url: Field::Value("https://api.stratus.run/services/1/".into()),
            ..Service::default()
        };
        assert!(service.handle().is_err());
    }
}
