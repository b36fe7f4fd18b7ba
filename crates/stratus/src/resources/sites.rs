//! Sites: the top-level grouping for services and deployments.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;
use crate::rest::ResourceClient;
use crate::types::Field;

use super::record_url;

/// Facade for the `sites/` endpoints.
#[derive(Clone, Debug)]
pub struct Sites {
    rest: ResourceClient,
}

/// A site record. Every field is independently present or absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Site {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub key: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub users: Field<Vec<SiteMember>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,

    #[serde(skip)]
    handle: Option<Sites>,
}

/// A user's membership in a site.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteMember {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub user: Field<SiteMemberUser>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub role: Field<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteMemberUser {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub username: Field<String>,
}

impl Sites {
    pub(crate) fn new(rest: ResourceClient) -> Self {
        Self { rest }
    }

    /// Create a site, returning the server's view of the record.
    #[instrument(skip(self, site))]
    pub async fn create(&self, site: Site) -> Result<Site, Error> {
        let url = self.rest.endpoint("sites/");
        let mut created: Site = self.rest.post(url, &site).await?;
        created.handle = Some(self.clone());
        Ok(created)
    }

    /// List all sites visible to the authenticated user.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Site>, Error> {
        let url = self.rest.endpoint("sites/");
        let (mut sites, _) = self.rest.get::<Vec<Site>>(url).await?;
        for site in &mut sites {
            site.handle = Some(self.clone());
        }
        Ok(sites)
    }

    /// Look up a single site by name.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no site with that name exists.
    #[instrument(skip(self))]
    pub async fn get(&self, name: &str) -> Result<Site, Error> {
        let mut url = self.rest.endpoint("sites/find/");
        url.query_pairs_mut().append_pair("name", name);
        let (mut site, _) = self.rest.get::<Site>(url).await?;
        site.handle = Some(self.clone());
        Ok(site)
    }

    /// Delete a site. The record must carry its self URL.
    #[instrument(skip(self, site))]
    pub async fn delete(&self, site: &Site) -> Result<(), Error> {
        let url = record_url(&site.url, "site")?;
        self.rest.delete(url).await
    }
}

impl Site {
    fn handle(&self) -> Result<&Sites, Error> {
        self.handle.as_ref().ok_or(Error::Detached)
    }

    /// Grant a user access to this site by email.
    ///
    /// Requires the record to have been fetched through a live [`Sites`]
    /// facade and to carry its self URL.
    pub async fn add_user(&self, email: &str, role: &str) -> Result<(), Error> {
        #[derive(Debug, Serialize)]
        struct AddMemberRequest<'a> {
            site: &'a str,
            email: &'a str,
            role: &'a str,
        }

        let handle = self.handle()?;
        let site_url = self.url.value().ok_or(Error::MissingField { name: "site" })?;
        let url = handle.rest.endpoint("site_users/");
        handle
            .rest
            .post_empty(
                url,
                &AddMemberRequest {
                    site: site_url,
                    email,
                    role,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_record_cannot_add_users() {
        let site = Site {
            name: Field::Value("primary".into()),
            ..Site::default()
        };
        assert!(site.handle().is_err());
    }

    #[test]
    fn serializes_only_present_fields() {
        let site = Site {
            name: Field::Value("primary".into()),
            ..Site::default()
        };
        let payload = serde_json::to_value(&site).unwrap();
        assert_eq!(payload, serde_json::json!({"name": "primary"}));
    }
}
