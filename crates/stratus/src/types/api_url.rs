//! Validated API base URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::Error;

/// A validated base URL for the resource or identity API.
///
/// The URL must be absolute, use HTTPS (HTTP is allowed for localhost only),
/// and is normalized with a trailing slash so that relative endpoint paths
/// join underneath it.
///
/// # Example
///
/// ```
/// use stratus::ApiUrl;
///
/// let api = ApiUrl::new("https://api.stratus.run").unwrap();
/// assert_eq!(api.endpoint("sites/find/").as_str(),
///            "https://api.stratus.run/sites/find/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the string is not an absolute
    /// HTTPS (or localhost HTTP) URL.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let mut url = Url::parse(s).map_err(|e| Error::InvalidUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: a trailing slash makes Url::join treat the final
        // path segment as a directory.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint path relative to the base.
    ///
    /// `path` must be relative (no leading slash); an empty path yields the
    /// API root.
    pub fn endpoint(&self, path: &str) -> Url {
        self.0
            .join(path)
            .expect("relative endpoint path joins onto a validated base")
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            });
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "::1");

        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(Error::InvalidUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            });
        }

        if url.host_str().is_none() {
            return Err(Error::InvalidUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://api.stratus.run").unwrap();
        assert_eq!(api.host(), Some("api.stratus.run"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://localhost:8000").unwrap();
        assert_eq!(api.host(), Some("localhost"));
    }

    #[test]
    fn endpoint_joins_relative_paths() {
        let api = ApiUrl::new("https://api.stratus.run").unwrap();
        assert_eq!(
            api.endpoint("services/find/").as_str(),
            "https://api.stratus.run/services/find/"
        );
    }

    #[test]
    fn endpoint_preserves_base_path() {
        let api = ApiUrl::new("https://api.stratus.run/v2").unwrap();
        assert_eq!(
            api.endpoint("sites/").as_str(),
            "https://api.stratus.run/v2/sites/"
        );
    }

    #[test]
    fn empty_path_is_the_api_root() {
        let api = ApiUrl::new("https://api.stratus.run").unwrap();
        assert_eq!(api.endpoint("").as_str(), "https://api.stratus.run/");
    }

    #[test]
    fn query_pairs_append_onto_endpoint() {
        let api = ApiUrl::new("https://api.stratus.run").unwrap();
        let mut url = api.endpoint("sites/find/");
        url.query_pairs_mut().append_pair("name", "primary");
        assert_eq!(
            url.as_str(),
            "https://api.stratus.run/sites/find/?name=primary"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://api.stratus.run").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/sites/").is_err());
    }
}
