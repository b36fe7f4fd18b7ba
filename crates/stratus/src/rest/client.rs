//! Generic HTTP executor for resource endpoints.

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};
use url::Url;

use crate::auth::AuthSession;
use crate::error::Error;

/// Status line and headers of a successful response.
///
/// Most callers only need the decoded body; the log facade reads the
/// pagination token out of a response header.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    fn from_response(response: &reqwest::Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
        }
    }

    /// Returns a response header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Uniform executor for typed CRUD operations against resource endpoints.
///
/// Stateless apart from a handle to the owning [`AuthSession`]; all resource
/// facades share one client. The bearer token is read from the session at
/// call time, so a refreshed token is picked up by the next request.
///
/// The client does not trigger verification and never retries; callers run
/// [`AuthSession::ensure_verified`] first, and a 401 surfacing here is
/// reported as [`Error::UnexpectedStatus`].
#[derive(Debug, Clone)]
pub struct ResourceClient {
    session: AuthSession,
}

impl ResourceClient {
    /// Create a client sharing the given session.
    pub fn new(session: AuthSession) -> Self {
        Self { session }
    }

    /// Returns the owning session.
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Returns the full URL for a path relative to the resource API base.
    pub(crate) fn endpoint(&self, path: &str) -> Url {
        self.session.api().endpoint(path)
    }

    /// Issue a GET and decode the body into `T` (a single record or a
    /// sequence, depending on the target shape).
    ///
    /// # Errors
    ///
    /// 404 is classified as [`Error::NotFound`]; any other non-2xx as
    /// [`Error::UnexpectedStatus`]; a malformed body as [`Error::Decode`].
    #[instrument(skip(self), fields(%url))]
    pub async fn get<T>(&self, url: Url) -> Result<(T, ResponseMeta), Error>
    where
        T: DeserializeOwned,
    {
        debug!("GET");
        let response = self.request(Method::GET, url).await.send().await?;
        let meta = ResponseMeta::from_response(&response);
        trace!(status = %meta.status, "response");

        match meta.status.as_u16() {
            200..=299 => {
                let body = response.json().await?;
                Ok((body, meta))
            }
            404 => Err(Error::NotFound),
            status => Err(Error::UnexpectedStatus { status }),
        }
    }

    /// Issue a POST with a JSON body and decode the 2xx response into `T`.
    ///
    /// Absent fields of `body` are omitted from the payload.
    #[instrument(skip(self, body), fields(%url))]
    pub async fn post<B, T>(&self, url: Url, body: &B) -> Result<T, Error>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("POST");
        let response = self
            .request(Method::POST, url)
            .await
            .json(body)
            .send()
            .await?;
        Self::decoded(response).await
    }

    /// Issue a POST with a JSON body, discarding any response body.
    #[instrument(skip(self, body), fields(%url))]
    pub async fn post_empty<B>(&self, url: Url, body: &B) -> Result<(), Error>
    where
        B: Serialize,
    {
        debug!("POST");
        let response = self
            .request(Method::POST, url)
            .await
            .json(body)
            .send()
            .await?;
        Self::classified(response)
    }

    /// Issue a PATCH with a sparse JSON body, discarding any response body.
    ///
    /// Used exclusively for partial updates. Callers must clear the record's
    /// own URL field before patching so the server does not reject a
    /// self-referential update.
    #[instrument(skip(self, body), fields(%url))]
    pub async fn patch_empty<B>(&self, url: Url, body: &B) -> Result<(), Error>
    where
        B: Serialize,
    {
        debug!("PATCH");
        let response = self
            .request(Method::PATCH, url)
            .await
            .json(body)
            .send()
            .await?;
        Self::classified(response)
    }

    /// Issue a DELETE. Any 2xx is success regardless of body.
    #[instrument(skip(self), fields(%url))]
    pub async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE");
        let response = self.request(Method::DELETE, url).await.send().await?;
        Self::classified(response)
    }

    /// Stream a build artifact to a pre-signed URL.
    ///
    /// PUTs the blob as `application/x-tar` and decodes the `{endpoint}`
    /// response, returning the endpoint string.
    #[instrument(skip(self, blob), fields(%url))]
    pub async fn put_archive(&self, url: Url, blob: reqwest::Body) -> Result<String, Error> {
        #[derive(Debug, serde::Deserialize)]
        struct UploadResponse {
            endpoint: String,
        }

        debug!("PUT archive");
        let response = self
            .request(Method::PUT, url)
            .await
            .header(CONTENT_TYPE, "application/x-tar")
            .header(CONTENT_DISPOSITION, "attachment; filename=blob.tar")
            .body(blob)
            .send()
            .await?;

        let payload: UploadResponse = Self::decoded(response).await?;
        Ok(payload.endpoint)
    }

    /// Start a request with the current bearer token attached.
    async fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let token = self.session.access_token().await;
        self.session.http().request(method, url).bearer_auth(token)
    }

    /// Classify a response and decode its 2xx body.
    async fn decoded<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
        let status = response.status();
        trace!(status = %status, "response");
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            })
        }
    }

    /// Classify a response, ignoring any body.
    fn classified(response: reqwest::Response) -> Result<(), Error> {
        let status = response.status();
        trace!(status = %status, "response");
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            })
        }
    }
}
