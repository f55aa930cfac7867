//! REST API client for the ChunkyCloud render service.
//!
//! Wraps the job, stats and resource-pack endpoints using [`reqwest`].
//! Job creation takes an already-built multipart form (see
//! [`crate::files::build_form`]).

use bytes::Bytes;
use chunkycloud_core::job::JobState;
use chunkycloud_core::resource_pack::ResourcePack;
use chunkycloud_core::stats::AggregateStats;
use chunkycloud_core::submission::{CreatedJob, API_KEY_HEADER};
use chunkycloud_core::types::JobId;
use reqwest::StatusCode;

use crate::config::{normalize_url, ClientConfig};

/// HTTP client for one render service.
#[derive(Debug, Clone)]
pub struct RenderApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the render service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with an unexpected status code.
    #[error("Render service error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, shown to the user as-is.
        body: String,
    },

    /// The body did not match the expected shape.
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RenderApi {
    /// Create a client from configuration (base URL and request timeout).
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: normalize_url(api_url),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch a job snapshot.
    ///
    /// Sends `GET /jobs/{id}`. A 404 is a definitive answer and comes back
    /// as `Ok(None)`; every other non-200 status is an error.
    pub async fn get_job(&self, id: &JobId) -> Result<Option<JobState>, ApiError> {
        let response = self
            .client
            .get(format!("{}/jobs/{}", self.api_url, id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    /// Fetch fleet statistics (`GET /stats`).
    pub async fn get_stats(&self) -> Result<AggregateStats, ApiError> {
        let response = self
            .client
            .get(format!("{}/stats", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// List the resource packs jobs may render with, in display order.
    pub async fn list_resource_packs(&self) -> Result<Vec<ResourcePack>, ApiError> {
        let response = self
            .client
            .get(format!("{}/resourcepacks", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Create a job.
    ///
    /// Sends `POST /jobs` with the multipart `form` and the `X-Api-Key`
    /// header. Only `201 Created` counts as success; any other status is
    /// reported as [`ApiError::Status`] carrying the raw body text.
    pub async fn create_job(
        &self,
        form: reqwest::multipart::Form,
        api_key: &str,
    ) -> Result<JobId, ApiError> {
        let response = self
            .client
            .post(format!("{}/jobs", self.api_url))
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::CREATED {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedJob = serde_json::from_str(&body)?;
        Ok(created.id)
    }

    /// URL of the latest preview image. Passing the current spp makes the
    /// URL change whenever new samples are merged.
    pub fn preview_url(&self, id: &JobId, spp: Option<u64>) -> String {
        match spp {
            Some(spp) => format!("{}/jobs/{}/latest.png?{}", self.api_url, id, spp),
            None => format!("{}/jobs/{}/latest.png", self.api_url, id),
        }
    }

    /// URL of the latest render dump.
    pub fn dump_url(&self, id: &JobId) -> String {
        format!("{}/jobs/{}/latest.dump", self.api_url, id)
    }

    /// Download the latest preview image.
    ///
    /// No preview yet (404) is a normal state and yields `Ok(None)`.
    pub async fn fetch_preview(&self, id: &JobId, spp: Option<u64>) -> Result<Option<Bytes>, ApiError> {
        let response = self.client.get(self.preview_url(id, spp)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::ensure_success(response).await?;
        Ok(Some(response.bytes().await?))
    }

    /// Download the latest render dump. Callers check
    /// [`JobState::dump_available`] first.
    pub async fn download_dump(&self, id: &JobId) -> Result<Bytes, ApiError> {
        let response = self.client.get(self.dump_url(id)).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> RenderApi {
        RenderApi::with_client(reqwest::Client::new(), "http://render.test/")
    }

    #[test]
    fn preview_url_carries_spp_cache_buster() {
        let id = JobId::new("abc");
        assert_eq!(
            api().preview_url(&id, Some(42)),
            "http://render.test/jobs/abc/latest.png?42"
        );
        assert_eq!(api().preview_url(&id, None), "http://render.test/jobs/abc/latest.png");
    }

    #[test]
    fn dump_url() {
        assert_eq!(
            api().dump_url(&JobId::new("abc")),
            "http://render.test/jobs/abc/latest.dump"
        );
    }

    #[test]
    fn new_uses_configured_url() {
        let api = RenderApi::new(&ClientConfig::default()).unwrap();
        assert_eq!(api.api_url(), crate::config::DEFAULT_API_URL);
    }
}
