//! Client for the Hugging Face Inference Endpoints API.
//!
//! Handlers talk to the API only through the [`EndpointsApi`] trait. The
//! production implementation is [`HttpEndpointsClient`]; tests substitute
//! [`crate::testing::MemoryEndpointsApi`].

mod http;
pub mod types;

pub use http::HttpEndpointsClient;
pub use types::{Endpoint, EndpointUpdate, EndpointWithStatus};

use async_trait::async_trait;
use thiserror::Error;

/// Default base URL of the Inference Endpoints API.
pub const DEFAULT_API_URL: &str = "https://api.endpoints.huggingface.cloud";

/// Errors returned by an [`EndpointsApi`] implementation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint or namespace does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status.
    #[error("API returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the API.
        message: String,
    },

    /// The request could not be sent or the response not received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is not usable.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status code behind the error, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }
}

/// Server-side filter of a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Only endpoints carrying all of these tags.
    pub tags: Vec<String>,
}

impl ListFilter {
    /// Filter on the given tags.
    pub fn with_tags(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Operations the provider needs from the Inference Endpoints API.
#[async_trait]
pub trait EndpointsApi: Send + Sync {
    /// List the endpoints of a namespace.
    async fn list_endpoints(
        &self,
        namespace: &str,
        filter: &ListFilter,
    ) -> Result<Vec<EndpointWithStatus>, ApiError>;

    /// Create an endpoint in a namespace.
    async fn create_endpoint(
        &self,
        namespace: &str,
        endpoint: &Endpoint,
    ) -> Result<EndpointWithStatus, ApiError>;

    /// Fetch one endpoint.
    async fn get_endpoint(&self, namespace: &str, name: &str)
        -> Result<EndpointWithStatus, ApiError>;

    /// Apply a partial update to an endpoint.
    async fn update_endpoint(
        &self,
        namespace: &str,
        name: &str,
        update: &EndpointUpdate,
    ) -> Result<EndpointWithStatus, ApiError>;

    /// Delete an endpoint.
    async fn delete_endpoint(&self, namespace: &str, name: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status() {
        assert_eq!(ApiError::NotFound("ns/ep".to_string()).status(), Some(404));
        assert_eq!(
            ApiError::Status {
                status: 503,
                message: "busy".to_string()
            }
            .status(),
            Some(503)
        );
        let err = ApiError::InvalidUrl(url::ParseError::EmptyHost);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_list_filter() {
        let filter = ListFilter::with_tags(["prod", "llm"]);
        assert_eq!(filter.tags, vec!["prod".to_string(), "llm".to_string()]);
        assert!(ListFilter::default().tags.is_empty());
    }
}
