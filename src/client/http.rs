//! `reqwest` implementation of [`EndpointsApi`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{Endpoint, EndpointList, EndpointUpdate, EndpointWithStatus};
use super::{ApiError, EndpointsApi, ListFilter};

/// Maximum length of a response body included in logs and errors.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body and drop control characters before logging it.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Client for the Inference Endpoints REST API.
///
/// One request per call: no retries and no pagination.
#[derive(Clone)]
pub struct HttpEndpointsClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpEndpointsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEndpointsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpEndpointsClient {
    /// Create a client for the API at `base_url`, authenticating with `token`.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let client = Client::builder()
            .user_agent(concat!("huggingface-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn namespace_url(&self, namespace: &str) -> String {
        format!(
            "{}/v2/endpoint/{}",
            self.base_url,
            urlencoding::encode(namespace)
        )
    }

    fn endpoint_url(&self, namespace: &str, name: &str) -> String {
        format!(
            "{}/{}",
            self.namespace_url(namespace),
            urlencoding::encode(name)
        )
    }

    async fn send(&self, request: RequestBuilder, target: &str) -> Result<String, ApiError> {
        let response = request.bearer_auth(&self.token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        tracing::error!(
            status = status.as_u16(),
            body = %sanitize_for_log(&body),
            "API error"
        );
        Err(classify(status, target, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: &str,
    ) -> Result<T, ApiError> {
        let body = self.send(request, target).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn classify(status: StatusCode, target: &str, body: &str) -> ApiError {
    let message = error_message(body);
    if status == StatusCode::NOT_FOUND {
        let detail = if message.is_empty() {
            target.to_string()
        } else {
            format!("{}: {}", target, message)
        };
        return ApiError::NotFound(detail);
    }
    ApiError::Status {
        status: status.as_u16(),
        message: if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            message
        },
    }
}

// The API reports errors as `{"error": "..."}`; anything else is passed on
// as (truncated) text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| sanitize_for_log(body.trim()))
}

#[async_trait]
impl EndpointsApi for HttpEndpointsClient {
    async fn list_endpoints(
        &self,
        namespace: &str,
        filter: &ListFilter,
    ) -> Result<Vec<EndpointWithStatus>, ApiError> {
        let url = self.namespace_url(namespace);
        tracing::debug!("GET {}", url);

        let query: Vec<(&str, &str)> = filter.tags.iter().map(|t| ("tag", t.as_str())).collect();
        let list: EndpointList = self
            .send_json(self.client.get(&url).query(&query), namespace)
            .await?;
        Ok(list.items)
    }

    async fn create_endpoint(
        &self,
        namespace: &str,
        endpoint: &Endpoint,
    ) -> Result<EndpointWithStatus, ApiError> {
        let url = self.namespace_url(namespace);
        tracing::debug!("POST {}", url);

        let target = format!("{}/{}", namespace, endpoint.name);
        self.send_json(self.client.post(&url).json(endpoint), &target)
            .await
    }

    async fn get_endpoint(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<EndpointWithStatus, ApiError> {
        let url = self.endpoint_url(namespace, name);
        tracing::debug!("GET {}", url);

        let target = format!("{}/{}", namespace, name);
        self.send_json(self.client.get(&url), &target).await
    }

    async fn update_endpoint(
        &self,
        namespace: &str,
        name: &str,
        update: &EndpointUpdate,
    ) -> Result<EndpointWithStatus, ApiError> {
        let url = self.endpoint_url(namespace, name);
        tracing::debug!("PUT {}", url);

        let target = format!("{}/{}", namespace, name);
        self.send_json(self.client.put(&url).json(update), &target)
            .await
    }

    async fn delete_endpoint(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let url = self.endpoint_url(namespace, name);
        tracing::debug!("DELETE {}", url);

        let target = format!("{}/{}", namespace, name);
        self.send(self.client.delete(&url), &target).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_for_log_truncates() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
        assert_eq!(sanitize_for_log("line\nbreak"), "linebreak");
    }

    #[test]
    fn test_urls_encode_segments() {
        let client = HttpEndpointsClient::new("https://api.example.com/", "token").expect("client");
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(
            client.endpoint_url("my org", "ep/1"),
            "https://api.example.com/v2/endpoint/my%20org/ep%2F1"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpEndpointsClient::new("not a url", "token"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        let err = classify(StatusCode::NOT_FOUND, "ns/ep", r#"{"error":"Endpoint not found"}"#);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "ns/ep: Endpoint not found"));

        let err = classify(StatusCode::BAD_REQUEST, "ns/ep", "");
        assert!(matches!(
            err,
            ApiError::Status { status: 400, ref message } if message == "Bad Request"
        ));
    }
}
