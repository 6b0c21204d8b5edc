//! Error types for the Hugging Face provider.

use thiserror::Error;

use crate::client::ApiError;
use crate::schema::{Diagnostic, Diagnostics};

/// Errors that can occur while serving a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested endpoint was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A composite endpoint id could not be parsed.
    #[error("Invalid endpoint id: {0}")]
    InvalidId(String),

    /// One or more fields could not be converted between local and remote form.
    #[error("Conversion failed: {0}")]
    Conversion(Diagnostics),

    /// Resource already exists (create conflict).
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Permission denied (authentication/authorization failure).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Quota or rate limit exceeded.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Service temporarily unavailable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The API rejected the request for another reason.
    #[error("Remote error: {0}")]
    Remote(String),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Get the error message as a string.
    ///
    /// Returns a reference to the error message for any variant that
    /// carries one.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::InvalidId(msg) => msg,
            Self::Conversion(_diags) => "conversion error (see diagnostics)",
            Self::AlreadyExists(msg) => msg,
            Self::PermissionDenied(msg) => msg,
            Self::ResourceExhausted(msg) => msg,
            Self::Unavailable(msg) => msg,
            Self::Remote(msg) => msg,
            Self::Unimplemented(msg) => msg,
        }
    }

    /// Classify a client error raised while performing `operation`.
    ///
    /// The message names the operation and carries the client's error text.
    pub fn remote(operation: &str, err: ApiError) -> Self {
        let message = format!("Could not {}: {}", operation, err);
        match err.status() {
            Some(404) => Self::NotFound(message),
            Some(401) | Some(403) => Self::PermissionDenied(message),
            Some(409) => Self::AlreadyExists(message),
            Some(429) => Self::ResourceExhausted(message),
            Some(status) if status >= 500 => Self::Unavailable(message),
            _ => Self::Remote(message),
        }
    }

    /// Fail with [`ProviderError::Conversion`] if `diags` holds any error.
    pub fn check(diags: Diagnostics) -> Result<Diagnostics, Self> {
        if diags.has_errors() {
            Err(Self::Conversion(diags))
        } else {
            Ok(diags)
        }
    }

    /// Whether this error means the endpoint does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Render the error as diagnostics for the host.
    ///
    /// Conversion errors keep their per-field diagnostics; every other
    /// error becomes a single diagnostic carrying its display text.
    pub fn to_diagnostics(&self, summary: &str) -> Diagnostics {
        match self {
            Self::Conversion(diags) => diags.clone(),
            other => Diagnostics::from(vec![Diagnostic::error(summary).with_detail(other.to_string())]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("resource-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: resource-123");

        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");

        let err = ProviderError::UnknownResource("custom_resource".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: custom_resource");

        let err = ProviderError::InvalidId("ns".to_string());
        assert_eq!(format!("{}", err), "Invalid endpoint id: ns");
    }

    #[test]
    fn test_remote_classification() {
        let err = ProviderError::remote("read endpoint", ApiError::NotFound("ns/ep".to_string()));
        assert!(err.is_not_found());
        assert_eq!(err.message(), "Could not read endpoint: not found: ns/ep");

        let status = |status: u16| ApiError::Status {
            status,
            message: "boom".to_string(),
        };
        assert!(matches!(
            ProviderError::remote("create endpoint", status(401)),
            ProviderError::PermissionDenied(_)
        ));
        assert!(matches!(
            ProviderError::remote("create endpoint", status(403)),
            ProviderError::PermissionDenied(_)
        ));
        assert!(matches!(
            ProviderError::remote("create endpoint", status(409)),
            ProviderError::AlreadyExists(_)
        ));
        assert!(matches!(
            ProviderError::remote("create endpoint", status(429)),
            ProviderError::ResourceExhausted(_)
        ));
        assert!(matches!(
            ProviderError::remote("create endpoint", status(502)),
            ProviderError::Unavailable(_)
        ));
        let err = ProviderError::remote("create endpoint", status(400));
        assert!(matches!(err, ProviderError::Remote(_)));
        assert_eq!(
            err.message(),
            "Could not create endpoint: API returned status 400: boom"
        );
    }

    #[test]
    fn test_conversion_is_distinct_from_not_found() {
        let mut diags = Diagnostics::new();
        diags.attribute_error("compute.accelerator", "Invalid value", "tpu");

        let err = ProviderError::check(diags).unwrap_err();
        assert!(!err.is_not_found());
        let rendered = err.to_diagnostics("Error creating endpoint");
        assert_eq!(rendered.len(), 1);
        assert_eq!(
            rendered.iter().next().and_then(|d| d.attribute.clone()),
            Some("compute.accelerator".to_string())
        );
    }

    #[test]
    fn test_to_diagnostics_wraps_message() {
        let err = ProviderError::Configuration("no token".to_string());
        let diags = err.to_diagnostics("Error configuring provider");
        let diag = diags.iter().next().expect("one diagnostic");
        assert_eq!(diag.summary, "Error configuring provider");
        assert_eq!(diag.detail.as_deref(), Some("Configuration error: no token"));
    }

    #[test]
    fn test_check_passes_warnings() {
        let diags = Diagnostics::from(vec![Diagnostic::warning("deprecated")]);
        let kept = ProviderError::check(diags).expect("warnings are not errors");
        assert_eq!(kept.len(), 1);
    }
}
