//! Provider configuration.
//!
//! The provider block takes an API token and an optional API URL. Both fall
//! back to environment variables when left out of the configuration.

use std::fmt;

use serde_json::Value;

use crate::client::DEFAULT_API_URL;
use crate::schema::{Attribute, Diagnostics, Schema};
use crate::value::{decode_object, AttrValue, ObjectReader, ObjectWriter, StateObject};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "HF_TOKEN";

/// Environment variable overriding the API URL.
pub const API_URL_ENV: &str = "HF_ENDPOINTS_API_URL";

/// Schema of the provider block.
pub fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_description("Manage Hugging Face Inference Endpoints.")
        .with_attribute(
            "hf_token",
            Attribute::optional_string().sensitive().with_description(
                "Hugging Face API token. May also be provided via the HF_TOKEN environment variable.",
            ),
        )
        .with_attribute(
            "api_url",
            Attribute::optional_string().with_description(
                "Base URL of the Inference Endpoints API. Defaults to https://api.endpoints.huggingface.cloud.",
            ),
        )
}

#[derive(Debug, Default)]
struct ProviderBlock {
    hf_token: AttrValue<String>,
    api_url: AttrValue<String>,
}

impl StateObject for ProviderBlock {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            hf_token: reader.string("hf_token"),
            api_url: reader.string("api_url"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("hf_token", &self.hf_token);
        writer.leaf("api_url", &self.api_url);
    }
}

/// Resolved provider settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API token sent as a bearer credential.
    pub hf_token: String,
    /// Base URL of the API.
    pub api_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("hf_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve the configuration against the process environment.
    pub fn from_config(config: &Value) -> Result<Self, Diagnostics> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    /// Resolve the configuration, looking up fallbacks with `env`.
    pub fn resolve(config: &Value, env: impl Fn(&str) -> Option<String>) -> Result<Self, Diagnostics> {
        let mut diags = Diagnostics::new();
        let block: ProviderBlock = decode_object(config, &mut diags);

        let hf_token = match block.hf_token {
            AttrValue::Unknown => {
                diags.attribute_error(
                    "hf_token",
                    "Unknown Hugging Face Token",
                    "The provider cannot create the Hugging Face API client as there is an unknown \
                     configuration value for the Hugging Face token. Either target apply the source \
                     of the value first, set the value statically in the configuration, or use the \
                     HF_TOKEN environment variable.",
                );
                None
            },
            AttrValue::Known(token) => Some(token),
            AttrValue::Null => env(TOKEN_ENV),
        };
        let hf_token = hf_token.unwrap_or_default();
        if hf_token.is_empty() && !diags.has_errors() {
            diags.attribute_error(
                "hf_token",
                "Missing Hugging Face Token",
                "The provider cannot create the Hugging Face API client as there is a missing or \
                 empty value for the Hugging Face token. Set the hf_token value in the \
                 configuration or use the HF_TOKEN environment variable.",
            );
        }

        let api_url = match block.api_url {
            AttrValue::Known(url) if !url.is_empty() => url,
            AttrValue::Unknown => {
                diags.attribute_error(
                    "api_url",
                    "Unknown API URL",
                    "api_url must be known when the provider is configured.",
                );
                String::new()
            },
            _ => env(API_URL_ENV)
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };
        if !api_url.is_empty() {
            if let Err(err) = url::Url::parse(&api_url) {
                diags.attribute_error("api_url", "Invalid API URL", format!("{}: {}", api_url, err));
            }
        }

        if diags.has_errors() {
            return Err(diags);
        }
        Ok(Self { hf_token, api_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::UNKNOWN_VALUE;
    use serde_json::json;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn summaries(diags: &Diagnostics) -> Vec<&str> {
        diags.iter().map(|d| d.summary.as_str()).collect()
    }

    #[test]
    fn test_token_from_config() {
        let config = ProviderConfig::resolve(&json!({"hf_token": "hf_abc"}), no_env).expect("valid");
        assert_eq!(config.hf_token, "hf_abc");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_token_from_environment() {
        let env = |key: &str| match key {
            TOKEN_ENV => Some("hf_env".to_string()),
            API_URL_ENV => Some("http://localhost:8080".to_string()),
            _ => None,
        };
        let config = ProviderConfig::resolve(&json!({"hf_token": null}), env).expect("valid");
        assert_eq!(config.hf_token, "hf_env");
        assert_eq!(config.api_url, "http://localhost:8080");
    }

    #[test]
    fn test_config_wins_over_environment() {
        let env = |_: &str| Some("from-env".to_string());
        let config = ProviderConfig::resolve(
            &json!({"hf_token": "hf_cfg", "api_url": "https://example.com"}),
            env,
        )
        .expect("valid");
        assert_eq!(config.hf_token, "hf_cfg");
        assert_eq!(config.api_url, "https://example.com");
    }

    #[test]
    fn test_unknown_token() {
        let diags = ProviderConfig::resolve(&json!({"hf_token": UNKNOWN_VALUE}), no_env).unwrap_err();
        assert_eq!(summaries(&diags), vec!["Unknown Hugging Face Token"]);
    }

    #[test]
    fn test_missing_token() {
        let diags = ProviderConfig::resolve(&json!({}), no_env).unwrap_err();
        assert_eq!(summaries(&diags), vec!["Missing Hugging Face Token"]);

        let diags = ProviderConfig::resolve(&json!({"hf_token": ""}), no_env).unwrap_err();
        let diag = diags.iter().next().expect("diagnostic");
        assert_eq!(diag.attribute.as_deref(), Some("hf_token"));
    }

    #[test]
    fn test_invalid_api_url() {
        let diags = ProviderConfig::resolve(
            &json!({"hf_token": "hf_abc", "api_url": "not a url"}),
            no_env,
        )
        .unwrap_err();
        assert_eq!(summaries(&diags), vec!["Invalid API URL"]);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig {
            hf_token: "hf_secret".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        };
        assert!(!format!("{:?}", config).contains("hf_secret"));
    }
}
