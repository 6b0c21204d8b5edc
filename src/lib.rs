//! Hugging Face Provider
//!
//! An infrastructure provider that manages
//! [Hugging Face Inference Endpoints](https://huggingface.co/docs/inference-endpoints)
//! as declarative resources. It follows the resource model of
//! [terraform-plugin-go](https://github.com/hashicorp/terraform-plugin-go):
//! a host drives the provider through plan, create, read, update, delete
//! and import calls, exchanging state as attribute trees.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **`huggingface_endpoint` resource**: full lifecycle of one endpoint
//! - **`huggingface_endpoints` data source**: the endpoints of a namespace
//! - **Schema types**: provider, resource and data source schemas
//! - **Tri-state values**: null, unknown and known attribute values
//! - **API client**: an HTTP client for the Inference Endpoints API behind
//!   the [`client::EndpointsApi`] trait
//! - **Logging**: structured logging with `tracing`, written to stderr
//!
//! # Quick Start
//!
//! ```ignore
//! use huggingface_provider::{HuggingfaceProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     huggingface_provider::init_logging();
//!
//!     let provider = HuggingfaceProvider::new();
//!     provider.configure(json!({"hf_token": "hf_xxx", "api_url": null})).await?;
//!
//!     let state = provider
//!         .read("huggingface_endpoint", json!({"id": "my-org/my-endpoint"}))
//!         .await?;
//!     println!("{}", state["status"]["url"]);
//!     Ok(())
//! }
//! ```
//!
//! # Attribute Values
//!
//! States are `serde_json::Value` trees keyed by schema attribute names.
//! `null` means the attribute is not set and the string
//! [`value::UNKNOWN_VALUE`] marks a value that is not known until apply.
//! Planning fills every computed attribute with the unknown marker on
//! create, and keeps prior computed values on update.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod id;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod service;
pub mod state;
pub mod testing;
pub mod transform;
pub mod types;
pub mod validation;
pub mod value;

// Re-export main types at crate root
pub use error::ProviderError;
pub use id::EndpointId;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::HuggingfaceProvider;
pub use schema::{Diagnostic, Diagnostics, ProviderSchema};
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};
pub use value::{AttrValue, UNKNOWN_VALUE};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
