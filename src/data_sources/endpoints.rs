//! The `huggingface_endpoints` data source: every endpoint of a namespace.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::{EndpointsApi, ListFilter};
use crate::error::ProviderError;
use crate::resources::endpoint::{endpoint_block, with_identity};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostics, NestedBlock, Schema};
use crate::state::EndpointsDataSourceState;
use crate::transform::to_local;
use crate::value::{decode_object, encode_object, AttrValue};

/// Data source type name.
pub const DATA_SOURCE_TYPE: &str = "huggingface_endpoints";

/// Schema of the endpoints data source.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Lists the Inference Endpoints of a namespace.")
        .with_attribute(
            "namespace",
            Attribute::required_string().with_description("User or organization to list."),
        )
        .with_attribute(
            "tags",
            Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::optional(),
            )
            .with_description("Only list endpoints carrying all of these tags."),
        )
        .with_block(
            "endpoints",
            NestedBlock::list(endpoint_block().into_computed(), AttributeFlags::computed()),
        )
}

/// Reader of the endpoints data source, bound to an API client.
pub struct EndpointsDataSource {
    api: Arc<dyn EndpointsApi>,
}

impl EndpointsDataSource {
    /// Bind the reader to a client.
    pub fn new(api: Arc<dyn EndpointsApi>) -> Self {
        Self { api }
    }

    /// List the endpoints selected by the configuration.
    #[instrument(skip(self, config), name = "endpoints.read")]
    pub async fn read(&self, config: Value) -> Result<Value, ProviderError> {
        let mut diags = Diagnostics::new();
        let state: EndpointsDataSourceState = decode_object(&config, &mut diags);
        ProviderError::check(diags)?;

        let namespace = state
            .namespace
            .known_cloned()
            .filter(|ns| !ns.is_empty())
            .ok_or_else(|| ProviderError::Validation("namespace must be set".to_string()))?;
        let filter = ListFilter::with_tags(state.tags.known_cloned().unwrap_or_default());

        debug!(namespace = %namespace, tags = ?filter.tags, "Listing endpoints");
        let remote = self
            .api
            .list_endpoints(&namespace, &filter)
            .await
            .map_err(|e| ProviderError::remote("list endpoints", e))?;

        let endpoints = remote
            .iter()
            .map(|endpoint| with_identity(to_local(endpoint), &namespace))
            .collect::<Vec<_>>();

        debug!(namespace = %namespace, count = endpoints.len(), "Listed endpoints");
        Ok(encode_object(&EndpointsDataSourceState {
            namespace: AttrValue::Known(namespace),
            tags: state.tags,
            endpoints: AttrValue::Known(endpoints),
        }))
    }
}
