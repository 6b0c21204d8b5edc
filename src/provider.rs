//! The Hugging Face provider: configuration and dispatch by resource type.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::client::{EndpointsApi, HttpEndpointsClient};
use crate::config::{provider_config_schema, ProviderConfig};
use crate::data_sources::endpoints::{self, EndpointsDataSource, DATA_SOURCE_TYPE};
use crate::error::ProviderError;
use crate::resources::endpoint::{self, EndpointResource, RESOURCE_TYPE};
use crate::schema::{Diagnostic, Diagnostics, ProviderSchema};
use crate::service::ProviderService;
use crate::state::EndpointState;
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation::validate;
use crate::value::decode_object;

/// Provider type name.
pub const PROVIDER_TYPE: &str = "huggingface";

/// Full schema of the provider.
pub fn provider_schema() -> ProviderSchema {
    ProviderSchema::new()
        .with_provider_config(provider_config_schema())
        .with_resource(RESOURCE_TYPE, endpoint::schema())
        .with_data_source(DATA_SOURCE_TYPE, endpoints::schema())
}

/// Provider for Hugging Face Inference Endpoints.
///
/// The API client is created by [`ProviderService::configure`]; every
/// resource or data source call before that fails with
/// [`ProviderError::Configuration`].
#[derive(Default)]
pub struct HuggingfaceProvider {
    client: RwLock<Option<Arc<dyn EndpointsApi>>>,
}

impl HuggingfaceProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that uses `client` instead of configuring one.
    pub fn with_client(client: Arc<dyn EndpointsApi>) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    /// Whether a client is available.
    pub async fn is_configured(&self) -> bool {
        self.client.read().await.is_some()
    }

    async fn api(&self) -> Result<Arc<dyn EndpointsApi>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "the provider must be configured before managing endpoints".to_string(),
            )
        })
    }

    async fn endpoint_resource(&self) -> Result<EndpointResource, ProviderError> {
        Ok(EndpointResource::new(self.api().await?))
    }
}

fn check_resource_type(resource_type: &str) -> Result<(), ProviderError> {
    if resource_type == RESOURCE_TYPE {
        Ok(())
    } else {
        Err(ProviderError::UnknownResource(resource_type.to_string()))
    }
}

fn check_data_source_type(data_source_type: &str) -> Result<(), ProviderError> {
    if data_source_type == DATA_SOURCE_TYPE {
        Ok(())
    } else {
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderService for HuggingfaceProvider {
    fn schema(&self) -> ProviderSchema {
        provider_schema()
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE.to_string(),
            resources: vec![RESOURCE_TYPE.to_string()],
            data_sources: vec![DATA_SOURCE_TYPE.to_string()],
        }
    }

    #[instrument(skip(self, config), name = "provider.validate_config")]
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&provider_config_schema(), &config).into_vec())
    }

    #[instrument(skip(self, config), name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let settings = match ProviderConfig::from_config(&config) {
            Ok(settings) => settings,
            Err(diags) => {
                error!(diagnostics = diags.len(), "Configure failed");
                return Ok(diags.into_vec());
            },
        };

        let client = HttpEndpointsClient::new(&settings.api_url, settings.hf_token).map_err(|e| {
            ProviderError::Configuration(format!("Unable to create Hugging Face API client: {}", e))
        })?;
        *self.client.write().await = Some(Arc::new(client));

        info!(api_url = %settings.api_url, "Configure completed successfully");
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Stop called");
        Ok(())
    }

    #[instrument(skip(self, config), name = "provider.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        check_resource_type(resource_type)?;
        let mut diags = validate(&endpoint::schema(), &config);
        // Catches conflicting image variants, which the schema cannot express.
        let _: EndpointState = decode_object(&config, &mut diags);
        Ok(diags.into_vec())
    }

    #[instrument(skip(self, prior_state, proposed_state, _config), name = "provider.plan")]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        check_resource_type(resource_type)?;
        debug!(resource_type = %resource_type, is_create = prior_state.is_none(), "Plan called");

        let result = EndpointResource::plan(prior_state, proposed_state);
        match &result {
            Ok(plan) => info!(
                resource_type = %resource_type,
                changes = plan.changes.len(),
                deferred = plan.changes.iter().filter(|c| c.is_deferred()).count(),
                requires_replace = plan.requires_replace,
                "Plan completed"
            ),
            Err(e) => error!(resource_type = %resource_type, error = %e, "Plan failed"),
        }
        result
    }

    #[instrument(skip(self, planned_state), name = "provider.create")]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        check_resource_type(resource_type)?;
        self.endpoint_resource()
            .await?
            .create(planned_state)
            .await
            .inspect_err(|e| error!(resource_type = %resource_type, error = %e, "Create failed"))
    }

    #[instrument(skip(self, current_state), name = "provider.read")]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        check_resource_type(resource_type)?;
        self.endpoint_resource()
            .await?
            .read(current_state)
            .await
            .inspect_err(|e| error!(resource_type = %resource_type, error = %e, "Read failed"))
    }

    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        check_resource_type(resource_type)?;
        self.endpoint_resource()
            .await?
            .update(prior_state, planned_state)
            .await
            .inspect_err(|e| error!(resource_type = %resource_type, error = %e, "Update failed"))
    }

    #[instrument(skip(self, current_state), name = "provider.delete")]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        check_resource_type(resource_type)?;
        self.endpoint_resource()
            .await?
            .delete(current_state)
            .await
            .inspect_err(|e| error!(resource_type = %resource_type, error = %e, "Delete failed"))
    }

    #[instrument(skip(self), name = "provider.import")]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        check_resource_type(resource_type)?;
        self.endpoint_resource()
            .await?
            .import(id)
            .await
            .inspect_err(|e| error!(resource_type = %resource_type, error = %e, "Import failed"))
    }

    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        check_data_source_type(data_source_type)?;
        Ok(validate(&endpoints::schema(), &config).into_vec())
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        check_data_source_type(data_source_type)?;
        EndpointsDataSource::new(self.api().await?)
            .read(config)
            .await
            .inspect_err(|e| error!(data_source_type = %data_source_type, error = %e, "ReadDataSource failed"))
    }
}

/// Render a failed operation as host-facing diagnostics.
pub fn error_diagnostics(operation: &str, err: &ProviderError) -> Diagnostics {
    err.to_diagnostics(&format!("{} failed", operation))
}
