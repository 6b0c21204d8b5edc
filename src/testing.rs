//! Testing utilities for the provider.
//!
//! [`ProviderTester`] drives any [`ProviderService`] in-process, the way a
//! host would. [`MemoryEndpointsApi`] stands in for the remote API so the
//! whole lifecycle can run without network access.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use huggingface_provider::testing::{MemoryEndpointsApi, ProviderTester};
//! use huggingface_provider::HuggingfaceProvider;
//!
//! #[tokio::test]
//! async fn test_create_endpoint() {
//!     let api = Arc::new(MemoryEndpointsApi::new());
//!     let tester = ProviderTester::new(HuggingfaceProvider::with_client(api));
//!
//!     let state = tester.lifecycle_create("huggingface_endpoint", config()).await.unwrap();
//!     assert_eq!(state["id"], "ns1/ep1");
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::client::types::{EndpointType, PrivateEndpointStatus, Status, User};
use crate::client::{ApiError, Endpoint, EndpointUpdate, EndpointWithStatus, EndpointsApi, ListFilter};
use crate::error::ProviderError;
use crate::id::EndpointId;
use crate::schema::{Diagnostic, Diagnostics, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// A test harness for provider implementations.
///
/// This wraps a `ProviderService` implementation and provides simplified
/// methods for driving it without a plugin host.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration, failing on any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a new resource.
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run plan → create → read and return the state after read.
    pub async fn lifecycle_create(&self, resource_type: &str, config: Value) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// Run plan → update → read and return the state after read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read(resource_type, updated).await
    }

    /// Run plan → delete.
    pub async fn lifecycle_delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Diagnostics),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    writeln!(f, "  [{:?}] {}", diag.severity, diag)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(Diagnostics::from(errors)))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan creates the resource in place.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(!plan.requires_replace, "Expected plan to create, not replace");
}

/// Assert that a plan has no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changed_paths().collect::<Vec<_>>()
    );
}

/// Assert that a plan changes `path` and updates in place.
///
/// # Panics
///
/// Panics if the path is not changed or the plan requires replacement.
pub fn assert_plan_updates_attribute(plan: &PlanResult, path: &str) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
    assert!(
        plan.changed_paths().any(|p| p == path),
        "Expected plan to change attribute '{}'. Changed attributes: {:?}",
        path,
        plan.changed_paths().collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.summary.contains(substring)),
        "Expected an error containing '{}'. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

// =========================================================================
// In-memory API
// =========================================================================

/// An [`EndpointsApi`] that keeps endpoints in memory.
///
/// Behaves like the remote API where the provider can observe it: creation
/// assigns a compute id and a status, unknown endpoints answer 404, and an
/// existing name answers 409.
#[derive(Debug, Default)]
pub struct MemoryEndpointsApi {
    endpoints: Mutex<BTreeMap<(String, String), EndpointWithStatus>>,
    updates: Mutex<Vec<EndpointUpdate>>,
}

impl MemoryEndpointsApi {
    /// Create an empty API.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an endpoint as if it had been created out of band.
    pub async fn insert(&self, namespace: &str, endpoint: EndpointWithStatus) {
        let key = (namespace.to_string(), endpoint.endpoint.name.clone());
        self.endpoints.lock().await.insert(key, endpoint);
    }

    /// Fetch a stored endpoint.
    pub async fn get(&self, namespace: &str, name: &str) -> Option<EndpointWithStatus> {
        self.endpoints
            .lock()
            .await
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Number of stored endpoints.
    pub async fn len(&self) -> usize {
        self.endpoints.lock().await.len()
    }

    /// Whether no endpoint is stored.
    pub async fn is_empty(&self) -> bool {
        self.endpoints.lock().await.is_empty()
    }

    /// Every patch received by `update_endpoint`, oldest first.
    pub async fn updates(&self) -> Vec<EndpointUpdate> {
        self.updates.lock().await.clone()
    }
}

fn not_found(namespace: &str, name: &str) -> ApiError {
    ApiError::NotFound(EndpointId::new(namespace, name).to_string())
}

fn new_status(namespace: &str, endpoint: &Endpoint) -> Status {
    let now = Utc::now();
    let user = User {
        id: format!("user-{}", namespace),
        name: namespace.to_string(),
    };
    let replicas = endpoint.compute.scaling.min_replica.max(1);
    Status {
        created_at: now,
        created_by: user.clone(),
        updated_at: now,
        updated_by: user,
        state: "running".to_string(),
        message: "Endpoint is running".to_string(),
        ready_replica: replicas,
        target_replica: replicas,
        error_message: None,
        url: match endpoint.endpoint_type {
            EndpointType::Private => None,
            _ => Some(format!("https://{}.endpoints.huggingface.cloud", endpoint.name)),
        },
        private: endpoint.private_service.as_ref().map(|_| PrivateEndpointStatus {
            service_name: Some(format!("com.amazonaws.vpce.{}", endpoint.name)),
        }),
    }
}

fn apply_update(endpoint: &mut Endpoint, update: &EndpointUpdate) {
    if let Some(endpoint_type) = update.endpoint_type {
        endpoint.endpoint_type = endpoint_type;
    }
    if let Some(compute) = &update.compute {
        if let Some(accelerator) = compute.accelerator {
            endpoint.compute.accelerator = accelerator;
        }
        if let Some(instance_type) = &compute.instance_type {
            endpoint.compute.instance_type = instance_type.clone();
        }
        if let Some(instance_size) = &compute.instance_size {
            endpoint.compute.instance_size = instance_size.clone();
        }
        if let Some(scaling) = &compute.scaling {
            let target = &mut endpoint.compute.scaling;
            if let Some(min_replica) = scaling.min_replica {
                target.min_replica = min_replica;
            }
            if let Some(max_replica) = scaling.max_replica {
                target.max_replica = max_replica;
            }
            if scaling.scale_to_zero_timeout.is_some() {
                target.scale_to_zero_timeout = scaling.scale_to_zero_timeout;
            }
            if scaling.metric.is_some() {
                target.metric = scaling.metric;
            }
            if scaling.threshold.is_some() {
                target.threshold = scaling.threshold;
            }
            if scaling.measure.is_some() {
                target.measure = scaling.measure.clone();
            }
        }
    }
    if let Some(model) = &update.model {
        if let Some(repository) = &model.repository {
            endpoint.model.repository = repository.clone();
        }
        if let Some(framework) = &model.framework {
            endpoint.model.framework = framework.clone();
        }
        if let Some(task) = &model.task {
            endpoint.model.task = task.clone();
        }
        if model.image.is_some() {
            endpoint.model.image = model.image.clone();
        }
    }
    if update.tags.is_some() {
        endpoint.tags = update.tags.clone();
    }
    if update.cache_http_responses.is_some() {
        endpoint.cache_http_responses = update.cache_http_responses;
    }
    if update.experimental_features.is_some() {
        endpoint.experimental_features = update.experimental_features.clone();
    }
    if let Some(route) = &update.route {
        // An empty route removes the custom domain.
        endpoint.route = Some(route.clone()).filter(|r| !r.domain.is_empty() || !r.path.is_empty());
    }
}

#[async_trait]
impl EndpointsApi for MemoryEndpointsApi {
    async fn list_endpoints(
        &self,
        namespace: &str,
        filter: &ListFilter,
    ) -> Result<Vec<EndpointWithStatus>, ApiError> {
        let endpoints = self.endpoints.lock().await;
        Ok(endpoints
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, endpoint)| endpoint)
            .filter(|endpoint| {
                let tags = endpoint.endpoint.tags.as_deref().unwrap_or_default();
                filter.tags.iter().all(|tag| tags.contains(tag))
            })
            .cloned()
            .collect())
    }

    async fn create_endpoint(
        &self,
        namespace: &str,
        endpoint: &Endpoint,
    ) -> Result<EndpointWithStatus, ApiError> {
        let mut endpoints = self.endpoints.lock().await;
        let key = (namespace.to_string(), endpoint.name.clone());
        if endpoints.contains_key(&key) {
            return Err(ApiError::Status {
                status: 409,
                message: format!("endpoint {} already exists", endpoint.name),
            });
        }

        let mut stored = endpoint.clone();
        if stored.compute.id.is_none() {
            stored.compute.id = Some(format!(
                "{}-{}-{}-{}",
                stored.provider.vendor,
                stored.provider.region,
                stored.compute.instance_type,
                stored.compute.instance_size
            ));
        }
        let created = EndpointWithStatus {
            status: new_status(namespace, &stored),
            endpoint: stored,
        };
        endpoints.insert(key, created.clone());
        Ok(created)
    }

    async fn get_endpoint(&self, namespace: &str, name: &str) -> Result<EndpointWithStatus, ApiError> {
        self.get(namespace, name)
            .await
            .ok_or_else(|| not_found(namespace, name))
    }

    async fn update_endpoint(
        &self,
        namespace: &str,
        name: &str,
        update: &EndpointUpdate,
    ) -> Result<EndpointWithStatus, ApiError> {
        let mut endpoints = self.endpoints.lock().await;
        let stored = endpoints
            .get_mut(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| not_found(namespace, name))?;

        apply_update(&mut stored.endpoint, update);
        stored.status.updated_at = Utc::now();
        self.updates.lock().await.push(update.clone());
        Ok(stored.clone())
    }

    async fn delete_endpoint(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        self.endpoints
            .lock()
            .await
            .remove(&(namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| not_found(namespace, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{
        Accelerator, CloudProvider, Compute, ComputeUpdate, Model, Scaling, ScalingUpdate,
    };

    fn endpoint(name: &str, tags: &[&str]) -> Endpoint {
        Endpoint {
            name: name.to_string(),
            endpoint_type: EndpointType::Protected,
            provider: CloudProvider {
                vendor: "aws".to_string(),
                region: "us-east-1".to_string(),
            },
            compute: Compute {
                id: None,
                accelerator: Accelerator::Gpu,
                instance_type: "nvidia-t4".to_string(),
                instance_size: "x1".to_string(),
                scaling: Scaling {
                    min_replica: 0,
                    max_replica: 1,
                    scale_to_zero_timeout: None,
                    metric: None,
                    threshold: None,
                    measure: None,
                },
            },
            model: Model {
                repository: "openai-community/gpt2".to_string(),
                framework: "pytorch".to_string(),
                task: "text-generation".to_string(),
                image: None,
            },
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            cache_http_responses: None,
            experimental_features: None,
            private_service: None,
            route: None,
        }
    }

    #[tokio::test]
    async fn test_memory_api_create_assigns_computed_fields() {
        let api = MemoryEndpointsApi::new();
        let created = api
            .create_endpoint("ns1", &endpoint("ep1", &[]))
            .await
            .expect("created");

        assert_eq!(
            created.endpoint.compute.id.as_deref(),
            Some("aws-us-east-1-nvidia-t4-x1")
        );
        assert_eq!(created.status.state, "running");
        assert!(created.status.url.is_some());

        let err = api
            .create_endpoint("ns1", &endpoint("ep1", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn test_memory_api_missing_endpoint_is_not_found() {
        let api = MemoryEndpointsApi::new();
        assert_eq!(api.get_endpoint("ns1", "ep1").await.unwrap_err().status(), Some(404));
        assert_eq!(api.delete_endpoint("ns1", "ep1").await.unwrap_err().status(), Some(404));
        let err = api
            .update_endpoint("ns1", "ep1", &EndpointUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_api_update_patches_known_fields() {
        let api = MemoryEndpointsApi::new();
        api.create_endpoint("ns1", &endpoint("ep1", &["dev"]))
            .await
            .expect("created");

        let update = EndpointUpdate {
            compute: Some(ComputeUpdate {
                scaling: Some(ScalingUpdate {
                    max_replica: Some(4),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let updated = api
            .update_endpoint("ns1", "ep1", &update)
            .await
            .expect("updated");

        assert_eq!(updated.endpoint.compute.scaling.max_replica, 4);
        assert_eq!(updated.endpoint.compute.scaling.min_replica, 0);
        assert_eq!(updated.endpoint.tags, Some(vec!["dev".to_string()]));
        assert_eq!(api.updates().await, vec![update]);
    }

    #[tokio::test]
    async fn test_memory_api_list_filters() {
        let api = MemoryEndpointsApi::new();
        for (ns, name, tags) in [
            ("ns1", "a", vec!["prod", "llm"]),
            ("ns1", "b", vec!["dev"]),
            ("ns2", "c", vec!["prod"]),
        ] {
            api.create_endpoint(ns, &endpoint(name, &tags))
                .await
                .expect("created");
        }

        let all = api
            .list_endpoints("ns1", &ListFilter::default())
            .await
            .expect("listed");
        assert_eq!(all.len(), 2);

        let prod = api
            .list_endpoints("ns1", &ListFilter::with_tags(["prod"]))
            .await
            .expect("listed");
        let names: Vec<_> = prod.iter().map(|e| e.endpoint.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(api.len().await, 3);
    }

    #[test]
    fn test_assert_error_contains() {
        let diagnostics = vec![Diagnostic::error("Invalid configuration value")];
        assert_error_contains(&diagnostics, "Invalid");
        assert_error_contains(&diagnostics, "configuration");
    }

    #[test]
    #[should_panic(expected = "Expected an error containing")]
    fn test_assert_error_contains_fails() {
        let diagnostics = vec![Diagnostic::warning("Invalid, but only a warning")];
        assert_error_contains(&diagnostics, "Invalid");
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(Diagnostics::from(vec![
            Diagnostic::error("First error").with_attribute("field1"),
            Diagnostic::error("Second error").with_detail("More info"),
        ]));

        let display = format!("{}", err);
        assert!(display.contains("First error"));
        assert!(display.contains("Second error"));
        assert!(display.contains("field1"));
        assert!(display.contains("More info"));
    }
}
