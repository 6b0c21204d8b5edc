//! The `huggingface_endpoint` resource.
//!
//! Every handler follows the same shape: decode the attribute tree, convert
//! it to an API request, make exactly one API call, map the response back
//! and stamp the identity (`namespace` and the composite `id`) onto it.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::client::{EndpointWithStatus, EndpointsApi};
use crate::error::ProviderError;
use crate::id::EndpointId;
use crate::plan::{diff, keep_prior_computed, mark_computed_unknown};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, Diagnostics, NestedBlock, Schema};
use crate::state::EndpointState;
use crate::transform::{private_service_to_remote, to_local, to_remote, to_remote_update};
use crate::types::{ImportedResource, PlanResult};
use crate::value::{decode_object, encode_object, unknown, AttrValue};

/// Resource type name.
pub const RESOURCE_TYPE: &str = "huggingface_endpoint";

/// Schema of the endpoint resource.
pub fn schema() -> Schema {
    let mut schema = Schema::v0().with_description("A Hugging Face Inference Endpoint.");
    schema.block = endpoint_block();
    schema
}

/// The endpoint attribute tree, shared with the endpoints data source.
pub fn endpoint_block() -> Block {
    Block::new()
        .with_description("A Hugging Face Inference Endpoint.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("Identifier of the form <namespace>/<name>."),
        )
        .with_attribute(
            "namespace",
            Attribute::required_string().with_description("User or organization owning the endpoint."),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("Endpoint name, unique within the namespace."),
        )
        .with_attribute(
            "type",
            Attribute::required_string()
                .with_description("Access level: public, protected, private or authenticated."),
        )
        .with_attribute(
            "tags",
            Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::optional_computed(),
            ),
        )
        .with_attribute("cache_http_responses", Attribute::optional_computed_bool())
        .with_block(
            "cloud_provider",
            NestedBlock::required(
                Block::new()
                    .with_attribute("vendor", Attribute::required_string())
                    .with_attribute("region", Attribute::required_string()),
            ),
        )
        .with_block("compute", NestedBlock::required(compute_block()))
        .with_block("model", NestedBlock::required(model_block()))
        .with_block(
            "experimental_features",
            NestedBlock::optional_computed(
                Block::new()
                    .with_attribute("cache_http_responses", Attribute::optional_computed_bool())
                    .with_block(
                        "kv_router",
                        NestedBlock::optional_computed(
                            Block::new().with_attribute("tag", Attribute::optional_computed_string()),
                        ),
                    ),
            ),
        )
        .with_block(
            "private_service",
            NestedBlock::optional_computed(
                Block::new()
                    .with_attribute(
                        "account_id",
                        Attribute::required_string()
                            .with_description("Cloud account allowed to reach the endpoint privately."),
                    )
                    .with_attribute("shared", Attribute::optional_computed_bool()),
            ),
        )
        .with_block(
            "route",
            NestedBlock::optional_computed(
                Block::new()
                    .with_attribute("domain", Attribute::optional_computed_string())
                    .with_attribute("path", Attribute::optional_computed_string()),
            ),
        )
        .with_block("status", NestedBlock::computed(status_block()))
}

fn compute_block() -> Block {
    let measure = Block::new()
        .with_attribute("hardware_usage", Attribute::optional_float64())
        .with_attribute("pending_requests", Attribute::optional_float64());

    let scaling = Block::new()
        .with_attribute("min_replica", Attribute::optional_computed_int64())
        .with_attribute("max_replica", Attribute::optional_computed_int64())
        .with_attribute("scale_to_zero_timeout", Attribute::optional_computed_int64())
        .with_attribute(
            "metric",
            Attribute::optional_computed_string()
                .with_description("Autoscaling metric: hardwareUsage or pendingRequests."),
        )
        .with_attribute("threshold", Attribute::optional_computed_float64())
        .with_block("measure", NestedBlock::optional_computed(measure));

    Block::new()
        .with_attribute("id", Attribute::optional_computed_string())
        .with_attribute(
            "accelerator",
            Attribute::required_string().with_description("Accelerator kind: cpu, gpu or neuron."),
        )
        .with_attribute("instance_type", Attribute::required_string())
        .with_attribute("instance_size", Attribute::required_string())
        .with_block("scaling", NestedBlock::required(scaling))
}

fn model_block() -> Block {
    Block::new()
        .with_attribute("repository", Attribute::required_string())
        .with_attribute("framework", Attribute::required_string())
        .with_attribute("task", Attribute::required_string())
        .with_block(
            "image",
            NestedBlock::optional_computed(
                image_block().with_description("Serving image. At most one variant may be set."),
            ),
        )
}

fn server_image(extra: Block) -> Block {
    extra
        .with_attribute("health_route", Attribute::optional_string())
        .with_attribute("port", Attribute::optional_int64())
        .with_attribute("url", Attribute::required_string())
}

fn image_block() -> Block {
    let tgi_limits = || {
        Block::new()
            .with_attribute("max_batch_prefill_tokens", Attribute::optional_int64())
            .with_attribute("max_batch_total_tokens", Attribute::optional_int64())
            .with_attribute("max_input_length", Attribute::optional_int64())
            .with_attribute("max_total_tokens", Attribute::optional_int64())
    };

    Block::new()
        .with_block("huggingface", NestedBlock::optional(Block::new()))
        .with_block(
            "huggingface_neuron",
            NestedBlock::optional(
                Block::new()
                    .with_attribute("batch_size", Attribute::optional_int64())
                    .with_attribute("neuron_cache", Attribute::optional_string())
                    .with_attribute("sequence_length", Attribute::optional_int64()),
            ),
        )
        .with_block(
            "tgi",
            NestedBlock::optional(server_image(
                tgi_limits()
                    .with_attribute("disable_custom_kernels", Attribute::optional_bool())
                    .with_attribute("quantize", Attribute::optional_string()),
            )),
        )
        .with_block(
            "tgi_neuron",
            NestedBlock::optional(server_image(
                tgi_limits()
                    .with_attribute("hf_auto_cast_type", Attribute::optional_string())
                    .with_attribute("hf_num_cores", Attribute::optional_int64()),
            )),
        )
        .with_block(
            "tei",
            NestedBlock::optional(server_image(
                Block::new()
                    .with_attribute("max_batch_tokens", Attribute::optional_int64())
                    .with_attribute("max_concurrent_requests", Attribute::optional_int64())
                    .with_attribute("pooling", Attribute::optional_string()),
            )),
        )
        .with_block(
            "llamacpp",
            NestedBlock::optional(server_image(
                Block::new()
                    .with_attribute("ctx_size", Attribute::required_int64())
                    .with_attribute("mode", Attribute::optional_string())
                    .with_attribute("model_path", Attribute::required_string())
                    .with_attribute("n_gpu_layers", Attribute::optional_int64())
                    .with_attribute("n_parallel", Attribute::required_int64())
                    .with_attribute("pooling", Attribute::optional_string())
                    .with_attribute("threads_http", Attribute::required_int64())
                    .with_attribute("variant", Attribute::optional_string()),
            )),
        )
        .with_block(
            "custom",
            NestedBlock::optional(server_image(Block::new().with_block(
                "credentials",
                NestedBlock::optional(
                    Block::new()
                        .with_attribute("username", Attribute::required_string())
                        .with_attribute("password", Attribute::optional_string().sensitive()),
                ),
            ))),
        )
}

fn status_block() -> Block {
    let user = || {
        Block::new()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
    };

    Block::new()
        .with_attribute("created_at", Attribute::computed_string())
        .with_attribute("updated_at", Attribute::computed_string())
        .with_attribute("state", Attribute::computed_string())
        .with_attribute("message", Attribute::computed_string())
        .with_attribute("ready_replica", Attribute::computed_int64())
        .with_attribute("target_replica", Attribute::computed_int64())
        .with_attribute("error_message", Attribute::computed_string())
        .with_attribute("url", Attribute::computed_string())
        .with_block("created_by", NestedBlock::computed(user()))
        .with_block("updated_by", NestedBlock::computed(user()))
        .with_block(
            "private",
            NestedBlock::computed(Block::new().with_attribute("service_name", Attribute::computed_string())),
        )
}

/// Set `namespace` and the composite `id` on freshly mapped state.
pub fn with_identity(mut state: EndpointState, namespace: &str) -> EndpointState {
    let name = state.name.known_cloned().unwrap_or_default();
    state.namespace = AttrValue::known(namespace);
    state.id = AttrValue::Known(EndpointId::new(namespace, name).to_string());
    state
}

/// Resolve which endpoint a state refers to.
///
/// A known composite `id` wins; otherwise `namespace` and `name` are used.
pub fn resolve_id(state: &EndpointState) -> Result<EndpointId, ProviderError> {
    if let Some(id) = state.id.as_known().filter(|id| !id.is_empty()) {
        return id.parse();
    }
    match (state.namespace.as_known(), state.name.as_known()) {
        (Some(namespace), Some(name)) if !namespace.is_empty() && !name.is_empty() => {
            Ok(EndpointId::new(namespace.clone(), name.clone()))
        },
        _ => Err(ProviderError::Validation(
            "endpoint state has neither an id nor a known namespace and name".to_string(),
        )),
    }
}

fn decode_state(value: &Value) -> Result<EndpointState, ProviderError> {
    let mut diags = Diagnostics::new();
    let state = decode_object(value, &mut diags);
    ProviderError::check(diags)?;
    Ok(state)
}

fn convert<T>(f: impl FnOnce(&mut Diagnostics) -> Option<T>) -> Result<T, ProviderError> {
    let mut diags = Diagnostics::new();
    match f(&mut diags) {
        Some(value) if !diags.has_errors() => Ok(value),
        _ => Err(ProviderError::Conversion(diags)),
    }
}

fn local_state(remote: &EndpointWithStatus, namespace: &str) -> Value {
    encode_object(&with_identity(to_local(remote), namespace))
}

/// Handlers of the endpoint resource, bound to an API client.
pub struct EndpointResource {
    api: Arc<dyn EndpointsApi>,
}

impl EndpointResource {
    /// Bind the handlers to a client.
    pub fn new(api: Arc<dyn EndpointsApi>) -> Self {
        Self { api }
    }

    /// Compute the plan for a create, update or delete.
    ///
    /// Endpoints are always updated in place. Changing `namespace`, `name`
    /// or `private_service` of an existing endpoint is rejected.
    pub fn plan(prior: Option<Value>, proposed: Value) -> Result<PlanResult, ProviderError> {
        let block = endpoint_block();

        if proposed.is_null() {
            let prior = prior.unwrap_or(Value::Null);
            let changes = diff(&prior, &Value::Null);
            return Ok(PlanResult::with_changes(Value::Null, changes, false));
        }

        let proposed_state = decode_state(&proposed)?;
        let mut planned = proposed;

        let Some(prior) = prior.filter(|p| !p.is_null()) else {
            mark_computed_unknown(&block, &mut planned);
            let changes = diff(&Value::Null, &planned);
            return Ok(PlanResult::with_changes(planned, changes, false));
        };

        let prior_state = decode_state(&prior)?;
        for (attr, before, after) in [
            ("namespace", &prior_state.namespace, &proposed_state.namespace),
            ("name", &prior_state.name, &proposed_state.name),
        ] {
            if before.is_known() && after.is_known() && before != after {
                return Err(ProviderError::Validation(format!(
                    "{} cannot be changed on an existing endpoint",
                    attr
                )));
            }
        }

        keep_prior_computed(&block, &prior, &mut planned);
        let planned_state = decode_state(&planned)?;
        if planned_state.private_service.is_known()
            && private_service_to_remote(&planned_state.private_service)
                != private_service_to_remote(&prior_state.private_service)
        {
            return Err(ProviderError::Validation(
                "private_service cannot be changed on an existing endpoint".to_string(),
            ));
        }

        let changes = diff(&prior, &planned);
        if changes.is_empty() {
            return Ok(PlanResult::no_change(planned));
        }

        if let Some(obj) = planned.as_object_mut() {
            obj.insert("status".to_string(), unknown());
        }
        Ok(PlanResult::with_changes(planned, changes, false))
    }

    /// Create the endpoint described by the planned state.
    #[instrument(skip(self, planned), name = "endpoint.create")]
    pub async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let state = decode_state(&planned)?;
        let namespace = state
            .namespace
            .known_cloned()
            .filter(|ns| !ns.is_empty())
            .ok_or_else(|| {
                ProviderError::Validation("namespace must be known to create an endpoint".to_string())
            })?;
        let body = convert(|diags| to_remote(&state, diags))?;

        debug!(namespace = %namespace, name = %body.name, "Creating endpoint");
        let created = self
            .api
            .create_endpoint(&namespace, &body)
            .await
            .map_err(|e| ProviderError::remote("create endpoint", e))?;

        info!(namespace = %namespace, name = %created.endpoint.name, "Endpoint created");
        Ok(local_state(&created, &namespace))
    }

    /// Refresh the state from the API.
    #[instrument(skip(self, current), name = "endpoint.read")]
    pub async fn read(&self, current: Value) -> Result<Value, ProviderError> {
        let state = decode_state(&current)?;
        let id = resolve_id(&state)?;

        debug!(id = %id, "Reading endpoint");
        let remote = self
            .api
            .get_endpoint(&id.namespace, &id.name)
            .await
            .map_err(|e| ProviderError::remote("read endpoint", e))?;

        Ok(local_state(&remote, &id.namespace))
    }

    /// Patch the endpoint with every known value of the planned state.
    #[instrument(skip(self, prior, planned), name = "endpoint.update")]
    pub async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let planned_state = decode_state(&planned)?;
        let prior_state = decode_state(&prior)?;
        let id = resolve_id(&prior_state).or_else(|_| resolve_id(&planned_state))?;
        let patch = convert(|diags| to_remote_update(&planned_state, diags))?;

        debug!(id = %id, "Updating endpoint");
        let updated = self
            .api
            .update_endpoint(&id.namespace, &id.name, &patch)
            .await
            .map_err(|e| ProviderError::remote("update endpoint", e))?;

        info!(id = %id, "Endpoint updated");
        Ok(local_state(&updated, &id.namespace))
    }

    /// Delete the endpoint.
    #[instrument(skip(self, current), name = "endpoint.delete")]
    pub async fn delete(&self, current: Value) -> Result<(), ProviderError> {
        let state = decode_state(&current)?;
        let id = resolve_id(&state)?;

        self.api
            .delete_endpoint(&id.namespace, &id.name)
            .await
            .map_err(|e| ProviderError::remote("delete endpoint", e))?;

        info!(id = %id, "Endpoint deleted");
        Ok(())
    }

    /// Import an existing endpoint by its composite id.
    #[instrument(skip(self), name = "endpoint.import")]
    pub async fn import(&self, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
        let id: EndpointId = id.parse()?;
        let remote = self
            .api
            .get_endpoint(&id.namespace, &id.name)
            .await
            .map_err(|e| ProviderError::remote("import endpoint", e))?;

        info!(id = %id, "Endpoint imported");
        Ok(vec![ImportedResource::new(
            RESOURCE_TYPE,
            local_state(&remote, &id.namespace),
        )])
    }
}
