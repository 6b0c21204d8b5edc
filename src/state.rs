//! Typed local state of the endpoint resource and data source.
//!
//! Each struct mirrors one nested object of the resource schema and knows
//! how to read itself from and write itself to the attribute tree. Leaves
//! are [`AttrValue`]s so that null, unknown and known values survive the
//! trip through the typed model.
//!
//! The model image is held as a single tagged [`ImageVariantState`]. The
//! attribute tree still exposes one key per variant, so encoding renders
//! every inactive variant as a placeholder: an object whose leaves are all
//! null, or plain `null` for `huggingface` and `huggingface_neuron`. Those
//! two need no settings, so an empty object selects them.

use crate::value::{
    encode_object, has_known_leaf, is_unknown, AttrValue, ObjectReader, ObjectWriter, StateObject,
};
use serde_json::Value;

/// Attribute key of each image variant, in schema order.
pub const IMAGE_VARIANT_KEYS: [&str; 7] = [
    "huggingface",
    "huggingface_neuron",
    "tgi",
    "tgi_neuron",
    "tei",
    "llamacpp",
    "custom",
];

/// State of a `huggingface_endpoint` resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointState {
    /// Composite id, `<namespace>/<name>`.
    pub id: AttrValue<String>,
    /// Namespace (user or organisation) owning the endpoint.
    pub namespace: AttrValue<String>,
    /// Endpoint name.
    pub name: AttrValue<String>,
    /// Access level, stored under the `type` key.
    pub endpoint_type: AttrValue<String>,
    /// Vendor and region.
    pub cloud_provider: AttrValue<CloudProviderState>,
    /// Instance and autoscaling settings.
    pub compute: AttrValue<ComputeState>,
    /// Served model.
    pub model: AttrValue<ModelState>,
    /// Free-form labels.
    pub tags: AttrValue<Vec<String>>,
    /// Top-level response caching flag.
    pub cache_http_responses: AttrValue<bool>,
    /// Opt-in features.
    pub experimental_features: AttrValue<ExperimentalFeaturesState>,
    /// Private networking. Fixed after creation.
    pub private_service: AttrValue<PrivateServiceState>,
    /// Custom domain and path.
    pub route: AttrValue<RouteState>,
    /// Status reported by the API.
    pub status: AttrValue<StatusState>,
}

impl StateObject for EndpointState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            id: reader.string("id"),
            namespace: reader.string("namespace"),
            name: reader.string("name"),
            endpoint_type: reader.string("type"),
            cloud_provider: reader.object("cloud_provider"),
            compute: reader.object("compute"),
            model: reader.object("model"),
            tags: reader.string_list("tags"),
            cache_http_responses: reader.bool("cache_http_responses"),
            experimental_features: reader.object("experimental_features"),
            private_service: reader.object("private_service"),
            route: reader.object("route"),
            status: reader.object("status"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("id", &self.id);
        writer.leaf("namespace", &self.namespace);
        writer.leaf("name", &self.name);
        writer.leaf("type", &self.endpoint_type);
        writer.object("cloud_provider", &self.cloud_provider);
        writer.object("compute", &self.compute);
        writer.object("model", &self.model);
        writer.leaf("tags", &self.tags);
        writer.leaf("cache_http_responses", &self.cache_http_responses);
        writer.object("experimental_features", &self.experimental_features);
        writer.object("private_service", &self.private_service);
        writer.object("route", &self.route);
        writer.object("status", &self.status);
    }
}

/// Vendor and region of an endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CloudProviderState {
    /// Vendor name.
    pub vendor: AttrValue<String>,
    /// Vendor region.
    pub region: AttrValue<String>,
}

impl StateObject for CloudProviderState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            vendor: reader.string("vendor"),
            region: reader.string("region"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("vendor", &self.vendor);
        writer.leaf("region", &self.region);
    }
}

/// Instance selection and autoscaling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputeState {
    /// Identifier assigned by the API.
    pub id: AttrValue<String>,
    /// Accelerator family, one of the wire values.
    pub accelerator: AttrValue<String>,
    /// Instance type.
    pub instance_type: AttrValue<String>,
    /// Instance size.
    pub instance_size: AttrValue<String>,
    /// Autoscaling policy.
    pub scaling: AttrValue<ScalingState>,
}

impl StateObject for ComputeState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            id: reader.string("id"),
            accelerator: reader.string("accelerator"),
            instance_type: reader.string("instance_type"),
            instance_size: reader.string("instance_size"),
            scaling: reader.object("scaling"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("id", &self.id);
        writer.leaf("accelerator", &self.accelerator);
        writer.leaf("instance_type", &self.instance_type);
        writer.leaf("instance_size", &self.instance_size);
        writer.object("scaling", &self.scaling);
    }
}

/// Autoscaling policy. Absent knobs stay null.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalingState {
    /// Lower replica bound.
    pub min_replica: AttrValue<i64>,
    /// Upper replica bound.
    pub max_replica: AttrValue<i64>,
    /// Idle minutes before scaling to zero.
    pub scale_to_zero_timeout: AttrValue<i64>,
    /// Metric driving autoscaling.
    pub metric: AttrValue<String>,
    /// Metric value that triggers scaling.
    pub threshold: AttrValue<f64>,
    /// Measured metric values.
    pub measure: AttrValue<ScalingMeasureState>,
}

impl StateObject for ScalingState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            min_replica: reader.int("min_replica"),
            max_replica: reader.int("max_replica"),
            scale_to_zero_timeout: reader.int("scale_to_zero_timeout"),
            metric: reader.string("metric"),
            threshold: reader.float("threshold"),
            measure: reader.object("measure"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("min_replica", &self.min_replica);
        writer.leaf("max_replica", &self.max_replica);
        writer.leaf("scale_to_zero_timeout", &self.scale_to_zero_timeout);
        writer.leaf("metric", &self.metric);
        writer.leaf("threshold", &self.threshold);
        writer.object("measure", &self.measure);
    }
}

/// Measured values of the scaling metrics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalingMeasureState {
    /// Hardware utilisation.
    pub hardware_usage: AttrValue<f64>,
    /// Queued requests.
    pub pending_requests: AttrValue<f64>,
}

impl StateObject for ScalingMeasureState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            hardware_usage: reader.float("hardware_usage"),
            pending_requests: reader.float("pending_requests"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("hardware_usage", &self.hardware_usage);
        writer.leaf("pending_requests", &self.pending_requests);
    }
}

/// Model repository and serving container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelState {
    /// Hub repository.
    pub repository: AttrValue<String>,
    /// Framework.
    pub framework: AttrValue<String>,
    /// Task.
    pub task: AttrValue<String>,
    /// Serving container.
    pub image: AttrValue<ModelImageState>,
}

impl StateObject for ModelState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            repository: reader.string("repository"),
            framework: reader.string("framework"),
            task: reader.string("task"),
            image: reader.object("image"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("repository", &self.repository);
        writer.leaf("framework", &self.framework);
        writer.leaf("task", &self.task);
        writer.object("image", &self.image);
    }
}

/// The container image of a model: at most one active variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelImageState {
    /// The chosen variant, `None` when the API picks the image.
    pub variant: Option<ImageVariantState>,
}

impl ModelImageState {
    /// An image with the given active variant.
    pub fn with_variant(variant: ImageVariantState) -> Self {
        Self {
            variant: Some(variant),
        }
    }
}

/// One image variant and its settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageVariantState {
    /// Default container. Takes no settings.
    Huggingface,
    /// Default container on Neuron accelerators.
    HuggingfaceNeuron(HuggingfaceNeuronState),
    /// Text Generation Inference.
    Tgi(TgiState),
    /// Text Generation Inference on Neuron.
    TgiNeuron(TgiNeuronState),
    /// Text Embeddings Inference.
    Tei(TeiState),
    /// llama.cpp server.
    LlamaCpp(LlamaCppState),
    /// Any container from a registry.
    Custom(CustomImageState),
}

impl ImageVariantState {
    /// Attribute key of the variant.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Huggingface => "huggingface",
            Self::HuggingfaceNeuron(_) => "huggingface_neuron",
            Self::Tgi(_) => "tgi",
            Self::TgiNeuron(_) => "tgi_neuron",
            Self::Tei(_) => "tei",
            Self::LlamaCpp(_) => "llamacpp",
            Self::Custom(_) => "custom",
        }
    }
}

impl StateObject for ModelImageState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        let active: Vec<&str> = IMAGE_VARIANT_KEYS
            .iter()
            .copied()
            .filter(|key| branch_is_active(key, reader.raw(key)))
            .collect();

        if active.len() > 1 {
            reader.object_error(
                "Conflicting image configuration",
                format!(
                    "only one image variant may be set, found: {}",
                    active.join(", ")
                ),
            );
            return Self::default();
        }

        let variant = match active.first().copied() {
            None => None,
            Some("huggingface") => Some(ImageVariantState::Huggingface),
            Some("huggingface_neuron") => reader
                .object("huggingface_neuron")
                .into_known()
                .map(ImageVariantState::HuggingfaceNeuron),
            Some("tgi") => reader.object("tgi").into_known().map(ImageVariantState::Tgi),
            Some("tgi_neuron") => reader
                .object("tgi_neuron")
                .into_known()
                .map(ImageVariantState::TgiNeuron),
            Some("tei") => reader.object("tei").into_known().map(ImageVariantState::Tei),
            Some("llamacpp") => reader
                .object("llamacpp")
                .into_known()
                .map(ImageVariantState::LlamaCpp),
            Some(_) => reader
                .object("custom")
                .into_known()
                .map(ImageVariantState::Custom),
        };

        Self { variant }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        use ImageVariantState as V;

        writer.value(
            "huggingface",
            match &self.variant {
                Some(V::Huggingface) => Value::Object(Default::default()),
                _ => Value::Null,
            },
        );
        writer.value(
            "huggingface_neuron",
            match &self.variant {
                Some(V::HuggingfaceNeuron(state)) => encode_object(state),
                _ => Value::Null,
            },
        );
        writer.value(
            "tgi",
            match &self.variant {
                Some(V::Tgi(state)) => encode_object(state),
                _ => encode_object(&TgiState::default()),
            },
        );
        writer.value(
            "tgi_neuron",
            match &self.variant {
                Some(V::TgiNeuron(state)) => encode_object(state),
                _ => encode_object(&TgiNeuronState::default()),
            },
        );
        writer.value(
            "tei",
            match &self.variant {
                Some(V::Tei(state)) => encode_object(state),
                _ => encode_object(&TeiState::default()),
            },
        );
        writer.value(
            "llamacpp",
            match &self.variant {
                Some(V::LlamaCpp(state)) => encode_object(state),
                _ => encode_object(&LlamaCppState::default()),
            },
        );
        writer.value(
            "custom",
            match &self.variant {
                Some(V::Custom(state)) => encode_object(state),
                _ => encode_object(&CustomImageState::default()),
            },
        );
    }
}

// A placeholder has no known leaf, so any known leaf marks the branch the
// user (or the remote) actually chose. The variants with no required
// settings render their placeholder as null and are active whenever they
// are a known object.
fn branch_is_active(key: &str, raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => false,
        Some(value) if is_unknown(value) => false,
        Some(value) if matches!(key, "huggingface" | "huggingface_neuron") => value.is_object(),
        Some(value) => has_known_leaf(value),
    }
}

/// Settings of the default Neuron container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HuggingfaceNeuronState {
    /// Compiled batch size.
    pub batch_size: AttrValue<i64>,
    /// Repository of precompiled artifacts.
    pub neuron_cache: AttrValue<String>,
    /// Compiled sequence length.
    pub sequence_length: AttrValue<i64>,
}

impl StateObject for HuggingfaceNeuronState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            batch_size: reader.int("batch_size"),
            neuron_cache: reader.string("neuron_cache"),
            sequence_length: reader.int("sequence_length"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("batch_size", &self.batch_size);
        writer.leaf("neuron_cache", &self.neuron_cache);
        writer.leaf("sequence_length", &self.sequence_length);
    }
}

/// Text Generation Inference settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TgiState {
    /// Path probed for readiness.
    pub health_route: AttrValue<String>,
    /// Port the server listens on.
    pub port: AttrValue<i64>,
    /// Container image reference.
    pub url: AttrValue<String>,
    /// Token budget of the prefill step.
    pub max_batch_prefill_tokens: AttrValue<i64>,
    /// Token budget of a batch.
    pub max_batch_total_tokens: AttrValue<i64>,
    /// Longest accepted prompt.
    pub max_input_length: AttrValue<i64>,
    /// Longest prompt plus completion.
    pub max_total_tokens: AttrValue<i64>,
    /// Fall back to the stock kernels.
    pub disable_custom_kernels: AttrValue<bool>,
    /// Quantization scheme.
    pub quantize: AttrValue<String>,
}

impl StateObject for TgiState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            health_route: reader.string("health_route"),
            port: reader.int("port"),
            url: reader.string("url"),
            max_batch_prefill_tokens: reader.int("max_batch_prefill_tokens"),
            max_batch_total_tokens: reader.int("max_batch_total_tokens"),
            max_input_length: reader.int("max_input_length"),
            max_total_tokens: reader.int("max_total_tokens"),
            disable_custom_kernels: reader.bool("disable_custom_kernels"),
            quantize: reader.string("quantize"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("health_route", &self.health_route);
        writer.leaf("port", &self.port);
        writer.leaf("url", &self.url);
        writer.leaf("max_batch_prefill_tokens", &self.max_batch_prefill_tokens);
        writer.leaf("max_batch_total_tokens", &self.max_batch_total_tokens);
        writer.leaf("max_input_length", &self.max_input_length);
        writer.leaf("max_total_tokens", &self.max_total_tokens);
        writer.leaf("disable_custom_kernels", &self.disable_custom_kernels);
        writer.leaf("quantize", &self.quantize);
    }
}

/// Text Generation Inference settings for Neuron accelerators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TgiNeuronState {
    /// Path probed for readiness.
    pub health_route: AttrValue<String>,
    /// Port the server listens on.
    pub port: AttrValue<i64>,
    /// Container image reference.
    pub url: AttrValue<String>,
    /// Token budget of the prefill step.
    pub max_batch_prefill_tokens: AttrValue<i64>,
    /// Token budget of a batch.
    pub max_batch_total_tokens: AttrValue<i64>,
    /// Longest accepted prompt.
    pub max_input_length: AttrValue<i64>,
    /// Longest prompt plus completion.
    pub max_total_tokens: AttrValue<i64>,
    /// Precision the weights are cast to.
    pub hf_auto_cast_type: AttrValue<String>,
    /// Neuron cores per replica.
    pub hf_num_cores: AttrValue<i64>,
}

impl StateObject for TgiNeuronState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            health_route: reader.string("health_route"),
            port: reader.int("port"),
            url: reader.string("url"),
            max_batch_prefill_tokens: reader.int("max_batch_prefill_tokens"),
            max_batch_total_tokens: reader.int("max_batch_total_tokens"),
            max_input_length: reader.int("max_input_length"),
            max_total_tokens: reader.int("max_total_tokens"),
            hf_auto_cast_type: reader.string("hf_auto_cast_type"),
            hf_num_cores: reader.int("hf_num_cores"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("health_route", &self.health_route);
        writer.leaf("port", &self.port);
        writer.leaf("url", &self.url);
        writer.leaf("max_batch_prefill_tokens", &self.max_batch_prefill_tokens);
        writer.leaf("max_batch_total_tokens", &self.max_batch_total_tokens);
        writer.leaf("max_input_length", &self.max_input_length);
        writer.leaf("max_total_tokens", &self.max_total_tokens);
        writer.leaf("hf_auto_cast_type", &self.hf_auto_cast_type);
        writer.leaf("hf_num_cores", &self.hf_num_cores);
    }
}

/// Text Embeddings Inference settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeiState {
    /// Path probed for readiness.
    pub health_route: AttrValue<String>,
    /// Port the server listens on.
    pub port: AttrValue<i64>,
    /// Container image reference.
    pub url: AttrValue<String>,
    /// Token budget of one batch.
    pub max_batch_tokens: AttrValue<i64>,
    /// Requests served at once.
    pub max_concurrent_requests: AttrValue<i64>,
    /// Pooling method.
    pub pooling: AttrValue<String>,
}

impl StateObject for TeiState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            health_route: reader.string("health_route"),
            port: reader.int("port"),
            url: reader.string("url"),
            max_batch_tokens: reader.int("max_batch_tokens"),
            max_concurrent_requests: reader.int("max_concurrent_requests"),
            pooling: reader.string("pooling"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("health_route", &self.health_route);
        writer.leaf("port", &self.port);
        writer.leaf("url", &self.url);
        writer.leaf("max_batch_tokens", &self.max_batch_tokens);
        writer.leaf("max_concurrent_requests", &self.max_concurrent_requests);
        writer.leaf("pooling", &self.pooling);
    }
}

/// llama.cpp server settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LlamaCppState {
    /// Path probed for readiness.
    pub health_route: AttrValue<String>,
    /// Port the server listens on.
    pub port: AttrValue<i64>,
    /// Container image reference.
    pub url: AttrValue<String>,
    /// Context size in tokens.
    pub ctx_size: AttrValue<i64>,
    /// Server mode.
    pub mode: AttrValue<String>,
    /// GGUF file inside the repository.
    pub model_path: AttrValue<String>,
    /// Layers offloaded to the GPU.
    pub n_gpu_layers: AttrValue<i64>,
    /// Parallel decoding slots.
    pub n_parallel: AttrValue<i64>,
    /// Pooling method for embeddings.
    pub pooling: AttrValue<String>,
    /// HTTP worker threads.
    pub threads_http: AttrValue<i64>,
    /// Build variant of the server.
    pub variant: AttrValue<String>,
}

impl StateObject for LlamaCppState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            health_route: reader.string("health_route"),
            port: reader.int("port"),
            url: reader.string("url"),
            ctx_size: reader.int("ctx_size"),
            mode: reader.string("mode"),
            model_path: reader.string("model_path"),
            n_gpu_layers: reader.int("n_gpu_layers"),
            n_parallel: reader.int("n_parallel"),
            pooling: reader.string("pooling"),
            threads_http: reader.int("threads_http"),
            variant: reader.string("variant"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("health_route", &self.health_route);
        writer.leaf("port", &self.port);
        writer.leaf("url", &self.url);
        writer.leaf("ctx_size", &self.ctx_size);
        writer.leaf("mode", &self.mode);
        writer.leaf("model_path", &self.model_path);
        writer.leaf("n_gpu_layers", &self.n_gpu_layers);
        writer.leaf("n_parallel", &self.n_parallel);
        writer.leaf("pooling", &self.pooling);
        writer.leaf("threads_http", &self.threads_http);
        writer.leaf("variant", &self.variant);
    }
}

/// A container pulled from any registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomImageState {
    /// Path probed for readiness.
    pub health_route: AttrValue<String>,
    /// Port the server listens on.
    pub port: AttrValue<i64>,
    /// Container image reference.
    pub url: AttrValue<String>,
    /// Registry login.
    pub credentials: AttrValue<CredentialsState>,
}

impl StateObject for CustomImageState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            health_route: reader.string("health_route"),
            port: reader.int("port"),
            url: reader.string("url"),
            credentials: reader.object("credentials"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("health_route", &self.health_route);
        writer.leaf("port", &self.port);
        writer.leaf("url", &self.url);
        writer.object("credentials", &self.credentials);
    }
}

/// Registry login of a custom image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CredentialsState {
    /// Registry user.
    pub username: AttrValue<String>,
    /// Registry password. Sensitive.
    pub password: AttrValue<String>,
}

impl StateObject for CredentialsState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            username: reader.string("username"),
            password: reader.string("password"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("username", &self.username);
        writer.leaf("password", &self.password);
    }
}

/// Opt-in features.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExperimentalFeaturesState {
    /// Whether responses may be cached.
    pub cache_http_responses: AttrValue<bool>,
    /// Cache-aware routing. An empty tag turns it off.
    pub kv_router: AttrValue<KvRouterState>,
}

impl StateObject for ExperimentalFeaturesState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            cache_http_responses: reader.bool("cache_http_responses"),
            kv_router: reader.object("kv_router"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("cache_http_responses", &self.cache_http_responses);
        writer.object("kv_router", &self.kv_router);
    }
}

/// Cache-aware request routing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KvRouterState {
    /// Router release.
    pub tag: AttrValue<String>,
}

impl StateObject for KvRouterState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            tag: reader.string("tag"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("tag", &self.tag);
    }
}

/// Private networking of an endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrivateServiceState {
    /// Cloud account allowed to connect. Empty means none.
    pub account_id: AttrValue<String>,
    /// Whether other accounts of the organisation may connect.
    pub shared: AttrValue<bool>,
}

impl StateObject for PrivateServiceState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            account_id: reader.string("account_id"),
            shared: reader.bool("shared"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("account_id", &self.account_id);
        writer.leaf("shared", &self.shared);
    }
}

/// Custom domain and path. Both empty means none.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteState {
    /// Domain name.
    pub domain: AttrValue<String>,
    /// Path prefix.
    pub path: AttrValue<String>,
}

impl StateObject for RouteState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            domain: reader.string("domain"),
            path: reader.string("path"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("domain", &self.domain);
        writer.leaf("path", &self.path);
    }
}

/// Provider-reported status of an endpoint. Never set by the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusState {
    /// Creation time, RFC 3339.
    pub created_at: AttrValue<String>,
    /// Creator.
    pub created_by: AttrValue<UserState>,
    /// Last change time, RFC 3339.
    pub updated_at: AttrValue<String>,
    /// Last user to change the endpoint.
    pub updated_by: AttrValue<UserState>,
    /// Lifecycle state.
    pub state: AttrValue<String>,
    /// Detail of `state`.
    pub message: AttrValue<String>,
    /// Replicas serving traffic.
    pub ready_replica: AttrValue<i64>,
    /// Replicas the autoscaler aims for.
    pub target_replica: AttrValue<i64>,
    /// Failure reason, empty when healthy.
    pub error_message: AttrValue<String>,
    /// Public URL, empty for private endpoints.
    pub url: AttrValue<String>,
    /// Private link details.
    pub private: AttrValue<PrivateStatusState>,
}

impl StateObject for StatusState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            created_at: reader.string("created_at"),
            created_by: reader.object("created_by"),
            updated_at: reader.string("updated_at"),
            updated_by: reader.object("updated_by"),
            state: reader.string("state"),
            message: reader.string("message"),
            ready_replica: reader.int("ready_replica"),
            target_replica: reader.int("target_replica"),
            error_message: reader.string("error_message"),
            url: reader.string("url"),
            private: reader.object("private"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("created_at", &self.created_at);
        writer.object("created_by", &self.created_by);
        writer.leaf("updated_at", &self.updated_at);
        writer.object("updated_by", &self.updated_by);
        writer.leaf("state", &self.state);
        writer.leaf("message", &self.message);
        writer.leaf("ready_replica", &self.ready_replica);
        writer.leaf("target_replica", &self.target_replica);
        writer.leaf("error_message", &self.error_message);
        writer.leaf("url", &self.url);
        writer.object("private", &self.private);
    }
}

/// A Hugging Face account.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserState {
    /// Account id.
    pub id: AttrValue<String>,
    /// Account name.
    pub name: AttrValue<String>,
}

impl StateObject for UserState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            id: reader.string("id"),
            name: reader.string("name"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("id", &self.id);
        writer.leaf("name", &self.name);
    }
}

/// Private link details of an endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrivateStatusState {
    /// Service to connect the private link to.
    pub service_name: AttrValue<String>,
}

impl StateObject for PrivateStatusState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            service_name: reader.string("service_name"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("service_name", &self.service_name);
    }
}

/// State of the `huggingface_endpoints` data source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointsDataSourceState {
    /// Namespace to list.
    pub namespace: AttrValue<String>,
    /// Only endpoints carrying every tag are listed.
    pub tags: AttrValue<Vec<String>>,
    /// Listed endpoints.
    pub endpoints: AttrValue<Vec<EndpointState>>,
}

impl StateObject for EndpointsDataSourceState {
    fn decode(reader: &mut ObjectReader<'_>) -> Self {
        Self {
            namespace: reader.string("namespace"),
            tags: reader.string_list("tags"),
            endpoints: reader.object_list("endpoints"),
        }
    }

    fn encode(&self, writer: &mut ObjectWriter) {
        writer.leaf("namespace", &self.namespace);
        writer.leaf("tags", &self.tags);
        writer.object_list("endpoints", &self.endpoints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Diagnostics;
    use crate::value::{decode_object, UNKNOWN_VALUE};
    use serde_json::json;

    fn decode_image(value: Value) -> (ModelImageState, Diagnostics) {
        let mut diags = Diagnostics::new();
        let image = decode_object(&value, &mut diags);
        (image, diags)
    }

    #[test]
    fn test_image_without_variant_renders_all_placeholders() {
        let encoded = encode_object(&ModelImageState::default());
        let map = encoded.as_object().expect("image object");

        assert_eq!(map.len(), IMAGE_VARIANT_KEYS.len());
        assert_eq!(map["huggingface"], Value::Null);
        assert_eq!(map["huggingface_neuron"], Value::Null);
        for key in IMAGE_VARIANT_KEYS.iter().skip(2) {
            let branch = map[*key].as_object().expect("placeholder object");
            assert!(!branch.is_empty(), "{} placeholder has leaves", key);
            assert!(!has_known_leaf(&map[*key]), "{} placeholder is all null", key);
        }
        assert_eq!(map["custom"]["credentials"], Value::Null);
    }

    #[test]
    fn test_image_active_variant_survives_placeholders() {
        let image = ModelImageState::with_variant(ImageVariantState::Tgi(TgiState {
            url: AttrValue::known("ghcr.io/huggingface/text-generation-inference:latest"),
            port: AttrValue::Known(80),
            ..Default::default()
        }));

        let encoded = encode_object(&image);
        assert_eq!(encoded["tgi"]["port"], json!(80));
        assert_eq!(encoded["tgi"]["quantize"], Value::Null);
        assert_eq!(encoded["tei"]["url"], Value::Null);

        let (decoded, diags) = decode_image(encoded);
        assert!(diags.is_empty());
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_huggingface_variant_is_distinct_from_placeholder() {
        let image = ModelImageState::with_variant(ImageVariantState::Huggingface);
        let encoded = encode_object(&image);
        assert_eq!(encoded["huggingface"], json!({}));

        let (decoded, _) = decode_image(encoded);
        assert_eq!(decoded.variant, Some(ImageVariantState::Huggingface));

        let (empty, _) = decode_image(encode_object(&ModelImageState::default()));
        assert_eq!(empty.variant, None);
    }

    #[test]
    fn test_empty_huggingface_neuron_is_active() {
        let (image, diags) = decode_image(json!({"huggingface_neuron": {}}));
        assert!(diags.is_empty());
        assert_eq!(
            image.variant,
            Some(ImageVariantState::HuggingfaceNeuron(HuggingfaceNeuronState::default()))
        );

        let encoded = encode_object(&image);
        assert!(encoded["huggingface_neuron"].is_object());
        assert_eq!(encoded["huggingface"], Value::Null);
        let (again, _) = decode_image(encoded);
        assert_eq!(again, image);

        let (conflict, diags) = decode_image(json!({
            "huggingface_neuron": {},
            "tgi": {"url": "a"}
        }));
        assert!(conflict.variant.is_none());
        assert!(diags.has_errors());
    }

    #[test]
    fn test_two_active_variants_is_an_error() {
        let (image, diags) = decode_image(json!({
            "tgi": {"url": "a"},
            "tei": {"url": "b"}
        }));

        assert!(image.variant.is_none());
        assert!(diags.has_errors());
        let diag = diags.iter().next().expect("diagnostic");
        assert_eq!(diag.summary, "Conflicting image configuration");
        assert!(diag.detail.as_deref().unwrap_or_default().contains("tgi, tei"));
    }

    #[test]
    fn test_branch_with_only_unknown_leaves_is_inactive() {
        let (image, diags) = decode_image(json!({
            "huggingface": null,
            "tgi": {"url": UNKNOWN_VALUE, "port": null},
            "llamacpp": {"url": "x", "model_path": "m.gguf"}
        }));

        assert!(diags.is_empty());
        assert!(matches!(image.variant, Some(ImageVariantState::LlamaCpp(_))));
    }

    #[test]
    fn test_endpoint_state_keys() {
        let state = EndpointState {
            endpoint_type: AttrValue::known("protected"),
            ..Default::default()
        };
        let encoded = encode_object(&state);
        assert_eq!(encoded["type"], json!("protected"));
        assert_eq!(encoded.as_object().map(|m| m.len()), Some(13));
    }
}
