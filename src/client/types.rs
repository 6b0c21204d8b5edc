//! Wire types of the Inference Endpoints API.
//!
//! Field names follow the API's camelCase JSON. Optional fields are
//! `Option`s and are left out of request bodies when `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string that is not one of the values accepted by an API enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} {value:?}, expected one of: {expected}")]
pub struct ParseEnumError {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Accepted values, comma separated.
    pub expected: &'static str,
}

macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[doc = concat!("`", $wire, "` on the wire.")]
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// The value as sent on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: concat!($($wire, " "),+).trim_end(),
                    }),
                }
            }
        }
    };
}

api_enum! {
    /// Who may call an endpoint.
    EndpointType, "endpoint type" {
        Public => "public",
        Protected => "protected",
        Private => "private",
        Authenticated => "authenticated",
    }
}

api_enum! {
    /// Accelerator family of an instance.
    Accelerator, "accelerator" {
        Cpu => "cpu",
        Gpu => "gpu",
        Neuron => "neuron",
    }
}

api_enum! {
    /// Metric driving autoscaling.
    ScalingMetric, "scaling metric" {
        HardwareUsage => "hardwareUsage",
        PendingRequests => "pendingRequests",
    }
}

/// An endpoint as submitted on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Name, unique within the namespace.
    pub name: String,
    /// Access level.
    #[serde(rename = "type")]
    pub endpoint_type: EndpointType,
    /// Where the endpoint runs.
    pub provider: CloudProvider,
    /// Instance and autoscaling settings.
    pub compute: Compute,
    /// Model served by the endpoint.
    pub model: Model,
    /// Free-form labels, usable as list filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Whether identical requests may be answered from a cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_http_responses: Option<bool>,
    /// Opt-in features that may change without notice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental_features: Option<ExperimentalFeatures>,
    /// Private networking. Fixed once the endpoint exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_service: Option<PrivateService>,
    /// Custom domain and path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
}

/// An endpoint as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointWithStatus {
    /// The submitted configuration, as stored by the API.
    #[serde(flatten)]
    pub endpoint: Endpoint,
    /// Runtime status.
    pub status: Status,
}

/// Response body of the list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointList {
    /// Endpoints of the namespace, after filtering.
    #[serde(default)]
    pub items: Vec<EndpointWithStatus>,
}

/// Cloud vendor and region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProvider {
    /// Vendor name, such as `aws`.
    pub vendor: String,
    /// Vendor region, such as `us-east-1`.
    pub region: String,
}

/// Instance selection and autoscaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compute {
    /// Identifier assigned by the API. Never sent on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Accelerator family.
    pub accelerator: Accelerator,
    /// Instance type, such as `nvidia-t4`.
    pub instance_type: String,
    /// Instance size, such as `x1`.
    pub instance_size: String,
    /// Replica bounds and scaling policy.
    pub scaling: Scaling,
}

/// Autoscaling policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scaling {
    /// Lower replica bound. Zero allows scaling to zero.
    pub min_replica: i32,
    /// Upper replica bound.
    pub max_replica: i32,
    /// Idle minutes before scaling to zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_to_zero_timeout: Option<i32>,
    /// Metric compared against `threshold`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<ScalingMetric>,
    /// Value of `metric` that triggers scaling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Latest measured values, reported by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<ScalingMeasure>,
}

/// Measured values of the scaling metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingMeasure {
    /// Hardware utilisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_usage: Option<f64>,
    /// Requests waiting for a replica.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<f64>,
}

/// Model repository and serving container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Hub repository, such as `openai-community/gpt2`.
    pub repository: String,
    /// Framework, such as `pytorch`.
    pub framework: String,
    /// Task, such as `text-generation`.
    pub task: String,
    /// Serving container. `None` lets the API choose.
    #[serde(
        default,
        deserialize_with = "deserialize_image",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<ModelImage>,
}

/// The container image of a model. Exactly one variant is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelImage {
    /// Default Hugging Face container.
    Huggingface(HuggingfaceImage),
    /// Default container on Neuron accelerators.
    HuggingfaceNeuron(HuggingfaceNeuronImage),
    /// Text Generation Inference.
    Tgi(TgiImage),
    /// Text Generation Inference on Neuron accelerators.
    TgiNeuron(TgiNeuronImage),
    /// Text Embeddings Inference.
    Tei(TeiImage),
    /// llama.cpp server.
    Llamacpp(LlamacppImage),
    /// Any container from a registry.
    Custom(CustomImage),
}

// The API reports "no image" as `{}` and may pad the object with null
// variants, so both collapse to `None` here.
fn deserialize_image<'de, D>(deserializer: D) -> Result<Option<ModelImage>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let mut map = match value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Object(map)) => map,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected image object, got {}",
                other
            )))
        },
    };
    map.retain(|_, v| !v.is_null());
    if map.is_empty() {
        return Ok(None);
    }
    serde_json::from_value(serde_json::Value::Object(map))
        .map(Some)
        .map_err(D::Error::custom)
}

/// The default container takes no settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HuggingfaceImage {}

/// Settings of the default Neuron container. All are optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuggingfaceNeuronImage {
    /// Compiled batch size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<i32>,
    /// Repository holding precompiled artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neuron_cache: Option<String>,
    /// Compiled sequence length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_length: Option<i32>,
}

/// Text Generation Inference container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TgiImage {
    /// Container image reference.
    pub url: String,
    /// Path probed for readiness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_route: Option<String>,
    /// Port the server listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Token budget of the prefill step of a batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_prefill_tokens: Option<i32>,
    /// Token budget of a whole batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_total_tokens: Option<i32>,
    /// Longest accepted prompt, in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_length: Option<i32>,
    /// Longest prompt plus completion, in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_tokens: Option<i32>,
    /// Fall back to the stock kernels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_custom_kernels: Option<bool>,
    /// Quantization scheme, such as `bitsandbytes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantize: Option<String>,
}

/// Text Generation Inference container for Neuron accelerators.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TgiNeuronImage {
    /// Container image reference.
    pub url: String,
    /// Path probed for readiness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_route: Option<String>,
    /// Port the server listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Token budget of the prefill step of a batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_prefill_tokens: Option<i32>,
    /// Token budget of a whole batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_total_tokens: Option<i32>,
    /// Longest accepted prompt, in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_length: Option<i32>,
    /// Longest prompt plus completion, in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_tokens: Option<i32>,
    /// Precision the weights are cast to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_auto_cast_type: Option<String>,
    /// Neuron cores per replica.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_num_cores: Option<i32>,
}

/// Text Embeddings Inference container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeiImage {
    /// Container image reference.
    pub url: String,
    /// Path probed for readiness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_route: Option<String>,
    /// Port the server listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Token budget of one batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_tokens: Option<i32>,
    /// Requests served at once before new ones are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_requests: Option<i32>,
    /// Pooling method, such as `cls` or `mean`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pooling: Option<String>,
}

/// llama.cpp server container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlamacppImage {
    /// Container image reference.
    pub url: String,
    /// Context size in tokens.
    pub ctx_size: i32,
    /// GGUF file inside the repository.
    pub model_path: String,
    /// Parallel decoding slots.
    pub n_parallel: i32,
    /// HTTP worker threads.
    pub threads_http: i32,
    /// Path probed for readiness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_route: Option<String>,
    /// Port the server listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Server mode, such as `embedding`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Layers offloaded to the GPU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_gpu_layers: Option<i32>,
    /// Pooling method for embeddings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pooling: Option<String>,
    /// Build variant of the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// A container pulled from any registry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomImage {
    /// Container image reference.
    pub url: String,
    /// Path probed for readiness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_route: Option<String>,
    /// Port the server listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Registry login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

/// Registry login of a custom image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Registry user.
    pub username: String,
    /// Registry password or token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Opt-in features.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentalFeatures {
    /// Whether identical requests may be answered from a cache.
    #[serde(default)]
    pub cache_http_responses: bool,
    /// Cache-aware request routing. `None` turns it off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kv_router: Option<KvRouter>,
}

/// Cache-aware request routing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KvRouter {
    /// Router release to deploy.
    pub tag: String,
}

/// Private networking through the vendor's private link service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateService {
    /// Cloud account allowed to connect.
    pub account_id: String,
    /// Whether other accounts of the organisation may connect too.
    #[serde(default)]
    pub shared: bool,
}

/// Custom domain and path of an endpoint. Both empty means none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    /// Domain name, such as `models.example.com`.
    #[serde(default)]
    pub domain: String,
    /// Path prefix on that domain.
    #[serde(default)]
    pub path: String,
}

/// Provider-reported status of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: User,
    /// Last change time.
    pub updated_at: DateTime<Utc>,
    /// Last user to change the endpoint.
    pub updated_by: User,
    /// Lifecycle state, such as `pending` or `running`.
    pub state: String,
    /// Human-readable detail of `state`.
    #[serde(default)]
    pub message: String,
    /// Replicas serving traffic.
    #[serde(default)]
    pub ready_replica: i32,
    /// Replicas the autoscaler aims for.
    #[serde(default)]
    pub target_replica: i32,
    /// Set when the endpoint failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Public URL. Absent for private endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Private link details, present when a private service was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<PrivateEndpointStatus>,
}

/// A Hugging Face account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    /// Account id.
    pub id: String,
    /// Account name.
    pub name: String,
}

/// Private link details of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateEndpointStatus {
    /// Service name to connect the private link to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

/// Partial update of an endpoint. Only `Some` fields are sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointUpdate {
    /// New access level.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<EndpointType>,
    /// Compute changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<ComputeUpdate>,
    /// Model changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelUpdate>,
    /// Replacement tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// New caching flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_http_responses: Option<bool>,
    /// Replacement feature set. A `Some` value replaces the whole block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental_features: Option<ExperimentalFeatures>,
    /// Replacement route. An empty route removes the custom domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
}

/// Compute changes of an [`EndpointUpdate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeUpdate {
    /// New accelerator family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<Accelerator>,
    /// New instance type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// New instance size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_size: Option<String>,
    /// Scaling changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<ScalingUpdate>,
}

/// Scaling changes of a [`ComputeUpdate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingUpdate {
    /// New lower replica bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replica: Option<i32>,
    /// New upper replica bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_replica: Option<i32>,
    /// New idle timeout, in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_to_zero_timeout: Option<i32>,
    /// New scaling metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<ScalingMetric>,
    /// New threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Measured values, echoed back as configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<ScalingMeasure>,
}

/// Model changes of an [`EndpointUpdate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelUpdate {
    /// New repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// New framework.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// New task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Replacement image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ModelImage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_endpoint_json() -> serde_json::Value {
        json!({
            "name": "ep1",
            "type": "protected",
            "provider": {"vendor": "aws", "region": "us-east-1"},
            "compute": {
                "id": "aws-us-east-1-nvidia-t4-x1",
                "accelerator": "gpu",
                "instanceType": "nvidia-t4",
                "instanceSize": "x1",
                "scaling": {
                    "minReplica": 0,
                    "maxReplica": 1,
                    "metric": "hardwareUsage",
                    "measure": {"hardwareUsage": 10.0}
                }
            },
            "model": {
                "repository": "openai-community/gpt2",
                "framework": "pytorch",
                "task": "text-generation",
                "image": {"huggingface": {}}
            },
            "tags": ["dev"],
            "status": {
                "createdAt": "2024-05-01T10:00:00Z",
                "createdBy": {"id": "u1", "name": "alice"},
                "updatedAt": "2024-05-01T10:05:00Z",
                "updatedBy": {"id": "u1", "name": "alice"},
                "state": "running",
                "message": "Endpoint is running",
                "readyReplica": 1,
                "targetReplica": 1,
                "url": "https://ep1.endpoints.huggingface.cloud"
            }
        })
    }

    #[test]
    fn test_deserialize_endpoint_with_status() {
        let endpoint: EndpointWithStatus =
            serde_json::from_value(sample_endpoint_json()).expect("valid endpoint");

        assert_eq!(endpoint.endpoint.endpoint_type, EndpointType::Protected);
        assert_eq!(endpoint.endpoint.compute.accelerator, Accelerator::Gpu);
        assert_eq!(
            endpoint.endpoint.compute.scaling.metric,
            Some(ScalingMetric::HardwareUsage)
        );
        assert_eq!(
            endpoint.endpoint.model.image,
            Some(ModelImage::Huggingface(HuggingfaceImage {}))
        );
        assert_eq!(endpoint.status.ready_replica, 1);
        assert!(endpoint.status.error_message.is_none());
    }

    #[test]
    fn test_empty_image_is_none() {
        let mut raw = sample_endpoint_json();
        raw["model"]["image"] = json!({});
        let endpoint: EndpointWithStatus = serde_json::from_value(raw).expect("valid endpoint");
        assert_eq!(endpoint.endpoint.model.image, None);

        let mut raw = sample_endpoint_json();
        raw["model"]["image"] = json!({"tgi": null, "tei": {"url": "img"}});
        let endpoint: EndpointWithStatus = serde_json::from_value(raw).expect("valid endpoint");
        assert!(matches!(endpoint.endpoint.model.image, Some(ModelImage::Tei(_))));
    }

    #[test]
    fn test_image_wire_format() {
        let image = ModelImage::Llamacpp(LlamacppImage {
            url: "ghcr.io/ggerganov/llama.cpp:server".to_string(),
            ctx_size: 4096,
            model_path: "/repository/model.gguf".to_string(),
            n_parallel: 2,
            threads_http: 4,
            n_gpu_layers: Some(99),
            ..Default::default()
        });

        assert_eq!(
            serde_json::to_value(&image).expect("serializable"),
            json!({"llamacpp": {
                "url": "ghcr.io/ggerganov/llama.cpp:server",
                "ctxSize": 4096,
                "modelPath": "/repository/model.gguf",
                "nParallel": 2,
                "threadsHttp": 4,
                "nGpuLayers": 99
            }})
        );
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = EndpointUpdate {
            compute: Some(ComputeUpdate {
                scaling: Some(ScalingUpdate {
                    max_replica: Some(2),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&update).expect("serializable"),
            json!({"compute": {"scaling": {"maxReplica": 2}}})
        );
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("private".parse::<EndpointType>(), Ok(EndpointType::Private));
        assert_eq!(
            "pendingRequests".parse::<ScalingMetric>(),
            Ok(ScalingMetric::PendingRequests)
        );

        let err = "tpu".parse::<Accelerator>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid accelerator \"tpu\", expected one of: cpu gpu neuron"
        );
    }
}
