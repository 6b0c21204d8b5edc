//! Mapping between local endpoint state and the API's wire types.
//!
//! Local to remote ([`to_remote`], [`to_remote_update`]) copies a field only
//! when it is known; null and unknown leaves mean "absent". Remote to local
//! ([`to_local`]) never produces unknown values. Absent top-level and status
//! fields become known-empty values (`""`, `false`, an object of those),
//! while absent scaling knobs and image settings stay null so that
//! `to_local(to_remote(x))` keeps their presence exactly. A create leaves
//! the known-empty blocks out; an update sends them so a setting can be
//! cleared.
//!
//! Problems are collected in a [`Diagnostics`] so one call reports every
//! bad field. Callers must not use the result when it holds errors.

use std::str::FromStr;

use chrono::SecondsFormat;

use crate::client::types::{
    CloudProvider, Compute, ComputeUpdate, Credentials, CustomImage, Endpoint, EndpointUpdate,
    EndpointWithStatus, ExperimentalFeatures, HuggingfaceImage, HuggingfaceNeuronImage, KvRouter,
    LlamacppImage, Model, ModelImage, ModelUpdate, ParseEnumError, PrivateEndpointStatus,
    PrivateService, Route, Scaling, ScalingMeasure, ScalingUpdate, Status, TeiImage, TgiImage,
    TgiNeuronImage, User,
};
use crate::schema::Diagnostics;
use crate::state::{
    CloudProviderState, ComputeState, CredentialsState, CustomImageState, EndpointState,
    ExperimentalFeaturesState, HuggingfaceNeuronState, ImageVariantState, KvRouterState,
    LlamaCppState, ModelImageState, ModelState, PrivateServiceState, PrivateStatusState,
    RouteState, ScalingMeasureState, ScalingState, StatusState, TeiState, TgiNeuronState,
    TgiState, UserState,
};
use crate::value::AttrValue;

/// Replica bounds used when the configuration leaves them out.
pub const DEFAULT_MIN_REPLICA: i32 = 0;
/// See [`DEFAULT_MIN_REPLICA`].
pub const DEFAULT_MAX_REPLICA: i32 = 1;

// ---------------------------------------------------------------------------
// Leaf helpers
// ---------------------------------------------------------------------------

fn required<T: Clone>(value: &AttrValue<T>, path: &str, diags: &mut Diagnostics) -> Option<T> {
    match value {
        AttrValue::Known(value) => Some(value.clone()),
        AttrValue::Null => {
            diags.attribute_error(
                path,
                "Missing required attribute",
                format!("{} must be set", path),
            );
            None
        },
        AttrValue::Unknown => {
            diags.attribute_error(
                path,
                "Value not yet known",
                format!("{} must be known before the endpoint can be created", path),
            );
            None
        },
    }
}

fn narrow(value: i64, path: &str, diags: &mut Diagnostics) -> Option<i32> {
    match i32::try_from(value) {
        Ok(value) => Some(value),
        Err(_) => {
            diags.attribute_error(
                path,
                "Value out of range",
                format!("{} must fit in a 32-bit integer, got {}", path, value),
            );
            None
        },
    }
}

fn optional_int(value: &AttrValue<i64>, path: &str, diags: &mut Diagnostics) -> Option<i32> {
    value.as_known().and_then(|v| narrow(*v, path, diags))
}

fn required_int(value: &AttrValue<i64>, path: &str, diags: &mut Diagnostics) -> Option<i32> {
    required(value, path, diags).and_then(|v| narrow(v, path, diags))
}

fn parse_enum<E>(value: &str, path: &str, diags: &mut Diagnostics) -> Option<E>
where
    E: FromStr<Err = ParseEnumError>,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            diags.attribute_error(path, "Invalid attribute value", err.to_string());
            None
        },
    }
}

fn optional_enum<E>(value: &AttrValue<String>, path: &str, diags: &mut Diagnostics) -> Option<E>
where
    E: FromStr<Err = ParseEnumError>,
{
    value
        .as_known()
        .and_then(|raw| parse_enum(raw, path, diags))
}

fn required_enum<E>(value: &AttrValue<String>, path: &str, diags: &mut Diagnostics) -> Option<E>
where
    E: FromStr<Err = ParseEnumError>,
{
    required(value, path, diags).and_then(|raw| parse_enum(&raw, path, diags))
}

// A known-empty string stands for "absent".
fn non_empty(value: &AttrValue<String>) -> Option<String> {
    value.as_known().filter(|s| !s.is_empty()).cloned()
}

// ---------------------------------------------------------------------------
// Local -> remote
// ---------------------------------------------------------------------------

/// Build the create request for an endpoint.
///
/// Returns `None` when a required attribute is missing or a value cannot be
/// converted; the reasons are in `diags`.
pub fn to_remote(state: &EndpointState, diags: &mut Diagnostics) -> Option<Endpoint> {
    let name = required(&state.name, "name", diags);
    let endpoint_type = required_enum(&state.endpoint_type, "type", diags);
    let provider = match required(&state.cloud_provider, "cloud_provider", diags) {
        Some(provider) => cloud_provider_to_remote(&provider, diags),
        None => None,
    };
    let compute = match required(&state.compute, "compute", diags) {
        Some(compute) => compute_to_remote(&compute, diags),
        None => None,
    };
    let model = match required(&state.model, "model", diags) {
        Some(model) => model_to_remote(&model, diags),
        None => None,
    };
    // Known-empty blocks are left out of a create.
    let experimental_features = experimental_features_to_remote(&state.experimental_features)
        .filter(|f| f.cache_http_responses || f.kv_router.is_some());
    let private_service = private_service_to_remote(&state.private_service);
    let route = route_to_remote(&state.route).filter(|r| !r.domain.is_empty() || !r.path.is_empty());

    if diags.has_errors() {
        return None;
    }

    Some(Endpoint {
        name: name?,
        endpoint_type: endpoint_type?,
        provider: provider?,
        compute: compute?,
        model: model?,
        tags: state.tags.known_cloned(),
        cache_http_responses: state.cache_http_responses.known_cloned(),
        experimental_features,
        private_service,
        route,
    })
}

/// Build the partial update for an endpoint.
///
/// Only known attributes are sent. A known block is sent even when every
/// leaf is empty, so that settings can be switched off again. Private
/// networking cannot be changed after creation and is never part of the
/// update.
pub fn to_remote_update(state: &EndpointState, diags: &mut Diagnostics) -> Option<EndpointUpdate> {
    let endpoint_type = optional_enum(&state.endpoint_type, "type", diags);
    let compute = state
        .compute
        .as_known()
        .map(|compute| compute_to_update(compute, diags));
    let model = state
        .model
        .as_known()
        .map(|model| model_to_update(model, diags));

    if diags.has_errors() {
        return None;
    }

    Some(EndpointUpdate {
        endpoint_type,
        compute,
        model,
        tags: state.tags.known_cloned(),
        cache_http_responses: state.cache_http_responses.known_cloned(),
        experimental_features: experimental_features_to_remote(&state.experimental_features),
        route: route_to_remote(&state.route),
    })
}

fn cloud_provider_to_remote(
    provider: &CloudProviderState,
    diags: &mut Diagnostics,
) -> Option<CloudProvider> {
    let vendor = required(&provider.vendor, "cloud_provider.vendor", diags);
    let region = required(&provider.region, "cloud_provider.region", diags);
    Some(CloudProvider {
        vendor: vendor?,
        region: region?,
    })
}

fn compute_to_remote(compute: &ComputeState, diags: &mut Diagnostics) -> Option<Compute> {
    let accelerator = required_enum(&compute.accelerator, "compute.accelerator", diags);
    let instance_type = required(&compute.instance_type, "compute.instance_type", diags);
    let instance_size = required(&compute.instance_size, "compute.instance_size", diags);
    let scaling = match required(&compute.scaling, "compute.scaling", diags) {
        Some(scaling) => scaling_to_remote(&scaling, diags),
        None => None,
    };

    Some(Compute {
        id: non_empty(&compute.id),
        accelerator: accelerator?,
        instance_type: instance_type?,
        instance_size: instance_size?,
        scaling: scaling?,
    })
}

fn scaling_to_remote(scaling: &ScalingState, diags: &mut Diagnostics) -> Option<Scaling> {
    let update = scaling_to_update(scaling, diags);
    Some(Scaling {
        min_replica: update.min_replica.unwrap_or(DEFAULT_MIN_REPLICA),
        max_replica: update.max_replica.unwrap_or(DEFAULT_MAX_REPLICA),
        scale_to_zero_timeout: update.scale_to_zero_timeout,
        metric: update.metric,
        threshold: update.threshold,
        measure: update.measure,
    })
}

fn scaling_to_update(scaling: &ScalingState, diags: &mut Diagnostics) -> ScalingUpdate {
    ScalingUpdate {
        min_replica: optional_int(&scaling.min_replica, "compute.scaling.min_replica", diags),
        max_replica: optional_int(&scaling.max_replica, "compute.scaling.max_replica", diags),
        scale_to_zero_timeout: optional_int(
            &scaling.scale_to_zero_timeout,
            "compute.scaling.scale_to_zero_timeout",
            diags,
        ),
        metric: optional_enum(&scaling.metric, "compute.scaling.metric", diags),
        threshold: scaling.threshold.known_cloned(),
        measure: scaling.measure.as_known().map(measure_to_remote),
    }
}

fn measure_to_remote(measure: &ScalingMeasureState) -> ScalingMeasure {
    ScalingMeasure {
        hardware_usage: measure.hardware_usage.known_cloned(),
        pending_requests: measure.pending_requests.known_cloned(),
    }
}

fn compute_to_update(compute: &ComputeState, diags: &mut Diagnostics) -> ComputeUpdate {
    ComputeUpdate {
        accelerator: optional_enum(&compute.accelerator, "compute.accelerator", diags),
        instance_type: compute.instance_type.known_cloned(),
        instance_size: compute.instance_size.known_cloned(),
        scaling: compute
            .scaling
            .as_known()
            .map(|scaling| scaling_to_update(scaling, diags)),
    }
}

fn model_to_remote(model: &ModelState, diags: &mut Diagnostics) -> Option<Model> {
    let repository = required(&model.repository, "model.repository", diags);
    let framework = required(&model.framework, "model.framework", diags);
    let task = required(&model.task, "model.task", diags);
    let image = image_to_remote(&model.image, diags);

    Some(Model {
        repository: repository?,
        framework: framework?,
        task: task?,
        image,
    })
}

fn model_to_update(model: &ModelState, diags: &mut Diagnostics) -> ModelUpdate {
    ModelUpdate {
        repository: model.repository.known_cloned(),
        framework: model.framework.known_cloned(),
        task: model.task.known_cloned(),
        image: image_to_remote(&model.image, diags),
    }
}

/// Convert the active image variant. Absent variants are never synthesized.
pub fn image_to_remote(
    image: &AttrValue<ModelImageState>,
    diags: &mut Diagnostics,
) -> Option<ModelImage> {
    let variant = image.as_known()?.variant.as_ref()?;
    match variant {
        ImageVariantState::Huggingface => Some(ModelImage::Huggingface(HuggingfaceImage {})),
        ImageVariantState::HuggingfaceNeuron(image) => {
            huggingface_neuron_to_remote(image, diags).map(ModelImage::HuggingfaceNeuron)
        },
        ImageVariantState::Tgi(image) => tgi_to_remote(image, diags).map(ModelImage::Tgi),
        ImageVariantState::TgiNeuron(image) => {
            tgi_neuron_to_remote(image, diags).map(ModelImage::TgiNeuron)
        },
        ImageVariantState::Tei(image) => tei_to_remote(image, diags).map(ModelImage::Tei),
        ImageVariantState::LlamaCpp(image) => {
            llamacpp_to_remote(image, diags).map(ModelImage::Llamacpp)
        },
        ImageVariantState::Custom(image) => custom_to_remote(image, diags).map(ModelImage::Custom),
    }
}

fn huggingface_neuron_to_remote(
    image: &HuggingfaceNeuronState,
    diags: &mut Diagnostics,
) -> Option<HuggingfaceNeuronImage> {
    const P: &str = "model.image.huggingface_neuron";
    let batch_size = optional_int(&image.batch_size, &format!("{P}.batch_size"), diags);
    let sequence_length =
        optional_int(&image.sequence_length, &format!("{P}.sequence_length"), diags);
    Some(HuggingfaceNeuronImage {
        batch_size,
        neuron_cache: image.neuron_cache.known_cloned(),
        sequence_length,
    })
}

fn tgi_to_remote(image: &TgiState, diags: &mut Diagnostics) -> Option<TgiImage> {
    const P: &str = "model.image.tgi";
    let url = required(&image.url, &format!("{P}.url"), diags);
    let port = optional_int(&image.port, &format!("{P}.port"), diags);
    let max_batch_prefill_tokens = optional_int(
        &image.max_batch_prefill_tokens,
        &format!("{P}.max_batch_prefill_tokens"),
        diags,
    );
    let max_batch_total_tokens = optional_int(
        &image.max_batch_total_tokens,
        &format!("{P}.max_batch_total_tokens"),
        diags,
    );
    let max_input_length =
        optional_int(&image.max_input_length, &format!("{P}.max_input_length"), diags);
    let max_total_tokens =
        optional_int(&image.max_total_tokens, &format!("{P}.max_total_tokens"), diags);

    Some(TgiImage {
        url: url?,
        health_route: image.health_route.known_cloned(),
        port,
        max_batch_prefill_tokens,
        max_batch_total_tokens,
        max_input_length,
        max_total_tokens,
        disable_custom_kernels: image.disable_custom_kernels.known_cloned(),
        quantize: image.quantize.known_cloned(),
    })
}

fn tgi_neuron_to_remote(image: &TgiNeuronState, diags: &mut Diagnostics) -> Option<TgiNeuronImage> {
    const P: &str = "model.image.tgi_neuron";
    let url = required(&image.url, &format!("{P}.url"), diags);
    let port = optional_int(&image.port, &format!("{P}.port"), diags);
    let max_batch_prefill_tokens = optional_int(
        &image.max_batch_prefill_tokens,
        &format!("{P}.max_batch_prefill_tokens"),
        diags,
    );
    let max_batch_total_tokens = optional_int(
        &image.max_batch_total_tokens,
        &format!("{P}.max_batch_total_tokens"),
        diags,
    );
    let max_input_length =
        optional_int(&image.max_input_length, &format!("{P}.max_input_length"), diags);
    let max_total_tokens =
        optional_int(&image.max_total_tokens, &format!("{P}.max_total_tokens"), diags);
    let hf_num_cores = optional_int(&image.hf_num_cores, &format!("{P}.hf_num_cores"), diags);

    Some(TgiNeuronImage {
        url: url?,
        health_route: image.health_route.known_cloned(),
        port,
        max_batch_prefill_tokens,
        max_batch_total_tokens,
        max_input_length,
        max_total_tokens,
        hf_auto_cast_type: image.hf_auto_cast_type.known_cloned(),
        hf_num_cores,
    })
}

fn tei_to_remote(image: &TeiState, diags: &mut Diagnostics) -> Option<TeiImage> {
    const P: &str = "model.image.tei";
    let url = required(&image.url, &format!("{P}.url"), diags);
    let port = optional_int(&image.port, &format!("{P}.port"), diags);
    let max_batch_tokens =
        optional_int(&image.max_batch_tokens, &format!("{P}.max_batch_tokens"), diags);
    let max_concurrent_requests = optional_int(
        &image.max_concurrent_requests,
        &format!("{P}.max_concurrent_requests"),
        diags,
    );

    Some(TeiImage {
        url: url?,
        health_route: image.health_route.known_cloned(),
        port,
        max_batch_tokens,
        max_concurrent_requests,
        pooling: image.pooling.known_cloned(),
    })
}

fn llamacpp_to_remote(image: &LlamaCppState, diags: &mut Diagnostics) -> Option<LlamacppImage> {
    const P: &str = "model.image.llamacpp";
    let url = required(&image.url, &format!("{P}.url"), diags);
    let ctx_size = required_int(&image.ctx_size, &format!("{P}.ctx_size"), diags);
    let model_path = required(&image.model_path, &format!("{P}.model_path"), diags);
    let n_parallel = required_int(&image.n_parallel, &format!("{P}.n_parallel"), diags);
    let threads_http = required_int(&image.threads_http, &format!("{P}.threads_http"), diags);
    let port = optional_int(&image.port, &format!("{P}.port"), diags);
    let n_gpu_layers = optional_int(&image.n_gpu_layers, &format!("{P}.n_gpu_layers"), diags);

    Some(LlamacppImage {
        url: url?,
        ctx_size: ctx_size?,
        model_path: model_path?,
        n_parallel: n_parallel?,
        threads_http: threads_http?,
        health_route: image.health_route.known_cloned(),
        port,
        mode: image.mode.known_cloned(),
        n_gpu_layers,
        pooling: image.pooling.known_cloned(),
        variant: image.variant.known_cloned(),
    })
}

fn custom_to_remote(image: &CustomImageState, diags: &mut Diagnostics) -> Option<CustomImage> {
    const P: &str = "model.image.custom";
    let url = required(&image.url, &format!("{P}.url"), diags);
    let port = optional_int(&image.port, &format!("{P}.port"), diags);
    let credentials = match image.credentials.as_known() {
        Some(credentials) => {
            let username = required(
                &credentials.username,
                &format!("{P}.credentials.username"),
                diags,
            );
            Some(Credentials {
                username: username?,
                password: credentials.password.known_cloned(),
            })
        },
        None => None,
    };

    Some(CustomImage {
        url: url?,
        health_route: image.health_route.known_cloned(),
        port,
        credentials,
    })
}

fn experimental_features_to_remote(
    features: &AttrValue<ExperimentalFeaturesState>,
) -> Option<ExperimentalFeatures> {
    let features = features.as_known()?;
    let cache_http_responses = features.cache_http_responses.known_cloned().unwrap_or(false);
    let kv_router = features
        .kv_router
        .as_known()
        .and_then(|router| non_empty(&router.tag))
        .map(|tag| KvRouter { tag });

    Some(ExperimentalFeatures {
        cache_http_responses,
        kv_router,
    })
}

/// The private service a state asks for. An empty `account_id` means none.
pub(crate) fn private_service_to_remote(
    service: &AttrValue<PrivateServiceState>,
) -> Option<PrivateService> {
    let service = service.as_known()?;
    let account_id = non_empty(&service.account_id)?;
    Some(PrivateService {
        account_id,
        shared: service.shared.known_cloned().unwrap_or(false),
    })
}

fn route_to_remote(route: &AttrValue<RouteState>) -> Option<Route> {
    let route = route.as_known()?;
    if !route.domain.is_known() && !route.path.is_known() {
        return None;
    }
    Some(Route {
        domain: route.domain.known_cloned().unwrap_or_default(),
        path: route.path.known_cloned().unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// Remote -> local
// ---------------------------------------------------------------------------

fn known<T>(value: impl Into<T>) -> AttrValue<T> {
    AttrValue::Known(value.into())
}

fn known_or_empty(value: &Option<String>) -> AttrValue<String> {
    AttrValue::Known(value.clone().unwrap_or_default())
}

fn int_from(value: Option<i32>) -> AttrValue<i64> {
    AttrValue::from_option(value.map(i64::from))
}

/// Map an endpoint returned by the API to local state.
///
/// `id` and `namespace` are left null; the caller knows the namespace the
/// endpoint was fetched from and fills both in.
pub fn to_local(remote: &EndpointWithStatus) -> EndpointState {
    let endpoint = &remote.endpoint;
    EndpointState {
        id: AttrValue::Null,
        namespace: AttrValue::Null,
        name: known(endpoint.name.clone()),
        endpoint_type: known(endpoint.endpoint_type.as_str()),
        cloud_provider: known(CloudProviderState {
            vendor: known(endpoint.provider.vendor.clone()),
            region: known(endpoint.provider.region.clone()),
        }),
        compute: known(compute_to_local(&endpoint.compute)),
        model: known(model_to_local(&endpoint.model)),
        tags: known(endpoint.tags.clone().unwrap_or_default()),
        cache_http_responses: known(endpoint.cache_http_responses.unwrap_or(false)),
        experimental_features: known(experimental_features_to_local(
            endpoint.experimental_features.as_ref(),
        )),
        private_service: known(private_service_to_local(endpoint.private_service.as_ref())),
        route: known(route_to_local(endpoint.route.as_ref())),
        status: known(status_to_local(&remote.status)),
    }
}

fn compute_to_local(compute: &Compute) -> ComputeState {
    ComputeState {
        id: known_or_empty(&compute.id),
        accelerator: known(compute.accelerator.as_str()),
        instance_type: known(compute.instance_type.clone()),
        instance_size: known(compute.instance_size.clone()),
        scaling: known(scaling_to_local(&compute.scaling)),
    }
}

fn scaling_to_local(scaling: &Scaling) -> ScalingState {
    ScalingState {
        min_replica: known(scaling.min_replica),
        max_replica: known(scaling.max_replica),
        scale_to_zero_timeout: int_from(scaling.scale_to_zero_timeout),
        metric: AttrValue::from_option(scaling.metric.map(|m| m.as_str().to_string())),
        threshold: AttrValue::from_option(scaling.threshold),
        measure: AttrValue::from_option(scaling.measure.as_ref().map(|measure| {
            ScalingMeasureState {
                hardware_usage: AttrValue::from_option(measure.hardware_usage),
                pending_requests: AttrValue::from_option(measure.pending_requests),
            }
        })),
    }
}

fn model_to_local(model: &Model) -> ModelState {
    ModelState {
        repository: known(model.repository.clone()),
        framework: known(model.framework.clone()),
        task: known(model.task.clone()),
        image: known(image_to_local(model.image.as_ref())),
    }
}

/// Map the remote image. No remote variant gives an image with no active branch.
pub fn image_to_local(image: Option<&ModelImage>) -> ModelImageState {
    let variant = image.map(|image| match image {
        ModelImage::Huggingface(_) => ImageVariantState::Huggingface,
        ModelImage::HuggingfaceNeuron(image) => {
            ImageVariantState::HuggingfaceNeuron(HuggingfaceNeuronState {
                batch_size: int_from(image.batch_size),
                neuron_cache: AttrValue::from_option(image.neuron_cache.clone()),
                sequence_length: int_from(image.sequence_length),
            })
        },
        ModelImage::Tgi(image) => ImageVariantState::Tgi(TgiState {
            health_route: AttrValue::from_option(image.health_route.clone()),
            port: int_from(image.port),
            url: known(image.url.clone()),
            max_batch_prefill_tokens: int_from(image.max_batch_prefill_tokens),
            max_batch_total_tokens: int_from(image.max_batch_total_tokens),
            max_input_length: int_from(image.max_input_length),
            max_total_tokens: int_from(image.max_total_tokens),
            disable_custom_kernels: AttrValue::from_option(image.disable_custom_kernels),
            quantize: AttrValue::from_option(image.quantize.clone()),
        }),
        ModelImage::TgiNeuron(image) => ImageVariantState::TgiNeuron(TgiNeuronState {
            health_route: AttrValue::from_option(image.health_route.clone()),
            port: int_from(image.port),
            url: known(image.url.clone()),
            max_batch_prefill_tokens: int_from(image.max_batch_prefill_tokens),
            max_batch_total_tokens: int_from(image.max_batch_total_tokens),
            max_input_length: int_from(image.max_input_length),
            max_total_tokens: int_from(image.max_total_tokens),
            hf_auto_cast_type: AttrValue::from_option(image.hf_auto_cast_type.clone()),
            hf_num_cores: int_from(image.hf_num_cores),
        }),
        ModelImage::Tei(image) => ImageVariantState::Tei(TeiState {
            health_route: AttrValue::from_option(image.health_route.clone()),
            port: int_from(image.port),
            url: known(image.url.clone()),
            max_batch_tokens: int_from(image.max_batch_tokens),
            max_concurrent_requests: int_from(image.max_concurrent_requests),
            pooling: AttrValue::from_option(image.pooling.clone()),
        }),
        ModelImage::Llamacpp(image) => ImageVariantState::LlamaCpp(LlamaCppState {
            health_route: AttrValue::from_option(image.health_route.clone()),
            port: int_from(image.port),
            url: known(image.url.clone()),
            ctx_size: known(image.ctx_size),
            mode: AttrValue::from_option(image.mode.clone()),
            model_path: known(image.model_path.clone()),
            n_gpu_layers: int_from(image.n_gpu_layers),
            n_parallel: known(image.n_parallel),
            pooling: AttrValue::from_option(image.pooling.clone()),
            threads_http: known(image.threads_http),
            variant: AttrValue::from_option(image.variant.clone()),
        }),
        ModelImage::Custom(image) => ImageVariantState::Custom(CustomImageState {
            health_route: AttrValue::from_option(image.health_route.clone()),
            port: int_from(image.port),
            url: known(image.url.clone()),
            credentials: AttrValue::from_option(image.credentials.as_ref().map(|c| {
                CredentialsState {
                    username: known(c.username.clone()),
                    password: AttrValue::from_option(c.password.clone()),
                }
            })),
        }),
    });

    ModelImageState { variant }
}

fn experimental_features_to_local(
    features: Option<&ExperimentalFeatures>,
) -> ExperimentalFeaturesState {
    ExperimentalFeaturesState {
        cache_http_responses: known(features.map(|f| f.cache_http_responses).unwrap_or(false)),
        kv_router: known(KvRouterState {
            tag: known(
                features
                    .and_then(|f| f.kv_router.as_ref())
                    .map(|router| router.tag.clone())
                    .unwrap_or_default(),
            ),
        }),
    }
}

fn private_service_to_local(service: Option<&PrivateService>) -> PrivateServiceState {
    PrivateServiceState {
        account_id: known(service.map(|s| s.account_id.clone()).unwrap_or_default()),
        shared: known(service.map(|s| s.shared).unwrap_or(false)),
    }
}

fn route_to_local(route: Option<&Route>) -> RouteState {
    RouteState {
        domain: known(route.map(|r| r.domain.clone()).unwrap_or_default()),
        path: known(route.map(|r| r.path.clone()).unwrap_or_default()),
    }
}

fn user_to_local(user: &User) -> UserState {
    UserState {
        id: known(user.id.clone()),
        name: known(user.name.clone()),
    }
}

fn status_to_local(status: &Status) -> StatusState {
    StatusState {
        created_at: known(status.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        created_by: known(user_to_local(&status.created_by)),
        updated_at: known(status.updated_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        updated_by: known(user_to_local(&status.updated_by)),
        state: known(status.state.clone()),
        message: known(status.message.clone()),
        ready_replica: known(status.ready_replica),
        target_replica: known(status.target_replica),
        error_message: known_or_empty(&status.error_message),
        url: known_or_empty(&status.url),
        private: known(PrivateStatusState {
            service_name: known_or_empty(
                &status
                    .private
                    .as_ref()
                    .and_then(|p: &PrivateEndpointStatus| p.service_name.clone()),
            ),
        }),
    }
}
