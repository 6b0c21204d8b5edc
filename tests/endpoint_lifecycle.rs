//! Full resource lifecycle against the in-memory API.

use std::sync::Arc;

use huggingface_provider::testing::{
    assert_plan_creates, assert_plan_no_changes, assert_plan_updates_attribute,
    MemoryEndpointsApi, ProviderTester, TestError,
};
use huggingface_provider::client::types::{ExperimentalFeatures, KvRouter, ModelImage, Route};
use huggingface_provider::{HuggingfaceProvider, ProviderError, UNKNOWN_VALUE};
use serde_json::{json, Value};

const ENDPOINT: &str = "huggingface_endpoint";
const ENDPOINTS: &str = "huggingface_endpoints";

fn config(name: &str) -> Value {
    json!({
        "namespace": "ns1",
        "name": name,
        "type": "protected",
        "cloud_provider": {"vendor": "aws", "region": "us-east-1"},
        "compute": {
            "accelerator": "gpu",
            "instance_type": "nvidia-t4",
            "instance_size": "x1",
            "scaling": {"min_replica": 0, "max_replica": 1}
        },
        "model": {
            "repository": "openai-community/gpt2",
            "framework": "pytorch",
            "task": "text-generation",
            "image": {"huggingface": {}}
        }
    })
}

fn setup() -> (Arc<MemoryEndpointsApi>, ProviderTester<HuggingfaceProvider>) {
    huggingface_provider::try_init_logging();
    let api = Arc::new(MemoryEndpointsApi::new());
    let provider = HuggingfaceProvider::with_client(api.clone());
    (api, ProviderTester::new(provider))
}

#[tokio::test]
async fn test_create_read_update_delete() {
    let (api, tester) = setup();

    tester
        .validate_resource_config(ENDPOINT, config("ep1"))
        .await
        .expect("valid config");

    let plan = tester.plan_create(ENDPOINT, config("ep1")).await.expect("plan");
    assert_plan_creates(&plan);
    assert_eq!(plan.planned_state["id"], UNKNOWN_VALUE);

    let state = tester
        .lifecycle_create(ENDPOINT, config("ep1"))
        .await
        .expect("created");
    assert_eq!(state["id"], "ns1/ep1");
    assert_eq!(state["namespace"], "ns1");
    assert_eq!(state["compute"]["id"], "aws-us-east-1-nvidia-t4-x1");
    assert_eq!(state["compute"]["scaling"]["max_replica"], 1);
    assert_eq!(state["model"]["image"]["huggingface"], json!({}));
    assert_eq!(state["model"]["image"]["tgi"]["url"], Value::Null);
    assert_eq!(state["status"]["state"], "running");
    assert_eq!(state["status"]["url"], "https://ep1.endpoints.huggingface.cloud");
    assert_eq!(state["tags"], json!([]));
    assert_eq!(api.len().await, 1);

    // Re-planning the unchanged configuration is a no-op.
    let plan = tester
        .plan_update(ENDPOINT, state.clone(), config("ep1"))
        .await
        .expect("plan");
    assert_plan_no_changes(&plan);

    let mut proposed = config("ep1");
    proposed["compute"]["scaling"]["max_replica"] = json!(3);
    let plan = tester
        .plan_update(ENDPOINT, state.clone(), proposed.clone())
        .await
        .expect("plan");
    assert_plan_updates_attribute(&plan, "compute.scaling.max_replica");
    assert_eq!(plan.planned_state["id"], "ns1/ep1");
    assert_eq!(plan.planned_state["status"], UNKNOWN_VALUE);

    let updated = tester
        .lifecycle_update(ENDPOINT, state, proposed)
        .await
        .expect("updated");
    assert_eq!(updated["compute"]["scaling"]["max_replica"], 3);
    assert_eq!(updated["compute"]["id"], "aws-us-east-1-nvidia-t4-x1");
    let stored = api.get("ns1", "ep1").await.expect("stored");
    assert_eq!(stored.endpoint.compute.scaling.max_replica, 3);

    let updates = api.updates().await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].route.as_ref().map(|r| r.domain.as_str()), Some(""));
    assert!(stored.endpoint.route.is_none());
    assert!(updates[0].experimental_features.is_some());

    tester
        .lifecycle_delete(ENDPOINT, updated.clone())
        .await
        .expect("deleted");
    assert!(api.is_empty().await);

    let err = tester.read(ENDPOINT, updated).await.unwrap_err();
    assert!(err.is_not_found(), "expected not found, got {:?}", err);
}

#[tokio::test]
async fn test_registered_types() {
    let (_api, tester) = setup();
    assert_eq!(tester.resource_types(), vec![ENDPOINT.to_string()]);
    assert_eq!(tester.data_source_types(), vec![ENDPOINTS.to_string()]);
}

#[tokio::test]
async fn test_update_turns_off_cached_responses() {
    let (api, tester) = setup();
    let mut cfg = config("ep1");
    cfg["experimental_features"] = json!({"cache_http_responses": true});
    let state = tester.lifecycle_create(ENDPOINT, cfg.clone()).await.expect("created");
    assert_eq!(state["experimental_features"]["cache_http_responses"], true);

    cfg["experimental_features"] = json!({"cache_http_responses": false});
    let plan = tester
        .plan_update(ENDPOINT, state.clone(), cfg.clone())
        .await
        .expect("plan");
    assert_plan_updates_attribute(&plan, "experimental_features.cache_http_responses");

    let updated = tester
        .lifecycle_update(ENDPOINT, state, cfg.clone())
        .await
        .expect("updated");
    assert_eq!(updated["experimental_features"]["cache_http_responses"], false);

    let updates = api.updates().await;
    assert_eq!(
        updates[0].experimental_features,
        Some(ExperimentalFeatures {
            cache_http_responses: false,
            kv_router: None,
        })
    );
    let stored = api.get("ns1", "ep1").await.expect("stored");
    assert_eq!(
        stored.endpoint.experimental_features.map(|f| f.cache_http_responses),
        Some(false)
    );

    // The stored value now matches the configuration.
    let plan = tester.plan_update(ENDPOINT, updated, cfg).await.expect("plan");
    assert_plan_no_changes(&plan);
}

#[tokio::test]
async fn test_update_clears_kv_router_and_route() {
    let (api, tester) = setup();
    let mut cfg = config("ep1");
    cfg["experimental_features"] = json!({"cache_http_responses": true, "kv_router": {"tag": "v1"}});
    cfg["route"] = json!({"domain": "models.example.com", "path": "/gpt2"});
    let state = tester.lifecycle_create(ENDPOINT, cfg.clone()).await.expect("created");
    let stored = api.get("ns1", "ep1").await.expect("stored");
    assert_eq!(
        stored.endpoint.experimental_features.and_then(|f| f.kv_router),
        Some(KvRouter {
            tag: "v1".to_string()
        })
    );
    assert_eq!(
        stored.endpoint.route,
        Some(Route {
            domain: "models.example.com".to_string(),
            path: "/gpt2".to_string(),
        })
    );

    cfg["experimental_features"]["kv_router"]["tag"] = json!("");
    cfg["route"] = json!({"domain": "", "path": ""});
    let updated = tester
        .lifecycle_update(ENDPOINT, state, cfg.clone())
        .await
        .expect("updated");
    assert_eq!(updated["experimental_features"]["kv_router"]["tag"], "");
    assert_eq!(updated["route"]["domain"], "");

    let stored = api.get("ns1", "ep1").await.expect("stored");
    assert_eq!(
        stored.endpoint.experimental_features,
        Some(ExperimentalFeatures {
            cache_http_responses: true,
            kv_router: None,
        })
    );
    assert!(stored.endpoint.route.is_none());

    let plan = tester.plan_update(ENDPOINT, updated, cfg).await.expect("plan");
    assert_plan_no_changes(&plan);
}

#[tokio::test]
async fn test_private_service_is_fixed_after_create() {
    let (api, tester) = setup();
    let mut cfg = config("ep1");
    cfg["type"] = json!("private");
    cfg["private_service"] = json!({"account_id": "123456789012", "shared": true});
    let state = tester.lifecycle_create(ENDPOINT, cfg.clone()).await.expect("created");
    assert_eq!(state["status"]["private"]["service_name"], "com.amazonaws.vpce.ep1");

    let mut changed = cfg.clone();
    changed["private_service"] = json!({"account_id": "", "shared": false});
    let err = tester
        .lifecycle_update(ENDPOINT, state.clone(), changed)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Validation(_)));
    assert!(api.updates().await.is_empty());

    // Other changes leave the private service untouched.
    cfg["compute"]["scaling"]["max_replica"] = json!(2);
    tester
        .lifecycle_update(ENDPOINT, state, cfg)
        .await
        .expect("updated");
    let updates = api.updates().await;
    assert_eq!(updates.len(), 1);
    let stored = api.get("ns1", "ep1").await.expect("stored");
    let service = stored.endpoint.private_service.expect("private service");
    assert_eq!(service.account_id, "123456789012");
    assert!(service.shared);
}

#[tokio::test]
async fn test_create_with_huggingface_neuron_image() {
    let (api, tester) = setup();
    let mut cfg = config("ep1");
    cfg["model"]["image"] = json!({"huggingface_neuron": {}});
    let state = tester.lifecycle_create(ENDPOINT, cfg.clone()).await.expect("created");

    let stored = api.get("ns1", "ep1").await.expect("stored");
    assert!(matches!(
        stored.endpoint.model.image,
        Some(ModelImage::HuggingfaceNeuron(_))
    ));
    assert!(state["model"]["image"]["huggingface_neuron"].is_object());
    assert_eq!(state["model"]["image"]["huggingface"], Value::Null);

    let plan = tester.plan_update(ENDPOINT, state, cfg).await.expect("plan");
    assert_plan_no_changes(&plan);
}

#[tokio::test]
async fn test_create_twice_conflicts() {
    let (_api, tester) = setup();
    tester
        .lifecycle_create(ENDPOINT, config("ep1"))
        .await
        .expect("created");

    let err = tester
        .lifecycle_create(ENDPOINT, config("ep1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_create_with_missing_required_block() {
    let (api, tester) = setup();
    let mut invalid = config("ep1");
    invalid.as_object_mut().expect("object").remove("compute");

    match tester.validate_resource_config(ENDPOINT, invalid.clone()).await {
        Err(TestError::Diagnostics(diags)) => {
            assert!(diags.iter().any(|d| d.attribute.as_deref() == Some("compute")));
        },
        other => panic!("expected diagnostics, got {:?}", other),
    }

    let err = tester.lifecycle_create(ENDPOINT, invalid).await.unwrap_err();
    assert!(matches!(err, ProviderError::Conversion(_)));
    assert!(api.is_empty().await);
}

#[tokio::test]
async fn test_import_existing_endpoint() {
    let (_api, tester) = setup();
    tester
        .lifecycle_create(ENDPOINT, config("ep1"))
        .await
        .expect("created");

    let imported = tester
        .import_resource(ENDPOINT, "ns1/ep1")
        .await
        .expect("imported");
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, ENDPOINT);
    assert_eq!(imported[0].state["id"], "ns1/ep1");
    assert_eq!(imported[0].state["cloud_provider"]["region"], "us-east-1");

    let err = tester.import_resource(ENDPOINT, "ns1/missing").await.unwrap_err();
    assert!(err.is_not_found());
    let err = tester.import_resource(ENDPOINT, "no-slash").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidId(_)));
}

#[tokio::test]
async fn test_data_source_lists_by_tag() {
    let (_api, tester) = setup();
    for (name, tags) in [("a", json!(["prod"])), ("b", json!(["dev"]))] {
        let mut cfg = config(name);
        cfg["tags"] = tags;
        tester.lifecycle_create(ENDPOINT, cfg).await.expect("created");
    }

    tester
        .validate_data_source_config(ENDPOINTS, json!({"namespace": "ns1", "tags": ["prod"]}))
        .await
        .expect("valid config");

    let listed = tester
        .read_data_source(ENDPOINTS, json!({"namespace": "ns1", "tags": ["prod"]}))
        .await
        .expect("listed");
    let endpoints = listed["endpoints"].as_array().expect("endpoints");
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0]["id"], "ns1/a");
    assert_eq!(endpoints[0]["tags"], json!(["prod"]));

    let listed = tester
        .read_data_source(ENDPOINTS, json!({"namespace": "ns1", "tags": null}))
        .await
        .expect("listed");
    assert_eq!(listed["endpoints"].as_array().map(Vec::len), Some(2));

    let listed = tester
        .read_data_source(ENDPOINTS, json!({"namespace": "ns2", "tags": null}))
        .await
        .expect("listed");
    assert_eq!(listed["endpoints"], json!([]));
}

#[tokio::test]
async fn test_operations_require_configuration() {
    let tester = ProviderTester::new(HuggingfaceProvider::new());

    // Planning is local and works before configuration.
    tester.plan_create(ENDPOINT, config("ep1")).await.expect("plan");

    let err = tester
        .lifecycle_create(ENDPOINT, config("ep1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Configuration(_)));

    let err = tester
        .read_data_source(ENDPOINTS, json!({"namespace": "ns1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Configuration(_)));
}

#[tokio::test]
async fn test_configure_without_token_reports_diagnostics() {
    let tester = ProviderTester::new(HuggingfaceProvider::new());
    match tester.configure(json!({"hf_token": "", "api_url": null})).await {
        Err(TestError::Diagnostics(diags)) => {
            assert_eq!(diags.len(), 1);
            assert_eq!(
                diags.iter().next().map(|d| d.summary.as_str()),
                Some("Missing Hugging Face Token")
            );
        },
        other => panic!("expected diagnostics, got {:?}", other),
    }
    assert!(!tester.provider().is_configured().await);
}
