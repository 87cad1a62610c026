//! End-to-end tests over a mock Hawkular-style HTTP backend

use chrono::{Duration, Utc};
use estimator_lib::{
    ConnectionConfig, EstimatorError, HawkularBackend, ResourceKind, UsageSource,
};
use mockito::Matcher;
use std::io::Write;
use std::sync::Arc;

const WILDCARD_CPU_TAGS: &str =
    "container_base_image:registry.example/app:*,descriptor_name:cpu/usage";

fn definitions_body() -> &'static str {
    r#"[
        { "id": "test.ir.1", "type": "counter",
          "tags": { "descriptor_name": "cpu/usage", "container_base_image": "registry.example/app:latest" } },
        { "id": "test.ir.2", "type": "gauge",
          "tags": { "descriptor_name": "cpu/usage", "container_base_image": "registry.example/app:v2" } }
    ]"#
}

#[tokio::test]
async fn test_merges_samples_across_matching_series() {
    let mut server = mockito::Server::new_async().await;

    let definitions = server
        .mock("GET", "/metrics")
        .match_query(Matcher::UrlEncoded("tags".into(), WILDCARD_CPU_TAGS.into()))
        .match_header("Hawkular-Tenant", "heapster")
        .with_header("content-type", "application/json")
        .with_body(definitions_body())
        .create_async()
        .await;

    let first = server
        .mock("GET", "/counters/test.ir.1/raw")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(r#"[ { "timestamp": 1000, "value": 100 }, { "timestamp": 2000, "value": 200 } ]"#)
        .create_async()
        .await;

    let second = server
        .mock("GET", "/gauges/test.ir.2/raw")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[ { "timestamp": 1000, "value": 300.5 },
                 { "timestamp": 2000, "value": 400 },
                 { "timestamp": 3000, "value": 500 } ]"#,
        )
        .create_async()
        .await;

    let source = UsageSource::from_uri(&server.url()).unwrap();
    let end = Utc::now();
    let start = end - Duration::days(7);

    let estimate = source
        .get_usage_percentile(
            ResourceKind::Cpu,
            90,
            "registry.example/app:latest",
            "default",
            false,
            start,
            end,
        )
        .await
        .unwrap();

    assert_eq!(estimate.samples, 5);
    assert_eq!(estimate.value, 500);

    definitions.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_tenant_override_and_bearer_token_ride_on_requests() {
    let mut server = mockito::Server::new_async().await;

    let definitions = server
        .mock("GET", "/metrics")
        .match_query(Matcher::UrlEncoded(
            "tags".into(),
            "container_base_image:registry.example/app:latest,descriptor_name:memory/usage".into(),
        ))
        .match_header("Hawkular-Tenant", "staging")
        .match_header("Authorization", "Bearer sa-token")
        .with_header("content-type", "application/json")
        .with_body(r#"[ { "id": "mem.1", "type": "gauge" } ]"#)
        .create_async()
        .await;

    let datapoints = server
        .mock("GET", "/gauges/mem.1/raw")
        .match_query(Matcher::Any)
        .match_header("Hawkular-Tenant", "staging")
        .match_header("Authorization", "Bearer sa-token")
        .with_header("content-type", "application/json")
        .with_body(r#"[ { "timestamp": 1000, "value": 64.9 } ]"#)
        .create_async()
        .await;

    let mut token_file = tempfile::NamedTempFile::new().unwrap();
    token_file.write_all(b"sa-token").unwrap();

    let uri = format!("{}?tenant=staging&useServiceAccount=true", server.url());
    let config = ConnectionConfig::from_uri_with_token_path(&uri, token_file.path()).unwrap();
    let backend = HawkularBackend::new(&config).unwrap();
    let source = UsageSource::new(Arc::new(backend), config.use_namespace);

    let end = Utc::now();
    let start = end - Duration::days(1);
    let estimate = source
        .get_usage_percentile(
            ResourceKind::Memory,
            50,
            "registry.example/app:latest",
            "default",
            true,
            start,
            end,
        )
        .await
        .unwrap();

    assert_eq!(estimate.samples, 1);
    assert_eq!(estimate.value, 64);

    definitions.assert_async().await;
    datapoints.assert_async().await;
}

#[tokio::test]
async fn test_one_failing_read_fails_the_whole_call() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/metrics")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(definitions_body())
        .create_async()
        .await;

    server
        .mock("GET", "/counters/test.ir.1/raw")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(r#"[ { "timestamp": 1000, "value": 100 } ]"#)
        .create_async()
        .await;

    server
        .mock("GET", "/gauges/test.ir.2/raw")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("series storage unavailable")
        .create_async()
        .await;

    let source = UsageSource::from_uri(&server.url()).unwrap();
    let end = Utc::now();
    let start = end - Duration::days(7);

    let err = source
        .get_usage_percentile(
            ResourceKind::Cpu,
            90,
            "registry.example/app",
            "default",
            false,
            start,
            end,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EstimatorError::BackendStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_window_without_datapoints_is_an_empty_result() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/metrics")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(definitions_body())
        .create_async()
        .await;

    // One series answers 204, the other an empty body.
    server
        .mock("GET", "/counters/test.ir.1/raw")
        .match_query(Matcher::Any)
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("GET", "/gauges/test.ir.2/raw")
        .match_query(Matcher::Any)
        .with_body("")
        .create_async()
        .await;

    let source = UsageSource::from_uri(&server.url()).unwrap();
    let end = Utc::now();
    let start = end - Duration::days(7);

    let err = source
        .get_usage_percentile(
            ResourceKind::Cpu,
            90,
            "registry.example/app",
            "default",
            false,
            start,
            end,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EstimatorError::EmptySamples));
}

#[tokio::test]
async fn test_no_matching_definitions_is_an_empty_result() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/metrics")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let source = UsageSource::from_uri(&server.url()).unwrap();
    let end = Utc::now();
    let start = end - Duration::days(7);

    let err = source
        .get_usage_percentile(
            ResourceKind::Cpu,
            90,
            "registry.example/app",
            "default",
            false,
            start,
            end,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EstimatorError::EmptySamples));
}

#[tokio::test]
async fn test_failed_definitions_lookup_aborts_the_call() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/metrics")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("tenant store down")
        .create_async()
        .await;

    let source = UsageSource::from_uri(&server.url()).unwrap();
    let end = Utc::now();
    let start = end - Duration::days(7);

    let err = source
        .get_usage_percentile(
            ResourceKind::Cpu,
            90,
            "registry.example/app",
            "default",
            false,
            start,
            end,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EstimatorError::BackendStatus { status: 503, .. }
    ));
}
