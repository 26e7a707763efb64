use kubeops_api::routes::ErrorMessage;
use kubeops_api::routes::pods::{ReadPodResponse, ReadPodsResponse};
use kubeops_k8s::fake::FakeCluster;
use reqwest::StatusCode;

mod support;

use support::spawn_test_app;

fn cluster() -> FakeCluster {
    FakeCluster::new()
        .with_namespace("a")
        .with_namespace("b")
        .with_namespace("empty-ns")
        .with_pod("a", "p1", "Running")
        .with_pod("b", "p2", "Pending")
        .with_pod("kube-system", "coredns", "Running")
}

#[tokio::test]
async fn pods_in_namespace_are_listed_by_name() {
    let app = spawn_test_app(cluster()).await;

    let response = app.get("/api/v1/namespaces/a/pods").await;

    assert_eq!(response.status(), StatusCode::OK);
    let response: ReadPodsResponse = response.json().await.unwrap();
    assert_eq!(response.data, vec!["p1"]);
    assert_eq!(response.namespace, "a");
}

#[tokio::test]
async fn namespace_without_pods_lists_empty_array() {
    let app = spawn_test_app(cluster()).await;

    let response = app.get("/api/v1/namespaces/empty-ns/pods").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "data": [], "namespace": "empty-ns" }));
}

#[tokio::test]
async fn existing_pod_can_be_read() {
    let app = spawn_test_app(cluster()).await;

    let response = app.get("/api/v1/namespaces/b/pods/p2").await;

    assert_eq!(response.status(), StatusCode::OK);
    let response: ReadPodResponse = response.json().await.unwrap();
    assert_eq!(response.data, "p2");
    assert_eq!(response.namespace, "b");
}

#[tokio::test]
async fn missing_pod_is_not_found() {
    let app = spawn_test_app(cluster()).await;

    let response = app.get("/api/v1/namespaces/default/pods/missing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response: ErrorMessage = response.json().await.unwrap();
    assert_eq!(response.error, "Pod not found");
    assert!(!response.details.is_empty());
}

#[tokio::test]
async fn all_pods_are_listed_across_namespaces() {
    let app = spawn_test_app(cluster()).await;

    let response = app.get("/api/v1/pods").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "data": [
                { "namespace": "a", "name": "p1", "status": "Running" },
                { "namespace": "b", "name": "p2", "status": "Pending" },
                { "namespace": "kube-system", "name": "coredns", "status": "Running" },
            ]
        })
    );
}

#[tokio::test]
async fn upstream_failures_are_internal_server_errors() {
    let app = spawn_test_app(cluster().failing(503, "apiserver is shutting down")).await;

    for (path, message) in [
        ("/api/v1/namespaces/a/pods", "Failed to list pods"),
        ("/api/v1/namespaces/a/pods/p1", "Failed to get pod"),
        ("/api/v1/pods", "Failed to list all pods"),
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        let response: ErrorMessage = response.json().await.unwrap();
        assert_eq!(response.error, message);
        assert!(response.details.contains("apiserver is shutting down"));
    }
}
