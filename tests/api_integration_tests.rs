//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint on a single
//! node, plus end-to-end peer forwarding between two real nodes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use peercache::api::create_router;
use peercache::{AppState, HttpPeerPool, Registry};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let registry = Arc::new(Registry::new());
    registry.create(0, 1 << 16).unwrap();
    registry.create(1, 1 << 16).unwrap();
    create_router(AppState::new(registry))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn put_request(db: u8, json: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/cache/{}", db))
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

// == PUT Endpoint Tests ==

#[tokio::test]
async fn test_put_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request(0, r#"{"test_key":"test_value"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["stored"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn test_put_endpoint_multiple_entries() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put_request(0, r#"{"a":"1","b":"2","c":"3"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for (key, value) in [("a", "1"), ("b", "2"), ("c", "3")] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/cache/0/{}", key))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_to_string(response.into_body()).await, value);
    }
}

#[tokio::test]
async fn test_put_endpoint_malformed_body() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request(0, "this is not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_endpoint_unknown_database() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request(9, r#"{"k":"v"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_endpoint_empty_key() {
    let app = create_test_app();

    let response = app.oneshot(put_request(0, r#"{"":"v"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_returns_raw_bytes() {
    let app = create_test_app();

    let put = app
        .clone()
        .oneshot(put_request(0, r#"{"get_key":"get_value"}"#))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/0/get_key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_to_string(response.into_body()).await, "get_value");
}

#[tokio::test]
async fn test_get_endpoint_absent_key() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/0/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_endpoint_bad_database_id() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/not-a-number/key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_databases_are_isolated() {
    let app = create_test_app();

    let put = app
        .clone()
        .oneshot(put_request(0, r#"{"shared_key":"db0_value"}"#))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    // Same key in database 1 must not resolve
    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/1/shared_key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();

    let put = app
        .clone()
        .oneshot(put_request(0, r#"{"doomed":"value"}"#))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cache/0/doomed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/0/doomed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_unknown_database() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cache/9/key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    let put = app
        .clone()
        .oneshot(put_request(0, r#"{"k":"v"}"#))
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::OK);

    // One hit, one miss
    let _ = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/0/k")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let _ = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/0/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats/0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
}

// == Two-Node Peer Tests ==

/// Spawns a real node on an ephemeral port: one database (id 0) wired to
/// a peer pool with no peers configured. Returns the node's base URL.
async fn spawn_standalone_node() -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let pool = Arc::new(HttpPeerPool::new(url.clone()));
    let registry = Arc::new(Registry::new());
    let db = registry.create(0, 1 << 16).unwrap();
    db.register_peers(pool).unwrap();

    let app = create_router(AppState::new(registry));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    url
}

#[tokio::test]
async fn test_two_nodes_share_ownership() {
    // Fixed URLs are not known until bind, so each node registers the
    // OTHER node's URL after both listeners exist
    let listener_a = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let listener_b = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let url_a = format!("http://{}", listener_a.local_addr().unwrap());
    let url_b = format!("http://{}", listener_b.local_addr().unwrap());
    let peer_set = vec![url_a.clone(), url_b.clone()];

    for (listener, url) in [(listener_a, &url_a), (listener_b, &url_b)] {
        let mut pool = HttpPeerPool::new(url.clone());
        pool.set_peers(peer_set.clone());
        let registry = Arc::new(Registry::new());
        let db = registry.create(0, 1 << 16).unwrap();
        db.register_peers(Arc::new(pool)).unwrap();
        let app = create_router(AppState::new(registry));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
    }

    let http = reqwest::Client::new();

    // Writes through node A land on whichever node owns each key
    for i in 0..10 {
        let mut body = std::collections::HashMap::new();
        body.insert(format!("key-{}", i), format!("value-{}", i));
        let response = http
            .put(format!("{}/cache/0", url_a))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    // Reads through node B resolve every key, local or forwarded
    for i in 0..10 {
        let response = http
            .get(format!("{}/cache/0/key-{}", url_b, i))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), format!("value-{}", i));
    }

    // Deletes through node A make keys unresolvable from both nodes.
    // Node B may still hold pass-through copies of keys it read above,
    // so delete through B as well before checking.
    for i in 0..10 {
        for url in [&url_a, &url_b] {
            let response = http
                .delete(format!("{}/cache/0/key-{}", url, i))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::OK);
        }
    }
    for i in 0..10 {
        let response = http
            .get(format!("{}/cache/0/key-{}", url_a, i))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_standalone_node_serves_locally() {
    let url = spawn_standalone_node().await;
    let http = reqwest::Client::new();

    let response = http
        .put(format!("{}/cache/0", url))
        .json(&serde_json::json!({"solo": "value"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = http
        .get(format!("{}/cache/0/solo", url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "value");
}

#[tokio::test]
async fn test_peer_fetch_failure_degrades_to_miss() {
    // The peer set routes some keys to a dead address; gets for those
    // keys must come back 404, not 502
    let dead_peer = "http://127.0.0.1:1".to_string();
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let mut pool = HttpPeerPool::new(url.clone());
    pool.set_peers([url.clone(), dead_peer]);
    let registry = Arc::new(Registry::new());
    let db = registry.create(0, 1 << 16).unwrap();
    db.register_peers(Arc::new(pool)).unwrap();
    let app = create_router(AppState::new(registry));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let http = reqwest::Client::new();
    for i in 0..20 {
        let response = http
            .get(format!("{}/cache/0/absent-{}", url, i))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
