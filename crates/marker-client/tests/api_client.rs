//! ApiClient against an in-process backend.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use marker_client::{ApiClient, ApiConfig, ApiError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

async fn spawn_backend(app: Router) -> ApiConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiConfig::new(format!("http://{}", addr))
}

fn echo_backend() -> Router {
    Router::new()
        .route(
            "/api/pdf/process",
            post(|Json(body): Json<Value>| async move { Json(json!({ "received": body })) }),
        )
        .route(
            "/api/pdf/list",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "directory": body["directory"],
                    "files": ["a.pdf", "b.pdf"],
                }))
            }),
        )
}

#[tokio::test]
async fn submit_sends_data_path_and_timestamp() {
    let config = spawn_backend(echo_backend()).await;
    let client = ApiClient::new(config).unwrap();

    let data = json!({ "name": "Invoice", "fields": [1, 2, 3] });
    let response = client.submit_pdf_data(&data, "/srv/docs/invoice.pdf").await.unwrap();

    let received = &response["received"];
    assert_eq!(received["data"], data);
    assert_eq!(received["pdfPath"], "/srv/docs/invoice.pdf");

    let timestamp = received["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'), "timestamp should be UTC: {}", timestamp);
    assert_eq!(timestamp.len(), "2024-01-01T00:00:00.000Z".len());
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn list_sends_directory() {
    let config = spawn_backend(echo_backend()).await;
    let client = ApiClient::new(config).unwrap();

    let response = client.list_pdfs("/srv/docs").await.unwrap();

    assert_eq!(
        response,
        json!({ "directory": "/srv/docs", "files": ["a.pdf", "b.pdf"] })
    );
}

#[tokio::test]
async fn non_success_status_is_network_error() {
    let app = Router::new().route(
        "/api/pdf/list",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let config = spawn_backend(app).await;
    let client = ApiClient::new(config).unwrap();

    let err = client.list_pdfs("/srv/docs").await.unwrap_err();

    match &err {
        ApiError::Network { status, reason } => {
            assert_eq!(*status, 503);
            assert_eq!(reason, "Service Unavailable");
        }
        other => panic!("expected network error, got {:?}", other),
    }
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "API Error: 503 Service Unavailable");
}

#[tokio::test]
async fn missing_route_is_network_error() {
    let config = spawn_backend(Router::new()).await;
    let client = ApiClient::new(config).unwrap();

    let err = client.submit_pdf_data(&json!({}), "x.pdf").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let app = Router::new().route("/api/pdf/list", post(|| async { "not json" }));
    let config = spawn_backend(app).await;
    let client = ApiClient::new(config).unwrap();

    let err = client.list_pdfs("/").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(ApiConfig::new(format!("http://{}", addr))).unwrap();
    let err = client.list_pdfs("/").await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "got {:?}", err);
    assert_eq!(err.status(), None);
}
