use std::sync::Arc;

use super::*;
use axum::{
    extract::{Multipart, Path as UrlPath, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::{domain::SessionTimestamp, error::ApiError, protocol::DEFAULT_BPF_FILTER};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq)]
struct ReceivedUpload {
    field: String,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct ServerState {
    json_bodies: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
}

fn analysis_body(timestamp: &str) -> Value {
    json!({
        "success": true,
        "timestamp": timestamp,
        "statistics": {
            "total_records": 120,
            "anomaly_count": 6,
            "anomaly_percentage": 5.0
        },
        "recommendations": []
    })
}

async fn handle_generate(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.json_bodies.lock().await.push(body.clone());
    if body["start_date"] == "not-a-date" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::to_value(ApiError::new("bad date")).expect("envelope")),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "filename": "sample_2024.csv", "records": 48 })),
    )
}

async fn handle_analyze(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let upload = ReceivedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            bytes: field.bytes().await.expect("field bytes").to_vec(),
        };
        state.uploads.lock().await.push(upload);
    }
    Json(analysis_body("20240101_000000"))
}

async fn handle_capture(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.json_bodies.lock().await.push(body);
    // Failure carried in a 200 response.
    Json(json!({ "error": "Interface is required" }))
}

async fn handle_report(UrlPath(timestamp): UrlPath<String>) -> impl IntoResponse {
    if timestamp == "missing" {
        return (StatusCode::NOT_FOUND, Vec::new());
    }
    (StatusCode::OK, format!("report for {timestamp}").into_bytes())
}

async fn handle_malformed() -> &'static str {
    "<html>Internal Server Error</html>"
}

async fn spawn_backend() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/generate_data", post(handle_generate))
        .route("/analyze", post(handle_analyze))
        .route("/capture_and_analyze", post(handle_capture))
        .route("/download/:timestamp", get(handle_report))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

async fn spawn_malformed_backend() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/generate_data", post(handle_malformed));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn generate_data_posts_json_and_returns_filename() {
    let (server_url, state) = spawn_backend().await;
    let client = HttpAnalysisClient::new(&server_url).expect("client");

    let result = client
        .generate_data(GenerationRequest {
            start_date: "2024-01-01T00:00".into(),
            duration: Some(24),
        })
        .await
        .expect("generate");

    assert_eq!(result.filename.as_str(), "sample_2024.csv");
    assert_eq!(result.records, Some(48));
    let bodies = state.json_bodies.lock().await;
    assert_eq!(
        bodies.as_slice(),
        &[json!({ "start_date": "2024-01-01T00:00", "duration": 24 })]
    );
}

#[tokio::test]
async fn error_envelope_becomes_remote_failure_with_verbatim_text() {
    let (server_url, _state) = spawn_backend().await;
    let client = HttpAnalysisClient::new(&server_url).expect("client");

    let err = client
        .generate_data(GenerationRequest {
            start_date: "not-a-date".into(),
            duration: None,
        })
        .await
        .expect_err("should fail");

    assert!(err.is_remote());
    assert_eq!(err.message(), "bad date");
}

#[tokio::test]
async fn error_field_in_success_status_is_still_a_failure() {
    let (server_url, state) = spawn_backend().await;
    let client = HttpAnalysisClient::new(&server_url).expect("client");

    let err = client
        .capture_and_analyze(CaptureRequest {
            interface: "eth0".into(),
            duration: 10,
            bpf: DEFAULT_BPF_FILTER.into(),
            max_packets: None,
            tshark_path: None,
        })
        .await
        .expect_err("should fail");

    assert_eq!(err.message(), "Interface is required");
    let bodies = state.json_bodies.lock().await;
    assert_eq!(bodies[0]["bpf"], "tcp or udp");
    assert!(bodies[0].get("max_packets").is_none());
}

#[tokio::test]
async fn analyze_file_sends_single_multipart_file_part() {
    let (server_url, state) = spawn_backend().await;
    let client = HttpAnalysisClient::new(&format!("{server_url}/")).expect("client");

    let result = client
        .analyze_file(UploadFile::new("traffic.csv", b"a,b\n1,2\n".to_vec()))
        .await
        .expect("analyze");

    assert_eq!(result.timestamp, SessionTimestamp::new("20240101_000000"));
    assert_eq!(result.statistics.total_records, 120);
    let uploads = state.uploads.lock().await;
    assert_eq!(
        uploads.as_slice(),
        &[ReceivedUpload {
            field: "file".into(),
            file_name: Some("traffic.csv".into()),
            bytes: b"a,b\n1,2\n".to_vec(),
        }]
    );
}

#[tokio::test]
async fn non_json_body_is_a_decode_failure() {
    let server_url = spawn_malformed_backend().await;
    let client = HttpAnalysisClient::new(&server_url).expect("client");

    let err = client
        .generate_data(GenerationRequest {
            start_date: "2024-01-01".into(),
            duration: None,
        })
        .await
        .expect_err("should fail");

    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn transport_failure_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let client = HttpAnalysisClient::new(&format!("http://{addr}")).expect("client");

    let err = client
        .generate_data(GenerationRequest {
            start_date: "2024-01-01".into(),
            duration: None,
        })
        .await
        .expect_err("should fail");

    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn fetch_artifact_returns_bytes_and_flags_missing_resources() {
    let (server_url, _state) = spawn_backend().await;
    let client = HttpAnalysisClient::new(&server_url).expect("client");

    let report = client
        .fetch_artifact(&routes::report_download(&SessionTimestamp::new("20240101-0102")))
        .await
        .expect("report");
    assert_eq!(report, b"report for 20240101-0102".to_vec());

    let err = client
        .fetch_artifact("/download/missing")
        .await
        .expect_err("missing");
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[test]
fn rejects_unparseable_server_url() {
    let err = HttpAnalysisClient::new("not a url").err().expect("invalid url");
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
}

#[tokio::test]
async fn upload_file_from_path_keeps_file_name() {
    let dir = std::env::temp_dir().join(format!("client_core_upload_{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("dir");
    let path = dir.join("capture.csv");
    tokio::fs::write(&path, b"x").await.expect("write");

    let upload = UploadFile::from_path(&path).await.expect("read");
    assert_eq!(upload.file_name, "capture.csv");
    assert_eq!(upload.bytes, b"x".to_vec());

    tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
}
