#![allow(clippy::float_cmp)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};

use super::*;
use crate::canvas::Edge;
use crate::sync::dataset::DynamicalSystem;
use crate::sync::payload::{BlockInfo, GraphNode};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn recording_backend(seen: Seen) -> Router {
    Router::new()
        .route(
            CONSTRUCT_PATH,
            post(|State(seen): State<Seen>, axum::Json(body): axum::Json<Value>| async move {
                seen.lock().unwrap().push(body);
                axum::Json(json!({"message": "Problem created successfully =p1"}))
            }),
        )
        .route(
            TRAIN_PATH,
            post(|State(seen): State<Seen>, axum::Json(body): axum::Json<Value>| async move {
                seen.lock().unwrap().push(body);
                axum::Json(json!({"message": "Trained successfully =p1"}))
            }),
        )
        .route(
            PLOT_SYSTEM_PATH,
            post(|State(seen): State<Seen>, axum::Json(body): axum::Json<Value>| async move {
                seen.lock().unwrap().push(body);
                axum::Json(json!({
                    "System_name": "VanDerPol",
                    "Num_simulations": 2,
                    "Y_data": {"Y": [[0.1, 0.2], [0.3, 0.4]]},
                    "nx": 2
                }))
            }),
        )
        .with_state(seen)
}

fn client(url: &str) -> HttpBackend {
    HttpBackend::new(SyncConfig::default().with_backend_url(url)).unwrap()
}

fn sample_payload() -> GraphPayload {
    let node = |id: &str, kind: &str| GraphNode {
        id: id.to_string(),
        block_info: BlockInfo {
            id: id.to_string(),
            name: kind.to_string(),
            kind_id: kind.to_string(),
            label: kind.to_uppercase(),
            class_type: "neuromancer_block".to_string(),
            category: crate::registry::BlockCategory::Layer,
            x: 0.0,
            y: 0.0,
        },
    };
    GraphPayload {
        problem_id: "p1".to_string(),
        nodes: vec![node("b1", "linear"), node("b2", "mlp")],
        edges: vec![Edge::new("b1", "b2")],
    }
}

// =============================================================
// success paths
// =============================================================

#[tokio::test]
async fn construct_wraps_payload_in_data() {
    let seen = Seen::default();
    let url = spawn_backend(recording_backend(seen.clone())).await;

    let ack = client(&url).construct(&sample_payload()).await.unwrap();
    assert_eq!(ack.status, 200);
    assert!(ack.body.contains("Problem created successfully"));

    let bodies = seen.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["data"]["problemId"], "p1");
    assert_eq!(bodies[0]["data"]["nodes"][1]["blockInfo"]["name"], "mlp");
    assert_eq!(bodies[0]["data"]["edges"][0]["sourceInstanceId"], "b1");
}

#[tokio::test]
async fn train_sends_problem_id() {
    let seen = Seen::default();
    let url = spawn_backend(recording_backend(seen.clone())).await;

    let ack = client(&url).train("p1").await.unwrap();
    assert_eq!(ack.status, 200);
    assert_eq!(seen.lock().unwrap()[0], json!({"problemId": "p1"}));
}

#[tokio::test]
async fn plot_system_parses_trajectory() {
    let seen = Seen::default();
    let url = spawn_backend(recording_backend(seen.clone())).await;

    let request = PlotRequest::new("dataset_abc", DynamicalSystem::VanDerPol, 2).unwrap();
    let series = client(&url).plot_system(&request).await.unwrap();
    assert_eq!(series.points, [(0.1, 0.2), (0.3, 0.4)]);
    assert_eq!(series.nx, Some(2));
    assert_eq!(
        seen.lock().unwrap()[0],
        json!({"id": "dataset_abc", "system": "VanDerPol", "numSimulations": 2})
    );
}

#[tokio::test]
async fn empty_success_body_is_accepted() {
    let app = Router::new().route(CONSTRUCT_PATH, post(|| async { StatusCode::NO_CONTENT }));
    let url = spawn_backend(app).await;

    let ack = client(&url).construct(&sample_payload()).await.unwrap();
    assert_eq!(ack, Ack { status: 204, body: String::new() });
}

// =============================================================
// failure paths
// =============================================================

#[tokio::test]
async fn client_error_is_rejected_with_body() {
    let app = Router::new().route(
        CONSTRUCT_PATH,
        post(|| async { (StatusCode::BAD_REQUEST, r#"{"error": "Request must contain JSON data"}"#) }),
    );
    let url = spawn_backend(app).await;

    let err = client(&url).construct(&sample_payload()).await.unwrap_err();
    match err {
        SyncError::BackendRejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Request must contain JSON data"));
        }
        other => panic!("expected BackendRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_rejected() {
    let app = Router::new().route(
        TRAIN_PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "KeyError: 'p1'") }),
    );
    let url = spawn_backend(app).await;

    let err = client(&url).train("p1").await.unwrap_err();
    assert!(matches!(err, SyncError::BackendRejected { status: 500, ref body } if body.contains("KeyError")));
}

#[tokio::test]
async fn missing_route_is_rejected_404() {
    let url = spawn_backend(Router::new()).await;
    let err = client(&url).train("p1").await.unwrap_err();
    assert!(matches!(err, SyncError::BackendRejected { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .construct(&sample_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::BackendUnavailable(_)));
}

#[tokio::test]
async fn malformed_plot_response_is_invalid() {
    let app = Router::new().route(PLOT_SYSTEM_PATH, post(|| async { axum::Json(json!({"Y_data": {"Y": [[1.0]]}})) }));
    let url = spawn_backend(app).await;

    let request = PlotRequest::new("d", DynamicalSystem::Pendulum, 1).unwrap();
    let err = client(&url).plot_system(&request).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidResponse(_)));
}

#[tokio::test]
async fn request_timeout_surfaces_as_unavailable() {
    let app = Router::new().route(
        CONSTRUCT_PATH,
        post(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            StatusCode::OK
        }),
    );
    let url = spawn_backend(app).await;

    let config = SyncConfig::new(&url, crate::sync::config::BackendTimeouts { request_secs: Some(1), connect_secs: 1 });
    let err = HttpBackend::new(config)
        .unwrap()
        .construct(&sample_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::BackendUnavailable(_)));
}
