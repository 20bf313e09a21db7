//! REST router tests driven through `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use common::{demo_refinery, NOVEL};
use refinery::http::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState {
        refinery: demo_refinery(),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn import(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/manuscripts",
        Some(json!({ "title": "The Lantern Keeper", "text": NOVEL })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_mode() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["mode"], "demo");
}

#[tokio::test]
async fn manuscript_crud() {
    let app = app();
    let id = import(&app).await;

    let (status, list) = send(&app, Method::GET, "/api/v1/manuscripts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["chapter_count"], 4);

    let (status, m) = send(&app, Method::GET, &format!("/api/v1/manuscripts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["chapters"][0]["title"], "Chapter 1: The Light");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/manuscripts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/manuscripts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn validation_errors_are_400() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/manuscripts",
        Some(json!({ "title": "Slides", "text": "x", "file_type": "pptx" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unsupported file type"));

    let id = import(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/analysis/run",
        Some(json!({ "manuscript_id": id, "module": "tarot_reading" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/manuscripts")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": \"Half"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    // Well-formed JSON with a missing field is also a 400, not a 422.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/manuscripts",
        Some(json!({ "title": "No text" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("text"));

    let id = import(&app).await;
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/manuscripts/{}/queue?status=maybe", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn analysis_queue_and_score() {
    let app = app();
    let id = import(&app).await;

    let (status, results) = send(
        &app,
        Method::POST,
        "/api/v1/analysis/run-all",
        Some(json!({ "manuscript_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 6);

    let (status, listed) = send(&app, Method::GET, &format!("/api/v1/analysis/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let result_id = listed[0]["id"].as_str().unwrap().to_string();
    assert_eq!(listed[0]["module"], "intelligence_engine");

    let (status, one) = send(
        &app,
        Method::GET,
        &format!("/api/v1/analysis/result/{}", result_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["status"], "completed");

    let (status, queue) = send(
        &app,
        Method::GET,
        &format!("/api/v1/manuscripts/{}/queue", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let total = queue["stats"]["total"].as_u64().unwrap();
    assert!(total > 0);

    let (status, item) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/manuscripts/{}/queue/1", id),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "accepted");

    let (_, accepted) = send(
        &app,
        Method::GET,
        &format!("/api/v1/manuscripts/{}/queue?status=accepted", id),
        None,
    )
    .await;
    assert_eq!(accepted["items"].as_array().unwrap().len(), 1);

    let (status, score) = send(
        &app,
        Method::POST,
        &format!("/api/v1/manuscripts/{}/score", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(score["acquisition_score"].as_u64().unwrap() <= 100);

    let (status, report) = send(
        &app,
        Method::POST,
        &format!("/api/v1/manuscripts/{}/reports", id),
        Some(json!({ "kind": "rejection", "tone": "encouraging" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["kind"], "rejection");
    assert_eq!(report["report"]["tone"], "encouraging");
}

#[tokio::test]
async fn report_without_results_is_400() {
    let app = app();
    let id = import(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/manuscripts/{}/reports", id),
        Some(json!({ "kind": "reader" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn workflow_and_annotations() {
    let app = app();
    let id = import(&app).await;

    let (status, decision) = send(
        &app,
        Method::GET,
        &format!("/api/v1/manuscripts/{}/workflow", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["stage"], "unreviewed");

    let (status, decision) = send(
        &app,
        Method::POST,
        &format!("/api/v1/manuscripts/{}/workflow/advance", id),
        Some(json!({ "notes": "Strong voice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["stage"], "reader_reviewed");
    assert_eq!(decision["reader_notes"], "Strong voice");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/manuscripts/{}/workflow/advance", id),
        Some(json!({ "outcome": "acquire" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, note) = send(
        &app,
        Method::POST,
        &format!("/api/v1/manuscripts/{}/annotations", id),
        Some(json!({ "content": "Storm scene drags", "kind": "suggestion", "chapter": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = note["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/annotations/{}", note_id),
        Some(json!({ "content": "Storm scene drags in the middle" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "Storm scene drags in the middle");

    let (_, notes) = send(
        &app,
        Method::GET,
        &format!("/api/v1/manuscripts/{}/annotations", id),
        None,
    )
    .await;
    assert_eq!(notes.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/annotations/{}", note_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/annotations/{}", note_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
