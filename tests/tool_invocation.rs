//! End-to-end tests against a local API: documents are fetched over HTTP and
//! tool calls are sent to real routes.

mod common;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::{json_request, text_reply, tool_call_reply, ScriptedModel};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use toolforge::{
    ingest_documents,
    ingestion::{HttpMethod, HttpSpecFetcher, ToolParameters},
    invocation::HttpToolInvoker,
    router, AppError, AppState, Config, SpecFetcher, Tool, ToolExecutor,
};

fn api_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "servers": [{ "url": "/v1" }],
        "paths": {
            "/users": {
                "post": {
                    "operationId": "createUser",
                    "summary": "Create a user",
                    "requestBody": {
                        "content": { "application/json": { "schema": { "type": "object" } } }
                    }
                }
            },
            "/users/{id}": {
                "get": {
                    "operationId": "getUser",
                    "summary": "Get a user by id",
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } },
                        { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
                    ]
                }
            },
            "/plain": { "get": { "operationId": "getPlain" } },
            "/gone": { "get": { "operationId": "getGone" } }
        }
    })
}

async fn get_user(Path(id): Path<String>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "id": id, "verbose": query.get("verbose") }))
}

async fn create_user(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "created": body })))
}

async fn spawn_api() -> SocketAddr {
    let app = Router::new()
        .route("/spec.json", get(|| async { Json(api_document()) }))
        .route("/not-json", get(|| async { "<html></html>" }))
        .route("/v1/users", axum::routing::post(create_user))
        .route("/v1/users/:id", get(get_user))
        .route("/v1/plain", get(|| async { "plain text" }))
        .route(
            "/v1/gone",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "message": "gone" }))) }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Accepts connections and then goes quiet. With `partial_body` the headers
/// and the first bytes of a longer body are sent before stalling.
async fn spawn_stalling_server(partial_body: bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                if partial_body {
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"partial\":",
                        )
                        .await;
                }
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });
    addr
}

fn slow_tool(addr: SocketAddr) -> Tool {
    Tool {
        name: "getSlow".to_string(),
        description: "Get something slowly".to_string(),
        parameters: ToolParameters::new(),
        method: HttpMethod::Get,
        path: "/slow".to_string(),
        base_url: format!("http://{}", addr),
        consumes: Vec::new(),
    }
}

async fn ingested_tools(addr: SocketAddr) -> Vec<Tool> {
    let fetcher = HttpSpecFetcher::new(Duration::from_secs(5)).unwrap();
    ingest_documents(&[format!("http://{}/spec.json", addr)], &fetcher)
        .await
        .unwrap()
        .tools
}

fn find<'a>(tools: &'a [Tool], name: &str) -> &'a Tool {
    tools.iter().find(|t| t.name == name).unwrap()
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn test_relative_server_url_resolves_against_document_host() {
    let addr = spawn_api().await;
    let tools = ingested_tools(addr).await;

    assert_eq!(tools.len(), 4);
    assert!(tools.iter().all(|t| t.base_url == format!("http://{}/v1", addr)));
}

#[tokio::test]
async fn test_fetch_failures() {
    let addr = spawn_api().await;
    let fetcher = HttpSpecFetcher::new(Duration::from_secs(5)).unwrap();

    let missing = fetcher.fetch_json(&format!("http://{}/nothing.json", addr)).await;
    assert!(matches!(missing, Err(AppError::FetchError(_))));

    let not_json = fetcher.fetch_json(&format!("http://{}/not-json", addr)).await;
    assert!(matches!(not_json, Err(AppError::FetchError(_))));
}

#[tokio::test]
async fn test_get_with_encoded_path_and_query() {
    let addr = spawn_api().await;
    let tools = ingested_tools(addr).await;
    let invoker = HttpToolInvoker::new(Duration::from_secs(5)).unwrap();

    let result = invoker
        .execute(find(&tools, "getUser"), &args(json!({ "id": "a b", "verbose": true })))
        .await;

    assert_eq!(result.status_code, 200);
    assert!(result.url.ends_with("/v1/users/a%20b"));
    assert_eq!(result.data, Some(json!({ "id": "a b", "verbose": "true" })));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_post_sends_body() {
    let addr = spawn_api().await;
    let tools = ingested_tools(addr).await;
    let invoker = HttpToolInvoker::new(Duration::from_secs(5)).unwrap();

    let result = invoker
        .execute(find(&tools, "createUser"), &args(json!({ "body": { "name": "Ann" } })))
        .await;

    assert_eq!(result.status_code, 201);
    assert_eq!(result.data.unwrap()["created"]["name"], "Ann");
}

#[tokio::test]
async fn test_non_json_and_error_statuses_are_results() {
    let addr = spawn_api().await;
    let tools = ingested_tools(addr).await;
    let invoker = HttpToolInvoker::new(Duration::from_secs(5)).unwrap();

    let plain = invoker.execute(find(&tools, "getPlain"), &Map::new()).await;
    assert_eq!(plain.status_code, 200);
    assert_eq!(plain.data, Some(json!({ "text": "plain text" })));

    let gone = invoker.execute(find(&tools, "getGone"), &Map::new()).await;
    assert_eq!(gone.status_code, 404);
    assert_eq!(gone.data.unwrap()["message"], "gone");
    assert!(gone.error.is_none());
}

#[tokio::test]
async fn test_unreachable_host_is_bad_gateway() {
    let addr = spawn_api().await;
    let mut tool = find(&ingested_tools(addr).await, "getPlain").clone();
    tool.base_url = "http://127.0.0.1:1".to_string();
    let invoker = HttpToolInvoker::new(Duration::from_secs(5)).unwrap();

    let result = invoker.execute(&tool, &Map::new()).await;

    assert_eq!(result.status_code, 502);
    assert!(result.error.is_some());
    assert!(result.data.is_none());
}

#[tokio::test]
async fn test_chat_turn_calls_live_api() {
    let addr = spawn_api().await;
    let model = Arc::new(ScriptedModel::new(vec![
        tool_call_reply("getUser", json!({ "id": "42" })),
        text_reply("User 42 found."),
    ]));
    let state = Arc::new(AppState::with_components(
        Config::default(),
        Arc::new(HttpSpecFetcher::new(Duration::from_secs(5)).unwrap()),
        Arc::new(HttpToolInvoker::new(Duration::from_secs(5)).unwrap()),
        model,
    ));

    let (status, _) = json_request(
        router(state.clone()),
        "POST",
        "/ingest",
        Some(json!({
            "swagger_urls": [format!("http://{}/spec.json", addr)],
            "session_id": "live"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = json_request(
        router(state),
        "POST",
        "/chat",
        Some(json!({ "session_id": "live", "message": "get user 42" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "User 42 found.");
    assert_eq!(body["tool_result"]["status_code"], 200);
    assert_eq!(body["tool_result"]["data"]["id"], "42");
    assert_eq!(body["tool_result"]["url"], format!("http://{}/v1/users/42", addr));
}

#[tokio::test]
async fn test_unanswered_request_times_out_as_gateway_timeout() {
    let addr = spawn_stalling_server(false).await;
    let invoker = HttpToolInvoker::new(Duration::from_millis(500)).unwrap();

    let result = invoker.execute(&slow_tool(addr), &Map::new()).await;

    assert_eq!(result.status_code, 504);
    assert!(result.error.is_some());
    assert!(result.data.is_none());
    assert!(!result.is_success());
}

#[tokio::test]
async fn test_stalled_body_times_out_as_gateway_timeout() {
    let addr = spawn_stalling_server(true).await;
    let invoker = HttpToolInvoker::new(Duration::from_millis(500)).unwrap();

    let result = invoker.execute(&slow_tool(addr), &Map::new()).await;

    assert_eq!(result.status_code, 504);
    assert!(result.error.is_some());
    assert!(result.data.is_none());
    assert_eq!(result.url, format!("http://{}/slow", addr));
}

#[tokio::test]
async fn test_fetch_timeouts_are_fetch_errors() {
    let fetcher = HttpSpecFetcher::new(Duration::from_millis(500)).unwrap();

    for partial_body in [false, true] {
        let addr = spawn_stalling_server(partial_body).await;
        let result = fetcher.fetch_json(&format!("http://{}/spec.json", addr)).await;
        assert!(
            matches!(result, Err(AppError::FetchError(_))),
            "partial_body={} gave {:?}",
            partial_body,
            result
        );
    }
}
