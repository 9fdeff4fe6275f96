//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use toolforge::{
    ingestion::StaticSpecFetcher,
    llm::{AssistantReply, ChatMessage, ChatModel, FunctionDescriptor, ToolCall},
    AppState, Config, Result, Tool, ToolExecutor, ToolResult,
};
use tower::ServiceExt;

pub const USERS_SPEC: &str = "https://specs.example/users.json";
pub const PETS_SPEC: &str = "https://specs.example/pets.json";
pub const LEGACY_SPEC: &str = "https://legacy.example/api-docs";

pub fn users_document() -> Value {
    json!({
        "openapi": "3.0.1",
        "info": { "title": "Users", "version": "1" },
        "servers": [{ "url": "https://api.users.example/v1" }],
        "paths": {
            "/users": {
                "get": {
                    "operationId": "listUsers",
                    "summary": "List users",
                    "parameters": [
                        { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                    ]
                },
                "post": {
                    "operationId": "createUser",
                    "summary": "Create a user",
                    "requestBody": {
                        "content": { "application/json": { "schema": { "type": "object" } } }
                    }
                },
                "head": { "operationId": "headUsers" }
            },
            "/users/{id}": {
                "get": {
                    "operationId": "getUser",
                    "summary": "Get a user by id",
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }
                    ]
                },
                "delete": { "operationId": "deleteUser", "summary": "Delete a user" },
                "options": { "operationId": "optionsUser" }
            }
        }
    })
}

pub fn pets_document() -> Value {
    json!({
        "swagger": "2.0",
        "host": "pets.example",
        "basePath": "/api",
        "schemes": ["http"],
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "findPets",
                    "summary": "Find pets by tag",
                    "parameters": [
                        { "name": "tags", "in": "query", "type": "array", "items": { "type": "string" } }
                    ]
                }
            },
            "/pets/{petId}/uploadImage": {
                "post": {
                    "operationId": "uploadPetImage",
                    "summary": "Upload an image",
                    "consumes": ["multipart/form-data"]
                }
            }
        }
    })
}

pub fn legacy_listing() -> Value {
    json!({
        "swaggerVersion": "1.2",
        "basePath": "https://legacy.example/api",
        "apis": [{ "path": "/store" }, { "path": "/gone" }]
    })
}

pub fn legacy_declaration() -> Value {
    json!({
        "swaggerVersion": "1.2",
        "apis": [{
            "path": "/store/order/{orderId}",
            "operations": [{
                "method": "GET",
                "nickname": "getOrderById",
                "summary": "Find purchase order by id",
                "parameters": [
                    { "name": "orderId", "paramType": "path", "required": true, "type": "integer" }
                ]
            }]
        }]
    })
}

pub fn fetcher() -> StaticSpecFetcher {
    StaticSpecFetcher::new()
        .with_document(USERS_SPEC, users_document())
        .with_document(PETS_SPEC, pets_document())
        .with_document(LEGACY_SPEC, legacy_listing())
        .with_document("https://legacy.example/store", legacy_declaration())
}

/// Replays canned replies in order and records what each call was given.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<AssistantReply>>,
    pub offered: Mutex<Vec<Vec<String>>>,
    pub conversations: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<AssistantReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn offered(&self) -> Vec<Vec<String>> {
        self.offered.lock().unwrap().clone()
    }

    pub fn conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.conversations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[FunctionDescriptor],
    ) -> Result<AssistantReply> {
        self.offered
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());
        self.conversations.lock().unwrap().push(messages.to_vec());
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| text_reply("done")))
    }
}

pub fn text_reply(text: &str) -> AssistantReply {
    AssistantReply {
        content: Some(text.to_string()),
        tool_calls: Vec::new(),
    }
}

pub fn tool_call_reply(name: &str, arguments: Value) -> AssistantReply {
    AssistantReply {
        content: None,
        tool_calls: vec![ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
    }
}

/// Records calls and answers every one with `200 {"ok": true}`.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl RecordingExecutor {
    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutor for RecordingExecutor {
    async fn execute(&self, tool: &Tool, arguments: &Map<String, Value>) -> ToolResult {
        self.calls
            .lock()
            .unwrap()
            .push((tool.name.clone(), arguments.clone()));
        ToolResult {
            status_code: 200,
            data: Some(json!({ "ok": true })),
            error: None,
            url: format!("{}{}", tool.base_url, tool.path),
        }
    }
}

pub fn state_with(
    model: Arc<dyn ChatModel>,
    executor: Arc<dyn ToolExecutor>,
) -> Arc<AppState> {
    let state = AppState::with_components(Config::default(), Arc::new(fetcher()), executor, model);
    state.mark_ready();
    Arc::new(state)
}

/// Send a request through the router and decode the JSON body (or `{}`).
pub async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}
