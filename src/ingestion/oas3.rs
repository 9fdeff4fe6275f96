//! OpenAPI 3 parser.

use crate::ingestion::normalizer::{
    is_absolute_http, is_required, join_origin, merged_parameters, operation_description,
    operation_name, origin, path_operations, resolve_ref, str_field,
};
use crate::ingestion::types::{ParamSchema, SchemaType, Tool, ToolParameters};
use serde_json::Value;

const JSON_CONTENT_TYPE: &str = "application/json";

pub fn parse(document: &Value, source_url: &str) -> Vec<Tool> {
    let base_url = resolve_base_url(document, source_url);

    path_operations(document)
        .into_iter()
        .map(|operation| {
            let op = operation.op;
            let name = operation_name(op, "operationId", operation.raw_method, operation.path);
            let description = operation_description(
                op,
                &["description", "summary"],
                operation.method,
                operation.path,
            );

            let mut parameters = ToolParameters::new();
            for param in merged_parameters(document, &operation) {
                let Some(param_name) = str_field(param, "name") else {
                    continue;
                };
                let schema = param_schema(param);
                parameters.insert(param_name, schema, is_required(param));
            }

            let mut consumes = Vec::new();
            if let Some(body) = op.get("requestBody") {
                let body = resolve_ref(document, body);
                if let Some(content) = body.get("content").and_then(Value::as_object) {
                    consumes.extend(content.keys().cloned());
                    if let Some(media) = content.get(JSON_CONTENT_TYPE) {
                        parameters.insert("body", body_schema(media), true);
                    }
                }
            }

            Tool {
                name,
                description,
                parameters,
                method: operation.method,
                path: operation.path.to_string(),
                base_url: base_url.clone(),
                consumes,
            }
        })
        .collect()
}

/// First `servers` entry, with server variables replaced by their defaults.
/// Relative URLs hang off the origin of the document's own fetch URL.
fn resolve_base_url(document: &Value, source_url: &str) -> String {
    let server = document
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first());

    let server_url = server
        .and_then(|s| str_field(s, "url"))
        .map(|url| substitute_server_variables(url, server))
        .unwrap_or_default();

    if is_absolute_http(&server_url) {
        return server_url;
    }

    let source_origin = origin(source_url);
    if server_url.is_empty() {
        source_origin
    } else {
        join_origin(&source_origin, &server_url)
    }
}

fn substitute_server_variables(url: &str, server: Option<&Value>) -> String {
    let Some(variables) = server
        .and_then(|s| s.get("variables"))
        .and_then(Value::as_object)
    else {
        return url.to_string();
    };

    variables.iter().fold(url.to_string(), |acc, (name, variable)| {
        match str_field(variable, "default") {
            Some(default) => acc.replace(&format!("{{{}}}", name), default),
            None => acc,
        }
    })
}

fn param_schema(param: &Value) -> ParamSchema {
    let schema = match param.get("schema") {
        Some(inline) if inline.as_object().is_some_and(|o| !o.is_empty()) => {
            ParamSchema::from_value(inline)
        }
        _ => {
            let declared = str_field(param, "type").unwrap_or("string");
            ParamSchema::of(SchemaType::from(declared))
        }
    };

    match str_field(param, "description") {
        Some(description) => schema.describe(description),
        None => schema,
    }
}

fn body_schema(media: &Value) -> ParamSchema {
    match media.get("schema") {
        Some(inline) if inline.as_object().is_some_and(|o| !o.is_empty()) => {
            ParamSchema::from_value(inline)
        }
        _ => ParamSchema::object(),
    }
}
