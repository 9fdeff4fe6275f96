//! Dialect detection and the pieces shared by the three parsers.
//!
//! A raw document is classified into one [`Dialect`] and handed to that
//! dialect's parser. Every parser returns the same [`Tool`] records in
//! document order.

use crate::ingestion::fetch::SpecFetcher;
use crate::ingestion::types::{HttpMethod, Tool};
use crate::ingestion::{oas3, swagger12, swagger2};
use serde_json::Value;
use url::Url;

/// Maximum `$ref` hops followed before giving up on a reference chain.
const MAX_REF_DEPTH: usize = 8;

/// The API-description formats understood by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    OpenApi3,
    Swagger2,
    Swagger12,
}

impl Dialect {
    /// Checked in order: `openapi`, `swagger: 2.x`, `swaggerVersion: 1.x`.
    /// Anything else is parsed leniently as OpenAPI 3.
    pub fn detect(document: &Value) -> Self {
        if document.get("openapi").is_some() {
            return Self::OpenApi3;
        }
        if version_field(document, "swagger").is_some_and(|v| v.starts_with('2')) {
            return Self::Swagger2;
        }
        if version_field(document, "swaggerVersion").is_some_and(|v| v.starts_with('1')) {
            return Self::Swagger12;
        }
        Self::OpenApi3
    }
}

/// Convert a specification document into tools.
///
/// `source_url` is where the document was fetched from; it anchors relative
/// server URLs and Swagger 1.2 declaration lookups. Only Swagger 1.2 touches
/// `fetcher`, and a failed declaration fetch skips that API entry.
pub async fn normalize(document: &Value, source_url: &str, fetcher: &dyn SpecFetcher) -> Vec<Tool> {
    let dialect = Dialect::detect(document);

    let tools = match dialect {
        Dialect::OpenApi3 => oas3::parse(document, source_url),
        Dialect::Swagger2 => swagger2::parse(document, source_url),
        Dialect::Swagger12 => swagger12::parse(document, source_url, fetcher).await,
    };

    tracing::debug!(
        ?dialect,
        source = source_url,
        tools = tools.len(),
        "Document normalized"
    );

    tools
}

fn version_field(document: &Value, key: &str) -> Option<String> {
    match document.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// One path+method pair from a `paths` object.
pub(crate) struct Operation<'a> {
    pub path: &'a str,
    pub raw_method: &'a str,
    pub method: HttpMethod,
    pub op: &'a Value,
    /// Path-item level `parameters`, shared by every operation under the path.
    pub shared_parameters: &'a [Value],
}

/// Walk a Swagger 2 / OpenAPI 3 `paths` object in document order, keeping
/// only the supported verbs.
pub(crate) fn path_operations(document: &Value) -> Vec<Operation<'_>> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut operations = Vec::new();
    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        let shared_parameters = item
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for (raw_method, op) in item {
            let Some(method) = HttpMethod::parse(raw_method) else {
                continue;
            };
            if !op.is_object() {
                continue;
            }
            operations.push(Operation {
                path,
                raw_method,
                method,
                op,
                shared_parameters,
            });
        }
    }
    operations
}

/// Shared parameters first, then operation parameters; an operation
/// parameter with the same `name` and `in` replaces the shared one.
pub(crate) fn merged_parameters<'a>(document: &'a Value, operation: &Operation<'a>) -> Vec<&'a Value> {
    let own = operation
        .op
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut merged: Vec<&Value> = Vec::new();
    for param in operation.shared_parameters.iter().chain(own) {
        let param = resolve_ref(document, param);
        if let Some(pos) = merged.iter().position(|p| same_parameter(p, param)) {
            merged[pos] = param;
        } else {
            merged.push(param);
        }
    }
    merged
}

fn same_parameter(a: &Value, b: &Value) -> bool {
    a.get("name") == b.get("name") && a.get("in") == b.get("in")
}

/// Follow local `#/...` references. Unresolvable references return the
/// reference object itself.
pub(crate) fn resolve_ref<'a>(document: &'a Value, mut value: &'a Value) -> &'a Value {
    for _ in 0..MAX_REF_DEPTH {
        let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
            break;
        };
        let Some(pointer) = reference.strip_prefix('#') else {
            break;
        };
        match document.pointer(pointer) {
            Some(target) => value = target,
            None => break,
        }
    }
    value
}

/// Non-empty string field.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub(crate) fn is_required(param: &Value) -> bool {
    param.get("required").and_then(Value::as_bool).unwrap_or(false)
}

/// `operationId` (or the supplied key) or the synthesized fallback.
pub(crate) fn operation_name(op: &Value, key: &str, raw_method: &str, path: &str) -> String {
    str_field(op, key)
        .map(str::to_string)
        .unwrap_or_else(|| Tool::synthesized_name(raw_method, path))
}

/// First non-empty of `keys`, else `"Call {METHOD} {path}"`.
pub(crate) fn operation_description(op: &Value, keys: &[&str], method: HttpMethod, path: &str) -> String {
    keys.iter()
        .find_map(|key| str_field(op, key))
        .map(str::to_string)
        .unwrap_or_else(|| Tool::fallback_description(method, path))
}

/// `scheme://host[:port]` of `url`, or an empty string when it has no host.
pub fn origin(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    }
}

/// Resolve `relative` as a path under `origin`.
pub fn join_origin(origin: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    Url::parse(&format!("{}/", origin))
        .and_then(|base| base.join(relative))
        .map(|joined| joined.to_string())
        .unwrap_or_else(|_| format!("{}/{}", origin, relative))
}

pub(crate) fn is_absolute_http(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// String values of `key` when it is an array.
pub(crate) fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
