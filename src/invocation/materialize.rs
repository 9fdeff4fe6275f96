//! Path-template resolution and argument splitting.
//!
//! `{name}` placeholders are filled from the arguments (percent-escaped).
//! Whatever is left becomes query parameters, except a key literally named
//! `body`, which is the request payload. `style`/`explode` serialization is
//! not supported: arrays are always joined with commas.

use crate::ingestion::Tool;
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static PATH_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("Failed to compile regex"));

/// Everything but RFC 3986 unreserved characters is escaped.
const PATH_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const BODY_KEY: &str = "body";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterializeError {
    #[error("Missing path parameter: {0}")]
    MissingPathParameter(String),
}

/// A tool call with its path resolved and arguments sorted into place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterializedCall {
    pub path: String,
    pub query: Map<String, Value>,
    pub body: Option<Value>,
}

impl MaterializedCall {
    /// Query parameters as string pairs for the HTTP client.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .map(|(key, value)| (key.clone(), value_text(value)))
            .collect()
    }
}

pub fn materialize(tool: &Tool, arguments: &Map<String, Value>) -> Result<MaterializedCall, MaterializeError> {
    let (path, remaining) = expand_path(&tool.path, arguments)?;

    let mut query = Map::new();
    let mut body = None;
    for (key, value) in remaining {
        if key == BODY_KEY {
            body = Some(value);
        } else if let Some(normalized) = normalize_query_value(value) {
            query.insert(key, normalized);
        }
    }

    Ok(MaterializedCall { path, query, body })
}

/// Substitute every placeholder and return the arguments not consumed by it.
pub fn expand_path(
    template: &str,
    arguments: &Map<String, Value>,
) -> Result<(String, Map<String, Value>), MaterializeError> {
    let mut remaining = arguments.clone();
    let mut expanded = String::with_capacity(template.len());
    let mut last = 0;

    for captures in PATH_PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let key = name.as_str();
        // a repeated placeholder reuses the value already taken
        let value = remaining
            .remove(key)
            .or_else(|| arguments.get(key).cloned())
            .ok_or_else(|| MaterializeError::MissingPathParameter(key.to_string()))?;

        expanded.push_str(&template[last..whole.start()]);
        expanded.extend(utf8_percent_encode(&value_text(&value), PATH_VALUE));
        last = whole.end();
    }
    expanded.push_str(&template[last..]);

    Ok((expanded, remaining))
}

/// `null` is dropped, arrays are comma-joined, everything else passes through.
fn normalize_query_value(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(items) => Some(Value::String(
            items.iter().map(value_text).collect::<Vec<_>>().join(","),
        )),
        other => Some(other),
    }
}

/// Strings without quotes, everything else as JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
