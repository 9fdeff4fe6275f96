//! Type definitions for the ingestion module.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP verbs that produce tools. Anything else (HEAD, OPTIONS, TRACE, ...)
/// is dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    /// Case-insensitive parse; `None` for unsupported verbs.
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON payload.
    pub fn sends_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` keyword of a parameter schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// Dialect-specific types such as Swagger 2 `file` or Swagger 1.2 model names.
    Other(String),
}

impl SchemaType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for SchemaType {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for SchemaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A minimal JSON-Schema subset describing one tool parameter.
///
/// `type`, `items` and `enum` are typed; any other keyword found in an inline
/// schema (`format`, `properties`, `$ref`, ...) is carried through untouched in
/// `extra`. An `array` schema always has `items` once built through
/// [`ParamSchema::from_value`] or the constructors here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParamSchema>>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParamSchema {
    pub fn of(schema_type: SchemaType) -> Self {
        let schema = Self {
            schema_type: Some(schema_type),
            items: None,
            enum_values: None,
            extra: Map::new(),
        };
        schema.with_default_items()
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    pub fn array_of(items: ParamSchema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            enum_values: None,
            extra: Map::new(),
        }
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Build from an inline JSON schema.
    ///
    /// Non-object input degrades to `{type: string}`. Array schemas missing
    /// `items` get `{type: string}` items, recursively.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::string();
        };

        let mut schema = Self {
            schema_type: None,
            items: None,
            enum_values: None,
            extra: Map::new(),
        };

        for (key, val) in object {
            match (key.as_str(), val) {
                ("type", Value::String(t)) => schema.schema_type = Some(SchemaType::from(t.as_str())),
                ("items", Value::Object(_)) => schema.items = Some(Box::new(Self::from_value(val))),
                ("enum", Value::Array(values)) => schema.enum_values = Some(values.clone()),
                _ => {
                    schema.extra.insert(key.clone(), val.clone());
                }
            }
        }

        schema.with_default_items()
    }

    /// Attach a `description` keyword unless the schema already has one.
    pub fn describe(mut self, description: &str) -> Self {
        if !description.is_empty() && !self.extra.contains_key("description") {
            self.extra
                .insert("description".to_string(), Value::String(description.to_string()));
        }
        self
    }

    pub fn is_array(&self) -> bool {
        matches!(self.schema_type, Some(SchemaType::Array))
    }

    fn with_default_items(mut self) -> Self {
        if self.is_array() && self.items.is_none() {
            self.extra.remove("items");
            self.items = Some(Box::new(Self::string()));
        }
        self
    }
}

/// The `parameters` object of a tool: `{type: "object", properties, required}`.
///
/// Every name in `required` is a key of `properties`; the insert API is the
/// only way to grow either.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolParameters {
    properties: BTreeMap<String, ParamSchema>,
    required: Vec<String>,
}

impl ToolParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a property. Required names keep first-declaration order.
    pub fn insert(&mut self, name: impl Into<String>, schema: ParamSchema, required: bool) {
        let name = name.into();
        if required {
            if !self.required.contains(&name) {
                self.required.push(name.clone());
            }
        } else {
            self.required.retain(|r| r != &name);
        }
        self.properties.insert(name, schema);
    }

    pub fn get(&self, name: &str) -> Option<&ParamSchema> {
        self.properties.get(name)
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}

impl Serialize for ToolParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// A normalized, invocable representation of one API operation.
///
/// Tools are built in bulk by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tool {
    /// Unique within one ingestion batch.
    pub name: String,

    /// `description` → `summary` → `"Call {METHOD} {path}"`.
    pub description: String,

    pub parameters: ToolParameters,

    pub method: HttpMethod,

    /// Unresolved path template, e.g. `/users/{id}`.
    pub path: String,

    /// Fully resolved origin plus base path.
    pub base_url: String,

    /// Declared request content types (used by upload suppression).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
}

impl Tool {
    /// `{method}_{path}` with `/`, `{` and `}` replaced by `_`.
    pub fn synthesized_name(method: &str, path: &str) -> String {
        format!("{}_{}", method, path).replace(['/', '{', '}'], "_")
    }

    pub fn fallback_description(method: HttpMethod, path: &str) -> String {
        format!("Call {} {}", method, path)
    }

    /// Lowercased `path name description`, the text the ranker matches against.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.path, self.name, self.description).to_lowercase()
    }

    pub fn accepts_multipart(&self) -> bool {
        self.consumes
            .iter()
            .any(|c| c.to_ascii_lowercase().contains("multipart/form-data"))
    }

    /// Compact JSON document describing the tool, one per tool per ingestion.
    pub fn summary_document(&self) -> String {
        json!({
            "name": self.name,
            "description": self.description,
            "method": self.method,
            "path": self.path,
            "base": self.base_url,
        })
        .to_string()
    }
}
