//! Swagger 2.0 parser.

use crate::ingestion::normalizer::{
    is_required, merged_parameters, operation_description, operation_name, origin,
    path_operations, str_field, string_list,
};
use crate::ingestion::types::{ParamSchema, SchemaType, Tool, ToolParameters};
use serde_json::Value;

pub fn parse(document: &Value, source_url: &str) -> Vec<Tool> {
    let base_url = resolve_base_url(document, source_url);
    let global_consumes = string_list(document, "consumes");

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
                parameters.insert(param_name, param_schema(param), is_required(param));
            }

            let consumes = match string_list(op, "consumes") {
                own if !own.is_empty() => own,
                _ => global_consumes.clone(),
            };

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

/// `{scheme}://{host}{basePath}` using the first declared scheme (default
/// `https`). A missing `host` means the host serving the document.
fn resolve_base_url(document: &Value, source_url: &str) -> String {
    let scheme = document
        .get("schemes")
        .and_then(Value::as_array)
        .and_then(|schemes| schemes.first())
        .and_then(Value::as_str)
        .unwrap_or("https");
    let base_path = str_field(document, "basePath").unwrap_or("");

    match str_field(document, "host") {
        Some(host) => format!("{}://{}{}", scheme, host, base_path),
        None => format!("{}{}", origin(source_url), base_path),
    }
}

/// Inline `schema` (body parameters) wins; otherwise the schema is built from
/// `type`, with `enum` on scalars and `items.enum` on arrays.
fn param_schema(param: &Value) -> ParamSchema {
    if let Some(inline) = param.get("schema").filter(|s| s.as_object().is_some_and(|o| !o.is_empty())) {
        return ParamSchema::from_value(inline);
    }

    let declared = SchemaType::from(str_field(param, "type").unwrap_or("string"));
    let schema = if declared == SchemaType::Array {
        let items = param.get("items").unwrap_or(&Value::Null);
        let item_type = SchemaType::from(str_field(items, "type").unwrap_or("string"));
        let mut item_schema = ParamSchema::of(item_type);
        if let Some(values) = items.get("enum").and_then(Value::as_array) {
            item_schema = item_schema.with_enum(values.clone());
        }
        ParamSchema::array_of(item_schema)
    } else {
        let mut scalar = ParamSchema::of(declared);
        if let Some(values) = param.get("enum").and_then(Value::as_array) {
            scalar = scalar.with_enum(values.clone());
        }
        scalar
    };

    match str_field(param, "description") {
        Some(description) => schema.describe(description),
        None => schema,
    }
}
