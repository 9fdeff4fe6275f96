//! Swagger 1.2 parser.
//!
//! A resource listing either embeds operations in its `apis` entries or points
//! at separate API declarations that have to be fetched. Declarations that
//! cannot be fetched are skipped; the rest of the listing still produces tools.

use crate::ingestion::fetch::SpecFetcher;
use crate::ingestion::normalizer::{
    is_required, join_origin, operation_description, operation_name, origin, str_field,
    string_list,
};
use crate::ingestion::types::{HttpMethod, ParamSchema, SchemaType, Tool, ToolParameters};
use serde_json::Value;

pub async fn parse(document: &Value, source_url: &str, fetcher: &dyn SpecFetcher) -> Vec<Tool> {
    let source_origin = origin(source_url);
    let listing_base = str_field(document, "basePath")
        .map(str::to_string)
        .unwrap_or_else(|| source_origin.clone());

    let apis = document
        .get("apis")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut tools = Vec::new();
    for api in apis {
        let api_path = str_field(api, "path").unwrap_or("");

        if has_operations(api) {
            collect_operations(api, api_path, &listing_base, &[], &mut tools);
            continue;
        }

        let declaration_url = join_origin(&source_origin, api_path);
        let declaration = match fetcher.fetch_json(&declaration_url).await {
            Ok(declaration) => declaration,
            Err(e) => {
                tracing::warn!(
                    url = %declaration_url,
                    error = %e,
                    "Skipping unreachable API declaration"
                );
                continue;
            }
        };

        let base = str_field(&declaration, "basePath")
            .map(str::to_string)
            .unwrap_or_else(|| listing_base.clone());
        let declaration_consumes = string_list(&declaration, "consumes");

        if has_operations(&declaration) {
            collect_operations(&declaration, api_path, &base, &declaration_consumes, &mut tools);
        }
        if let Some(entries) = declaration.get("apis").and_then(Value::as_array) {
            for entry in entries {
                collect_operations(entry, api_path, &base, &declaration_consumes, &mut tools);
            }
        }
    }
    tools
}

fn has_operations(value: &Value) -> bool {
    value
        .get("operations")
        .and_then(Value::as_array)
        .is_some_and(|ops| !ops.is_empty())
}

/// Turn one `{path, operations}` block into tools. `fallback_path` is used when
/// the block does not declare its own path.
fn collect_operations(
    block: &Value,
    fallback_path: &str,
    base_url: &str,
    inherited_consumes: &[String],
    tools: &mut Vec<Tool>,
) {
    let path = str_field(block, "path").unwrap_or(fallback_path);
    let Some(operations) = block.get("operations").and_then(Value::as_array) else {
        return;
    };

    for op in operations {
        let raw_method = str_field(op, "method")
            .or_else(|| str_field(op, "httpMethod"))
            .unwrap_or("");
        let Some(method) = HttpMethod::parse(raw_method) else {
            continue;
        };

        let name = operation_name(op, "nickname", method.as_str(), path);
        let description = operation_description(op, &["summary", "notes"], method, path);

        let mut parameters = ToolParameters::new();
        if let Some(params) = op.get("parameters").and_then(Value::as_array) {
            for param in params {
                let Some(param_name) = str_field(param, "name") else {
                    continue;
                };
                parameters.insert(param_name, param_schema(param), is_required(param));
            }
        }

        let consumes = match string_list(op, "consumes") {
            own if !own.is_empty() => own,
            _ => inherited_consumes.to_vec(),
        };

        tools.push(Tool {
            name,
            description,
            parameters,
            method,
            path: path.to_string(),
            base_url: base_url.to_string(),
            consumes,
        });
    }
}

/// Swagger 1.2 uses `type` (1.1 used `dataType`); arrays default their items
/// to strings.
fn param_schema(param: &Value) -> ParamSchema {
    let declared = str_field(param, "type")
        .or_else(|| str_field(param, "dataType"))
        .unwrap_or("string");

    let schema = match SchemaType::from(declared) {
        SchemaType::Array => {
            let items = param.get("items").unwrap_or(&Value::Null);
            let item_type = str_field(items, "type")
                .or_else(|| str_field(items, "$ref"))
                .unwrap_or("string");
            let mut item_schema = ParamSchema::of(SchemaType::from(item_type));
            if let Some(values) = items.get("enum").and_then(Value::as_array) {
                item_schema = item_schema.with_enum(values.clone());
            }
            ParamSchema::array_of(item_schema)
        }
        scalar => {
            let mut schema = ParamSchema::of(scalar);
            if let Some(values) = param.get("enum").and_then(Value::as_array) {
                schema = schema.with_enum(values.clone());
            }
            schema
        }
    };

    match str_field(param, "description") {
        Some(description) => schema.describe(description),
        None => schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::fetch::StaticSpecFetcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_inline_operations() {
        let doc = json!({
            "swaggerVersion": "1.2",
            "basePath": "https://legacy.example.com/api",
            "apis": [{
                "path": "/pets/{petId}",
                "operations": [
                    { "method": "GET", "nickname": "getPet",
                      "parameters": [{ "name": "petId", "type": "integer", "required": true }] },
                    { "httpMethod": "delete", "notes": "Removes a pet" },
                    { "method": "OPTIONS" }
                ]
            }]
        });
        let tools = parse(&doc, "https://legacy.example.com/api-docs", &StaticSpecFetcher::new()).await;

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "getPet");
        assert_eq!(tools[0].base_url, "https://legacy.example.com/api");
        assert!(tools[0].parameters.is_required("petId"));
        assert_eq!(tools[1].method, HttpMethod::Delete);
        assert_eq!(tools[1].name, "DELETE__pets__petId_");
        assert_eq!(tools[1].description, "Removes a pet");
    }

    #[tokio::test]
    async fn test_declarations_are_fetched_from_source_origin() {
        let listing = json!({
            "swaggerVersion": "1.2",
            "apis": [{ "path": "/store" }]
        });
        let fetcher = StaticSpecFetcher::new().with_document(
            "https://legacy.example.com/store",
            json!({
                "path": "/store/order",
                "operations": [{
                    "method": "POST",
                    "summary": "Place an order",
                    "parameters": [
                        { "name": "tags", "type": "array", "items": { "enum": ["x", "y"] } },
                        { "name": "kind", "type": "string", "enum": ["a", "b"] }
                    ]
                }]
            }),
        );

        let tools = parse(&listing, "https://legacy.example.com/api-docs", &fetcher).await;

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].path, "/store/order");
        assert_eq!(tools[0].base_url, "https://legacy.example.com");
        assert_eq!(tools[0].description, "Place an order");
        let params = tools[0].parameters.to_value();
        assert_eq!(params["properties"]["tags"]["items"]["type"], "string");
        assert_eq!(params["properties"]["tags"]["items"]["enum"], json!(["x", "y"]));
        assert_eq!(params["properties"]["kind"]["enum"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_declaration_with_nested_apis_and_base_path() {
        let listing = json!({ "swaggerVersion": "1.2", "apis": [{ "path": "/user" }] });
        let fetcher = StaticSpecFetcher::new().with_document(
            "https://legacy.example.com/user",
            json!({
                "basePath": "https://users.example.com/v1",
                "consumes": ["multipart/form-data"],
                "apis": [
                    { "path": "/user/{id}", "operations": [{ "method": "GET" }, { "method": "PUT" }] },
                    { "path": "/user", "operations": [{ "method": "HEAD" }] }
                ]
            }),
        );

        let tools = parse(&listing, "https://legacy.example.com/docs", &fetcher).await;

        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|t| t.base_url == "https://users.example.com/v1"));
        assert!(tools.iter().all(|t| t.path == "/user/{id}"));
        assert!(tools[1].accepts_multipart());
    }

    #[tokio::test]
    async fn test_unreachable_declaration_is_skipped() {
        let listing = json!({
            "swaggerVersion": "1.2",
            "apis": [
                { "path": "/missing" },
                { "path": "/pets", "operations": [{ "method": "GET" }] }
            ]
        });
        let tools = parse(&listing, "https://legacy.example.com/docs", &StaticSpecFetcher::new()).await;

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].path, "/pets");
    }
}
