//! OpenAPI document generation from service entries.
//!
//! # Responsibilities
//! - Turn each entry into one operation per HTTP method
//! - Map parameter and return type names onto JSON schemas
//! - Optionally strip namespaces from type and module names

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::service::{EntryParameter, ServiceEntry};

const OPENAPI_VERSION: &str = "3.0.1";
const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    pub openapi: String,
    pub info: ApiInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<ApiTag>,
    /// Path → lower-case method → operation. Entries colliding on a
    /// path and method are listed under `path#operation_id`.
    pub paths: BTreeMap<String, BTreeMap<String, Operation>>,
}

impl ApiDocument {
    /// Iterate over every operation in path order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.values().flat_map(|item| item.values())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub tags: Vec<String>,
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, ApiResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// Controls how names are rendered into a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameStyle {
    pub ignore_fully_qualified: bool,
}

impl NameStyle {
    pub fn display(&self, name: &str) -> String {
        if self.ignore_fully_qualified {
            short_name(name)
        } else {
            name.to_string()
        }
    }
}

/// Build a document describing `entries`.
pub fn generate(info: ApiInfo, entries: &[&ServiceEntry], style: NameStyle) -> ApiDocument {
    let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();
    let mut tags = BTreeSet::new();

    for entry in entries {
        let tag = style.display(&entry.module.name);
        tags.insert(tag.clone());

        let path = entry.http_path();
        let methods = entry.effective_methods();
        for method in &methods {
            let key = method.to_ascii_lowercase();
            let operation_id = operation_id(entry, method, methods.len());
            let op = operation(entry, method, operation_id, &tag, style);

            // A path item holds one operation per method; a second entry on
            // the same route and method gets its own `path#operation` item.
            let taken_by = paths.get(&path).and_then(|item| item.get(&key));
            let item_path = match taken_by {
                None => path.clone(),
                Some(existing) => {
                    let alternate = format!("{path}#{}", op.operation_id);
                    tracing::warn!(
                        path = %path,
                        method = %method,
                        entry = %entry.id,
                        existing = %existing.operation_id,
                        listed_as = %alternate,
                        "Entries share a route and method"
                    );
                    alternate
                }
            };
            paths.entry(item_path).or_default().insert(key, op);
        }
    }

    ApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info,
        tags: tags.into_iter().map(|name| ApiTag { name }).collect(),
        paths,
    }
}

/// The swagger-ui deep-link fragment of an entry's first operation.
pub fn operation_anchor(entry: &ServiceEntry, style: NameStyle) -> String {
    let methods = entry.effective_methods();
    let operation_id = match methods.first() {
        Some(first) => operation_id(entry, first, methods.len()),
        None => entry.id.clone(),
    };
    format!(
        "#/{}/{}",
        urlencoding::encode(&style.display(&entry.module.name)),
        urlencoding::encode(&operation_id)
    )
}

fn operation_id(entry: &ServiceEntry, method: &str, method_count: usize) -> String {
    if method_count > 1 {
        format!("{}_{}", entry.id, method.to_ascii_lowercase())
    } else {
        entry.id.clone()
    }
}

fn operation(entry: &ServiceEntry, method: &str, operation_id: String, tag: &str, style: NameStyle) -> Operation {
    let path_names = entry.path_parameter_names();
    let mut parameters: Vec<Parameter> = path_names
        .iter()
        .map(|name| {
            let declared = entry.parameters.iter().find(|p| p.name == *name);
            Parameter {
                name: name.to_string(),
                location: "path".to_string(),
                required: true,
                description: declared.and_then(|p| p.description.clone()),
                schema: declared
                    .map(|p| type_schema(&p.type_name, style))
                    .unwrap_or_else(|| json!({ "type": "string" })),
            }
        })
        .collect();

    let remaining: Vec<&EntryParameter> = entry
        .parameters
        .iter()
        .filter(|p| !path_names.contains(&p.name.as_str()))
        .collect();

    let carries_body = matches!(method, "POST" | "PUT" | "PATCH");
    let request_body = if carries_body && !remaining.is_empty() {
        Some(RequestBody {
            required: remaining.iter().any(|p| p.required),
            content: json_content(body_schema(&remaining, style)),
        })
    } else {
        if !carries_body {
            parameters.extend(remaining.iter().map(|p| Parameter {
                name: p.name.clone(),
                location: "query".to_string(),
                required: p.required,
                description: p.description.clone(),
                schema: type_schema(&p.type_name, style),
            }));
        }
        None
    };

    let mut responses = BTreeMap::new();
    responses.insert(
        "200".to_string(),
        ApiResponse {
            description: "Success".to_string(),
            content: entry
                .return_type
                .as_deref()
                .map(|t| json_content(type_schema(t, style))),
        },
    );

    Operation {
        tags: vec![tag.to_string()],
        operation_id,
        summary: entry.summary.clone(),
        parameters,
        request_body,
        responses,
    }
}

fn json_content(schema: Value) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

fn body_schema(parameters: &[&EntryParameter], style: NameStyle) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for p in parameters {
        let mut schema = type_schema(&p.type_name, style);
        if let (Some(description), Value::Object(map)) = (&p.description, &mut schema) {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
        properties.insert(p.name.clone(), schema);
        if p.required {
            required.push(Value::String(p.name.clone()));
        }
    }

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}

/// JSON schema for a type name.
pub fn type_schema(type_name: &str, style: NameStyle) -> Value {
    let name = type_name.trim();

    if let Some(inner) = name.strip_suffix('?') {
        return type_schema(inner, style);
    }
    if let Some(inner) = name.strip_suffix("[]") {
        return json!({ "type": "array", "items": type_schema(inner, style) });
    }
    if let Some((outer, args)) = split_generic(name) {
        let outer = last_segment(outer);
        match (outer, args.as_slice()) {
            ("Option" | "Nullable", [inner]) => return type_schema(inner, style),
            ("Vec" | "List" | "IList" | "IEnumerable" | "ICollection" | "HashSet" | "BTreeSet" | "VecDeque", [inner]) => {
                return json!({ "type": "array", "items": type_schema(inner, style) });
            }
            ("HashMap" | "BTreeMap" | "Dictionary" | "IDictionary", [_, value]) => {
                return json!({ "type": "object", "additionalProperties": type_schema(value, style) });
            }
            _ => {}
        }
    }

    match last_segment(name) {
        "string" | "String" | "str" | "&str" | "char" | "Char" => json!({ "type": "string" }),
        "Guid" | "Uuid" => json!({ "type": "string", "format": "uuid" }),
        "DateTime" | "DateTimeOffset" => json!({ "type": "string", "format": "date-time" }),
        "bool" | "Boolean" => json!({ "type": "boolean" }),
        "i8" | "i16" | "i32" | "u8" | "u16" | "int" | "short" | "byte" | "Int16" | "Int32" | "Byte" => {
            json!({ "type": "integer", "format": "int32" })
        }
        "i64" | "u32" | "u64" | "isize" | "usize" | "long" | "Int64" | "UInt32" | "UInt64" => {
            json!({ "type": "integer", "format": "int64" })
        }
        "f32" | "float" | "Single" => json!({ "type": "number", "format": "float" }),
        "f64" | "double" | "decimal" | "Double" | "Decimal" => json!({ "type": "number", "format": "double" }),
        _ => json!({ "type": "object", "title": style.display(name) }),
    }
}

/// Split `Outer<A, B<C>>` into `("Outer", ["A", "B<C>"])`.
fn split_generic(name: &str) -> Option<(&str, Vec<&str>)> {
    let open = name.find('<')?;
    let inner = name.strip_suffix('>')?.get(open + 1..)?;

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    Some((&name[..open], args))
}

fn last_segment(path: &str) -> &str {
    path.rsplit(|c: char| c == '.' || c == ':').next().unwrap_or(path)
}

/// Strip namespaces from every path in a type expression.
///
/// `acme.users.UserDto` and `acme::users::UserDto` become `UserDto`;
/// generic arguments are shortened too (`Vec<acme::User>` → `Vec<User>`).
pub fn short_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut token = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() || matches!(c, '_' | '.' | ':') {
            token.push(c);
        } else {
            out.push_str(last_segment(&token));
            token.clear();
            out.push(c);
        }
    }
    out.push_str(last_segment(&token));
    out
}
