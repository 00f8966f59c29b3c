//! JSON Schema generation from the static descriptor tables.
//!
//! Purely descriptive output for editor tooling; the validation path
//! never reads it. The walk consumes no input and is deterministic:
//! properties and definitions appear in declaration order, so the same
//! tables always produce byte-identical output.

use crate::fields::{self, EntityDef, FieldDef, Shape};
use serde_json::{json, Map, Value};

/// Build the self-contained JSON Schema document for the manifest.
pub fn schema_document() -> Value {
    let mut root = entity_schema(&fields::MANIFEST);
    let schema = root
        .as_object_mut()
        .expect("entity schema is always an object");
    schema.insert(
        "$schema".to_owned(),
        json!("http://json-schema.org/draft-07/schema#"),
    );
    let mut definitions = Map::new();
    for entity in fields::DEFINITIONS {
        definitions.insert(entity.name.to_owned(), entity_schema(entity));
    }
    schema.insert("definitions".to_owned(), Value::Object(definitions));
    root
}

/// Render the schema document as pretty-printed JSON.
pub fn schema_json() -> String {
    serde_json::to_string_pretty(&schema_document()).expect("schema document serializes")
}

fn entity_schema(entity: &EntityDef) -> Value {
    let mut schema = Map::new();
    schema.insert("title".to_owned(), json!(entity.name));
    schema.insert("description".to_owned(), json!(entity.description));
    schema.insert("type".to_owned(), json!("object"));
    schema.insert("additionalProperties".to_owned(), json!(false));

    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in entity.fields {
        properties.insert(field.name.to_owned(), field_schema(field));
        if field.required {
            required.push(json!(field.name));
        }
    }
    schema.insert("properties".to_owned(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_owned(), Value::Array(required));
    }
    Value::Object(schema)
}

fn field_schema(field: &FieldDef) -> Value {
    let shape = shape_schema(&field.shape);
    let mut schema = Map::new();
    schema.insert("description".to_owned(), json!(field.description));
    if !field.examples.is_empty() {
        let examples: Vec<Value> = field.examples.iter().copied().map(example_value).collect();
        schema.insert("examples".to_owned(), Value::Array(examples));
    }
    // A bare $ref tolerates no sibling keywords in draft-07; wrap it so
    // the description and examples survive.
    if shape.get("$ref").is_some() {
        schema.insert("allOf".to_owned(), json!([shape]));
    } else {
        let inner = shape.as_object().expect("shape schema is an object");
        for (key, value) in inner {
            schema.insert(key.clone(), value.clone());
        }
    }
    Value::Object(schema)
}

fn shape_schema(shape: &Shape) -> Value {
    match shape {
        Shape::NonEmptyStr => json!({"type": "string", "minLength": 1}),
        Shape::PathNoBackslash => json!({"type": "string", "pattern": "^[^\\\\]+$"}),
        Shape::Url => json!({"type": "string", "format": "uri"}),
        Shape::Int => json!({"type": "integer"}),
        Shape::PositiveFloat => json!({"type": "number", "exclusiveMinimum": 0}),
        Shape::Float => json!({"type": "number"}),
        Shape::Bool => json!({"type": "boolean"}),
        Shape::List(inner) => json!({"type": "array", "items": shape_schema(inner)}),
        Shape::Map(inner) => json!({
            "type": "object",
            "additionalProperties": shape_schema(inner),
        }),
        Shape::Entity(name) => {
            json!({"$ref": format!("#/definitions/{name}")})
        }
        Shape::AnyOf(alternatives) => {
            let rendered: Vec<Value> = alternatives.iter().map(shape_schema).collect();
            json!({"anyOf": rendered})
        }
    }
}

/// Examples are stored as text; structured examples (the target example
/// is a JSON object) are parsed back into their structural form, plain
/// text stays a string.
fn example_value(text: &str) -> Value {
    if text.starts_with('{') || text.starts_with('[') {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
    } else {
        Value::String(text.to_owned())
    }
}
