//! Schema introspection for the host-facing tool catalog.

use serde_json::{Map, Value, json};

use super::{Field, ObjectSchema, Presence, Schema, StringFormat, UnionSchema};

/// Describe a tool's input schema as a JSON-Schema-like object.
///
/// The result always has `type: "object"`, `properties` and `required`.
/// Unions are flattened: the discriminator becomes a required string enum,
/// properties are merged across variants (first declaration wins) and a field
/// is only listed as required when every variant requires it. This never
/// fails; shapes without a simple tag are described by their description only.
pub fn describe(schema: &Schema) -> Map<String, Value> {
    match schema {
        Schema::Object(object) => describe_object(object),
        Schema::Union(union) => describe_union(union),
        _ => {
            let mut out = Map::new();
            out.insert("type".into(), json!("object"));
            out.insert("properties".into(), Value::Object(Map::new()));
            out.insert("required".into(), json!([]));
            out
        }
    }
}

fn describe_object(object: &ObjectSchema) -> Map<String, Value> {
    let mut properties = Map::new();
    for field in &object.fields {
        properties.insert(field.name.to_string(), describe_field(field));
    }
    let required: Vec<&str> = object
        .fields
        .iter()
        .filter(|f| f.is_required())
        .map(|f| f.name)
        .collect();

    let mut out = Map::new();
    out.insert("type".into(), json!("object"));
    out.insert("properties".into(), Value::Object(properties));
    out.insert("required".into(), json!(required));
    out
}

fn describe_union(union: &UnionSchema) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut discriminator = Map::new();
    discriminator.insert("type".into(), json!("string"));
    discriminator.insert("enum".into(), json!(union.tags()));
    if !union.description.is_empty() {
        discriminator.insert("description".into(), json!(union.description));
    }
    properties.insert(union.discriminator.to_string(), Value::Object(discriminator));

    for variant in &union.variants {
        for field in &variant.fields.fields {
            if !properties.contains_key(field.name) {
                properties.insert(field.name.to_string(), describe_field(field));
            }
        }
    }

    let mut required = vec![union.discriminator];
    if let Some(first) = union.variants.first() {
        for field in first.fields.fields.iter().filter(|f| f.is_required()) {
            let everywhere = union.variants.iter().all(|v| {
                v.fields
                    .get(field.name)
                    .is_some_and(|other| other.is_required())
            });
            if everywhere && field.name != union.discriminator {
                required.push(field.name);
            }
        }
    }

    let mut out = Map::new();
    out.insert("type".into(), json!("object"));
    out.insert("properties".into(), Value::Object(properties));
    out.insert("required".into(), json!(required));
    out
}

fn describe_field(field: &Field) -> Value {
    let mut out = describe_value(&field.schema);
    if !field.description.is_empty() {
        out.insert("description".into(), json!(field.description));
    }
    if let Presence::Default(default) = &field.presence {
        out.insert("default".into(), default.clone());
    }
    Value::Object(out)
}

fn describe_value(schema: &Schema) -> Map<String, Value> {
    let mut out = Map::new();
    match schema {
        Schema::String(s) => {
            out.insert("type".into(), json!("string"));
            if let Some(min) = s.min_length {
                out.insert("minLength".into(), json!(min));
            }
            if let Some(max) = s.max_length {
                out.insert("maxLength".into(), json!(max));
            }
            match s.format {
                Some(StringFormat::Url) => {
                    out.insert("format".into(), json!("uri"));
                }
                Some(StringFormat::Identifier) => {
                    out.insert("pattern".into(), json!("^[A-Za-z_][A-Za-z0-9_]*$"));
                }
                Some(StringFormat::Column) | None => {}
            }
        }
        Schema::Number(n) => {
            out.insert("type".into(), json!(schema.kind()));
            if let Some(min) = n.minimum {
                out.insert("minimum".into(), bound(min, n.integer));
            }
            if let Some(max) = n.maximum {
                out.insert("maximum".into(), bound(max, n.integer));
            }
        }
        Schema::Boolean => {
            out.insert("type".into(), json!("boolean"));
        }
        Schema::Enum(e) => {
            out.insert("type".into(), json!("string"));
            out.insert("enum".into(), json!(e.values));
        }
        Schema::Array(a) => {
            out.insert("type".into(), json!("array"));
            out.insert("items".into(), Value::Object(describe_value(&a.items)));
            if let Some(min) = a.min_items {
                out.insert("minItems".into(), json!(min));
            }
            if let Some(max) = a.max_items {
                out.insert("maxItems".into(), json!(max));
            }
        }
        Schema::Object(o) => return describe_object(o),
        Schema::Union(u) => return describe_union(u),
        Schema::Record(r) => {
            out.insert("type".into(), json!("object"));
            out.insert(
                "additionalProperties".into(),
                Value::Object(describe_value(&r.values)),
            );
        }
        Schema::Any => {}
    }
    out
}

fn bound(value: f64, integer: bool) -> Value {
    if integer && value.fract() == 0.0 {
        json!(value as i64)
    } else {
        json!(value)
    }
}
