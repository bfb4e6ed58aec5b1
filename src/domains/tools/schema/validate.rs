//! Argument validation against a [`Schema`].

use std::fmt;

use serde_json::{Map, Number, Value};

use super::{
    ArraySchema, EnumSchema, NumberSchema, ObjectSchema, Presence, RecordSchema, Schema,
    StringFormat, StringSchema, UnionSchema,
};

/// One step in the path to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl FieldError {
    /// Dotted form of the path, e.g. `join.table` or `rows.0`.
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "(root)".to_string();
        }
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}

/// Every constraint violated by a set of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

impl Schema {
    /// Validate raw arguments, returning the normalized value.
    ///
    /// Defaults are inserted for omitted fields, unknown object keys are
    /// dropped and integer fields are rewritten as JSON integers. On failure
    /// every violated field is reported, at most once each.
    pub fn validate(&self, raw: &Value) -> Result<Value, ValidationErrors> {
        let mut walker = Walker::default();
        let value = walker.check(self, raw);
        match value {
            Some(value) if walker.errors.is_empty() => Ok(value),
            _ => Err(ValidationErrors {
                errors: walker.errors,
            }),
        }
    }
}

#[derive(Default)]
struct Walker {
    path: Vec<PathSegment>,
    errors: Vec<FieldError>,
}

impl Walker {
    fn fail(&mut self, message: impl Into<String>) -> Option<Value> {
        self.errors.push(FieldError {
            path: self.path.clone(),
            message: message.into(),
        });
        None
    }

    fn nested<T>(&mut self, segment: PathSegment, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let out = f(self);
        self.path.pop();
        out
    }

    fn check(&mut self, schema: &Schema, value: &Value) -> Option<Value> {
        match schema {
            Schema::String(s) => self.check_string(s, value),
            Schema::Number(n) => self.check_number(n, value),
            Schema::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                other => self.fail(expected("boolean", other)),
            },
            Schema::Enum(e) => self.check_enum(e, value),
            Schema::Array(a) => self.check_array(a, value),
            Schema::Object(o) => match value {
                Value::Object(map) => self.check_fields(o, map, Map::new()),
                other => self.fail(expected("object", other)),
            },
            Schema::Record(r) => self.check_record(r, value),
            Schema::Union(u) => self.check_union(u, value),
            Schema::Any => Some(value.clone()),
        }
    }

    fn check_string(&mut self, schema: &StringSchema, value: &Value) -> Option<Value> {
        let Value::String(s) = value else {
            return self.fail(expected("string", value));
        };
        let len = s.chars().count();
        if let Some(min) = schema.min_length {
            if len < min {
                return self.fail(format!("String must contain at least {} character(s)", min));
            }
        }
        if let Some(max) = schema.max_length {
            if len > max {
                return self.fail(format!("String must contain at most {} character(s)", max));
            }
        }
        if let Some(format) = schema.format {
            if let Err(message) = check_format(format, s) {
                return self.fail(message);
            }
        }
        Some(value.clone())
    }

    fn check_number(&mut self, schema: &NumberSchema, value: &Value) -> Option<Value> {
        if schema.integer {
            return self.check_integer(schema, value);
        }
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if schema.coerce => match s.trim().parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => return self.fail(format!("Expected number, received '{}'", s)),
            },
            other => return self.fail(expected("number", other)),
        };
        let Some(n) = n.filter(|n| n.is_finite()) else {
            return self.fail("Expected a finite number");
        };
        if let Err(message) = check_bounds(schema, n) {
            return self.fail(message);
        }
        match value {
            Value::Number(_) => Some(value.clone()),
            _ => Number::from_f64(n).map(Value::Number),
        }
    }

    /// Integers stay exact: JSON integers pass through as `i64`, floats are
    /// accepted only when integral and within the exactly representable range.
    fn check_integer(&mut self, schema: &NumberSchema, value: &Value) -> Option<Value> {
        let parsed = match value {
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Ok(i),
                (None, Some(_)) => Err(INTEGER_OUT_OF_RANGE),
                (None, None) => integer_from_f64(n.as_f64()),
            },
            Value::String(s) if schema.coerce => {
                let s = s.trim();
                match (s.parse::<i64>(), s.parse::<f64>()) {
                    (Ok(i), _) => Ok(i),
                    (Err(_), Ok(f)) => integer_from_f64(Some(f)),
                    (Err(_), Err(_)) => {
                        return self.fail(format!("Expected number, received '{}'", s));
                    }
                }
            }
            other => return self.fail(expected("number", other)),
        };
        let i = match parsed {
            Ok(i) => i,
            Err(message) => return self.fail(message),
        };
        if let Err(message) = check_bounds(schema, i as f64) {
            return self.fail(message);
        }
        Some(Value::from(i))
    }

    fn check_enum(&mut self, schema: &EnumSchema, value: &Value) -> Option<Value> {
        let Value::String(s) = value else {
            return self.fail(expected("string", value));
        };
        if schema.values.iter().any(|v| v == s) {
            Some(value.clone())
        } else {
            self.fail(format!(
                "Invalid enum value. Expected {}, received '{}'",
                quoted_list(&schema.values),
                s
            ))
        }
    }

    fn check_array(&mut self, schema: &ArraySchema, value: &Value) -> Option<Value> {
        let Value::Array(items) = value else {
            return self.fail(expected("array", value));
        };
        if let Some(min) = schema.min_items {
            if items.len() < min {
                return self.fail(format!("Array must contain at least {} element(s)", min));
            }
        }
        if let Some(max) = schema.max_items {
            if items.len() > max {
                return self.fail(format!("Array must contain at most {} element(s)", max));
            }
        }
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match self.nested(PathSegment::Index(i), |w| w.check(&schema.items, item)) {
                Some(v) => out.push(v),
                None => ok = false,
            }
        }
        ok.then_some(Value::Array(out))
    }

    fn check_record(&mut self, schema: &RecordSchema, value: &Value) -> Option<Value> {
        let Value::Object(map) = value else {
            return self.fail(expected("object", value));
        };
        let mut out = Map::new();
        let mut ok = true;
        for (key, item) in map {
            let checked = self.nested(PathSegment::Key(key.clone()), |w| {
                if let Some(format) = schema.key_format {
                    if let Err(message) = check_format(format, key) {
                        return w.fail(message);
                    }
                }
                w.check(&schema.values, item)
            });
            match checked {
                Some(v) => {
                    out.insert(key.clone(), v);
                }
                None => ok = false,
            }
        }
        ok.then_some(Value::Object(out))
    }

    fn check_union(&mut self, schema: &UnionSchema, value: &Value) -> Option<Value> {
        let Value::Object(map) = value else {
            return self.fail(expected("object", value));
        };
        let tag = map.get(schema.discriminator).filter(|v| !v.is_null());
        let discriminator = PathSegment::Key(schema.discriminator.to_string());
        let variant = match tag {
            None => return self.nested(discriminator, |w| w.fail("Required")),
            Some(Value::String(tag)) => schema.find(tag),
            Some(_) => None,
        };
        let Some(variant) = variant else {
            let received = match tag {
                Some(Value::String(s)) => format!("'{}'", s),
                Some(other) => kind_of(other).to_string(),
                None => "nothing".to_string(),
            };
            return self.nested(discriminator, |w| {
                w.fail(format!(
                    "Invalid discriminator value. Expected {}, received {}",
                    quoted_list(&schema.tags()),
                    received
                ))
            });
        };
        let mut seed = Map::new();
        seed.insert(
            schema.discriminator.to_string(),
            Value::String(variant.tag.to_string()),
        );
        self.check_fields(&variant.fields, map, seed)
    }

    /// Validate declared fields of `map` into `out`. A `null` counts as omitted.
    fn check_fields(
        &mut self,
        schema: &ObjectSchema,
        map: &Map<String, Value>,
        mut out: Map<String, Value>,
    ) -> Option<Value> {
        let mut ok = true;
        for field in &schema.fields {
            let supplied = map.get(field.name).filter(|v| !v.is_null());
            let segment = PathSegment::Key(field.name.to_string());
            match (supplied, &field.presence) {
                (Some(raw), _) => match self.nested(segment, |w| w.check(&field.schema, raw)) {
                    Some(v) => {
                        out.insert(field.name.to_string(), v);
                    }
                    None => ok = false,
                },
                (None, Presence::Required) => {
                    self.nested(segment, |w| w.fail("Required"));
                    ok = false;
                }
                (None, Presence::Default(default)) => {
                    out.insert(field.name.to_string(), default.clone());
                }
                (None, Presence::Optional) => {}
            }
        }
        ok.then_some(Value::Object(out))
    }
}

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

const INTEGER_OUT_OF_RANGE: &str = "Integer is out of range";

fn integer_from_f64(n: Option<f64>) -> Result<i64, &'static str> {
    let n = n.filter(|n| n.is_finite()).ok_or("Expected a finite number")?;
    if n.fract() != 0.0 {
        return Err("Expected integer, received float");
    }
    if n.abs() > MAX_SAFE_INTEGER {
        return Err(INTEGER_OUT_OF_RANGE);
    }
    Ok(n as i64)
}

fn check_bounds(schema: &NumberSchema, n: f64) -> Result<(), String> {
    if let Some(min) = schema.minimum {
        if n < min {
            return Err(format!("Number must be greater than or equal to {}", min));
        }
    }
    if let Some(max) = schema.maximum {
        if n > max {
            return Err(format!("Number must be less than or equal to {}", max));
        }
    }
    Ok(())
}

fn check_format(format: StringFormat, s: &str) -> Result<(), String> {
    match format {
        StringFormat::Identifier => {
            if is_identifier(s) {
                Ok(())
            } else {
                Err(format!(
                    "Invalid identifier '{}': use letters, digits and underscores",
                    s
                ))
            }
        }
        StringFormat::Column => {
            let valid = match s.split_once('.') {
                _ if s == "*" => true,
                Some((table, column)) => is_identifier(table) && (column == "*" || is_identifier(column)),
                None => is_identifier(s),
            };
            if valid {
                Ok(())
            } else {
                Err(format!(
                    "Invalid column '{}': expected 'column', 'table.column' or '*'",
                    s
                ))
            }
        }
        StringFormat::Url => match reqwest::Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            Ok(url) => Err(format!("Unsupported URL scheme '{}': use http or https", url.scheme())),
            Err(e) => Err(format!("Invalid url: {}", e)),
        },
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(kind: &str, received: &Value) -> String {
    format!("Expected {}, received {}", kind, kind_of(received))
}

fn quoted_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(" | ")
}
