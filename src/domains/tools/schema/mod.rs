//! Declarative input schemas for tools.
//!
//! A [`Schema`] is a tagged description of the arguments a tool accepts. The
//! same value is used twice:
//!
//! - [`Schema::validate`] checks raw JSON arguments, applies defaults and
//!   returns a normalized value ready to be deserialized into the tool's
//!   argument type.
//! - [`describe`] turns it into the JSON-Schema-like object advertised to the
//!   host in `tools/list`.
//!
//! Schemas are assembled with small builders:
//!
//! ```rust
//! use toolbox_mcp_server::domains::tools::schema::{Field, NumberSchema, ObjectSchema, StringSchema};
//!
//! let schema = ObjectSchema::new()
//!     .field(Field::required("query", "Search query", StringSchema::new().min_length(1)))
//!     .field(Field::with_default("limit", "Maximum results", NumberSchema::integer().range(1.0, 50.0), 10))
//!     .into_schema();
//! assert!(schema.validate(&serde_json::json!({ "query": "rust" })).is_ok());
//! ```

mod describe;
mod validate;

pub use describe::describe;
pub use validate::{FieldError, PathSegment, ValidationErrors};

use serde_json::Value;

/// A declarative schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean,
    Enum(EnumSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    /// Object with arbitrary keys whose values share one schema.
    Record(RecordSchema),
    /// Object whose shape is selected by the literal value of one field.
    Union(UnionSchema),
    /// Any JSON value, passed through untouched.
    Any,
}

impl Schema {
    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn any() -> Self {
        Self::Any
    }

    /// Short name used in introspection and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) | Self::Enum(_) => "string",
            Self::Number(n) if n.integer => "integer",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) | Self::Record(_) | Self::Union(_) => "object",
            Self::Any => "any",
        }
    }
}

/// Extra checks applied to string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// A SQL-style identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Identifier,
    /// An identifier optionally qualified by a table (`orders.id`), or `*` / `orders.*`.
    Column,
    /// An absolute `http` or `https` URL.
    Url,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub format: Option<StringFormat>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn format(mut self, format: StringFormat) -> Self {
        self.format = Some(format);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Reject values with a fractional part.
    pub integer: bool,
    /// Accept numeric strings such as `"42"`.
    pub coerce: bool,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integer() -> Self {
        Self {
            integer: true,
            ..Self::default()
        }
    }

    pub fn min(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn max(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn range(self, minimum: f64, maximum: f64) -> Self {
        self.min(minimum).max(maximum)
    }

    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub values: Vec<&'static str>,
}

impl EnumSchema {
    pub fn of(values: &[&'static str]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<Schema>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl ArraySchema {
    pub fn of(items: impl Into<Schema>) -> Self {
        Self {
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
        }
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub values: Box<Schema>,
    pub key_format: Option<StringFormat>,
}

impl RecordSchema {
    pub fn of(values: impl Into<Schema>) -> Self {
        Self {
            values: Box::new(values.into()),
            key_format: None,
        }
    }

    pub fn keys(mut self, format: StringFormat) -> Self {
        self.key_format = Some(format);
        self
    }
}

/// Whether a field must be supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    /// Optional; the value is filled in when omitted.
    Default(Value),
}

/// A named member of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Schema,
    pub presence: Presence,
}

impl Field {
    pub fn required(name: &'static str, description: &'static str, schema: impl Into<Schema>) -> Self {
        Self {
            name,
            description,
            schema: schema.into(),
            presence: Presence::Required,
        }
    }

    pub fn optional(name: &'static str, description: &'static str, schema: impl Into<Schema>) -> Self {
        Self {
            name,
            description,
            schema: schema.into(),
            presence: Presence::Optional,
        }
    }

    pub fn with_default(
        name: &'static str,
        description: &'static str,
        schema: impl Into<Schema>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name,
            description,
            schema: schema.into(),
            presence: Presence::Default(default.into()),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn into_schema(self) -> Schema {
        Schema::Object(self)
    }
}

/// One branch of a [`UnionSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub tag: &'static str,
    pub fields: ObjectSchema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    /// Name of the field whose value selects the variant.
    pub discriminator: &'static str,
    pub description: &'static str,
    pub variants: Vec<Variant>,
}

impl UnionSchema {
    pub fn new(discriminator: &'static str, description: &'static str) -> Self {
        Self {
            discriminator,
            description,
            variants: Vec::new(),
        }
    }

    pub fn variant(mut self, tag: &'static str, fields: ObjectSchema) -> Self {
        self.variants.push(Variant { tag, fields });
        self
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.variants.iter().map(|v| v.tag).collect()
    }

    pub fn find(&self, tag: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.tag == tag)
    }

    pub fn into_schema(self) -> Schema {
        Schema::Union(self)
    }
}

macro_rules! impl_into_schema {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Schema {
                fn from(value: $ty) -> Self {
                    Schema::$variant(value)
                }
            }
        )*
    };
}

impl_into_schema! {
    StringSchema => String,
    NumberSchema => Number,
    EnumSchema => Enum,
    ArraySchema => Array,
    ObjectSchema => Object,
    RecordSchema => Record,
    UnionSchema => Union,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Schema::from(StringSchema::new()).kind(), "string");
        assert_eq!(Schema::from(NumberSchema::new()).kind(), "number");
        assert_eq!(Schema::from(NumberSchema::integer()).kind(), "integer");
        assert_eq!(Schema::from(EnumSchema::of(&["a"])).kind(), "string");
        assert_eq!(Schema::boolean().kind(), "boolean");
        assert_eq!(Schema::any().kind(), "any");
    }

    #[test]
    fn test_field_presence() {
        assert!(Field::required("a", "", StringSchema::new()).is_required());
        assert!(!Field::optional("a", "", StringSchema::new()).is_required());
        assert!(!Field::with_default("a", "", NumberSchema::new(), 1).is_required());
    }

    #[test]
    fn test_union_lookup() {
        let union = UnionSchema::new("command", "Command")
            .variant("select", ObjectSchema::new())
            .variant("delete", ObjectSchema::new());
        assert_eq!(union.tags(), vec!["select", "delete"]);
        assert!(union.find("delete").is_some());
        assert!(union.find("Delete").is_none());
    }
}
