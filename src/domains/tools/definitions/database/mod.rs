//! Database query tool definition.
//!
//! Structured select/insert/update/delete against a SQLite database whose
//! path is taken from `DATABASE_PATH` on every call. Callers never write raw
//! SQL: identifiers are validated by the input schema and values are bound
//! as parameters.

pub mod sql;

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::common::{required_env, success_result};
use crate::domains::tools::descriptor::{ToolHandler, ToolResult};
use crate::domains::tools::schema::{
    ArraySchema, EnumSchema, Field, NumberSchema, ObjectSchema, RecordSchema, Schema,
    StringFormat, StringSchema, UnionSchema,
};
use crate::domains::tools::ToolError;

pub const DATABASE_PATH_VAR: &str = "DATABASE_PATH";

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl FilterOp {
    const ALL: [&'static str; 7] = ["eq", "neq", "gt", "gte", "lt", "lte", "like"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
        }
    }
}

/// A `column op value` condition. Conditions are combined with `AND`.
#[derive(Debug, Clone, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    /// Omitted means `NULL`, valid only with `eq` and `neq`.
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Join {
    pub table: String,
    pub left_column: String,
    pub right_column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub join: Option<Join>,
    pub order_by: Option<OrderBy>,
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsertQuery {
    pub table: String,
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuery {
    pub table: String,
    pub values: Map<String, Value>,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteQuery {
    pub table: String,
    pub filters: Vec<Filter>,
}

/// Parameters for the database tool, tagged by `command`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum DatabaseCommand {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

impl DatabaseCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

// ============================================================================
// Schema
// ============================================================================

fn table_field() -> Field {
    Field::required(
        "table",
        "Table name",
        StringSchema::new().format(StringFormat::Identifier),
    )
}

fn column_schema() -> StringSchema {
    StringSchema::new().format(StringFormat::Column)
}

fn filter_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(Field::required("column", "Column to compare", column_schema()))
        .field(Field::required(
            "op",
            "Comparison operator",
            EnumSchema::of(&FilterOp::ALL),
        ))
        .field(Field::optional(
            "value",
            "Value to compare against; omit to match NULL with eq/neq",
            Schema::any(),
        ))
}

fn filters_field(min_items: usize) -> Field {
    let filters = ArraySchema::of(filter_schema()).min_items(min_items);
    if min_items == 0 {
        Field::with_default(
            "filters",
            "Conditions combined with AND",
            filters,
            Value::Array(Vec::new()),
        )
    } else {
        Field::required(
            "filters",
            "Conditions combined with AND (at least one)",
            filters,
        )
    }
}

fn row_schema() -> RecordSchema {
    RecordSchema::of(Schema::any()).keys(StringFormat::Identifier)
}

fn select_variant() -> ObjectSchema {
    ObjectSchema::new()
        .field(table_field())
        .field(Field::with_default(
            "columns",
            "Columns to return",
            ArraySchema::of(column_schema()).min_items(1),
            serde_json::json!(["*"]),
        ))
        .field(filters_field(0))
        .field(Field::optional(
            "join",
            "Inner join with another table",
            ObjectSchema::new()
                .field(Field::required(
                    "table",
                    "Table to join",
                    StringSchema::new().format(StringFormat::Identifier),
                ))
                .field(Field::required(
                    "left_column",
                    "Column of the main table",
                    column_schema(),
                ))
                .field(Field::required(
                    "right_column",
                    "Column of the joined table",
                    column_schema(),
                )),
        ))
        .field(Field::optional(
            "order_by",
            "Sort order",
            ObjectSchema::new()
                .field(Field::required("column", "Column to sort by", column_schema()))
                .field(Field::with_default(
                    "descending",
                    "Sort descending",
                    Schema::boolean(),
                    false,
                )),
        ))
        .field(Field::with_default(
            "limit",
            "Maximum number of rows (1-1000)",
            NumberSchema::integer().range(1.0, 1000.0).coerce(),
            100,
        ))
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Database query tool.
#[derive(Debug, Default)]
pub struct DatabaseQueryTool;

impl DatabaseQueryTool {
    pub fn new() -> Self {
        Self
    }

    /// Run `command` against the database at `path` on the blocking pool.
    #[instrument(skip(self, command), fields(command = command.name()))]
    pub async fn run(&self, path: PathBuf, command: DatabaseCommand) -> ToolResult {
        let output = tokio::task::spawn_blocking(move || {
            let mut conn = sql::open(&path)?;
            sql::execute(&mut conn, &command)
        })
        .await
        .map_err(|e| ToolError::internal(format!("Database task failed: {}", e)))??;

        info!("Database command completed");
        Ok(success_result(output))
    }
}

#[async_trait::async_trait]
impl ToolHandler for DatabaseQueryTool {
    type Args = DatabaseCommand;

    const NAME: &'static str = "database_query";

    const DESCRIPTION: &'static str = "Query or modify the configured SQLite database. \
        Choose a command (select, insert, update, delete); table and column names must be \
        plain identifiers and values are always bound as parameters.";

    fn input_schema() -> Schema {
        UnionSchema::new("command", "Operation to perform")
            .variant("select", select_variant())
            .variant(
                "insert",
                ObjectSchema::new().field(table_field()).field(Field::required(
                    "rows",
                    "Rows to insert, as column/value objects",
                    ArraySchema::of(row_schema()).min_items(1),
                )),
            )
            .variant(
                "update",
                ObjectSchema::new()
                    .field(table_field())
                    .field(Field::required(
                        "values",
                        "Column/value pairs to set",
                        row_schema(),
                    ))
                    .field(filters_field(1)),
            )
            .variant(
                "delete",
                ObjectSchema::new().field(table_field()).field(filters_field(1)),
            )
            .into_schema()
    }

    async fn call(&self, args: DatabaseCommand) -> ToolResult {
        let path = required_env(DATABASE_PATH_VAR)?;
        self.run(PathBuf::from(path), args).await
    }
}

// ============================================================================
// Tests
// ============================================================================
