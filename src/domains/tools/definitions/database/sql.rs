//! SQL statement building and execution for the database tool.
//!
//! Identifiers are checked by the input schema before they reach this module
//! and are always double-quoted here. Values never appear in SQL text; they
//! are bound as parameters.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde_json::{Map, Value};
use tracing::debug;

use super::{DatabaseCommand, DeleteQuery, Filter, FilterOp, InsertQuery, SelectQuery, UpdateQuery};
use crate::domains::tools::ToolError;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A parameterized SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Quote a column reference: `id`, `orders.id`, `*` or `orders.*`.
pub fn quote_column(column: &str) -> String {
    match column.split_once('.') {
        _ if column == "*" => "*".to_string(),
        Some((table, "*")) => format!("{}.*", quote_ident(table)),
        Some((table, name)) => format!("{}.{}", quote_ident(table), quote_ident(name)),
        None => quote_ident(column),
    }
}

/// Double-quote a bare identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Convert a JSON argument into a bindable SQLite value.
///
/// Arrays and objects are stored as their JSON text.
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Convert a SQLite cell into JSON.
pub fn to_json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}

fn where_clause(filters: &[Filter], params: &mut Vec<SqlValue>) -> Result<String, ToolError> {
    if filters.is_empty() {
        return Ok(String::new());
    }
    let mut conditions = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = quote_column(&filter.column);
        let condition = match (filter.op, &filter.value) {
            (FilterOp::Eq, Value::Null) => format!("{} IS NULL", column),
            (FilterOp::Neq, Value::Null) => format!("{} IS NOT NULL", column),
            (op, Value::Null) => {
                return Err(ToolError::invalid_arguments(format!(
                    "filter on '{}' with op '{}' needs a value",
                    filter.column,
                    op.as_str()
                )));
            }
            (op, value) => {
                params.push(to_sql_value(value));
                format!("{} {} ?", column, op.sql())
            }
        };
        conditions.push(condition);
    }
    Ok(format!(" WHERE {}", conditions.join(" AND ")))
}

/// Qualify a bare join column with its table.
fn join_column(table: &str, column: &str) -> String {
    if column.contains('.') {
        quote_column(column)
    } else {
        format!("{}.{}", quote_ident(table), quote_ident(column))
    }
}

pub fn build_select(query: &SelectQuery) -> Result<Statement, ToolError> {
    let mut params = Vec::new();
    let columns = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query
            .columns
            .iter()
            .map(|c| quote_column(c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!("SELECT {} FROM {}", columns, quote_ident(&query.table));
    if let Some(join) = &query.join {
        sql.push_str(&format!(
            " JOIN {} ON {} = {}",
            quote_ident(&join.table),
            join_column(&query.table, &join.left_column),
            join_column(&join.table, &join.right_column)
        ));
    }
    sql.push_str(&where_clause(&query.filters, &mut params)?);
    if let Some(order) = &query.order_by {
        sql.push_str(&format!(
            " ORDER BY {} {}",
            quote_column(&order.column),
            if order.descending { "DESC" } else { "ASC" }
        ));
    }
    sql.push_str(" LIMIT ?");
    params.push(SqlValue::Integer(i64::from(query.limit)));

    Ok(Statement { sql, params })
}

pub fn build_insert(table: &str, row: &Map<String, Value>) -> Statement {
    if row.is_empty() {
        return Statement {
            sql: format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table)),
            params: Vec::new(),
        };
    }
    let columns: Vec<_> = row.keys().map(|k| quote_ident(k)).collect();
    let placeholders = vec!["?"; row.len()].join(", ");
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns.join(", "),
            placeholders
        ),
        params: row.values().map(to_sql_value).collect(),
    }
}

pub fn build_update(query: &UpdateQuery) -> Result<Statement, ToolError> {
    if query.values.is_empty() {
        return Err(ToolError::invalid_arguments("values must not be empty"));
    }
    let mut params: Vec<SqlValue> = query.values.values().map(to_sql_value).collect();
    let assignments = query
        .values
        .keys()
        .map(|k| format!("{} = ?", quote_ident(k)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("UPDATE {} SET {}", quote_ident(&query.table), assignments);
    sql.push_str(&where_clause(&query.filters, &mut params)?);
    Ok(Statement { sql, params })
}

pub fn build_delete(query: &DeleteQuery) -> Result<Statement, ToolError> {
    let mut params = Vec::new();
    let mut sql = format!("DELETE FROM {}", quote_ident(&query.table));
    sql.push_str(&where_clause(&query.filters, &mut params)?);
    Ok(Statement { sql, params })
}

/// Open the database at `path`. The file must already exist.
pub fn open(path: &Path) -> Result<Connection, ToolError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Run a command and render its outcome as text.
pub fn execute(conn: &mut Connection, command: &DatabaseCommand) -> Result<String, ToolError> {
    match command {
        DatabaseCommand::Select(query) => run_select(conn, query),
        DatabaseCommand::Insert(query) => run_insert(conn, query),
        DatabaseCommand::Update(query) => {
            let changed = run_statement(conn, &build_update(query)?)?;
            Ok(format!("Updated {} row(s) in {}", changed, query.table))
        }
        DatabaseCommand::Delete(query) => {
            let changed = run_statement(conn, &build_delete(query)?)?;
            Ok(format!("Deleted {} row(s) from {}", changed, query.table))
        }
    }
}

fn run_statement(conn: &Connection, statement: &Statement) -> Result<usize, ToolError> {
    debug!("Executing: {}", statement.sql);
    Ok(conn.execute(&statement.sql, params_from_iter(statement.params.iter()))?)
}

fn run_select(conn: &Connection, query: &SelectQuery) -> Result<String, ToolError> {
    let statement = build_select(query)?;
    debug!("Executing: {}", statement.sql);

    let mut stmt = conn.prepare(&statement.sql)?;
    let names = unique_names(stmt.column_names());
    let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;

    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Map::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            record.insert(name.clone(), to_json_value(row.get_ref(i)?));
        }
        records.push(Value::Object(record));
    }

    Ok(format!(
        "{} row(s)\n{}",
        records.len(),
        serde_json::to_string_pretty(&records)?
    ))
}

/// Result column names made unique: a join over same-named columns returns
/// `name`, `name_2`, ... in select order instead of dropping cells.
fn unique_names(names: Vec<&str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut unique = Vec::with_capacity(names.len());
    for name in &names {
        let mut key = name.to_string();
        let mut n = 2;
        while seen.contains(&key) || (key != *name && names.contains(&key.as_str())) {
            key = format!("{}_{}", name, n);
            n += 1;
        }
        seen.insert(key.clone());
        unique.push(key);
    }
    unique
}

/// Insert every row in one transaction. Nothing is written if any row fails.
fn run_insert(conn: &mut Connection, query: &InsertQuery) -> Result<String, ToolError> {
    let tx = conn.transaction()?;
    let mut inserted = 0;
    for row in &query.rows {
        inserted += run_statement(&tx, &build_insert(&query.table, row))?;
    }
    tx.commit()?;
    Ok(format!("Inserted {} row(s) into {}", inserted, query.table))
}
