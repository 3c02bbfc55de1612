//! Cleaning, running and pretty-printing generated SQL.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use thiserror::Error;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:sql)?").expect("fence pattern"));
static TERMINATED_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bSELECT\b.*?;").expect("select pattern"));
static OPEN_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bSELECT\b.*").expect("select pattern"));
static CLAUSE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]*\b(SELECT|FROM|JOIN|WHERE)\b").expect("keyword pattern")
});

/// The model's reply could not be turned into a statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSqlReply {
    #[error("Empty response received")]
    Empty,
    #[error("No valid SELECT statement found in response")]
    NoSelect,
}

/// Extract the first `SELECT` statement from a model reply, terminated by `;`.
pub fn clean_sql(reply: &str) -> Result<String, InvalidSqlReply> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(InvalidSqlReply::Empty);
    }
    tracing::debug!(reply = %reply, "Raw model reply");

    let unfenced = CODE_FENCE.replace_all(reply, "");
    let unfenced = unfenced.trim();

    let statement = if let Some(m) = TERMINATED_SELECT.find(unfenced) {
        m.as_str().to_string()
    } else if let Some(m) = OPEN_SELECT.find(unfenced) {
        format!("{};", m.as_str().trim_end())
    } else {
        tracing::error!(reply = %unfenced, "No SELECT statement in model reply");
        return Err(InvalidSqlReply::NoSelect);
    };

    Ok(statement)
}

/// Run `sql` and return each row as a JSON object keyed by column name.
pub async fn execute(pool: &SqlitePool, sql: &str) -> Result<Vec<Map<String, Value>>, sqlx::Error> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;
    rows.iter().map(row_to_json).collect()
}

fn row_to_json(row: &SqliteRow) -> Result<Map<String, Value>, sqlx::Error> {
    let mut object = Map::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(i)?),
                "REAL" => serde_json::Number::from_f64(row.try_get_unchecked::<f64, _>(i)?)
                    .map_or(Value::Null, Value::Number),
                "BLOB" => Value::String(
                    String::from_utf8_lossy(&row.try_get_unchecked::<Vec<u8>, _>(i)?).into_owned(),
                ),
                _ => Value::String(row.try_get_unchecked::<String, _>(i)?),
            }
        };
        object.insert(column.name().to_string(), value);
    }

    Ok(object)
}

/// Put each `SELECT`, `FROM`, `JOIN` and `WHERE` keyword on a new line.
#[must_use]
pub fn format_sql(sql: &str) -> String {
    CLAUSE_KEYWORD.replace_all(sql, "\n$1").into_owned()
}

/// One JSON object per line, or `[]` when there are no rows.
#[must_use]
pub fn format_rows(rows: &[Map<String, Value>]) -> String {
    if rows.is_empty() {
        return "[]".to_string();
    }
    rows.iter()
        .map(|row| Value::Object(row.clone()).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
