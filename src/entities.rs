use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use crate::case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TodoStatus {
    Incomplete,
    Complete,
}

impl FromStr for TodoStatus {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "incomplete" => Ok(TodoStatus::Incomplete),
            "complete" => Ok(TodoStatus::Complete),
            _ => Err(()),
        }
    }
}

/// One row of the `todos` table. Columns are snake_case in storage and
/// camelCase on the wire.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// Creation schema, validated once at the controller boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial-update schema. Unknown fields are rejected during
/// deserialization so the column list can only ever contain known keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn into_props(self) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert("title".to_string(), Value::String(self.title));
        props.insert("description".to_string(), Value::String(self.description));
        if let Some(due_at) = self.due_at {
            props.insert("dueAt".to_string(), timestamp(due_at));
        }
        if let Some(created_at) = self.created_at {
            props.insert("createdAt".to_string(), timestamp(created_at));
        }
        props
    }
}

impl UpdateTodo {
    pub fn into_props(self) -> Map<String, Value> {
        let mut props = Map::new();
        if let Some(title) = self.title {
            props.insert("title".to_string(), Value::String(title));
        }
        if let Some(description) = self.description {
            props.insert("description".to_string(), Value::String(description));
        }
        if let Some(due_at) = self.due_at {
            props.insert("dueAt".to_string(), timestamp(due_at));
        }
        props
    }
}

/// Wire-side (camelCase) keys accepted for `sortBy`. Anything else resolves
/// to ordering by `id`.
pub const SORT_KEYS: [&str; 7] = [
    "title",
    "description",
    "status",
    "dueAt",
    "createdAt",
    "completedAt",
    "editedAt",
];

const INSERT_COLUMNS: [&str; 5] = ["title", "description", "status", "due_at", "created_at"];
const UPDATE_COLUMNS: [&str; 5] = ["title", "description", "status", "due_at", "completed_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

// Timestamps are stored as RFC 3339 text with a fixed width so that
// lexicographic ORDER BY matches chronological order.
fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn push_bind_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Null => {
            builder.push_bind(None::<String>);
        }
        Value::Bool(b) => {
            builder.push_bind(*b);
        }
        Value::Number(n) if n.is_i64() => {
            builder.push_bind(n.as_i64().unwrap_or_default());
        }
        Value::Number(n) => {
            builder.push_bind(n.as_f64().unwrap_or_default());
        }
        Value::String(s) => {
            builder.push_bind(s.clone());
        }
        other => {
            builder.push_bind(other.to_string());
        }
    }
}

fn resolve_sort_column(sort_by: Option<&str>) -> String {
    match sort_by {
        Some(key) if SORT_KEYS.contains(&key) => case::camel_to_snake(key),
        _ => "id".to_string(),
    }
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'incomplete',
            due_at TEXT,
            created_at TEXT NOT NULL,
            completed_at TEXT,
            edited_at TEXT
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Data access for the `todos` table over an injected shared pool. Each
/// operation holds one pooled connection for the duration of one query.
/// Storage errors propagate to the caller untouched.
#[derive(Debug, Clone)]
pub struct TodoStore {
    pool: SqlitePool,
}

impl TodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a row built from camelCase props. `createdAt` defaults to
    /// now and `status` to incomplete when absent. Missing required
    /// columns surface as a constraint error from storage.
    pub async fn create(&self, mut props: Map<String, Value>) -> Result<Todo, sqlx::Error> {
        if !props.contains_key("createdAt") {
            props.insert("createdAt".to_string(), timestamp(Utc::now()));
        }
        if !props.contains_key("status") {
            props.insert("status".to_string(), Value::String("incomplete".to_string()));
        }

        let columns = case::convert_keys(&props, case::camel_to_snake);
        let accepted: Vec<(&String, &Value)> = columns
            .iter()
            .filter(|(column, _)| INSERT_COLUMNS.contains(&column.as_str()))
            .collect();

        let mut builder = QueryBuilder::new("INSERT INTO todos (");
        for (i, (column, _)) in accepted.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(column.as_str());
        }
        builder.push(") VALUES (");
        for (i, (_, value)) in accepted.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            push_bind_value(&mut builder, value);
        }
        builder.push(") RETURNING *");

        builder
            .build_query_as::<Todo>()
            .fetch_one(&self.pool)
            .await
    }

    pub async fn read(&self, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn read_all(
        &self,
        filter: Option<TodoStatus>,
        sort_by: Option<&str>,
        order: SortOrder,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        let column = resolve_sort_column(sort_by);
        let direction = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let sql = match filter {
            Some(_) => {
                format!("SELECT * FROM todos WHERE status = ? ORDER BY {column} {direction}")
            }
            None => format!("SELECT * FROM todos ORDER BY {column} {direction}"),
        };

        let mut query = sqlx::query_as::<_, Todo>(&sql);
        if let Some(status) = filter {
            query = query.bind(status);
        }
        query.fetch_all(&self.pool).await
    }

    /// Partial update from camelCase props. Keys outside the update
    /// whitelist are dropped before any column list is built; `edited_at`
    /// is always stamped. Returns `None` when the id does not exist.
    pub async fn update(
        &self,
        id: i64,
        props: Map<String, Value>,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let columns = case::convert_keys(&props, case::camel_to_snake);

        let mut builder = QueryBuilder::new("UPDATE todos SET edited_at = ");
        builder.push_bind(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
        for (column, value) in columns
            .iter()
            .filter(|(column, _)| UPDATE_COLUMNS.contains(&column.as_str()))
        {
            builder.push(", ");
            builder.push(column.as_str());
            builder.push(" = ");
            push_bind_value(&mut builder, value);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<Todo>()
            .fetch_optional(&self.pool)
            .await
    }

    /// True only when exactly one row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_complete(&self, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        let mut props = Map::new();
        props.insert("status".to_string(), Value::String("complete".to_string()));
        props.insert("completedAt".to_string(), timestamp(Utc::now()));
        self.update(id, props).await
    }
}
