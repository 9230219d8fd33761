use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{
    entities::{NewTodo, SortOrder, TodoStatus, TodoStore, UpdateTodo, SORT_KEYS},
    error::ApiError,
    response::reply,
};

/// Builds the application router. Parameterized routes sit behind the
/// static method routers axum resolves first, so `/todos/{id}/complete`
/// is never shadowed by `/todos/{id}`.
pub fn app(store: TodoStore) -> Router {
    Router::new()
        .route("/todos", post(create_todo).get(list_todos))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todos/{id}/complete", put(complete_todo))
        .fallback(not_found)
        .layer(Extension(store))
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    status: Option<String>,
    sort_by: Option<String>,
    order_by: Option<String>,
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid todo id '{raw}'")))
}

fn parse_order(raw: Option<&str>) -> Result<SortOrder, ApiError> {
    match raw {
        None | Some("asc") => Ok(SortOrder::Asc),
        Some("desc") => Ok(SortOrder::Desc),
        Some(other) => Err(ApiError::BadRequest(format!(
            "invalid orderBy '{other}': expected 'asc' or 'desc'"
        ))),
    }
}

// Bodies axum could not parse at all still get the response envelope.
fn parse_body<T: DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = body
        .map_err(|rejection| ApiError::BadRequest(format!("invalid request body: {rejection}")))?;
    serde_json::from_value(value)
        .map_err(|err| ApiError::BadRequest(format!("invalid request body: {err}")))
}

async fn list_todos(
    Extension(store): Extension<TodoStore>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let filter = match params.status.as_deref() {
        Some(raw) => Some(raw.parse::<TodoStatus>().map_err(|_| {
            ApiError::BadRequest(format!(
                "invalid status filter '{raw}': expected 'incomplete' or 'complete'"
            ))
        })?),
        None => None,
    };
    let sort_by = match params.sort_by.as_deref() {
        Some(key) if SORT_KEYS.contains(&key) => Some(key),
        Some(key) => {
            return Err(ApiError::BadRequest(format!(
                "invalid sortBy '{key}': expected one of {}",
                SORT_KEYS.join(", ")
            )))
        }
        None => None,
    };
    let order = parse_order(params.order_by.as_deref())?;

    let todos = store.read_all(filter, sort_by, order).await?;
    Ok(reply(
        StatusCode::OK,
        "todos retrieved",
        Some(json!({ "todos": todos })),
    ))
}

async fn get_todo(
    Extension(store): Extension<TodoStore>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    match store.read(id).await? {
        Some(todo) => Ok(reply(
            StatusCode::OK,
            "todo retrieved",
            Some(json!({ "todo": todo })),
        )),
        None => Err(ApiError::NotFound),
    }
}

async fn create_todo(
    Extension(store): Extension<TodoStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let new: NewTodo = parse_body(body)?;
    let todo = store.create(new.into_props()).await?;
    Ok(reply(
        StatusCode::CREATED,
        "todo created",
        Some(json!({ "todo": todo })),
    ))
}

async fn update_todo(
    Extension(store): Extension<TodoStore>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let patch: UpdateTodo = parse_body(body)?;
    match store.update(id, patch.into_props()).await? {
        Some(todo) => Ok(reply(
            StatusCode::OK,
            "todo updated",
            Some(json!({ "todo": todo })),
        )),
        None => Err(ApiError::NotFound),
    }
}

async fn delete_todo(
    Extension(store): Extension<TodoStore>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let todo = store.read(id).await?.ok_or(ApiError::NotFound)?;
    if store.delete(id).await? {
        Ok(reply(
            StatusCode::OK,
            "todo deleted",
            Some(json!({ "todo": todo })),
        ))
    } else {
        Err(ApiError::Internal("todo was not deleted".to_string()))
    }
}

async fn complete_todo(
    Extension(store): Extension<TodoStore>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    match store.mark_complete(id).await? {
        Some(todo) => Ok(reply(
            StatusCode::OK,
            "todo completed",
            Some(json!({ "todo": todo })),
        )),
        None => Err(ApiError::NotFound),
    }
}

async fn not_found() -> Response {
    reply(StatusCode::NOT_FOUND, "resource not found", None)
}
