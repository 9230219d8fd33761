use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Envelope wrapped around every response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

pub fn reply(status: StatusCode, message: impl Into<String>, payload: Option<Value>) -> Response {
    let envelope = Envelope {
        status_code: status.as_u16(),
        message: message.into(),
        payload,
    };
    (status, Json(envelope)).into_response()
}
