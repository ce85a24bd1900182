//! Uniform response envelope
//!
//! Every endpoint, success or error, answers with the same three-key body
//! `{ data, message, status }`, the HTTP status code mirroring the `status`
//! field. Dashboard clients render any response without branching on shape.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub message: String,
    pub status: u16,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            status: status.as_u16(),
        }
    }

    /// Envelope plus the mirrored HTTP status, ready to return.
    pub fn respond(status: StatusCode, data: T, message: impl Into<String>) -> Response {
        (status, Json(Self::new(status, data, message))).into_response()
    }
}

pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    Envelope::respond(StatusCode::OK, data, message)
}

pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    Envelope::respond(StatusCode::CREATED, data, message)
}
