//! Handlers, one module per resource

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ApiError;

pub(crate) mod actors;
pub(crate) mod assign;
pub(crate) mod movies;

/// A successful response: `{"success": true, ...fields of T}`
#[derive(Debug, Serialize)]
pub(crate) struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

impl<T> Success<T> {
    pub(crate) fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Deleted<Id> {
    deleted: Id,
}

pub(crate) async fn fallback() -> ApiError {
    ApiError::NoRoute
}
