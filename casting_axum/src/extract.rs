//! Request extractors that reject with [`ApiError`]

use axum::extract::{FromRequest, FromRequestParts};

use crate::ApiError;

/// A JSON request body
///
/// Missing fields, wrong types and a missing content type are all
/// reported as `400 Bad Request`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

/// A typed path parameter
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);
