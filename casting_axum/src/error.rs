//! Failure responses

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    response::{IntoResponse, Response},
    Json,
};
use casting_catalog::NotFound;
use casting_oauth2::AuthError;
use http::{header, HeaderValue, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// A request that could not be served
///
/// Every variant renders as `{"success": false, "error": <status>, "message": <text>}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable `Authorization: Bearer` header was presented
    #[error("missing or malformed bearer token")]
    MissingToken,
    /// The bearer token was presented but not accepted
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    /// The addressed actor or movie does not exist
    #[error(transparent)]
    NotFound(#[from] NotFound),
    /// No route matches the request path
    #[error("resource not found")]
    NoRoute,
    /// The request body or path could not be understood
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// The status code this error is reported with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Unauthorized(err) if err.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) | Self::NoRoute => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

// A non-numeric id names no resource, as if the route did not exist.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "unroutable path parameter");
        Self::NoRoute
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: u16,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Rejected tokens all read the same from the outside; the reason is
        // only logged.
        let message = match &self {
            Self::MissingToken | Self::Unauthorized(_) if status == StatusCode::UNAUTHORIZED => {
                "unauthorized".to_owned()
            }
            Self::Unauthorized(err) => {
                let error: &dyn std::error::Error = err;
                tracing::warn!(error, "unable to verify token");
                "signing keys unavailable; try again later".to_owned()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorBody {
            success: false,
            error: status.as_u16(),
            message: &message,
        });

        if status == StatusCode::UNAUTHORIZED {
            let challenge = HeaderValue::from_static(r#"Bearer error="invalid_token""#);
            (status, [(header::WWW_AUTHENTICATE, challenge)], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
