//! HTTP service for the casting catalog
//!
//! Every route requires a bearer token granting the permission of its
//! [`Operation`]. The token is checked before the request body is read or
//! the catalog is touched.
//!
//! | Route | Method | Operation |
//! |---|---|---|
//! | `/actors` | `GET` | [`Operation::GetActors`] |
//! | `/actors` | `POST` | [`Operation::AddActor`] |
//! | `/actors/:id` | `GET` | [`Operation::GetActors`] |
//! | `/actors/:id` | `PATCH` | [`Operation::PatchActor`] |
//! | `/actors/:id` | `DELETE` | [`Operation::DeleteActor`] |
//! | `/movies` | `GET` | [`Operation::GetMovies`] |
//! | `/movies` | `POST` | [`Operation::AddMovie`] |
//! | `/movies/:id` | `GET` | [`Operation::GetMovies`] |
//! | `/movies/:id` | `PATCH` | [`Operation::PatchMovie`] |
//! | `/movies/:id` | `DELETE` | [`Operation::DeleteMovie`] |
//! | `/assign` | `POST`, `DELETE` | [`Operation::AssignActor`] |

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use casting_catalog::Catalog;
use casting_oauth2::Gate;
use http::{header, Method};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
mod config;
mod error;
mod extract;
mod routes;

pub use auth::{Authorized, Operation};
pub use config::Config;
pub use error::ApiError;

/// Shared state handed to every handler
#[derive(Clone, Debug, FromRef)]
pub struct AppState {
    /// Checks bearer tokens
    pub gate: Gate,
    /// Actors, movies and their links
    pub catalog: Catalog,
}

/// Builds the service's router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/actors", get(routes::actors::list).post(routes::actors::create))
        .route(
            "/actors/:id",
            get(routes::actors::show)
                .patch(routes::actors::update)
                .delete(routes::actors::remove),
        )
        .route("/movies", get(routes::movies::list).post(routes::movies::create))
        .route(
            "/movies/:id",
            get(routes::movies::show)
                .patch(routes::movies::update)
                .delete(routes::movies::remove),
        )
        .route(
            "/assign",
            post(routes::assign::link).delete(routes::assign::unlink),
        )
        .fallback(routes::fallback)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PATCH])
}
