//! Bearer token extraction and the permission each operation requires

use std::{fmt, marker::PhantomData};

use axum::extract::{FromRef, FromRequestParts};
use casting_jose::Jwt;
use casting_oauth2::{Gate, PermissionRef, VerifiedToken};
use http::{header, request::Parts};

use crate::ApiError;

/// An operation exposed over HTTP
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Listing or reading actors
    GetActors,
    /// Adding an actor
    AddActor,
    /// Changing an actor's details
    PatchActor,
    /// Removing an actor
    DeleteActor,
    /// Listing or reading movies
    GetMovies,
    /// Adding a movie
    AddMovie,
    /// Changing a movie's details
    PatchMovie,
    /// Removing a movie
    DeleteMovie,
    /// Both casting an actor and removing them from a cast
    AssignActor,
}

impl Operation {
    /// Every operation
    pub const ALL: [Self; 9] = [
        Self::GetActors,
        Self::AddActor,
        Self::PatchActor,
        Self::DeleteActor,
        Self::GetMovies,
        Self::AddMovie,
        Self::PatchMovie,
        Self::DeleteMovie,
        Self::AssignActor,
    ];

    /// The permission a token must grant to perform this operation
    #[must_use]
    pub fn permission(self) -> &'static PermissionRef {
        PermissionRef::from_static(match self {
            Self::GetActors => "get:actors",
            Self::AddActor => "add:actor",
            Self::PatchActor => "patch:actor",
            Self::DeleteActor => "delete:actor",
            Self::GetMovies => "get:movies",
            Self::AddMovie => "add:movie",
            Self::PatchMovie => "patch:movie",
            Self::DeleteMovie => "delete:movie",
            Self::AssignActor => "assign:actor",
        })
    }
}

/// Ties a marker type to the [`Operation`] it guards
pub trait Guarded {
    /// The guarded operation
    const OPERATION: Operation;
}

macro_rules! operation_markers {
    ($($op:ident),* $(,)?) => {
        $(
            #[doc = concat!(
                "Marks a handler as performing [`Operation::", stringify!($op),
                "`](crate::Operation::", stringify!($op), ")"
            )]
            #[derive(Debug)]
            pub enum $op {}

            impl $crate::auth::Guarded for $op {
                const OPERATION: $crate::auth::Operation = $crate::auth::Operation::$op;
            }
        )*
    };
}

/// Markers for use with [`Authorized`]
pub mod op {
    operation_markers! {
        GetActors,
        AddActor,
        PatchActor,
        DeleteActor,
        GetMovies,
        AddMovie,
        PatchMovie,
        DeleteMovie,
        AssignActor,
    }
}

/// Proof that the request's bearer token grants the permission `Op` requires
///
/// Place this extractor first in a handler's arguments. Nothing else about
/// the request is looked at until the token has been accepted.
pub struct Authorized<Op> {
    token: VerifiedToken,
    _op: PhantomData<fn() -> Op>,
}

impl<Op> Authorized<Op> {
    /// The accepted token
    pub fn token(&self) -> &VerifiedToken {
        &self.token
    }
}

impl<Op: Guarded> fmt::Debug for Authorized<Op> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Authorized")
            .field("operation", &Op::OPERATION)
            .field("subject", &self.token.subject())
            .finish()
    }
}

#[axum::async_trait]
impl<Op, S> FromRequestParts<S> for Authorized<Op>
where
    Op: Guarded,
    Gate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_jwt)
            .ok_or_else(|| {
                tracing::debug!(operation = ?Op::OPERATION, "no bearer token presented");
                ApiError::MissingToken
            })?;

        let gate = Gate::from_ref(state);
        let token = gate
            .authorize(&jwt, Op::OPERATION.permission())
            .await?;

        Ok(Self {
            token,
            _op: PhantomData,
        })
    }
}

fn extract_jwt(auth: &str) -> Option<Jwt> {
    if auth.len() <= 7 || !auth[..7].eq_ignore_ascii_case("bearer ") {
        return None;
    }

    let token = auth[7..].trim();
    if token.is_empty() {
        return None;
    }

    Some(Jwt::from(token))
}
