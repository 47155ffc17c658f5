use axum::extract::State;
use casting_catalog::{Actor, ActorId, ActorPatch, ActorWithMovies, Catalog, Movie, NewActor};
use serde::Serialize;

use super::{Deleted, Success};
use crate::{
    auth::{op, Authorized},
    extract::{Json, Path},
    ApiError,
};

#[derive(Debug, Serialize)]
pub(crate) struct Filmography {
    movies: Vec<Movie>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActorDetails {
    #[serde(rename = "actor's_informaion")]
    actor: Actor,
    #[serde(rename = "actor's_movies")]
    movies: Filmography,
}

impl From<ActorWithMovies> for ActorDetails {
    fn from(entry: ActorWithMovies) -> Self {
        Self {
            actor: entry.actor,
            movies: Filmography {
                movies: entry.movies,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ActorList {
    actors: Vec<ActorDetails>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SingleActor {
    actor: Actor,
}

pub(crate) async fn list(
    _: Authorized<op::GetActors>,
    State(catalog): State<Catalog>,
) -> Success<ActorList> {
    let actors = catalog
        .actors_with_movies()
        .into_iter()
        .map(ActorDetails::from)
        .collect();
    Success::new(ActorList { actors })
}

pub(crate) async fn show(
    _: Authorized<op::GetActors>,
    Path(id): Path<ActorId>,
    State(catalog): State<Catalog>,
) -> Result<Success<ActorDetails>, ApiError> {
    let entry = catalog.actor_with_movies(id)?;
    Ok(Success::new(entry.into()))
}

pub(crate) async fn create(
    auth: Authorized<op::AddActor>,
    State(catalog): State<Catalog>,
    Json(new): Json<NewActor>,
) -> Success<SingleActor> {
    let actor = catalog.create_actor(new);
    tracing::info!(subject = %auth.token().subject(), actor.id = %actor.id.0, "actor added");
    Success::new(SingleActor { actor })
}

pub(crate) async fn update(
    auth: Authorized<op::PatchActor>,
    Path(id): Path<ActorId>,
    State(catalog): State<Catalog>,
    Json(patch): Json<ActorPatch>,
) -> Result<Success<SingleActor>, ApiError> {
    let actor = catalog.update_actor(id, patch)?;
    tracing::info!(subject = %auth.token().subject(), actor.id = %id.0, "actor updated");
    Ok(Success::new(SingleActor { actor }))
}

pub(crate) async fn remove(
    auth: Authorized<op::DeleteActor>,
    Path(id): Path<ActorId>,
    State(catalog): State<Catalog>,
) -> Result<Success<Deleted<ActorId>>, ApiError> {
    catalog.delete_actor(id)?;
    tracing::info!(subject = %auth.token().subject(), actor.id = %id.0, "actor deleted");
    Ok(Success::new(Deleted { deleted: id }))
}
