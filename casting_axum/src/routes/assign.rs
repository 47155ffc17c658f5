use axum::extract::State;
use casting_catalog::{Actor, ActorId, Catalog, LinkSet, MovieId};
use serde::{Deserialize, Serialize};

use super::Success;
use crate::{
    auth::{op, Authorized},
    extract::Json,
    ApiError,
};

#[derive(Debug, Deserialize)]
pub(crate) struct Assignment {
    actor_id: ActorId,
    movie_id: MovieId,
}

#[derive(Debug, Serialize)]
pub(crate) struct Cast {
    actors: Vec<Actor>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CastChanged {
    #[serde(rename = "movie's_actor")]
    cast: Cast,
}

/// Resolves the cast reported by a link mutation, skipping any actor
/// deleted since
fn cast_of(catalog: &Catalog, links: &LinkSet) -> Cast {
    Cast {
        actors: links
            .actors_of_movie
            .iter()
            .filter_map(|id| catalog.actor(*id).ok())
            .collect(),
    }
}

pub(crate) async fn link(
    auth: Authorized<op::AssignActor>,
    State(catalog): State<Catalog>,
    Json(Assignment { actor_id, movie_id }): Json<Assignment>,
) -> Result<Success<CastChanged>, ApiError> {
    let links = catalog.link(actor_id, movie_id)?;
    tracing::info!(
        subject = %auth.token().subject(),
        actor.id = %actor_id.0,
        movie.id = %movie_id.0,
        changed = links.changed,
        "actor cast in movie"
    );
    Ok(Success::new(CastChanged {
        cast: cast_of(&catalog, &links),
    }))
}

pub(crate) async fn unlink(
    auth: Authorized<op::AssignActor>,
    State(catalog): State<Catalog>,
    Json(Assignment { actor_id, movie_id }): Json<Assignment>,
) -> Result<Success<CastChanged>, ApiError> {
    let links = catalog.unlink(actor_id, movie_id)?;
    tracing::info!(
        subject = %auth.token().subject(),
        actor.id = %actor_id.0,
        movie.id = %movie_id.0,
        changed = links.changed,
        "actor removed from movie"
    );
    Ok(Success::new(CastChanged {
        cast: cast_of(&catalog, &links),
    }))
}
