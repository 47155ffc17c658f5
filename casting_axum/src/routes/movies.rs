use axum::extract::State;
use casting_catalog::{Actor, Catalog, Movie, MovieId, MoviePatch, MovieWithActors, NewMovie};
use serde::Serialize;

use super::{Deleted, Success};
use crate::{
    auth::{op, Authorized},
    extract::{Json, Path},
    ApiError,
};

#[derive(Debug, Serialize)]
pub(crate) struct Cast {
    actors: Vec<Actor>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MovieList {
    movies: Vec<Movie>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MovieDetails {
    #[serde(rename = "movie_informations")]
    movie: Movie,
    #[serde(rename = "movie's_actors")]
    cast: Cast,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewlyAdded {
    movie: Movie,
    #[serde(rename = "movie's_actors")]
    cast: Cast,
}

#[derive(Debug, Serialize)]
pub(crate) struct SingleMovie {
    movie: Movie,
}

pub(crate) async fn list(
    _: Authorized<op::GetMovies>,
    State(catalog): State<Catalog>,
) -> Success<MovieList> {
    Success::new(MovieList {
        movies: catalog.movies(),
    })
}

pub(crate) async fn show(
    _: Authorized<op::GetMovies>,
    Path(id): Path<MovieId>,
    State(catalog): State<Catalog>,
) -> Result<Success<MovieDetails>, ApiError> {
    let MovieWithActors { movie, actors } = catalog.movie_with_actors(id)?;
    Ok(Success::new(MovieDetails {
        movie,
        cast: Cast { actors },
    }))
}

pub(crate) async fn create(
    auth: Authorized<op::AddMovie>,
    State(catalog): State<Catalog>,
    Json(new): Json<NewMovie>,
) -> Success<NewlyAdded> {
    let movie = catalog.create_movie(new);
    tracing::info!(subject = %auth.token().subject(), movie.id = %movie.id.0, "movie added");
    Success::new(NewlyAdded {
        movie,
        cast: Cast { actors: Vec::new() },
    })
}

pub(crate) async fn update(
    auth: Authorized<op::PatchMovie>,
    Path(id): Path<MovieId>,
    State(catalog): State<Catalog>,
    Json(patch): Json<MoviePatch>,
) -> Result<Success<SingleMovie>, ApiError> {
    let movie = catalog.update_movie(id, patch)?;
    tracing::info!(subject = %auth.token().subject(), movie.id = %id.0, "movie updated");
    Ok(Success::new(SingleMovie { movie }))
}

pub(crate) async fn remove(
    auth: Authorized<op::DeleteMovie>,
    Path(id): Path<MovieId>,
    State(catalog): State<Catalog>,
) -> Result<Success<Deleted<MovieId>>, ApiError> {
    catalog.delete_movie(id)?;
    tracing::info!(subject = %auth.token().subject(), movie.id = %id.0, "movie deleted");
    Ok(Success::new(Deleted { deleted: id }))
}
