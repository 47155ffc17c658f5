use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;
use serde::Serialize;

use crate::{
    model::{
        Actor, ActorId, ActorPatch, EntityRef, Movie, MovieId, MoviePatch, NewActor, NewMovie,
    },
    relationships::{LinkSet, Links},
    NotFound,
};

/// The persistence contract relationship bookkeeping relies on
///
/// Deleting an entity through this trait also removes its links, so no
/// reader can observe a link to an entity that no longer exists.
pub trait EntityStore {
    /// Whether `entity` currently exists
    fn exists(&self, entity: EntityRef) -> bool;

    /// Deletes `entity` and every link touching it
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if `entity` does not exist.
    fn delete(&self, entity: EntityRef) -> Result<(), NotFound>;
}

/// An actor together with the movies they appear in
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActorWithMovies {
    /// The actor
    pub actor: Actor,
    /// Their movies, in ID order
    pub movies: Vec<Movie>,
}

/// A movie together with its cast
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MovieWithActors {
    /// The movie
    pub movie: Movie,
    /// Its cast, in ID order
    pub actors: Vec<Actor>,
}

#[derive(Debug, Default)]
struct Tables {
    actors: BTreeMap<ActorId, Actor>,
    movies: BTreeMap<MovieId, Movie>,
    links: Links,
    last_actor_id: u64,
    last_movie_id: u64,
}

impl Tables {
    fn exists(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Actor(id) => self.actors.contains_key(&id),
            EntityRef::Movie(id) => self.movies.contains_key(&id),
        }
    }

    fn require(&self, entity: EntityRef) -> Result<(), NotFound> {
        if self.exists(entity) {
            Ok(())
        } else {
            Err(NotFound(entity))
        }
    }

    fn movies_of(&self, actor: ActorId) -> Vec<Movie> {
        self.links
            .movies_of(actor)
            .into_iter()
            .filter_map(|id| self.movies.get(&id).cloned())
            .collect()
    }

    fn actors_of(&self, movie: MovieId) -> Vec<Actor> {
        self.links
            .actors_of(movie)
            .into_iter()
            .filter_map(|id| self.actors.get(&id).cloned())
            .collect()
    }
}

/// Actors, movies and the links between them
///
/// Every table lives behind one lock, so a mutation that checks existence
/// and updates links happens as a single step for any observer. Clones
/// share the same data.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Arc<RwLock<Tables>>,
}

impl Catalog {
    /// An empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new actor, assigning the next actor ID
    pub fn create_actor(&self, new: NewActor) -> Actor {
        let mut tables = self.tables.write();
        tables.last_actor_id += 1;
        let actor = Actor {
            id: ActorId(tables.last_actor_id),
            name: new.name,
            age: new.age,
            gender: new.gender,
        };
        tables.actors.insert(actor.id, actor.clone());
        tracing::debug!(actor.id = %actor.id.0, "actor created");
        actor
    }

    /// Stores a new movie, assigning the next movie ID
    pub fn create_movie(&self, new: NewMovie) -> Movie {
        let mut tables = self.tables.write();
        tables.last_movie_id += 1;
        let movie = Movie {
            id: MovieId(tables.last_movie_id),
            title: new.title,
            release_date: new.release_date,
        };
        tables.movies.insert(movie.id, movie.clone());
        tracing::debug!(movie.id = %movie.id.0, "movie created");
        movie
    }

    /// Looks up one actor
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such actor.
    pub fn actor(&self, id: ActorId) -> Result<Actor, NotFound> {
        self.tables
            .read()
            .actors
            .get(&id)
            .cloned()
            .ok_or(NotFound(EntityRef::Actor(id)))
    }

    /// Looks up one movie
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such movie.
    pub fn movie(&self, id: MovieId) -> Result<Movie, NotFound> {
        self.tables
            .read()
            .movies
            .get(&id)
            .cloned()
            .ok_or(NotFound(EntityRef::Movie(id)))
    }

    /// Every actor, in ID order
    #[must_use]
    pub fn actors(&self) -> Vec<Actor> {
        self.tables.read().actors.values().cloned().collect()
    }

    /// Every movie, in ID order
    #[must_use]
    pub fn movies(&self) -> Vec<Movie> {
        self.tables.read().movies.values().cloned().collect()
    }

    /// Every actor with their movies, read as one consistent view
    #[must_use]
    pub fn actors_with_movies(&self) -> Vec<ActorWithMovies> {
        let tables = self.tables.read();
        tables
            .actors
            .values()
            .map(|actor| ActorWithMovies {
                actor: actor.clone(),
                movies: tables.movies_of(actor.id),
            })
            .collect()
    }

    /// One actor with their movies
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such actor.
    pub fn actor_with_movies(&self, id: ActorId) -> Result<ActorWithMovies, NotFound> {
        let tables = self.tables.read();
        let actor = tables
            .actors
            .get(&id)
            .cloned()
            .ok_or(NotFound(EntityRef::Actor(id)))?;
        Ok(ActorWithMovies {
            movies: tables.movies_of(id),
            actor,
        })
    }

    /// One movie with its cast
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such movie.
    pub fn movie_with_actors(&self, id: MovieId) -> Result<MovieWithActors, NotFound> {
        let tables = self.tables.read();
        let movie = tables
            .movies
            .get(&id)
            .cloned()
            .ok_or(NotFound(EntityRef::Movie(id)))?;
        Ok(MovieWithActors {
            actors: tables.actors_of(id),
            movie,
        })
    }

    /// Applies a partial update to an actor
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such actor.
    pub fn update_actor(&self, id: ActorId, patch: ActorPatch) -> Result<Actor, NotFound> {
        let mut tables = self.tables.write();
        let actor = tables
            .actors
            .get_mut(&id)
            .ok_or(NotFound(EntityRef::Actor(id)))?;
        actor.apply(patch);
        Ok(actor.clone())
    }

    /// Applies a partial update to a movie
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such movie.
    pub fn update_movie(&self, id: MovieId, patch: MoviePatch) -> Result<Movie, NotFound> {
        let mut tables = self.tables.write();
        let movie = tables
            .movies
            .get_mut(&id)
            .ok_or(NotFound(EntityRef::Movie(id)))?;
        movie.apply(patch);
        Ok(movie.clone())
    }

    /// Deletes an actor together with their links
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such actor.
    pub fn delete_actor(&self, id: ActorId) -> Result<Actor, NotFound> {
        let mut tables = self.tables.write();
        let actor = tables
            .actors
            .remove(&id)
            .ok_or(NotFound(EntityRef::Actor(id)))?;
        let purged = tables.links.purge(EntityRef::Actor(id));
        tracing::debug!(actor.id = %id.0, links.purged = purged, "actor deleted");
        Ok(actor)
    }

    /// Deletes a movie together with its links
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if there is no such movie.
    pub fn delete_movie(&self, id: MovieId) -> Result<Movie, NotFound> {
        let mut tables = self.tables.write();
        let movie = tables
            .movies
            .remove(&id)
            .ok_or(NotFound(EntityRef::Movie(id)))?;
        let purged = tables.links.purge(EntityRef::Movie(id));
        tracing::debug!(movie.id = %id.0, links.purged = purged, "movie deleted");
        Ok(movie)
    }

    /// Casts `actor` in `movie`
    ///
    /// Linking a pair that is already linked succeeds and reports no change.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] naming the first of the two that does not exist.
    pub fn link(&self, actor: ActorId, movie: MovieId) -> Result<LinkSet, NotFound> {
        let mut tables = self.tables.write();
        tables.require(EntityRef::Actor(actor))?;
        tables.require(EntityRef::Movie(movie))?;

        let changed = tables.links.insert(actor, movie);
        tracing::debug!(actor.id = %actor.0, movie.id = %movie.0, changed, "linked");
        Ok(tables.links.snapshot(actor, movie, changed))
    }

    /// Removes `actor` from the cast of `movie`
    ///
    /// Unlinking a pair that is not linked succeeds and reports no change.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] naming the first of the two that does not exist.
    pub fn unlink(&self, actor: ActorId, movie: MovieId) -> Result<LinkSet, NotFound> {
        let mut tables = self.tables.write();
        tables.require(EntityRef::Actor(actor))?;
        tables.require(EntityRef::Movie(movie))?;

        let changed = tables.links.remove(actor, movie);
        tracing::debug!(actor.id = %actor.0, movie.id = %movie.0, changed, "unlinked");
        Ok(tables.links.snapshot(actor, movie, changed))
    }

    /// Removes every link touching `entity`, returning how many there were
    ///
    /// The entity itself is left in place. Deletes already do this; it is
    /// exposed for stores that remove entities by other means.
    pub fn purge_links_of(&self, entity: EntityRef) -> usize {
        let purged = self.tables.write().links.purge(entity);
        tracing::debug!(%entity, links.purged = purged, "links purged");
        purged
    }

    /// The entities of the opposite kind linked to `entity`
    ///
    /// An entity that does not exist has no links.
    #[must_use]
    pub fn links_of(&self, entity: EntityRef) -> Vec<EntityRef> {
        self.tables
            .read()
            .links
            .links_of(entity)
            .into_iter()
            .collect()
    }

    /// The IDs of the movies `actor` appears in
    #[must_use]
    pub fn movies_of(&self, actor: ActorId) -> Vec<MovieId> {
        self.tables
            .read()
            .links
            .movies_of(actor)
            .into_iter()
            .collect()
    }

    /// The IDs of the cast of `movie`
    #[must_use]
    pub fn actors_of(&self, movie: MovieId) -> Vec<ActorId> {
        self.tables
            .read()
            .links
            .actors_of(movie)
            .into_iter()
            .collect()
    }

    /// The number of actor/movie links
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.tables.read().links.len()
    }

    /// Whether every link is mirrored on both sides and refers only to
    /// existing entities
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let tables = self.tables.read();
        tables.links.is_symmetric()
            && tables
                .links
                .pairs()
                .all(|(a, m)| tables.actors.contains_key(&a) && tables.movies.contains_key(&m))
    }
}

impl EntityStore for Catalog {
    fn exists(&self, entity: EntityRef) -> bool {
        self.tables.read().exists(entity)
    }

    fn delete(&self, entity: EntityRef) -> Result<(), NotFound> {
        match entity {
            EntityRef::Actor(id) => self.delete_actor(id).map(drop),
            EntityRef::Movie(id) => self.delete_movie(id).map(drop),
        }
    }
}
