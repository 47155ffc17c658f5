//! A catalog of actors and movies joined by a symmetric cast relationship
//!
//! A link between an actor and a movie is always visible from both sides,
//! only ever refers to entities that exist, and is recorded at most once.
//!
//! ```
//! use casting_catalog::{Catalog, EntityRef, NewActor, NewMovie};
//! use time::macros::date;
//!
//! let catalog = Catalog::new();
//! let actor = catalog.create_actor(NewActor {
//!     name: "Pam Grier".into(),
//!     age: 74,
//!     gender: "female".into(),
//! });
//! let movie = catalog.create_movie(NewMovie {
//!     title: "Jackie Brown".into(),
//!     release_date: date!(1997 - 12 - 25),
//! });
//!
//! let links = catalog.link(actor.id, movie.id).unwrap();
//! assert!(links.changed);
//! assert_eq!(catalog.links_of(EntityRef::Movie(movie.id)), [EntityRef::Actor(actor.id)]);
//!
//! catalog.delete_actor(actor.id).unwrap();
//! assert!(catalog.links_of(EntityRef::Movie(movie.id)).is_empty());
//! ```

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

mod catalog;
mod error;
pub mod model;
mod relationships;

pub use catalog::{ActorWithMovies, Catalog, EntityStore, MovieWithActors};
pub use error::NotFound;
pub use model::{
    Actor, ActorId, ActorPatch, EntityKind, EntityRef, Movie, MovieId, MoviePatch, NewActor,
    NewMovie,
};
pub use relationships::LinkSet;
