//! Entities held by the catalog

use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

entity_id! {
    /// Identifies an actor
    ActorId, "actor"
}

entity_id! {
    /// Identifies a movie
    MovieId, "movie"
}

/// An actor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Assigned by the catalog
    pub id: ActorId,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender, as given
    pub gender: String,
}

/// A movie
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Assigned by the catalog
    pub id: MovieId,
    /// Title
    pub title: String,
    /// Serialized as `YYYY-MM-DD`
    pub release_date: Date,
}

/// An actor that has not been stored yet
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewActor {
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender, as given
    pub gender: String,
}

/// A movie that has not been stored yet
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewMovie {
    /// Title
    pub title: String,
    /// First release, as `YYYY-MM-DD`
    pub release_date: Date,
}

/// Changes to an actor; absent fields are left alone
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ActorPatch {
    /// New full name
    #[serde(default)]
    pub name: Option<String>,
    /// New age in years
    #[serde(default)]
    pub age: Option<u32>,
    /// New gender
    #[serde(default)]
    pub gender: Option<String>,
}

/// Changes to a movie; absent fields are left alone
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MoviePatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New release date
    #[serde(default)]
    pub release_date: Option<Date>,
}

impl Actor {
    pub(crate) fn apply(&mut self, patch: ActorPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
    }
}

impl Movie {
    pub(crate) fn apply(&mut self, patch: MoviePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(release_date) = patch.release_date {
            self.release_date = release_date;
        }
    }
}

/// The two kinds of entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// An [`Actor`]
    Actor,
    /// A [`Movie`]
    Movie,
}

/// A reference to one entity of either kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityRef {
    /// The actor with this ID
    Actor(ActorId),
    /// The movie with this ID
    Movie(MovieId),
}

impl EntityRef {
    /// The kind of entity referred to
    #[must_use]
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Actor(_) => EntityKind::Actor,
            Self::Movie(_) => EntityKind::Movie,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Actor(id) => fmt::Display::fmt(id, f),
            Self::Movie(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl From<ActorId> for EntityRef {
    fn from(id: ActorId) -> Self {
        Self::Actor(id)
    }
}

impl From<MovieId> for EntityRef {
    fn from(id: MovieId) -> Self {
        Self::Movie(id)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use time::macros::date;

    use super::*;

    #[test]
    fn movie_dates_use_calendar_form() -> Result<()> {
        let movie = Movie {
            id: MovieId(7),
            title: "Heat".to_owned(),
            release_date: date!(1995 - 12 - 15),
        };

        let json = serde_json::to_value(&movie)?;
        assert_eq!(json["release_date"], "1995-12-15");
        assert_eq!(json["id"], 7);

        let back: Movie = serde_json::from_value(json)?;
        assert_eq!(back, movie);
        Ok(())
    }

    #[test]
    fn new_entities_require_every_field() {
        assert!(serde_json::from_str::<NewActor>(r#"{"name":"Al","age":55}"#).is_err());
        assert!(serde_json::from_str::<NewMovie>(r#"{"title":"Heat"}"#).is_err());
        assert!(
            serde_json::from_str::<NewMovie>(r#"{"title":"Heat","release_date":"15/12/1995"}"#)
                .is_err()
        );
    }

    #[test]
    fn patch_leaves_absent_fields_alone() -> Result<()> {
        let mut actor = Actor {
            id: ActorId(1),
            name: "Val".to_owned(),
            age: 36,
            gender: "male".to_owned(),
        };

        actor.apply(serde_json::from_str(r#"{"age":37}"#)?);

        assert_eq!(actor.name, "Val");
        assert_eq!(actor.age, 37);
        assert_eq!(actor.gender, "male");
        Ok(())
    }

    #[test]
    fn entity_refs_name_their_kind() {
        assert_eq!(EntityRef::from(ActorId(3)).to_string(), "actor 3");
        assert_eq!(EntityRef::from(MovieId(9)).kind(), EntityKind::Movie);
    }
}
