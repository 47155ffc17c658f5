//! The cast relationship between actors and movies
//!
//! Each link is recorded twice, once under its actor and once under its
//! movie. Every mutation updates both sides before returning, and the two
//! indexes never disagree once a mutation is complete.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ActorId, EntityRef, MovieId};

/// The outcome of linking or unlinking one actor and one movie
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSet {
    /// The actor named in the request
    pub actor: ActorId,
    /// The movie named in the request
    pub movie: MovieId,
    /// The movie's cast after the mutation
    pub actors_of_movie: BTreeSet<ActorId>,
    /// The actor's movies after the mutation
    pub movies_of_actor: BTreeSet<MovieId>,
    /// Whether the mutation changed anything
    pub changed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Links {
    movies_of_actor: BTreeMap<ActorId, BTreeSet<MovieId>>,
    actors_of_movie: BTreeMap<MovieId, BTreeSet<ActorId>>,
}

impl Links {
    /// Returns `false` if the pair was already linked
    pub(crate) fn insert(&mut self, actor: ActorId, movie: MovieId) -> bool {
        let added = self.movies_of_actor.entry(actor).or_default().insert(movie);
        let mirrored = self.actors_of_movie.entry(movie).or_default().insert(actor);
        debug_assert_eq!(added, mirrored);
        self.debug_check();
        added
    }

    /// Returns `false` if the pair was not linked
    pub(crate) fn remove(&mut self, actor: ActorId, movie: MovieId) -> bool {
        let removed = remove_from(&mut self.movies_of_actor, actor, &movie);
        let mirrored = remove_from(&mut self.actors_of_movie, movie, &actor);
        debug_assert_eq!(removed, mirrored);
        self.debug_check();
        removed
    }

    /// Removes every link touching `entity`, returning how many there were
    pub(crate) fn purge(&mut self, entity: EntityRef) -> usize {
        let purged = match entity {
            EntityRef::Actor(actor) => {
                let movies = self.movies_of_actor.remove(&actor).unwrap_or_default();
                for movie in &movies {
                    remove_from(&mut self.actors_of_movie, *movie, &actor);
                }
                movies.len()
            }
            EntityRef::Movie(movie) => {
                let actors = self.actors_of_movie.remove(&movie).unwrap_or_default();
                for actor in &actors {
                    remove_from(&mut self.movies_of_actor, *actor, &movie);
                }
                actors.len()
            }
        };
        self.debug_check();
        purged
    }

    pub(crate) fn movies_of(&self, actor: ActorId) -> BTreeSet<MovieId> {
        self.movies_of_actor
            .get(&actor)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn actors_of(&self, movie: MovieId) -> BTreeSet<ActorId> {
        self.actors_of_movie
            .get(&movie)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn links_of(&self, entity: EntityRef) -> BTreeSet<EntityRef> {
        match entity {
            EntityRef::Actor(actor) => self
                .movies_of(actor)
                .into_iter()
                .map(EntityRef::Movie)
                .collect(),
            EntityRef::Movie(movie) => self
                .actors_of(movie)
                .into_iter()
                .map(EntityRef::Actor)
                .collect(),
        }
    }

    pub(crate) fn snapshot(&self, actor: ActorId, movie: MovieId, changed: bool) -> LinkSet {
        LinkSet {
            actor,
            movie,
            actors_of_movie: self.actors_of(movie),
            movies_of_actor: self.movies_of(actor),
            changed,
        }
    }

    /// Total number of distinct actor/movie pairs
    pub(crate) fn len(&self) -> usize {
        self.movies_of_actor.values().map(BTreeSet::len).sum()
    }

    /// Every linked pair, ordered by actor
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (ActorId, MovieId)> + '_ {
        self.movies_of_actor
            .iter()
            .flat_map(|(a, ms)| ms.iter().map(move |m| (*a, *m)))
    }

    /// Whether both indexes describe exactly the same pairs
    pub(crate) fn is_symmetric(&self) -> bool {
        let forward = self.pairs();
        let backward = self
            .actors_of_movie
            .iter()
            .flat_map(|(m, as_)| as_.iter().map(move |a| (*a, *m)));

        let forward: BTreeSet<_> = forward.collect();
        let backward: BTreeSet<_> = backward.collect();
        let no_empty_entries = self.movies_of_actor.values().all(|s| !s.is_empty())
            && self.actors_of_movie.values().all(|s| !s.is_empty());

        forward == backward && no_empty_entries
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(self.is_symmetric(), "cast links are asymmetric");
    }
}

fn remove_from<K: Ord + Copy, V: Ord>(
    index: &mut BTreeMap<K, BTreeSet<V>>,
    key: K,
    value: &V,
) -> bool {
    let Some(set) = index.get_mut(&key) else {
        return false;
    };
    let removed = set.remove(value);
    if set.is_empty() {
        index.remove(&key);
    }
    removed
}
