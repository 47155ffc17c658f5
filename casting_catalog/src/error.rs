use thiserror::Error;

use crate::model::EntityRef;

/// The referenced entity does not exist
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{0} not found")]
pub struct NotFound(pub EntityRef);

impl NotFound {
    /// The entity that could not be found
    #[must_use]
    pub fn entity(&self) -> EntityRef {
        self.0
    }
}
