use crate::model::{EntityKind, Id};
use thiserror::Error;

/// Failure of a store operation, tagged so the HTTP layer can pick a status.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matched the identifier
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: Id },

    /// Any other database failure
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    pub fn song_not_found(id: Id) -> Self {
        Self::NotFound {
            entity: EntityKind::Song,
            id,
        }
    }

    pub fn lyric_not_found(id: Id) -> Self {
        Self::NotFound {
            entity: EntityKind::Lyric,
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
