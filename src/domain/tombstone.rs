use chrono::{DateTime, Utc};

/// A deleted entity kept around so the deletion can be undone. There is no expiry.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Tombstone<T> {
    pub entity: T,
    pub deleted_at: DateTime<Utc>,
}

/// The state of a single id slot in the store. An id holds either the live entity or the
/// tombstone of its most recent deletion, never both. Burying a slot replaces whatever
/// tombstone was there before, so only the last deleted snapshot can be restored.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Stored<T> {
    Live(T),
    Deleted(Tombstone<T>),
}

impl<T> Stored<T> {
    pub fn live(&self) -> Option<&T> {
        match self {
            Self::Live(entity) => Some(entity),
            Self::Deleted(_) => None,
        }
    }

    pub fn live_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Live(entity) => Some(entity),
            Self::Deleted(_) => None,
        }
    }

    pub fn tombstone(&self) -> Option<&Tombstone<T>> {
        match self {
            Self::Live(_) => None,
            Self::Deleted(tombstone) => Some(tombstone),
        }
    }
}

impl<T: Clone> Stored<T> {
    /// Turns a live slot into a tombstone. Returns the buried entity, or [None] if the slot
    /// was already deleted.
    pub fn bury(&mut self, deleted_at: DateTime<Utc>) -> Option<T> {
        let Self::Live(entity) = self else {
            return None;
        };
        let entity = entity.clone();
        *self = Self::Deleted(Tombstone {
            entity: entity.clone(),
            deleted_at,
        });

        Some(entity)
    }

    /// Turns a tombstone back into the exact entity that was deleted. Returns [None] if the
    /// slot is live.
    pub fn revive(&mut self) -> Option<T> {
        let Self::Deleted(tombstone) = self else {
            return None;
        };
        let entity = tombstone.entity.clone();
        *self = Self::Live(entity.clone());

        Some(entity)
    }
}
