pub mod mem_activity_driven_ports;
pub mod mem_project_driven_ports;
pub mod mem_task_driven_ports;
pub mod mem_user_driven_ports;

use crate::domain::activity::Activity;
use crate::domain::project::Project;
use crate::domain::task::Task;
use crate::domain::tombstone::Stored;
use crate::domain::user::User;
use anyhow::anyhow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(test)]
use crate::domain::test_util::Connectivity;

/// Process-local entity store implementing every driven port. Deleted tasks and projects stay
/// in their id slot as tombstones. Locks are only held for the duration of one synchronous
/// table operation, never across an `.await`.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    connectivity: Connectivity,
}

/// Hands out ids 1, 2, 3... Ids are never reused, even after deletion.
#[derive(Default)]
struct IdSequence {
    last: i32,
}

impl IdSequence {
    fn next(&mut self) -> i32 {
        self.last += 1;
        self.last
    }
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    tasks: BTreeMap<i32, Stored<Task>>,
    projects: BTreeMap<i32, Stored<Project>>,
    /// (project id, user id) pairs
    memberships: BTreeSet<(i32, i32)>,
    activities: Vec<Activity>,
    user_ids: IdSequence,
    task_ids: IdSequence,
    project_ids: IdSequence,
    activity_ids: IdSequence,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            tables: RwLock::new(Tables::default()),
            #[cfg(test)]
            connectivity: Connectivity::Connected,
        }
    }

    /// A store where every call fails, for exercising port-error paths
    #[cfg(test)]
    pub fn disconnected() -> Self {
        InMemoryStore {
            tables: RwLock::new(Tables::default()),
            connectivity: Connectivity::Disconnected,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, anyhow::Error> {
        #[cfg(test)]
        self.connectivity.blow_up_if_disconnected()?;

        self.tables.read().map_err(anyhowify)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, anyhow::Error> {
        #[cfg(test)]
        self.connectivity.blow_up_if_disconnected()?;

        self.tables.write().map_err(anyhowify)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts anything implementing Debug and Display into an [anyhow::Error]
fn anyhowify<T: Debug + Display>(errorish: T) -> anyhow::Error {
    anyhow!(format!("{}", errorish))
}
