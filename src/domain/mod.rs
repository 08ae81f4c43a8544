pub mod access;
pub mod activity;
pub mod credentials;
pub mod progress;
pub mod project;
pub mod task;
pub mod tombstone;
pub mod user;

#[cfg(test)]
pub mod test_util;

/// Every driven port the task and project services reach through. Task and project rules
/// cut across each other (project tasks, progress write-back, membership checks), so those
/// services take one handle implementing all of them instead of a port per argument.
pub trait Repository:
    task::driven_ports::TaskReader
    + task::driven_ports::TaskWriter
    + project::driven_ports::ProjectReader
    + project::driven_ports::ProjectWriter
    + project::driven_ports::MembershipReader
    + project::driven_ports::MembershipWriter
    + user::driven_ports::UserReader
    + activity::driven_ports::ActivityWriter
    + Sync
{
}

impl<T> Repository for T where
    T: task::driven_ports::TaskReader
        + task::driven_ports::TaskWriter
        + project::driven_ports::ProjectReader
        + project::driven_ports::ProjectWriter
        + project::driven_ports::MembershipReader
        + project::driven_ports::MembershipWriter
        + user::driven_ports::UserReader
        + activity::driven_ports::ActivityWriter
        + Sync
{
}
