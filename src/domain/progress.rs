use crate::domain::project::driven_ports::ProjectWriter;
use crate::domain::project::ProjectStatus;
use crate::domain::task::{Task, TaskStatus};
use tracing::{debug, error};

/// Percentage of completed tasks, rounded half up. [None] for an empty task set, since there
/// is nothing to measure.
pub fn completion_percentage(tasks: &[Task]) -> Option<u8> {
    let total = tasks.len();
    if total == 0 {
        return None;
    }

    let completed = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .count();
    let percentage = (completed * 100 + total / 2) / total;

    // completed <= total, so the quotient is at most 100
    Some(percentage as u8)
}

/// What besides the percentage should be written back to the project
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum StatusSync {
    /// Leave the project's status alone
    Keep,
    /// Mark the project completed at 100% and in progress otherwise
    FollowProgress,
}

impl StatusSync {
    /// The status to write alongside `progress`, if any
    pub fn status_for(self, progress: u8) -> Option<ProjectStatus> {
        match self {
            StatusSync::Keep => None,
            StatusSync::FollowProgress if progress == 100 => Some(ProjectStatus::Completed),
            StatusSync::FollowProgress => Some(ProjectStatus::InProgress),
        }
    }
}

/// Recomputes a project's progress from every live task in it, regardless of who can see
/// them, and writes it back. A project without tasks keeps its previous progress. Failures
/// are logged and swallowed: the task change that triggered this has already happened.
pub(super) async fn recalculate_project_progress(
    project_id: i32,
    status_sync: StatusSync,
    repo: &impl ProjectWriter,
) {
    match repo.resync_progress(project_id, status_sync).await {
        Ok(Some(progress)) => debug!(project_id, progress, "Project progress recomputed"),
        Ok(None) => debug!(project_id, "Project is gone or has no tasks, progress untouched"),
        Err(err) => error!(project_id, "Could not recompute project progress: {err:#}"),
    }
}
