//! Rules deciding who may see and change tasks and projects. Everything here is a pure
//! function of the actor, the entity and the actor's relation to the entity's project, so the
//! services look the relation up once and ask these functions for a verdict.

use crate::domain::project::Project;
use crate::domain::task::Task;

/// How the acting user relates to a project
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct ProjectRelation {
    pub is_owner: bool,
    pub is_member: bool,
}

impl ProjectRelation {
    pub fn of(actor_id: i32, project: Option<&Project>, is_member: bool) -> Self {
        ProjectRelation {
            is_owner: project.is_some_and(|project| project.user_id == actor_id),
            is_member,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TaskOperation {
    Update,
    Delete,
    Restore,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ProjectOperation {
    /// Viewing the project, its members and its tasks, and adding tasks to it
    Read,
    /// Writing the progress percentage alone
    UpdateProgress,
    /// Editing, deleting, restoring and managing members
    Manage,
}

/// Decides whether the actor may perform `operation` on `task`. `relation` describes the actor's
/// standing in the task's project and is ignored for personal tasks.
///
/// The delete rules don't include the assignee branches the update rules have: a project
/// task's assignee who is not a member can edit the task but not delete it.
pub fn may_change_task(
    actor_id: i32,
    task: &Task,
    relation: ProjectRelation,
    operation: TaskOperation,
) -> bool {
    if task.user_id == actor_id {
        return true;
    }

    let is_assignee = task.assignee_id == Some(actor_id);
    match (operation, task.project_id) {
        (TaskOperation::Update, Some(_)) => {
            relation.is_owner || is_assignee || relation.is_member
        }
        (TaskOperation::Update, None) => is_assignee,
        (TaskOperation::Delete, Some(_)) => relation.is_owner || relation.is_member,
        (TaskOperation::Delete, None) => false,
        (TaskOperation::Restore, Some(_)) => relation.is_owner,
        (TaskOperation::Restore, None) => false,
    }
}

/// Decides whether the actor may perform `operation` on `project`
pub fn may_access_project(
    actor_id: i32,
    project: &Project,
    is_member: bool,
    operation: ProjectOperation,
) -> bool {
    let is_owner = project.user_id == actor_id;
    match operation {
        ProjectOperation::Read | ProjectOperation::UpdateProgress => is_owner || is_member,
        ProjectOperation::Manage => is_owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::test_util::project_owned_by;
    use crate::domain::task::test_util::task_owned_by;

    const CREATOR: i32 = 1;
    const OUTSIDER: i32 = 2;
    const ASSIGNEE: i32 = 3;

    fn stranger() -> ProjectRelation {
        ProjectRelation::default()
    }

    fn member() -> ProjectRelation {
        ProjectRelation {
            is_owner: false,
            is_member: true,
        }
    }

    fn owner() -> ProjectRelation {
        ProjectRelation {
            is_owner: true,
            is_member: false,
        }
    }

    mod may_change_task {
        use super::*;

        #[test]
        fn creator_may_do_everything() {
            let task = task_owned_by(CREATOR, None);
            for operation in [TaskOperation::Update, TaskOperation::Delete, TaskOperation::Restore] {
                assert!(may_change_task(CREATOR, &task, stranger(), operation));
            }
        }

        #[test]
        fn outsider_may_do_nothing() {
            let personal = task_owned_by(CREATOR, None);
            let in_project = task_owned_by(CREATOR, Some(7));
            for operation in [TaskOperation::Update, TaskOperation::Delete, TaskOperation::Restore] {
                assert!(!may_change_task(OUTSIDER, &personal, stranger(), operation));
                assert!(!may_change_task(OUTSIDER, &in_project, stranger(), operation));
            }
        }

        #[test]
        fn project_owner_may_do_everything_to_project_tasks() {
            let task = task_owned_by(CREATOR, Some(7));
            for operation in [TaskOperation::Update, TaskOperation::Delete, TaskOperation::Restore] {
                assert!(may_change_task(OUTSIDER, &task, owner(), operation));
            }
        }

        #[test]
        fn member_may_update_and_delete_but_not_restore() {
            let task = task_owned_by(CREATOR, Some(7));

            assert!(may_change_task(OUTSIDER, &task, member(), TaskOperation::Update));
            assert!(may_change_task(OUTSIDER, &task, member(), TaskOperation::Delete));
            assert!(!may_change_task(OUTSIDER, &task, member(), TaskOperation::Restore));
        }

        #[test]
        fn assignee_may_update_but_not_delete() {
            let mut personal = task_owned_by(CREATOR, None);
            personal.assignee_id = Some(ASSIGNEE);
            let mut in_project = task_owned_by(CREATOR, Some(7));
            in_project.assignee_id = Some(ASSIGNEE);

            assert!(may_change_task(ASSIGNEE, &personal, stranger(), TaskOperation::Update));
            assert!(may_change_task(ASSIGNEE, &in_project, stranger(), TaskOperation::Update));
            assert!(!may_change_task(ASSIGNEE, &personal, stranger(), TaskOperation::Delete));
            assert!(!may_change_task(ASSIGNEE, &in_project, stranger(), TaskOperation::Delete));
        }

        #[test]
        fn project_relation_is_ignored_for_personal_tasks() {
            let task = task_owned_by(CREATOR, None);

            assert!(!may_change_task(OUTSIDER, &task, member(), TaskOperation::Update));
            assert!(!may_change_task(OUTSIDER, &task, owner(), TaskOperation::Delete));
        }
    }

    mod may_access_project {
        use super::*;

        #[test]
        fn owner_may_do_everything() {
            let project = project_owned_by(CREATOR);
            for operation in [
                ProjectOperation::Read,
                ProjectOperation::UpdateProgress,
                ProjectOperation::Manage,
            ] {
                assert!(may_access_project(CREATOR, &project, false, operation));
            }
        }

        #[test]
        fn member_may_read_and_move_progress_only() {
            let project = project_owned_by(CREATOR);

            assert!(may_access_project(OUTSIDER, &project, true, ProjectOperation::Read));
            assert!(may_access_project(OUTSIDER, &project, true, ProjectOperation::UpdateProgress));
            assert!(!may_access_project(OUTSIDER, &project, true, ProjectOperation::Manage));
        }

        #[test]
        fn outsider_may_do_nothing() {
            let project = project_owned_by(CREATOR);
            for operation in [
                ProjectOperation::Read,
                ProjectOperation::UpdateProgress,
                ProjectOperation::Manage,
            ] {
                assert!(!may_access_project(OUTSIDER, &project, false, operation));
            }
        }
    }

    #[test]
    fn relation_of_missing_project_is_not_ownership() {
        let relation = ProjectRelation::of(CREATOR, None, true);

        assert_eq!(
            ProjectRelation {
                is_owner: false,
                is_member: true
            },
            relation
        );
    }
}
