use crate::domain::Repository;
use crate::domain::access::{self, ProjectOperation, ProjectRelation, TaskOperation};
use crate::domain::activity::{self, ActivityAction, ActivityTarget};
use crate::domain::progress::{self, StatusSync};
use crate::domain::project;
use crate::domain::project::driving_ports::ProjectError;
use crate::domain::task::driving_ports::TaskError;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub assignee_id: Option<i32>,
    /// The creator
    pub user_id: i32,
    pub project_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub assignee_id: Option<i32>,
    pub project_id: Option<i32>,
}

/// A partial task update. `None` leaves a field alone; for the nullable fields `Some(None)`
/// clears them. The project a task belongs to can't be changed.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<String>>,
    pub assignee_id: Option<Option<i32>>,
}

impl TaskUpdate {
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(ref due_date) = self.due_date {
            task.due_date = due_date.clone();
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
    }
}

pub mod driven_ports {
    use super::*;
    use crate::domain::tombstone::Tombstone;

    pub trait TaskReader {
        async fn task_by_id(&self, task_id: i32) -> Result<Option<Task>, anyhow::Error>;
        /// Live tasks the user created or is assigned to, ordered by id
        async fn tasks_for_user(&self, user_id: i32) -> Result<Vec<Task>, anyhow::Error>;
        /// Every live task in the project, ordered by id
        async fn tasks_in_project(&self, project_id: i32) -> Result<Vec<Task>, anyhow::Error>;
        async fn deleted_task(&self, task_id: i32) -> Result<Option<Tombstone<Task>>, anyhow::Error>;
    }

    pub trait TaskWriter {
        async fn create_task(&self, creator_id: i32, new_task: &NewTask) -> Result<Task, anyhow::Error>;
        /// Applies the update and bumps `updated_at`. Returns [None] if there is no live task with the id.
        async fn update_task(
            &self,
            task_id: i32,
            update: &TaskUpdate,
        ) -> Result<Option<Task>, anyhow::Error>;
        /// Tombstones the live task. Returns [None] if there is no live task with the id.
        async fn delete_task(&self, task_id: i32) -> Result<Option<Task>, anyhow::Error>;
        /// Brings a tombstoned task back untouched. Returns [None] if there is no tombstone for the id.
        async fn restore_task(&self, task_id: i32) -> Result<Option<Task>, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("The task could not be found.")]
        NotFound,
        #[error("Not authorized to change this task.")]
        NotAuthorized,
        #[error("Project tasks must be created through the project's task route.")]
        ProjectTaskOnPersonalRoute,
        #[error("Personal tasks can only be assigned to their creator.")]
        ForeignAssignee,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<ProjectError> for TaskError {
        fn from(value: ProjectError) -> Self {
            match value {
                ProjectError::NotFound => TaskError::NotFound,
                ProjectError::PortError(err) => TaskError::PortError(err),
                _ => TaskError::NotAuthorized,
            }
        }
    }


    pub trait TaskPort {
        async fn tasks_for_user(
            &self,
            actor_id: i32,
            repo: &impl Repository,
        ) -> Result<Vec<Task>, anyhow::Error>;
        async fn create_personal_task(
            &self,
            actor_id: i32,
            new_task: &NewTask,
            repo: &impl Repository,
        ) -> Result<Task, TaskError>;
        async fn create_project_task(
            &self,
            actor_id: i32,
            project_id: i32,
            new_task: &NewTask,
            repo: &impl Repository,
        ) -> Result<Task, TaskError>;
        async fn project_tasks(
            &self,
            actor_id: i32,
            project_id: i32,
            repo: &impl Repository,
        ) -> Result<Vec<Task>, TaskError>;
        async fn update_task(
            &self,
            actor_id: i32,
            task_id: i32,
            update: &TaskUpdate,
            repo: &impl Repository,
        ) -> Result<Task, TaskError>;
        async fn delete_task(
            &self,
            actor_id: i32,
            task_id: i32,
            repo: &impl Repository,
        ) -> Result<(), TaskError>;
        async fn restore_task(
            &self,
            actor_id: i32,
            task_id: i32,
            repo: &impl Repository,
        ) -> Result<Task, TaskError>;
    }
}

/// Finds how the actor relates to the project a task lives in. Personal tasks and tasks whose
/// project is gone get the empty relation.
async fn relation_to_task_project(
    actor_id: i32,
    task: &Task,
    repo: &impl Repository,
) -> Result<ProjectRelation, anyhow::Error> {
    let Some(project_id) = task.project_id else {
        return Ok(ProjectRelation::default());
    };

    let project = repo
        .project_by_id(project_id)
        .await
        .context("looking up the task's project")?;
    let is_member = repo
        .is_member(project_id, actor_id)
        .await
        .context("checking membership in the task's project")?;

    Ok(ProjectRelation::of(actor_id, project.as_ref(), is_member))
}

async fn authorize_task_change(
    actor_id: i32,
    task: &Task,
    operation: TaskOperation,
    repo: &impl Repository,
) -> Result<(), TaskError> {
    let relation = relation_to_task_project(actor_id, task, repo).await?;
    if access::may_change_task(actor_id, task, relation, operation) {
        Ok(())
    } else {
        warn!(actor_id, task_id = task.id, ?operation, "Task change denied");
        Err(TaskError::NotAuthorized)
    }
}

async fn resync_progress(task: &Task, status_sync: StatusSync, repo: &impl Repository) {
    if let Some(project_id) = task.project_id {
        progress::recalculate_project_progress(project_id, status_sync, repo).await;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn tasks_for_user(
        &self,
        actor_id: i32,
        repo: &impl Repository,
    ) -> Result<Vec<Task>, anyhow::Error> {
        repo.tasks_for_user(actor_id)
            .await
            .context("listing tasks for user")
    }

    async fn create_personal_task(
        &self,
        actor_id: i32,
        new_task: &NewTask,
        repo: &impl Repository,
    ) -> Result<Task, TaskError> {
        if new_task.project_id.is_some() {
            return Err(TaskError::ProjectTaskOnPersonalRoute);
        }
        if new_task.assignee_id.is_some_and(|assignee| assignee != actor_id) {
            return Err(TaskError::ForeignAssignee);
        }

        let personal = NewTask {
            assignee_id: Some(actor_id),
            ..new_task.clone()
        };
        let task = repo
            .create_task(actor_id, &personal)
            .await
            .context("creating personal task")?;
        info!(actor_id, task_id = task.id, "Personal task created");

        activity::log_activity(
            actor_id,
            ActivityAction::Created,
            ActivityTarget::Task,
            Some(task.id),
            repo,
        )
        .await;

        Ok(task)
    }

    async fn create_project_task(
        &self,
        actor_id: i32,
        project_id: i32,
        new_task: &NewTask,
        repo: &impl Repository,
    ) -> Result<Task, TaskError> {
        project::authorize_project(actor_id, project_id, ProjectOperation::Read, repo).await?;

        let in_project = NewTask {
            project_id: Some(project_id),
            ..new_task.clone()
        };
        let task = repo
            .create_task(actor_id, &in_project)
            .await
            .context("creating project task")?;
        info!(actor_id, project_id, task_id = task.id, "Project task created");

        resync_progress(&task, StatusSync::FollowProgress, repo).await;
        activity::log_activity(
            actor_id,
            ActivityAction::Created,
            ActivityTarget::Task,
            Some(task.id),
            repo,
        )
        .await;

        Ok(task)
    }

    async fn project_tasks(
        &self,
        actor_id: i32,
        project_id: i32,
        repo: &impl Repository,
    ) -> Result<Vec<Task>, TaskError> {
        project::authorize_project(actor_id, project_id, ProjectOperation::Read, repo).await?;

        let tasks = repo
            .tasks_in_project(project_id)
            .await
            .context("listing project tasks")?;

        Ok(tasks)
    }

    async fn update_task(
        &self,
        actor_id: i32,
        task_id: i32,
        update: &TaskUpdate,
        repo: &impl Repository,
    ) -> Result<Task, TaskError> {
        let Some(task) = repo
            .task_by_id(task_id)
            .await
            .context("looking up task to update")?
        else {
            return Err(TaskError::NotFound);
        };
        authorize_task_change(actor_id, &task, TaskOperation::Update, repo).await?;

        let updated = repo
            .update_task(task_id, update)
            .await
            .context("updating task")?
            .ok_or(TaskError::NotFound)?;

        resync_progress(&updated, StatusSync::Keep, repo).await;
        activity::log_activity(
            actor_id,
            ActivityAction::Updated,
            ActivityTarget::Task,
            Some(task_id),
            repo,
        )
        .await;

        Ok(updated)
    }

    async fn delete_task(
        &self,
        actor_id: i32,
        task_id: i32,
        repo: &impl Repository,
    ) -> Result<(), TaskError> {
        let Some(task) = repo
            .task_by_id(task_id)
            .await
            .context("looking up task to delete")?
        else {
            return Err(TaskError::NotFound);
        };
        authorize_task_change(actor_id, &task, TaskOperation::Delete, repo).await?;

        let deleted = repo
            .delete_task(task_id)
            .await
            .context("deleting task")?
            .ok_or(TaskError::NotFound)?;
        info!(actor_id, task_id, "Task deleted");

        resync_progress(&deleted, StatusSync::Keep, repo).await;
        activity::log_activity(
            actor_id,
            ActivityAction::Deleted,
            ActivityTarget::Task,
            Some(task_id),
            repo,
        )
        .await;

        Ok(())
    }

    async fn restore_task(
        &self,
        actor_id: i32,
        task_id: i32,
        repo: &impl Repository,
    ) -> Result<Task, TaskError> {
        let Some(tombstone) = repo
            .deleted_task(task_id)
            .await
            .context("looking up deleted task")?
        else {
            return Err(TaskError::NotFound);
        };
        authorize_task_change(actor_id, &tombstone.entity, TaskOperation::Restore, repo).await?;

        let restored = repo
            .restore_task(task_id)
            .await
            .context("restoring task")?
            .ok_or(TaskError::NotFound)?;
        info!(actor_id, task_id, "Task restored");

        resync_progress(&restored, StatusSync::Keep, repo).await;
        activity::log_activity(
            actor_id,
            ActivityAction::Restored,
            ActivityTarget::Task,
            Some(task_id),
            repo,
        )
        .await;

        Ok(restored)
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::FakeImplementation;
    use chrono::TimeZone;
    use std::sync::Mutex;

    pub fn task_owned_by(owner_id: i32, project_id: Option<i32>) -> Task {
        let created_at = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("fixed timestamp is valid");

        Task {
            id: 1,
            title: "Write report".to_owned(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            assignee_id: None,
            user_id: owner_id,
            project_id,
            created_at,
            updated_at: created_at,
        }
    }

    pub struct MockTaskService {
        pub tasks_for_user_result: FakeImplementation<i32, anyhow::Result<Vec<Task>>>,
        pub create_personal_task_result: FakeImplementation<(i32, String), Result<Task, TaskError>>,
        pub create_project_task_result:
            FakeImplementation<(i32, i32, String), Result<Task, TaskError>>,
        pub project_tasks_result: FakeImplementation<(i32, i32), Result<Vec<Task>, TaskError>>,
        pub update_task_result: FakeImplementation<(i32, i32), Result<Task, TaskError>>,
        pub delete_task_result: FakeImplementation<(i32, i32), Result<(), TaskError>>,
        pub restore_task_result: FakeImplementation<(i32, i32), Result<Task, TaskError>>,
    }

    impl MockTaskService {
        pub fn new() -> MockTaskService {
            MockTaskService {
                tasks_for_user_result: FakeImplementation::new(),
                create_personal_task_result: FakeImplementation::new(),
                create_project_task_result: FakeImplementation::new(),
                project_tasks_result: FakeImplementation::new(),
                update_task_result: FakeImplementation::new(),
                delete_task_result: FakeImplementation::new(),
                restore_task_result: FakeImplementation::new(),
            }
        }
    }

    impl driving_ports::TaskPort for Mutex<MockTaskService> {
        async fn tasks_for_user(
            &self,
            actor_id: i32,
            _repo: &impl Repository,
        ) -> Result<Vec<Task>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self.tasks_for_user_result.save_arguments(actor_id);

            locked_self.tasks_for_user_result.return_value_anyhow()
        }

        async fn create_personal_task(
            &self,
            actor_id: i32,
            new_task: &NewTask,
            _repo: &impl Repository,
        ) -> Result<Task, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .create_personal_task_result
                .save_arguments((actor_id, new_task.title.clone()));

            locked_self.create_personal_task_result.return_value_result()
        }

        async fn create_project_task(
            &self,
            actor_id: i32,
            project_id: i32,
            new_task: &NewTask,
            _repo: &impl Repository,
        ) -> Result<Task, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .create_project_task_result
                .save_arguments((actor_id, project_id, new_task.title.clone()));

            locked_self.create_project_task_result.return_value_result()
        }

        async fn project_tasks(
            &self,
            actor_id: i32,
            project_id: i32,
            _repo: &impl Repository,
        ) -> Result<Vec<Task>, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .project_tasks_result
                .save_arguments((actor_id, project_id));

            locked_self.project_tasks_result.return_value_result()
        }

        async fn update_task(
            &self,
            actor_id: i32,
            task_id: i32,
            _update: &TaskUpdate,
            _repo: &impl Repository,
        ) -> Result<Task, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .update_task_result
                .save_arguments((actor_id, task_id));

            locked_self.update_task_result.return_value_result()
        }

        async fn delete_task(
            &self,
            actor_id: i32,
            task_id: i32,
            _repo: &impl Repository,
        ) -> Result<(), TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .delete_task_result
                .save_arguments((actor_id, task_id));

            locked_self.delete_task_result.return_value_result()
        }

        async fn restore_task(
            &self,
            actor_id: i32,
            task_id: i32,
            _repo: &impl Repository,
        ) -> Result<Task, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .restore_task_result
                .save_arguments((actor_id, task_id));

            locked_self.restore_task_result.return_value_result()
        }
    }
}
