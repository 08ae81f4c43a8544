use crate::domain;
use crate::domain::task::{TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a returned task on the API
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct Task {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Write quarterly report")]
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[schema(example = "2024-06-30")]
    pub due_date: Option<String>,
    pub assignee_id: Option<i32>,
    /// The user who created the task
    pub user_id: i32,
    pub project_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::task::Task> for Task {
    fn from(value: domain::task::Task) -> Self {
        Task {
            id: value.id,
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
            due_date: value.due_date,
            assignee_id: value.assignee_id,
            user_id: value.user_id,
            project_id: value.project_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO for creating a new task via the API
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTask {
    #[validate(length(min = 1))]
    #[schema(example = "Write quarterly report")]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub assignee_id: Option<i32>,
    /// Only accepted by the project task route, which fills it in itself
    pub project_id: Option<i32>,
}

impl From<NewTask> for domain::task::NewTask {
    fn from(value: NewTask) -> Self {
        domain::task::NewTask {
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
            due_date: value.due_date,
            assignee_id: value.assignee_id,
            project_id: value.project_id,
        }
    }
}

/// DTO for partially updating a task. Absent fields are left alone; nullable fields sent
/// as `null` are cleared.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize, Default))]
pub struct TaskUpdate {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(
        default,
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub due_date: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i32>)]
    pub assignee_id: Option<Option<i32>>,
}

impl From<TaskUpdate> for domain::task::TaskUpdate {
    fn from(value: TaskUpdate) -> Self {
        domain::task::TaskUpdate {
            title: value.title,
            description: value.description,
            status: value.status,
            priority: value.priority,
            due_date: value.due_date,
            assignee_id: value.assignee_id,
        }
    }
}

/// DTO returned after undoing a task deletion
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TaskRestored {
    #[schema(example = "Task restored successfully")]
    pub message: String,
    pub task: Task,
}
