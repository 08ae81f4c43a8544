use crate::api::auth::AuthenticatedUser;
use crate::domain::Repository;
use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::dto::Message;
use crate::routing_utils::{
    ApiErrorResponse, GenericErrorResponse, Json, Path, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{ErrorResponse, IntoResponse, Response};
use axum::routing::{get, post, put};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks,
        create_task,
        update_task,
        delete_task,
        restore_task,
        list_project_tasks,
        create_project_task
    ),
    components(schemas(
        dto::task::Task,
        dto::task::NewTask,
        dto::task::TaskUpdate,
        dto::task::TaskRestored,
        dto::Message
    ))
)]
/// Defines the OpenAPI documentation for the task API
pub struct TaskApi;
/// Constant used to group task endpoints in OpenAPI documentation
pub const TASK_API_GROUP: &str = "Tasks";

/// Adds routes under "/tasks" and the task routes nested under a project
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/tasks",
            get(
                |State(app_state): AppState, AuthenticatedUser(actor_id): AuthenticatedUser| async move {
                    let task_service = domain::task::TaskService {};

                    list_tasks(actor_id, &app_state.store, &task_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let task_service = domain::task::TaskService {};

                    create_task(actor_id, new_task, &app_state.store, &task_service).await
                },
            ),
        )
        .route(
            "/tasks/:task_id",
            put(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(task_id): Path<i32>,
                 Json(update): Json<dto::task::TaskUpdate>| async move {
                    let task_service = domain::task::TaskService {};

                    update_task(actor_id, task_id, update, &app_state.store, &task_service).await
                },
            )
            .delete(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(task_id): Path<i32>| async move {
                    let task_service = domain::task::TaskService {};

                    delete_task(actor_id, task_id, &app_state.store, &task_service).await
                },
            ),
        )
        .route(
            "/tasks/:task_id/restore",
            post(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(task_id): Path<i32>| async move {
                    let task_service = domain::task::TaskService {};

                    restore_task(actor_id, task_id, &app_state.store, &task_service).await
                },
            ),
        )
        .route(
            "/projects/:project_id/tasks",
            get(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>| async move {
                    let task_service = domain::task::TaskService {};

                    list_project_tasks(actor_id, project_id, &app_state.store, &task_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let task_service = domain::task::TaskService {};

                    create_project_task(actor_id, project_id, new_task, &app_state.store, &task_service)
                        .await
                },
            ),
        )
}

/// Response type that turns [TaskError]s into [BasicErrorResponse][crate::routing_utils::BasicErrorResponse]s
pub struct TaskErrorResponse(TaskError);

impl IntoResponse for TaskErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            TaskError::NotFound => ApiErrorResponse::not_found().into_response(),
            TaskError::NotAuthorized | TaskError::ForeignAssignee => {
                ApiErrorResponse::forbidden(self.0.to_string()).into_response()
            }
            TaskError::ProjectTaskOnPersonalRoute => {
                ApiErrorResponse::bad_request("project_task_on_personal_route", self.0.to_string())
                    .into_response()
            }
            TaskError::PortError(err) => GenericErrorResponse(err).into_response(),
        }
    }
}

impl From<TaskError> for TaskErrorResponse {
    fn from(value: TaskError) -> Self {
        Self(value)
    }
}

fn into_dtos(tasks: Vec<domain::task::Task>) -> Vec<dto::task::Task> {
    tasks.into_iter().map(dto::task::Task::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = TASK_API_GROUP,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Tasks the caller created or is assigned to", body = Vec<dto::task::Task>),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Lists the caller's tasks
async fn list_tasks(
    actor_id: i32,
    repo: &impl Repository,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::task::Task>>, ErrorResponse> {
    info!(actor_id, "Listing tasks");
    let tasks = task_service
        .tasks_for_user(actor_id, repo)
        .await
        .map_err(GenericErrorResponse)?;

    Ok(Json(into_dtos(tasks)))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = TASK_API_GROUP,
    security(("bearer_token" = [])),
    request_body = dto::task::NewTask,
    responses(
        (status = 201, description = "Task created", body = dto::task::Task),
        (status = 400, description = "Invalid body, or a project id was given", body = BasicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Tried to assign the task to someone else", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Creates a personal task assigned to the caller
async fn create_task(
    actor_id: i32,
    new_task: dto::task::NewTask,
    repo: &impl Repository,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::task::Task>), ErrorResponse> {
    info!(actor_id, "Creating personal task");
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let domain_task = domain::task::NewTask::from(new_task);
    let created = task_service
        .create_personal_task(actor_id, &domain_task, repo)
        .await
        .map_err(TaskErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(dto::task::Task::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    tag = TASK_API_GROUP,
    security(("bearer_token" = [])),
    params(("task_id" = i32, Path, description = "Id of the task")),
    request_body = dto::task::TaskUpdate,
    responses(
        (status = 200, description = "The updated task", body = dto::task::Task),
        (status = 400, description = "Malformed or invalid body", body = BasicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Not allowed to change the task", body = BasicErrorResponse),
        (status = 404, description = "No such task", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Partially updates a task
async fn update_task(
    actor_id: i32,
    task_id: i32,
    update: dto::task::TaskUpdate,
    repo: &impl Repository,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::Task>, ErrorResponse> {
    info!(actor_id, task_id, "Updating task");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let domain_update = domain::task::TaskUpdate::from(update);
    let updated = task_service
        .update_task(actor_id, task_id, &domain_update, repo)
        .await
        .map_err(TaskErrorResponse::from)?;

    Ok(Json(dto::task::Task::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = TASK_API_GROUP,
    security(("bearer_token" = [])),
    params(("task_id" = i32, Path, description = "Id of the task")),
    responses(
        (status = 200, description = "Task deleted; it can be restored later", body = dto::Message),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Not allowed to delete the task", body = BasicErrorResponse),
        (status = 404, description = "No such task", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Deletes a task, keeping it around for a later restore
async fn delete_task(
    actor_id: i32,
    task_id: i32,
    repo: &impl Repository,
    task_service: &impl TaskPort,
) -> Result<Json<Message>, ErrorResponse> {
    info!(actor_id, task_id, "Deleting task");
    task_service
        .delete_task(actor_id, task_id, repo)
        .await
        .map_err(TaskErrorResponse::from)?;

    Ok(Json(Message::new("Task deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/tasks/{task_id}/restore",
    tag = TASK_API_GROUP,
    security(("bearer_token" = [])),
    params(("task_id" = i32, Path, description = "Id of the deleted task")),
    responses(
        (status = 200, description = "Task restored exactly as it was deleted", body = dto::task::TaskRestored),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Not allowed to restore the task", body = BasicErrorResponse),
        (status = 404, description = "No deleted task with that id", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Undoes the most recent deletion of a task
async fn restore_task(
    actor_id: i32,
    task_id: i32,
    repo: &impl Repository,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::TaskRestored>, ErrorResponse> {
    info!(actor_id, task_id, "Restoring task");
    let restored = task_service
        .restore_task(actor_id, task_id, repo)
        .await
        .map_err(TaskErrorResponse::from)?;

    Ok(Json(dto::task::TaskRestored {
        message: "Task restored successfully".to_owned(),
        task: dto::task::Task::from(restored),
    }))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/tasks",
    tag = TASK_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    responses(
        (status = 200, description = "Every task in the project", body = Vec<dto::task::Task>),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Lists the tasks of a project the caller owns or belongs to
async fn list_project_tasks(
    actor_id: i32,
    project_id: i32,
    repo: &impl Repository,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::task::Task>>, ErrorResponse> {
    info!(actor_id, project_id, "Listing project tasks");
    let tasks = task_service
        .project_tasks(actor_id, project_id, repo)
        .await
        .map_err(TaskErrorResponse::from)?;

    Ok(Json(into_dtos(tasks)))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/tasks",
    tag = TASK_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    request_body = dto::task::NewTask,
    responses(
        (status = 201, description = "Task created and project progress recomputed", body = dto::task::Task),
        (status = 400, description = "Malformed or invalid body", body = BasicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Adds a task to a project
async fn create_project_task(
    actor_id: i32,
    project_id: i32,
    new_task: dto::task::NewTask,
    repo: &impl Repository,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::task::Task>), ErrorResponse> {
    info!(actor_id, project_id, "Creating project task");
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let domain_task = domain::task::NewTask::from(new_task);
    let created = task_service
        .create_project_task(actor_id, project_id, &domain_task, repo)
        .await
        .map_err(TaskErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(dto::task::Task::from(created))))
}
