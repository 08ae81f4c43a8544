use crate::api::auth::AuthenticatedUser;
use crate::domain::Repository;
use crate::domain::project::driving_ports::{ProjectError, ProjectPort};
use crate::dto::Message;
use crate::routing_utils::{
    ApiErrorResponse, GenericErrorResponse, Json, Path, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{ErrorResponse, IntoResponse, Response};
use axum::routing::{delete, get, post};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_projects,
        get_project,
        create_project,
        update_project,
        patch_progress,
        delete_project,
        restore_project,
        list_members,
        add_member,
        remove_member
    ),
    components(schemas(
        dto::project::Project,
        dto::project::NewProject,
        dto::project::ProjectUpdate,
        dto::project::ProgressPatch,
        dto::project::ProgressUpdated,
        dto::project::ProjectDeleted,
        dto::project::ProjectRestored,
        dto::project::NewMember,
        dto::user::UserProfile
    ))
)]
/// Defines the OpenAPI documentation for the project API
pub struct ProjectApi;
/// Constant used to group project endpoints in OpenAPI documentation
pub const PROJECT_API_GROUP: &str = "Projects";

/// Adds routes under "/projects"
pub fn project_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/projects",
            get(
                |State(app_state): AppState, AuthenticatedUser(actor_id): AuthenticatedUser| async move {
                    let project_service = domain::project::ProjectService {};

                    list_projects(actor_id, &app_state.store, &project_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Json(new_project): Json<dto::project::NewProject>| async move {
                    let project_service = domain::project::ProjectService {};

                    create_project(actor_id, new_project, &app_state.store, &project_service).await
                },
            ),
        )
        .route(
            "/projects/:project_id",
            get(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>| async move {
                    let project_service = domain::project::ProjectService {};

                    get_project(actor_id, project_id, &app_state.store, &project_service).await
                },
            )
            .put(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>,
                 Json(update): Json<dto::project::ProjectUpdate>| async move {
                    let project_service = domain::project::ProjectService {};

                    update_project(actor_id, project_id, update, &app_state.store, &project_service)
                        .await
                },
            )
            .patch(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>,
                 Json(patch): Json<dto::project::ProgressPatch>| async move {
                    let project_service = domain::project::ProjectService {};

                    patch_progress(actor_id, project_id, patch, &app_state.store, &project_service)
                        .await
                },
            )
            .delete(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>| async move {
                    let project_service = domain::project::ProjectService {};

                    delete_project(actor_id, project_id, &app_state.store, &project_service).await
                },
            ),
        )
        .route(
            "/projects/:project_id/restore",
            post(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>| async move {
                    let project_service = domain::project::ProjectService {};

                    restore_project(actor_id, project_id, &app_state.store, &project_service).await
                },
            ),
        )
        .route(
            "/projects/:project_id/members",
            get(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>| async move {
                    let project_service = domain::project::ProjectService {};

                    list_members(actor_id, project_id, &app_state.store, &project_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path(project_id): Path<i32>,
                 Json(new_member): Json<dto::project::NewMember>| async move {
                    let project_service = domain::project::ProjectService {};

                    add_member(actor_id, project_id, new_member, &app_state.store, &project_service)
                        .await
                },
            ),
        )
        .route(
            "/projects/:project_id/members/:member_id",
            delete(
                |State(app_state): AppState,
                 AuthenticatedUser(actor_id): AuthenticatedUser,
                 Path((project_id, member_id)): Path<(i32, i32)>| async move {
                    let project_service = domain::project::ProjectService {};

                    remove_member(actor_id, project_id, member_id, &app_state.store, &project_service)
                        .await
                },
            ),
        )
}

/// Response type that turns [ProjectError]s into [BasicErrorResponse][crate::routing_utils::BasicErrorResponse]s
pub struct ProjectErrorResponse(ProjectError);

impl IntoResponse for ProjectErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            ProjectError::NotFound => ApiErrorResponse::not_found().into_response(),
            ProjectError::NotAuthorized => {
                ApiErrorResponse::forbidden(self.0.to_string()).into_response()
            }
            ProjectError::InviteeNotFound => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                "not_found",
                self.0.to_string(),
            )
            .into_response(),
            ProjectError::NoUpdatableFields => {
                ApiErrorResponse::bad_request("invalid_update_fields", self.0.to_string())
                    .into_response()
            }
            ProjectError::PortError(err) => GenericErrorResponse(err).into_response(),
        }
    }
}

impl From<ProjectError> for ProjectErrorResponse {
    fn from(value: ProjectError) -> Self {
        Self(value)
    }
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Projects the caller owns or belongs to", body = Vec<dto::project::Project>),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Lists the caller's projects
async fn list_projects(
    actor_id: i32,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<Vec<dto::project::Project>>, ErrorResponse> {
    info!(actor_id, "Listing projects");
    let projects = project_service
        .projects_for_user(actor_id, repo)
        .await
        .map_err(GenericErrorResponse)?;

    Ok(Json(
        projects
            .into_iter()
            .map(dto::project::Project::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    responses(
        (status = 200, description = "The project", body = dto::project::Project),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Fetches one project the caller owns or belongs to
async fn get_project(
    actor_id: i32,
    project_id: i32,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<dto::project::Project>, ErrorResponse> {
    info!(actor_id, project_id, "Fetching project");
    let project = project_service
        .project_for_user(actor_id, project_id, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok(Json(dto::project::Project::from(project)))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    request_body = dto::project::NewProject,
    responses(
        (status = 201, description = "Project created with the caller as owner", body = dto::project::Project),
        (status = 400, description = "Malformed or invalid body", body = BasicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Creates a project owned by the caller
async fn create_project(
    actor_id: i32,
    new_project: dto::project::NewProject,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<(StatusCode, Json<dto::project::Project>), ErrorResponse> {
    info!(actor_id, "Creating project");
    new_project.validate().map_err(ValidationErrorResponse::from)?;

    let domain_project = domain::project::NewProject::from(new_project);
    let created = project_service
        .create_project(actor_id, &domain_project, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(dto::project::Project::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/projects/{project_id}",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    request_body = dto::project::ProjectUpdate,
    responses(
        (status = 200, description = "The updated project", body = dto::project::Project),
        (status = 400, description = "Malformed or invalid body", body = BasicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Only the owner may edit the project", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Partially updates a project the caller owns
async fn update_project(
    actor_id: i32,
    project_id: i32,
    update: dto::project::ProjectUpdate,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<dto::project::Project>, ErrorResponse> {
    info!(actor_id, project_id, "Updating project");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let domain_update = domain::project::ProjectUpdate::from(update);
    let updated = project_service
        .update_project(actor_id, project_id, &domain_update, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok(Json(dto::project::Project::from(updated)))
}

#[utoipa::path(
    patch,
    path = "/api/projects/{project_id}",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    request_body = dto::project::ProgressPatch,
    responses(
        (status = 200, description = "Progress stored", body = dto::project::ProgressUpdated),
        (status = 400, description = "Anything besides a valid progress was sent", body = BasicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Sets the progress of a project the caller owns or belongs to
async fn patch_progress(
    actor_id: i32,
    project_id: i32,
    patch: dto::project::ProgressPatch,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<dto::project::ProgressUpdated>, ErrorResponse> {
    info!(actor_id, project_id, "Patching project progress");
    patch.validate().map_err(ValidationErrorResponse::from)?;

    let progress = project_service
        .update_progress(actor_id, project_id, patch.progress_only(), repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok(Json(dto::project::ProgressUpdated {
        success: true,
        progress,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    responses(
        (status = 200, description = "Project deleted; it can be restored later", body = dto::project::ProjectDeleted),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Only the owner may delete the project", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Deletes a project, keeping it around for a later restore
async fn delete_project(
    actor_id: i32,
    project_id: i32,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<dto::project::ProjectDeleted>, ErrorResponse> {
    info!(actor_id, project_id, "Deleting project");
    project_service
        .delete_project(actor_id, project_id, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok(Json(dto::project::ProjectDeleted {
        message: "Project deleted successfully".to_owned(),
        project_id,
    }))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/restore",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the deleted project")),
    responses(
        (status = 200, description = "Project restored exactly as it was deleted", body = dto::project::ProjectRestored),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Only the owner may restore the project", body = BasicErrorResponse),
        (status = 404, description = "No deleted project with that id", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Undoes the most recent deletion of a project
async fn restore_project(
    actor_id: i32,
    project_id: i32,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<dto::project::ProjectRestored>, ErrorResponse> {
    info!(actor_id, project_id, "Restoring project");
    let restored = project_service
        .restore_project(actor_id, project_id, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok(Json(dto::project::ProjectRestored {
        message: "Project restored successfully".to_owned(),
        project: dto::project::Project::from(restored),
    }))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/members",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    responses(
        (status = 200, description = "Profiles of the project's members", body = Vec<dto::user::UserProfile>),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Lists the members of a project
async fn list_members(
    actor_id: i32,
    project_id: i32,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<Vec<dto::user::UserProfile>>, ErrorResponse> {
    info!(actor_id, project_id, "Listing project members");
    let members = project_service
        .members(actor_id, project_id, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok(Json(
        members
            .into_iter()
            .map(dto::user::UserProfile::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/members",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(("project_id" = i32, Path, description = "Id of the project")),
    request_body = dto::project::NewMember,
    responses(
        (status = 201, description = "Invitee added to the project", body = dto::Message),
        (status = 400, description = "Malformed or invalid body", body = BasicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Only the owner may invite", body = BasicErrorResponse),
        (status = 404, description = "No such project, or nobody registered with that email", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Invites a registered user into a project by email
async fn add_member(
    actor_id: i32,
    project_id: i32,
    new_member: dto::project::NewMember,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<(StatusCode, Json<Message>), ErrorResponse> {
    info!(actor_id, project_id, "Adding project member");
    new_member.validate().map_err(ValidationErrorResponse::from)?;

    let invitee = project_service
        .add_member(actor_id, project_id, &new_member.invitee_email, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok((
        StatusCode::CREATED,
        Json(Message::new(format!("{} added to the project", invitee.username))),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/members/{member_id}",
    tag = PROJECT_API_GROUP,
    security(("bearer_token" = [])),
    params(
        ("project_id" = i32, Path, description = "Id of the project"),
        ("member_id" = i32, Path, description = "Id of the member to remove"),
    ),
    responses(
        (status = 200, description = "Member removed", body = dto::Message),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 403, description = "Only the owner may remove members", body = BasicErrorResponse),
        (status = 404, description = "No such project, or the caller can't see it", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Removes a member from a project
async fn remove_member(
    actor_id: i32,
    project_id: i32,
    member_id: i32,
    repo: &impl Repository,
    project_service: &impl ProjectPort,
) -> Result<Json<Message>, ErrorResponse> {
    info!(actor_id, project_id, member_id, "Removing project member");
    project_service
        .remove_member(actor_id, project_id, member_id, repo)
        .await
        .map_err(ProjectErrorResponse::from)?;

    Ok(Json(Message::new("Member removed successfully")))
}
