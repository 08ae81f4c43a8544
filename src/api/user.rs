use crate::api::auth::AuthenticatedUser;
use crate::domain::user::driven_ports::UserReader;
use crate::domain::user::driving_ports::UserPort;
use crate::routing_utils::{ApiErrorResponse, GenericErrorResponse, Json, Path};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(current_user, user_by_id))]
/// Defines the OpenAPI documentation for the user API
pub struct UsersApi;
/// Constant used to group user endpoints in OpenAPI documentation
pub const USER_API_GROUP: &str = "Users";

/// Builds a router for the user profile routes
pub fn user_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/user",
            get(
                |State(app_state): AppState, AuthenticatedUser(actor_id): AuthenticatedUser| async move {
                    let user_service = domain::user::UserService {};

                    current_user(actor_id, &app_state.store, &user_service).await
                },
            ),
        )
        .route(
            "/users/:user_id",
            get(
                |State(app_state): AppState,
                 AuthenticatedUser(_): AuthenticatedUser,
                 Path(user_id): Path<i32>| async move {
                    let user_service = domain::user::UserService {};

                    user_by_id(user_id, &app_state.store, &user_service).await
                },
            ),
        )
}

async fn profile_of(
    user_id: i32,
    u_read: &impl UserReader,
    user_service: &impl UserPort,
) -> Result<Json<dto::user::UserProfile>, ErrorResponse> {
    let user = user_service
        .user_by_id(user_id, u_read)
        .await
        .map_err(GenericErrorResponse)?
        .ok_or_else(ApiErrorResponse::not_found)?;

    Ok(Json(dto::user::UserProfile::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = USER_API_GROUP,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "The caller's profile", body = dto::user::UserProfile),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 404, description = "The token's user no longer exists", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Retrieves the profile of the logged in user
async fn current_user(
    actor_id: i32,
    u_read: &impl UserReader,
    user_service: &impl UserPort,
) -> Result<Json<dto::user::UserProfile>, ErrorResponse> {
    info!(actor_id, "Requested own profile");

    profile_of(actor_id, u_read, user_service).await
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = USER_API_GROUP,
    security(("bearer_token" = [])),
    params(("user_id" = i32, Path, description = "Id of the user")),
    responses(
        (status = 200, description = "The user's profile", body = dto::user::UserProfile),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 404, description = "No such user", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Retrieves any user's public profile
async fn user_by_id(
    user_id: i32,
    u_read: &impl UserReader,
    user_service: &impl UserPort,
) -> Result<Json<dto::user::UserProfile>, ErrorResponse> {
    info!(user_id, "Requested user profile");

    profile_of(user_id, u_read, user_service).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::error_parts;
    use crate::domain::user::test_util::{MockUserService, user_default};
    use crate::persistence::InMemoryStore;
    use anyhow::anyhow;
    use speculoos::prelude::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn returns_profile_without_password() {
        let mut user_service_raw = MockUserService::new();
        user_service_raw
            .user_by_id_result
            .set_returned_anyhow(Ok(Some(user_default())));
        let user_service = Mutex::new(user_service_raw);

        let response = current_user(1, &InMemoryStore::new(), &user_service).await;
        let Ok(Json(profile)) = response else {
            panic!("Expected a profile");
        };
        assert_that!(profile).is_equal_to(dto::user::UserProfile {
            id: 1,
            name: "John Doe".to_owned(),
            email: "john@example.com".to_owned(),
            username: "johndoe".to_owned(),
        });
        let locked_user_service = user_service.lock().expect("user service mutex poisoned");
        assert_eq!(locked_user_service.user_by_id_result.calls(), &[1]);
    }

    #[tokio::test]
    async fn missing_user_is_404() {
        let mut user_service_raw = MockUserService::new();
        user_service_raw.user_by_id_result.set_returned_anyhow(Ok(None));
        let user_service = Mutex::new(user_service_raw);

        let response = user_by_id(8, &InMemoryStore::new(), &user_service).await;
        let Err(err) = response else {
            panic!("Expected a missing user");
        };
        assert_that!(error_parts(err).await).is_equal_to((404u16, "not_found".to_owned()));
    }

    #[tokio::test]
    async fn port_failure_is_500() {
        let mut user_service_raw = MockUserService::new();
        user_service_raw
            .user_by_id_result
            .set_returned_anyhow(Err(anyhow!("store down")));
        let user_service = Mutex::new(user_service_raw);

        let response = user_by_id(8, &InMemoryStore::new(), &user_service).await;
        let Err(err) = response else {
            panic!("Expected a failure");
        };
        assert_that!(error_parts(err).await).is_equal_to((500u16, "internal_error".to_owned()));
    }
}
