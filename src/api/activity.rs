use crate::api::auth::AuthenticatedUser;
use crate::domain::activity::driven_ports::ActivityReader;
use crate::domain::activity::driving_ports::ActivityPort;
use crate::routing_utils::{GenericErrorResponse, Json, Query};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(recent_activity), components(schemas(dto::activity::Activity)))]
/// Defines the OpenAPI documentation for the activity feed
pub struct ActivityApi;
/// Constant used to group activity endpoints in OpenAPI documentation
pub const ACTIVITY_API_GROUP: &str = "Activity";

/// Adds routes under "/activities"
pub fn activity_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/activities",
        get(
            |State(app_state): AppState,
             AuthenticatedUser(actor_id): AuthenticatedUser,
             Query(feed_query): Query<dto::activity::FeedQuery>| async move {
                let activity_service = domain::activity::ActivityService {};

                recent_activity(actor_id, feed_query, &app_state.store, &activity_service).await
            },
        ),
    )
}

#[utoipa::path(
    get,
    path = "/api/activities",
    tag = ACTIVITY_API_GROUP,
    security(("bearer_token" = [])),
    params(dto::activity::FeedQuery),
    responses(
        (status = 200, description = "The caller's own activity, newest first", body = Vec<dto::activity::Activity>),
        (status = 401, description = "Missing or invalid token", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Returns the caller's activity feed
async fn recent_activity(
    actor_id: i32,
    feed_query: dto::activity::FeedQuery,
    a_read: &impl ActivityReader,
    activity_service: &impl ActivityPort,
) -> Result<Json<Vec<dto::activity::Activity>>, ErrorResponse> {
    info!(actor_id, limit = ?feed_query.limit, "Reading activity feed");
    let activities = activity_service
        .recent_activity(actor_id, feed_query.limit, a_read)
        .await
        .map_err(GenericErrorResponse)?;

    Ok(Json(
        activities
            .into_iter()
            .map(dto::activity::Activity::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::error_parts;
    use crate::domain::activity::test_util::MockActivityService;
    use crate::domain::activity::{Activity, ActivityAction, ActivityTarget};
    use crate::persistence::InMemoryStore;
    use anyhow::anyhow;
    use chrono::Utc;
    use speculoos::prelude::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn forwards_limit_and_converts_entries() {
        let mut activity_service_raw = MockActivityService::new();
        activity_service_raw
            .recent_activity_result
            .set_returned_anyhow(Ok(vec![Activity {
                id: 4,
                user_id: 1,
                action: ActivityAction::UpdatedProgressOn,
                target: ActivityTarget::Project,
                target_id: Some(2),
                created_at: Utc::now(),
            }]));
        let activity_service = Mutex::new(activity_service_raw);

        let response = recent_activity(
            1,
            dto::activity::FeedQuery { limit: Some(5) },
            &InMemoryStore::new(),
            &activity_service,
        )
        .await;
        let Ok(Json(feed)) = response else {
            panic!("Expected feed to load");
        };
        assert_that!(feed).has_length(1);
        assert_that!(feed[0].action).is_equal_to(ActivityAction::UpdatedProgressOn);

        let locked_activity_service = activity_service
            .lock()
            .expect("activity service mutex poisoned");
        assert_eq!(
            locked_activity_service.recent_activity_result.calls(),
            &[(1, Some(5usize))]
        );
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let mut activity_service_raw = MockActivityService::new();
        activity_service_raw
            .recent_activity_result
            .set_returned_anyhow(Err(anyhow!("store down")));
        let activity_service = Mutex::new(activity_service_raw);

        let response = recent_activity(
            1,
            dto::activity::FeedQuery { limit: None },
            &InMemoryStore::new(),
            &activity_service,
        )
        .await;
        let Err(err) = response else {
            panic!("Expected feed to fail");
        };
        assert_that!(error_parts(err).await).is_equal_to((500u16, "internal_error".to_owned()));
    }
}
