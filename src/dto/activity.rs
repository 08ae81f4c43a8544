use crate::domain;
use crate::domain::activity::{ActivityAction, ActivityTarget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// DTO for one entry of the activity feed
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct Activity {
    pub id: i32,
    pub user_id: i32,
    pub action: ActivityAction,
    pub target: ActivityTarget,
    pub target_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<domain::activity::Activity> for Activity {
    fn from(value: domain::activity::Activity) -> Self {
        Activity {
            id: value.id,
            user_id: value.user_id,
            action: value.action,
            target: value.target,
            target_id: value.target_id,
            created_at: value.created_at,
        }
    }
}

/// Query parameters of the activity feed
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// Maximum number of entries to return, 10 by default
    pub limit: Option<usize>,
}
