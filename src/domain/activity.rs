use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// The verb of an activity entry, rendered the way the feed shows it ("John updated progress on project")
#[derive(PartialEq, Eq, Debug, Clone, Copy, Display, Serialize, Deserialize, ToSchema)]
pub enum ActivityAction {
    #[display("created")]
    #[serde(rename = "created")]
    Created,
    #[display("updated")]
    #[serde(rename = "updated")]
    Updated,
    #[display("updated progress on")]
    #[serde(rename = "updated progress on")]
    UpdatedProgressOn,
    #[display("deleted")]
    #[serde(rename = "deleted")]
    Deleted,
    #[display("restored")]
    #[serde(rename = "restored")]
    Restored,
    #[display("invited")]
    #[serde(rename = "invited")]
    Invited,
    #[display("added to")]
    #[serde(rename = "added to")]
    AddedTo,
    #[display("removed")]
    #[serde(rename = "removed")]
    Removed,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Display, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTarget {
    #[display("task")]
    Task,
    #[display("project")]
    Project,
    #[display("user")]
    User,
}

/// One entry of the append-only audit log
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Activity {
    pub id: i32,
    pub user_id: i32,
    pub action: ActivityAction,
    pub target: ActivityTarget,
    pub target_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: i32,
    pub action: ActivityAction,
    pub target: ActivityTarget,
    pub target_id: Option<i32>,
}

/// How many entries the feed returns when the caller doesn't ask for a specific amount
pub const DEFAULT_FEED_LIMIT: usize = 10;

pub mod driven_ports {
    use super::*;

    pub trait ActivityReader {
        /// Entries recorded for the user, newest first, at most `limit` of them
        async fn recent_for_user(
            &self,
            user_id: i32,
            limit: usize,
        ) -> Result<Vec<Activity>, anyhow::Error>;
    }

    pub trait ActivityWriter {
        async fn record_activity(&self, activity: &NewActivity) -> Result<Activity, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait ActivityPort {
        async fn recent_activity(
            &self,
            user_id: i32,
            limit: Option<usize>,
            a_read: &impl driven_ports::ActivityReader,
        ) -> Result<Vec<Activity>, anyhow::Error>;
    }
}

/// Appends to the audit log after a mutation already happened. The mutation is not rolled
/// back when this fails, so the failure is only logged.
pub(super) async fn log_activity(
    user_id: i32,
    action: ActivityAction,
    target: ActivityTarget,
    target_id: Option<i32>,
    a_write: &impl driven_ports::ActivityWriter,
) {
    let new_activity = NewActivity {
        user_id,
        action,
        target,
        target_id,
    };

    if let Err(err) = a_write.record_activity(&new_activity).await {
        error!(user_id, %action, %target, "Failed to record activity: {err:#}");
    }
}

pub struct ActivityService {}

impl driving_ports::ActivityPort for ActivityService {
    async fn recent_activity(
        &self,
        user_id: i32,
        limit: Option<usize>,
        a_read: &impl driven_ports::ActivityReader,
    ) -> Result<Vec<Activity>, anyhow::Error> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT);

        a_read.recent_for_user(user_id, limit).await
    }
}
