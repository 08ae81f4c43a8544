use super::InMemoryStore;
use crate::domain;
use crate::domain::activity::{Activity, NewActivity};
use anyhow::Context;
use chrono::Utc;

impl domain::activity::driven_ports::ActivityReader for InMemoryStore {
    async fn recent_for_user(
        &self,
        user_id: i32,
        limit: usize,
    ) -> Result<Vec<Activity>, anyhow::Error> {
        let tables = self.read().context("Fetching recent activity")?;

        let mut entries: Vec<Activity> = tables
            .activities
            .iter()
            .filter(|activity| activity.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries.truncate(limit);

        Ok(entries)
    }
}

impl domain::activity::driven_ports::ActivityWriter for InMemoryStore {
    async fn record_activity(&self, activity: &NewActivity) -> Result<Activity, anyhow::Error> {
        let mut tables = self.write().context("Appending to the activity log")?;

        let recorded = Activity {
            id: tables.activity_ids.next(),
            user_id: activity.user_id,
            action: activity.action,
            target: activity.target,
            target_id: activity.target_id,
            created_at: Utc::now(),
        };
        tables.activities.push(recorded.clone());

        Ok(recorded)
    }
}
