use super::InMemoryStore;
use crate::domain;
use crate::domain::task::{NewTask, Task, TaskUpdate};
use crate::domain::tombstone::{Stored, Tombstone};
use anyhow::Context;
use chrono::Utc;

impl domain::task::driven_ports::TaskReader for InMemoryStore {
    async fn task_by_id(&self, task_id: i32) -> Result<Option<Task>, anyhow::Error> {
        let tables = self.read().context("Fetching a task by id")?;

        Ok(tables.tasks.get(&task_id).and_then(Stored::live).cloned())
    }

    async fn tasks_for_user(&self, user_id: i32) -> Result<Vec<Task>, anyhow::Error> {
        let tables = self.read().context("Fetching tasks for a user")?;

        Ok(tables
            .tasks
            .values()
            .filter_map(Stored::live)
            .filter(|task| task.user_id == user_id || task.assignee_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn tasks_in_project(&self, project_id: i32) -> Result<Vec<Task>, anyhow::Error> {
        let tables = self.read().context("Fetching tasks in a project")?;

        Ok(tables
            .tasks
            .values()
            .filter_map(Stored::live)
            .filter(|task| task.project_id == Some(project_id))
            .cloned()
            .collect())
    }

    async fn deleted_task(&self, task_id: i32) -> Result<Option<Tombstone<Task>>, anyhow::Error> {
        let tables = self.read().context("Fetching a deleted task")?;

        Ok(tables
            .tasks
            .get(&task_id)
            .and_then(Stored::tombstone)
            .cloned())
    }
}

impl domain::task::driven_ports::TaskWriter for InMemoryStore {
    async fn create_task(&self, creator_id: i32, new_task: &NewTask) -> Result<Task, anyhow::Error> {
        let mut tables = self.write().context("Inserting new task")?;

        let now = Utc::now();
        let id = tables.task_ids.next();
        let task = Task {
            id,
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            status: new_task.status,
            priority: new_task.priority,
            due_date: new_task.due_date.clone(),
            assignee_id: new_task.assignee_id,
            user_id: creator_id,
            project_id: new_task.project_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(id, Stored::Live(task.clone()));

        Ok(task)
    }

    async fn update_task(
        &self,
        task_id: i32,
        update: &TaskUpdate,
    ) -> Result<Option<Task>, anyhow::Error> {
        let mut tables = self.write().context("Updating a task")?;

        let Some(task) = tables.tasks.get_mut(&task_id).and_then(Stored::live_mut) else {
            return Ok(None);
        };
        update.apply_to(task);
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, task_id: i32) -> Result<Option<Task>, anyhow::Error> {
        let mut tables = self.write().context("Deleting a task")?;

        Ok(tables
            .tasks
            .get_mut(&task_id)
            .and_then(|slot| slot.bury(Utc::now())))
    }

    async fn restore_task(&self, task_id: i32) -> Result<Option<Task>, anyhow::Error> {
        let mut tables = self.write().context("Restoring a task")?;

        Ok(tables.tasks.get_mut(&task_id).and_then(Stored::revive))
    }
}
