use super::InMemoryStore;
use crate::domain;
use crate::domain::progress::{self, StatusSync};
use crate::domain::task::Task;
use crate::domain::project::{NewProject, Project, ProjectStatus, ProjectUpdate};
use crate::domain::tombstone::{Stored, Tombstone};
use anyhow::Context;
use chrono::Utc;

impl domain::project::driven_ports::ProjectReader for InMemoryStore {
    async fn project_by_id(&self, project_id: i32) -> Result<Option<Project>, anyhow::Error> {
        let tables = self.read().context("Fetching a project by id")?;

        Ok(tables
            .projects
            .get(&project_id)
            .and_then(Stored::live)
            .cloned())
    }

    async fn projects_for_user(&self, user_id: i32) -> Result<Vec<Project>, anyhow::Error> {
        let tables = self.read().context("Fetching projects for a user")?;

        Ok(tables
            .projects
            .values()
            .filter_map(Stored::live)
            .filter(|project| {
                project.user_id == user_id || tables.memberships.contains(&(project.id, user_id))
            })
            .cloned()
            .collect())
    }

    async fn deleted_project(
        &self,
        project_id: i32,
    ) -> Result<Option<Tombstone<Project>>, anyhow::Error> {
        let tables = self.read().context("Fetching a deleted project")?;

        Ok(tables
            .projects
            .get(&project_id)
            .and_then(Stored::tombstone)
            .cloned())
    }
}

impl domain::project::driven_ports::ProjectWriter for InMemoryStore {
    async fn create_project(
        &self,
        owner_id: i32,
        new_project: &NewProject,
        status: ProjectStatus,
    ) -> Result<Project, anyhow::Error> {
        let mut tables = self.write().context("Inserting new project")?;

        let id = tables.project_ids.next();
        let project = Project {
            id,
            title: new_project.title.clone(),
            description: new_project.description.clone(),
            status,
            progress: new_project.progress.unwrap_or(0),
            due_date: new_project.due_date.clone(),
            user_id: owner_id,
        };
        tables.projects.insert(id, Stored::Live(project.clone()));

        Ok(project)
    }

    async fn update_project(
        &self,
        project_id: i32,
        update: &ProjectUpdate,
    ) -> Result<Option<Project>, anyhow::Error> {
        let mut tables = self.write().context("Updating a project")?;

        let Some(project) = tables
            .projects
            .get_mut(&project_id)
            .and_then(Stored::live_mut)
        else {
            return Ok(None);
        };
        update.apply_to(project);

        Ok(Some(project.clone()))
    }

    async fn resync_progress(
        &self,
        project_id: i32,
        status_sync: StatusSync,
    ) -> Result<Option<u8>, anyhow::Error> {
        let mut guard = self.write().context("Recomputing project progress")?;
        let tables = &mut *guard;

        let Some(project) = tables
            .projects
            .get_mut(&project_id)
            .and_then(Stored::live_mut)
        else {
            return Ok(None);
        };
        let project_tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter_map(Stored::live)
            .filter(|task| task.project_id == Some(project_id))
            .cloned()
            .collect();
        let Some(progress) = progress::completion_percentage(&project_tasks) else {
            return Ok(None);
        };

        project.progress = progress;
        if let Some(status) = status_sync.status_for(progress) {
            project.status = status;
        }

        Ok(Some(progress))
    }

    async fn delete_project(&self, project_id: i32) -> Result<Option<Project>, anyhow::Error> {
        let mut tables = self.write().context("Deleting a project")?;

        Ok(tables
            .projects
            .get_mut(&project_id)
            .and_then(|slot| slot.bury(Utc::now())))
    }

    async fn restore_project(&self, project_id: i32) -> Result<Option<Project>, anyhow::Error> {
        let mut tables = self.write().context("Restoring a project")?;

        Ok(tables
            .projects
            .get_mut(&project_id)
            .and_then(Stored::revive))
    }
}

impl domain::project::driven_ports::MembershipReader for InMemoryStore {
    async fn is_member(&self, project_id: i32, user_id: i32) -> Result<bool, anyhow::Error> {
        let tables = self.read().context("Checking project membership")?;

        Ok(tables.memberships.contains(&(project_id, user_id)))
    }

    async fn member_ids(&self, project_id: i32) -> Result<Vec<i32>, anyhow::Error> {
        let tables = self.read().context("Listing project members")?;

        Ok(tables
            .memberships
            .range((project_id, i32::MIN)..=(project_id, i32::MAX))
            .map(|&(_, user_id)| user_id)
            .collect())
    }
}

impl domain::project::driven_ports::MembershipWriter for InMemoryStore {
    async fn add_member(&self, project_id: i32, user_id: i32) -> Result<(), anyhow::Error> {
        let mut tables = self.write().context("Adding a project member")?;
        tables.memberships.insert((project_id, user_id));

        Ok(())
    }

    async fn remove_member(&self, project_id: i32, user_id: i32) -> Result<bool, anyhow::Error> {
        let mut tables = self.write().context("Removing a project member")?;

        Ok(tables.memberships.remove(&(project_id, user_id)))
    }
}
