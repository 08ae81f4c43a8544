use crate::domain::Repository;
use crate::domain::access::{self, ProjectOperation};
use crate::domain::activity::{self, ActivityAction, ActivityTarget};
use crate::domain::project::driving_ports::ProjectError;
use crate::domain::user::User;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    OnTrack,
    AtRisk,
    Delayed,
}

impl ProjectStatus {
    /// Status a freshly created project starts with, given its initial progress
    pub fn for_initial_progress(progress: u8) -> Self {
        if progress == 100 {
            Self::Completed
        } else {
            Self::InProgress
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// Completion percentage, 0 through 100
    pub progress: u8,
    pub due_date: Option<String>,
    /// The owner
    pub user_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub progress: Option<u8>,
}

/// A partial project update. `None` leaves a field alone; for the nullable fields
/// `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<u8>,
    pub due_date: Option<Option<String>>,
}

impl ProjectUpdate {
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(ref title) = self.title {
            project.title = title.clone();
        }
        if let Some(ref description) = self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(progress) = self.progress {
            project.progress = progress;
        }
        if let Some(ref due_date) = self.due_date {
            project.due_date = due_date.clone();
        }
    }
}

pub mod driven_ports {
    use super::*;
    use crate::domain::progress::StatusSync;
    use crate::domain::tombstone::Tombstone;

    pub trait ProjectReader {
        async fn project_by_id(&self, project_id: i32) -> Result<Option<Project>, anyhow::Error>;
        /// Projects the user owns or is a member of, ordered by id
        async fn projects_for_user(&self, user_id: i32) -> Result<Vec<Project>, anyhow::Error>;
        async fn deleted_project(
            &self,
            project_id: i32,
        ) -> Result<Option<Tombstone<Project>>, anyhow::Error>;
    }

    pub trait ProjectWriter {
        async fn create_project(
            &self,
            owner_id: i32,
            new_project: &NewProject,
            status: ProjectStatus,
        ) -> Result<Project, anyhow::Error>;
        /// Returns [None] if there is no live project with the id
        async fn update_project(
            &self,
            project_id: i32,
            update: &ProjectUpdate,
        ) -> Result<Option<Project>, anyhow::Error>;
        /// Recomputes the live project's progress from its live tasks and writes it back, along
        /// with the status `status_sync` asks for, as one atomic step. Returns the new progress,
        /// or [None] if the project is gone or has no tasks (its progress is then left alone).
        async fn resync_progress(
            &self,
            project_id: i32,
            status_sync: StatusSync,
        ) -> Result<Option<u8>, anyhow::Error>;
        /// Tombstones the live project. Returns [None] if there is no live project with the id.
        async fn delete_project(&self, project_id: i32) -> Result<Option<Project>, anyhow::Error>;
        /// Brings a tombstoned project back. Returns [None] if there is no tombstone for the id.
        async fn restore_project(&self, project_id: i32) -> Result<Option<Project>, anyhow::Error>;
    }

    pub trait MembershipReader {
        async fn is_member(&self, project_id: i32, user_id: i32) -> Result<bool, anyhow::Error>;
        async fn member_ids(&self, project_id: i32) -> Result<Vec<i32>, anyhow::Error>;
    }

    pub trait MembershipWriter {
        async fn add_member(&self, project_id: i32, user_id: i32) -> Result<(), anyhow::Error>;
        /// Returns whether the user was a member before the call
        async fn remove_member(&self, project_id: i32, user_id: i32) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum ProjectError {
        #[error("The project could not be found.")]
        NotFound,
        #[error("Not authorized to change this project.")]
        NotAuthorized,
        #[error("No user is registered with that email address.")]
        InviteeNotFound,
        #[error("Only the progress field can be patched.")]
        NoUpdatableFields,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait ProjectPort {
        async fn projects_for_user(
            &self,
            actor_id: i32,
            repo: &impl Repository,
        ) -> Result<Vec<Project>, anyhow::Error>;
        async fn project_for_user(
            &self,
            actor_id: i32,
            project_id: i32,
            repo: &impl Repository,
        ) -> Result<Project, ProjectError>;
        async fn create_project(
            &self,
            actor_id: i32,
            new_project: &NewProject,
            repo: &impl Repository,
        ) -> Result<Project, ProjectError>;
        async fn update_project(
            &self,
            actor_id: i32,
            project_id: i32,
            update: &ProjectUpdate,
            repo: &impl Repository,
        ) -> Result<Project, ProjectError>;
        async fn update_progress(
            &self,
            actor_id: i32,
            project_id: i32,
            progress: Option<u8>,
            repo: &impl Repository,
        ) -> Result<u8, ProjectError>;
        async fn delete_project(
            &self,
            actor_id: i32,
            project_id: i32,
            repo: &impl Repository,
        ) -> Result<(), ProjectError>;
        async fn restore_project(
            &self,
            actor_id: i32,
            project_id: i32,
            repo: &impl Repository,
        ) -> Result<Project, ProjectError>;
        async fn members(
            &self,
            actor_id: i32,
            project_id: i32,
            repo: &impl Repository,
        ) -> Result<Vec<User>, ProjectError>;
        async fn add_member(
            &self,
            actor_id: i32,
            project_id: i32,
            invitee_email: &str,
            repo: &impl Repository,
        ) -> Result<User, ProjectError>;
        async fn remove_member(
            &self,
            actor_id: i32,
            project_id: i32,
            member_id: i32,
            repo: &impl Repository,
        ) -> Result<(), ProjectError>;
    }
}

/// Looks up a live project and checks the actor may perform `operation` on it. Projects the
/// actor can't even read are reported as missing rather than forbidden.
pub(super) async fn authorize_project(
    actor_id: i32,
    project_id: i32,
    operation: ProjectOperation,
    repo: &impl Repository,
) -> Result<Project, ProjectError> {
    let Some(project) = repo
        .project_by_id(project_id)
        .await
        .context("looking up project for authorization")?
    else {
        return Err(ProjectError::NotFound);
    };

    let is_member = repo
        .is_member(project_id, actor_id)
        .await
        .context("checking project membership")?;
    if access::may_access_project(actor_id, &project, is_member, operation) {
        return Ok(project);
    }

    if operation == ProjectOperation::Read {
        Err(ProjectError::NotFound)
    } else {
        warn!(actor_id, project_id, ?operation, "Project access denied");
        Err(ProjectError::NotAuthorized)
    }
}

pub struct ProjectService {}

impl driving_ports::ProjectPort for ProjectService {
    async fn projects_for_user(
        &self,
        actor_id: i32,
        repo: &impl Repository,
    ) -> Result<Vec<Project>, anyhow::Error> {
        repo.projects_for_user(actor_id)
            .await
            .context("listing projects for user")
    }

    async fn project_for_user(
        &self,
        actor_id: i32,
        project_id: i32,
        repo: &impl Repository,
    ) -> Result<Project, ProjectError> {
        authorize_project(actor_id, project_id, ProjectOperation::Read, repo).await
    }

    async fn create_project(
        &self,
        actor_id: i32,
        new_project: &NewProject,
        repo: &impl Repository,
    ) -> Result<Project, ProjectError> {
        let status = ProjectStatus::for_initial_progress(new_project.progress.unwrap_or(0));
        let project = repo
            .create_project(actor_id, new_project, status)
            .await
            .context("creating project")?;
        info!(actor_id, project_id = project.id, "Project created");

        activity::log_activity(
            actor_id,
            ActivityAction::Created,
            ActivityTarget::Project,
            Some(project.id),
            repo,
        )
        .await;

        Ok(project)
    }

    async fn update_project(
        &self,
        actor_id: i32,
        project_id: i32,
        update: &ProjectUpdate,
        repo: &impl Repository,
    ) -> Result<Project, ProjectError> {
        authorize_project(actor_id, project_id, ProjectOperation::Manage, repo).await?;

        let updated = repo
            .update_project(project_id, update)
            .await
            .context("updating project")?
            .ok_or(ProjectError::NotFound)?;

        activity::log_activity(
            actor_id,
            ActivityAction::Updated,
            ActivityTarget::Project,
            Some(project_id),
            repo,
        )
        .await;

        Ok(updated)
    }

    async fn update_progress(
        &self,
        actor_id: i32,
        project_id: i32,
        progress: Option<u8>,
        repo: &impl Repository,
    ) -> Result<u8, ProjectError> {
        authorize_project(actor_id, project_id, ProjectOperation::UpdateProgress, repo).await?;
        let Some(progress) = progress else {
            return Err(ProjectError::NoUpdatableFields);
        };

        let update = ProjectUpdate {
            progress: Some(progress),
            ..ProjectUpdate::default()
        };
        repo.update_project(project_id, &update)
            .await
            .context("patching project progress")?
            .ok_or(ProjectError::NotFound)?;

        activity::log_activity(
            actor_id,
            ActivityAction::UpdatedProgressOn,
            ActivityTarget::Project,
            Some(project_id),
            repo,
        )
        .await;

        Ok(progress)
    }

    async fn delete_project(
        &self,
        actor_id: i32,
        project_id: i32,
        repo: &impl Repository,
    ) -> Result<(), ProjectError> {
        authorize_project(actor_id, project_id, ProjectOperation::Manage, repo).await?;

        repo.delete_project(project_id)
            .await
            .context("deleting project")?
            .ok_or(ProjectError::NotFound)?;
        info!(actor_id, project_id, "Project deleted");

        activity::log_activity(
            actor_id,
            ActivityAction::Deleted,
            ActivityTarget::Project,
            Some(project_id),
            repo,
        )
        .await;

        Ok(())
    }

    async fn restore_project(
        &self,
        actor_id: i32,
        project_id: i32,
        repo: &impl Repository,
    ) -> Result<Project, ProjectError> {
        let Some(tombstone) = repo
            .deleted_project(project_id)
            .await
            .context("looking up deleted project")?
        else {
            return Err(ProjectError::NotFound);
        };
        if tombstone.entity.user_id != actor_id {
            warn!(actor_id, project_id, "Project restore denied");
            return Err(ProjectError::NotAuthorized);
        }

        let restored = repo
            .restore_project(project_id)
            .await
            .context("restoring project")?
            .ok_or(ProjectError::NotFound)?;
        info!(actor_id, project_id, "Project restored");

        activity::log_activity(
            actor_id,
            ActivityAction::Restored,
            ActivityTarget::Project,
            Some(project_id),
            repo,
        )
        .await;

        Ok(restored)
    }

    async fn members(
        &self,
        actor_id: i32,
        project_id: i32,
        repo: &impl Repository,
    ) -> Result<Vec<User>, ProjectError> {
        authorize_project(actor_id, project_id, ProjectOperation::Read, repo).await?;

        let member_ids = repo
            .member_ids(project_id)
            .await
            .context("listing project members")?;
        let mut members = Vec::with_capacity(member_ids.len());
        for member_id in member_ids {
            if let Some(user) = repo
                .user_by_id(member_id)
                .await
                .context("looking up project member")?
            {
                members.push(user);
            }
        }

        Ok(members)
    }

    async fn add_member(
        &self,
        actor_id: i32,
        project_id: i32,
        invitee_email: &str,
        repo: &impl Repository,
    ) -> Result<User, ProjectError> {
        authorize_project(actor_id, project_id, ProjectOperation::Manage, repo).await?;

        let Some(invitee) = repo
            .user_by_email(invitee_email)
            .await
            .context("looking up invitee")?
        else {
            return Err(ProjectError::InviteeNotFound);
        };
        repo.add_member(project_id, invitee.id)
            .await
            .context("adding project member")?;
        info!(actor_id, project_id, member_id = invitee.id, "Member added to project");

        activity::log_activity(
            actor_id,
            ActivityAction::Invited,
            ActivityTarget::User,
            Some(invitee.id),
            repo,
        )
        .await;
        activity::log_activity(
            invitee.id,
            ActivityAction::AddedTo,
            ActivityTarget::Project,
            Some(project_id),
            repo,
        )
        .await;

        Ok(invitee)
    }

    async fn remove_member(
        &self,
        actor_id: i32,
        project_id: i32,
        member_id: i32,
        repo: &impl Repository,
    ) -> Result<(), ProjectError> {
        authorize_project(actor_id, project_id, ProjectOperation::Manage, repo).await?;

        repo.remove_member(project_id, member_id)
            .await
            .context("removing project member")?;

        activity::log_activity(
            actor_id,
            ActivityAction::Removed,
            ActivityTarget::User,
            Some(member_id),
            repo,
        )
        .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::driving_ports::ProjectPort;
    use super::*;
    use crate::domain::activity::driven_ports::ActivityReader;
    use crate::domain::project::driven_ports::{MembershipReader, ProjectReader};
    use crate::domain::user::driven_ports::UserWriter;
    use crate::domain::user::CreateUser;
    use crate::persistence::InMemoryStore;
    use speculoos::prelude::*;

    const OWNER: i32 = 1;
    const MEMBER: i32 = 2;
    const OUTSIDER: i32 = 3;

    async fn store_with_users() -> InMemoryStore {
        let store = InMemoryStore::new();
        for name in ["owner", "member", "outsider"] {
            store
                .create_user(&CreateUser {
                    username: name.to_owned(),
                    email: format!("{name}@example.com"),
                    password_hash: "not-a-real-hash".to_owned(),
                    name: name.to_owned(),
                })
                .await
                .expect("user creation should work")
                .expect("test users are distinct");
        }

        store
    }

    fn new_project(progress: Option<u8>) -> NewProject {
        NewProject {
            title: "Launch".to_owned(),
            description: Some("Ship the thing".to_owned()),
            due_date: Some("2024-12-31".to_owned()),
            progress,
        }
    }

    /// Store with one project owned by [OWNER] that [MEMBER] belongs to
    async fn store_with_shared_project() -> InMemoryStore {
        let store = store_with_users().await;
        let service = ProjectService {};
        service
            .create_project(OWNER, &new_project(None), &store)
            .await
            .expect("project creation should work");
        service
            .add_member(OWNER, 1, "member@example.com", &store)
            .await
            .expect("adding member should work");

        store
    }

    mod create_project {
        use super::*;

        #[tokio::test]
        async fn defaults_to_in_progress() {
            let store = store_with_users().await;

            let created = ProjectService {}
                .create_project(OWNER, &new_project(None), &store)
                .await;
            assert_that!(created).is_ok().matches(|project| {
                project.id == 1
                    && project.user_id == OWNER
                    && project.progress == 0
                    && project.status == ProjectStatus::InProgress
            });
        }

        #[tokio::test]
        async fn fully_done_project_starts_completed() {
            let store = store_with_users().await;

            let created = ProjectService {}
                .create_project(OWNER, &new_project(Some(100)), &store)
                .await;
            assert_that!(created)
                .is_ok()
                .matches(|project| project.status == ProjectStatus::Completed);
        }

        #[tokio::test]
        async fn records_activity() {
            let store = store_with_users().await;
            ProjectService {}
                .create_project(OWNER, &new_project(None), &store)
                .await
                .expect("project creation should work");

            let feed = store.recent_for_user(OWNER, 10).await;
            assert_that!(feed).is_ok().matches(|entries| {
                matches!(entries.as_slice(), [activity::Activity {
                    action: ActivityAction::Created,
                    target: ActivityTarget::Project,
                    target_id: Some(1),
                    ..
                }])
            });
        }
    }

    mod project_for_user {
        use super::*;

        #[tokio::test]
        async fn owner_and_member_can_read() {
            let store = store_with_shared_project().await;
            let service = ProjectService {};

            assert_that!(service.project_for_user(OWNER, 1, &store).await).is_ok();
            assert_that!(service.project_for_user(MEMBER, 1, &store).await).is_ok();
        }

        #[tokio::test]
        async fn outsider_gets_not_found() {
            let store = store_with_shared_project().await;

            let read = ProjectService {}.project_for_user(OUTSIDER, 1, &store).await;
            let Err(ProjectError::NotFound) = read else {
                panic!("Expected project to be invisible, got {read:#?}");
            };
        }

        #[tokio::test]
        async fn list_includes_owned_and_shared() {
            let store = store_with_shared_project().await;
            let service = ProjectService {};

            assert_that!(service.projects_for_user(MEMBER, &store).await)
                .is_ok()
                .has_length(1);
            assert_that!(service.projects_for_user(OUTSIDER, &store).await)
                .is_ok()
                .is_empty();
        }
    }

    mod update_project {
        use super::*;

        fn rename() -> ProjectUpdate {
            ProjectUpdate {
                title: Some("Relaunch".to_owned()),
                description: Some(None),
                ..ProjectUpdate::default()
            }
        }

        #[tokio::test]
        async fn owner_can_update() {
            let store = store_with_shared_project().await;

            let updated = ProjectService {}
                .update_project(OWNER, 1, &rename(), &store)
                .await;
            assert_that!(updated).is_ok().matches(|project| {
                project.title == "Relaunch"
                    && project.description.is_none()
                    && project.due_date.as_deref() == Some("2024-12-31")
            });
        }

        #[tokio::test]
        async fn member_is_forbidden() {
            let store = store_with_shared_project().await;

            let updated = ProjectService {}
                .update_project(MEMBER, 1, &rename(), &store)
                .await;
            let Err(ProjectError::NotAuthorized) = updated else {
                panic!("Expected member to be refused, got {updated:#?}");
            };
        }

        #[tokio::test]
        async fn missing_project_is_not_found() {
            let store = store_with_users().await;

            let updated = ProjectService {}
                .update_project(OWNER, 42, &rename(), &store)
                .await;
            let Err(ProjectError::NotFound) = updated else {
                panic!("Expected not found, got {updated:#?}");
            };
        }
    }

    mod update_progress {
        use super::*;

        #[tokio::test]
        async fn member_can_patch_progress() {
            let store = store_with_shared_project().await;
            let service = ProjectService {};

            let patched = service.update_progress(MEMBER, 1, Some(60), &store).await;
            assert_that!(patched).is_ok().is_equal_to(60u8);
            assert_that!(service.project_for_user(OWNER, 1, &store).await)
                .is_ok()
                .matches(|project| project.progress == 60);
        }

        #[tokio::test]
        async fn missing_progress_is_rejected() {
            let store = store_with_shared_project().await;

            let patched = ProjectService {}.update_progress(OWNER, 1, None, &store).await;
            let Err(ProjectError::NoUpdatableFields) = patched else {
                panic!("Expected field rejection, got {patched:#?}");
            };
        }

        #[tokio::test]
        async fn outsider_is_forbidden() {
            let store = store_with_shared_project().await;

            let patched = ProjectService {}
                .update_progress(OUTSIDER, 1, Some(10), &store)
                .await;
            let Err(ProjectError::NotAuthorized) = patched else {
                panic!("Expected outsider to be refused, got {patched:#?}");
            };
        }
    }

    mod delete_and_restore {
        use super::*;

        #[tokio::test]
        async fn restore_gives_back_identical_project() {
            let store = store_with_shared_project().await;
            let service = ProjectService {};
            let before = service
                .project_for_user(OWNER, 1, &store)
                .await
                .expect("project should exist");

            assert_that!(service.delete_project(OWNER, 1, &store).await).is_ok();
            assert_that!(service.project_for_user(OWNER, 1, &store).await).is_err();

            let restored = service.restore_project(OWNER, 1, &store).await;
            assert_that!(restored).is_ok().is_equal_to(before);
        }

        #[tokio::test]
        async fn member_cannot_delete() {
            let store = store_with_shared_project().await;

            let deleted = ProjectService {}.delete_project(MEMBER, 1, &store).await;
            let Err(ProjectError::NotAuthorized) = deleted else {
                panic!("Expected member to be refused, got {deleted:#?}");
            };
        }

        #[tokio::test]
        async fn non_owner_restore_leaves_project_deleted() {
            let store = store_with_shared_project().await;
            let service = ProjectService {};
            service
                .delete_project(OWNER, 1, &store)
                .await
                .expect("delete should work");

            let restored = service.restore_project(MEMBER, 1, &store).await;
            let Err(ProjectError::NotAuthorized) = restored else {
                panic!("Expected member to be refused, got {restored:#?}");
            };
            assert_that!(store.deleted_project(1).await).is_ok().is_some();
        }

        #[tokio::test]
        async fn restoring_unknown_project_is_not_found() {
            let store = store_with_users().await;

            let restored = ProjectService {}.restore_project(OWNER, 9, &store).await;
            let Err(ProjectError::NotFound) = restored else {
                panic!("Expected not found, got {restored:#?}");
            };
        }
    }

    mod membership {
        use super::*;

        #[tokio::test]
        async fn add_and_list_members() {
            let store = store_with_shared_project().await;

            let members = ProjectService {}.members(MEMBER, 1, &store).await;
            assert_that!(members).is_ok().matches(|users| {
                matches!(users.as_slice(), [User { id: MEMBER, .. }])
            });
        }

        #[tokio::test]
        async fn unknown_invitee_is_reported() {
            let store = store_with_shared_project().await;

            let added = ProjectService {}
                .add_member(OWNER, 1, "nobody@example.com", &store)
                .await;
            let Err(ProjectError::InviteeNotFound) = added else {
                panic!("Expected unknown invitee, got {added:#?}");
            };
        }

        #[tokio::test]
        async fn member_cannot_invite() {
            let store = store_with_shared_project().await;

            let added = ProjectService {}
                .add_member(MEMBER, 1, "outsider@example.com", &store)
                .await;
            let Err(ProjectError::NotAuthorized) = added else {
                panic!("Expected member to be refused, got {added:#?}");
            };
        }

        #[tokio::test]
        async fn invite_is_logged_for_both_sides() {
            let store = store_with_shared_project().await;

            assert_that!(store.recent_for_user(MEMBER, 10).await)
                .is_ok()
                .matches(|entries| {
                    entries.iter().any(|entry| {
                        entry.action == ActivityAction::AddedTo && entry.target_id == Some(1)
                    })
                });
            assert_that!(store.recent_for_user(OWNER, 10).await)
                .is_ok()
                .matches(|entries| {
                    entries.iter().any(|entry| {
                        entry.action == ActivityAction::Invited && entry.target_id == Some(MEMBER)
                    })
                });
        }

        #[tokio::test]
        async fn owner_can_remove_member() {
            let store = store_with_shared_project().await;

            assert_that!(ProjectService {}.remove_member(OWNER, 1, MEMBER, &store).await).is_ok();
            assert_that!(store.is_member(1, MEMBER).await).is_ok().is_equal_to(false);
        }
    }

    #[tokio::test]
    async fn port_failure_is_reported() {
        let store = InMemoryStore::disconnected();

        let created = ProjectService {}
            .create_project(OWNER, &new_project(None), &store)
            .await;
        assert_that!(created)
            .is_err()
            .matches(|err| matches!(err, ProjectError::PortError(_)));
    }
}
