use crate::domain;
use crate::domain::project::ProjectStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a returned project on the API
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct Project {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Website relaunch")]
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// Completion percentage, 0 through 100
    #[schema(example = 25)]
    pub progress: u8,
    #[schema(example = "2024-12-31")]
    pub due_date: Option<String>,
    /// The owner
    pub user_id: i32,
}

impl From<domain::project::Project> for Project {
    fn from(value: domain::project::Project) -> Self {
        Project {
            id: value.id,
            title: value.title,
            description: value.description,
            status: value.status,
            progress: value.progress,
            due_date: value.due_date,
            user_id: value.user_id,
        }
    }
}

/// DTO for creating a project
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewProject {
    #[validate(length(min = 1))]
    #[schema(example = "Website relaunch")]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    #[validate(range(max = 100))]
    pub progress: Option<u8>,
}

impl From<NewProject> for domain::project::NewProject {
    fn from(value: NewProject) -> Self {
        domain::project::NewProject {
            title: value.title,
            description: value.description,
            due_date: value.due_date,
            progress: value.progress,
        }
    }
}

/// DTO for partially updating a project as its owner
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize, Default))]
pub struct ProjectUpdate {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    #[validate(range(max = 100))]
    pub progress: Option<u8>,
    #[serde(
        default,
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub due_date: Option<Option<String>>,
}

impl From<ProjectUpdate> for domain::project::ProjectUpdate {
    fn from(value: ProjectUpdate) -> Self {
        domain::project::ProjectUpdate {
            title: value.title,
            description: value.description,
            status: value.status,
            progress: value.progress,
            due_date: value.due_date,
        }
    }
}

/// DTO for the progress-only PATCH members may send. Any field besides `progress` makes the
/// request invalid.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct ProgressPatch {
    #[validate(range(max = 100))]
    #[schema(example = 60)]
    pub progress: Option<u8>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub other_fields: BTreeMap<String, Value>,
}

impl ProgressPatch {
    /// The progress to write, or [None] if the patch touches anything else
    pub fn progress_only(&self) -> Option<u8> {
        if self.other_fields.is_empty() {
            self.progress
        } else {
            None
        }
    }
}

/// DTO returned after patching progress
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct ProgressUpdated {
    pub success: bool,
    #[schema(example = 60)]
    pub progress: u8,
}

/// DTO returned after deleting a project
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct ProjectDeleted {
    #[schema(example = "Project deleted successfully")]
    pub message: String,
    pub project_id: i32,
}

/// DTO returned after undoing a project deletion
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct ProjectRestored {
    #[schema(example = "Project restored successfully")]
    pub message: String,
    pub project: Project,
}

/// DTO for inviting a registered user into a project
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewMember {
    #[validate(email)]
    #[schema(example = "jane@example.com")]
    pub invitee_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn progress_patch_rejects_extra_fields() {
        let only_progress: ProgressPatch =
            serde_json::from_str(r#"{"progress": 40}"#).expect("patch should parse");
        let with_title: ProgressPatch =
            serde_json::from_str(r#"{"progress": 40, "title": "Sneaky"}"#)
                .expect("patch should parse");
        let empty: ProgressPatch = serde_json::from_str("{}").expect("patch should parse");

        assert_that!(only_progress.progress_only()).is_equal_to(Some(40u8));
        assert_that!(with_title.progress_only()).is_none();
        assert_that!(empty.progress_only()).is_none();
    }

    #[test]
    fn progress_over_100_is_invalid() {
        let patch: ProgressPatch =
            serde_json::from_str(r#"{"progress": 150}"#).expect("patch should parse");

        assert!(patch.validate().is_err());
    }
}
