pub mod activity;
pub mod auth;
pub mod project;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Registers DTO schemas that no documented path references directly
#[derive(OpenApi)]
#[openapi(components(schemas(
    crate::routing_utils::BasicErrorResponse,
    crate::routing_utils::ExtraInfo,
    crate::routing_utils::ValidationErrorSchema,
    crate::domain::task::TaskStatus,
    crate::domain::task::TaskPriority,
    crate::domain::project::ProjectStatus,
    crate::domain::activity::ActivityAction,
    crate::domain::activity::ActivityTarget,
)))]
pub struct OpenApiSchemas;

/// Plain confirmation returned by mutations with nothing else to report
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct Message {
    #[schema(example = "Task deleted successfully")]
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message {
            message: message.into(),
        }
    }
}

/// Deserializes a field that distinguishes "absent" from "explicitly null". Use with
/// `#[serde(default)]` so an absent field becomes `None` and `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
