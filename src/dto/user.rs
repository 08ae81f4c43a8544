use crate::domain;
use serde::Serialize;
use utoipa::ToSchema;

/// DTO for a user's public profile. Password hashes never leave the server.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, PartialEq, Eq, Debug))]
pub struct UserProfile {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "johndoe")]
    pub username: String,
}

impl From<domain::user::User> for UserProfile {
    fn from(value: domain::user::User) -> Self {
        UserProfile {
            id: value.id,
            name: value.name,
            email: value.email,
            username: value.username,
        }
    }
}
