use crate::domain;
use crate::dto::user::UserProfile;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for logging in with email and password
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct LogIn {
    #[validate(email)]
    #[schema(example = "john@example.com")]
    pub email: String,
    #[validate(length(min = 6))]
    #[schema(example = "password123")]
    pub password: String,
}

/// DTO for registering a new account
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{username} <{email}>")]
#[cfg_attr(test, derive(Serialize, Clone))]
pub struct SignUp {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "johndoe")]
    pub username: String,
    #[validate(email)]
    #[schema(example = "john@example.com")]
    pub email: String,
    #[validate(length(min = 6))]
    #[schema(example = "password123")]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "John Doe")]
    pub name: String,
}

impl From<SignUp> for domain::user::NewUser {
    fn from(value: SignUp) -> Self {
        domain::user::NewUser {
            username: value.username,
            email: value.email,
            password: value.password,
            name: value.name,
        }
    }
}

/// DTO returned after a successful login or signup
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct AuthSuccess {
    #[schema(example = "Login successful")]
    pub message: String,
    /// Bearer token to send in the Authorization header of subsequent requests
    pub token: String,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_signup_data_gets_rejected() {
        let bad_signup = SignUp {
            username: String::new(),
            email: "not-an-email".to_owned(),
            password: "short".to_owned(),
            name: "John Doe".to_owned(),
        };

        let validation_result = bad_signup.validate();
        let Err(validation_errors) = validation_result else {
            panic!("Expected validation failure");
        };
        let field_validations = validation_errors.field_errors();
        assert!(field_validations.contains_key("username"));
        assert!(field_validations.contains_key("email"));
        assert!(field_validations.contains_key("password"));
        assert!(!field_validations.contains_key("name"));
    }

    #[test]
    fn login_requires_email_shape() {
        let login = LogIn {
            email: "john".to_owned(),
            password: "password123".to_owned(),
        };

        assert!(login.validate().is_err());
    }
}
