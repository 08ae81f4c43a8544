use crate::domain::credentials;
use crate::domain::user::driving_ports::{LogInError, SignUpError};
use anyhow::Context;
use tracing::{error, info, warn};

/// A registered user. The password is only ever held as an Argon2 PHC string.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Signup data as received from a client
#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

/// A user ready to be persisted, with the password already hashed
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

pub mod driven_ports {
    use super::*;
    use thiserror::Error;

    /// The unique field a refused user insert collided on
    #[derive(PartialEq, Eq, Debug, Clone, Copy, Error)]
    pub enum DuplicateUser {
        #[error("email address already registered")]
        Email,
        #[error("username already registered")]
        Username,
    }

    pub trait UserReader {
        async fn user_by_id(&self, id: i32) -> Result<Option<User>, anyhow::Error>;
        async fn user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    }

    pub trait UserWriter {
        /// Inserts the user unless the email or username is already registered
        async fn create_user(
            &self,
            user: &CreateUser,
        ) -> Result<Result<User, DuplicateUser>, anyhow::Error>;
    }

    pub trait DetectUser {
        async fn email_taken(&self, email: &str) -> Result<bool, anyhow::Error>;
        async fn username_taken(&self, username: &str) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum SignUpError {
        #[error("The email address is already in use.")]
        EmailTaken,
        #[error("The username is already taken.")]
        UsernameTaken,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum LogInError {
        #[error("The email or password was incorrect.")]
        InvalidCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait UserPort {
        async fn sign_up(
            &self,
            new_user: &NewUser,
            u_detect: &impl driven_ports::DetectUser,
            u_write: &impl driven_ports::UserWriter,
        ) -> Result<User, SignUpError>;
        async fn log_in(
            &self,
            email: &str,
            password: &str,
            u_read: &impl driven_ports::UserReader,
        ) -> Result<User, LogInError>;
        async fn user_by_id(
            &self,
            user_id: i32,
            u_read: &impl driven_ports::UserReader,
        ) -> Result<Option<User>, anyhow::Error>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn sign_up(
        &self,
        new_user: &NewUser,
        u_detect: &impl driven_ports::DetectUser,
        u_write: &impl driven_ports::UserWriter,
    ) -> Result<User, SignUpError> {
        let email_taken = u_detect
            .email_taken(&new_user.email)
            .await
            .context("looking up email during signup")?;
        if email_taken {
            return Err(SignUpError::EmailTaken);
        }

        let username_taken = u_detect
            .username_taken(&new_user.username)
            .await
            .context("looking up username during signup")?;
        if username_taken {
            return Err(SignUpError::UsernameTaken);
        }

        let create = CreateUser {
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: credentials::hash_password(&new_user.password).await?,
            name: new_user.name.clone(),
        };
        let created = u_write
            .create_user(&create)
            .await
            .context("creating user at service level")?;

        match created {
            Ok(user) => {
                info!(user_id = user.id, "user signed up");
                Ok(user)
            }
            Err(duplicate) => {
                // Another signup with the same details landed after the checks above
                warn!("Signup lost a race: {duplicate}");
                Err(match duplicate {
                    driven_ports::DuplicateUser::Email => SignUpError::EmailTaken,
                    driven_ports::DuplicateUser::Username => SignUpError::UsernameTaken,
                })
            }
        }
    }

    async fn log_in(
        &self,
        email: &str,
        password: &str,
        u_read: &impl driven_ports::UserReader,
    ) -> Result<User, LogInError> {
        let Some(user) = u_read
            .user_by_email(email)
            .await
            .context("looking up user during login")?
        else {
            return Err(LogInError::InvalidCredentials);
        };

        if !credentials::verify_password(password, &user.password_hash).await? {
            return Err(LogInError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn user_by_id(
        &self,
        user_id: i32,
        u_read: &impl driven_ports::UserReader,
    ) -> Result<Option<User>, anyhow::Error> {
        let user_result = u_read.user_by_id(user_id).await;
        if let Err(ref port_err) = user_result {
            error!("User fetch failure: {port_err}");
        }

        user_result.context("fetching user by id")
    }
}
