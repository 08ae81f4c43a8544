use super::InMemoryStore;
use crate::domain;
use crate::domain::user::driven_ports::DuplicateUser;
use crate::domain::user::{CreateUser, User};
use anyhow::Context;

impl domain::user::driven_ports::DetectUser for InMemoryStore {
    async fn email_taken(&self, email: &str) -> Result<bool, anyhow::Error> {
        let tables = self.read().context("Detecting user with email")?;

        Ok(tables.users.values().any(|user| user.email == email))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, anyhow::Error> {
        let tables = self.read().context("Detecting user with username")?;

        Ok(tables.users.values().any(|user| user.username == username))
    }
}

impl domain::user::driven_ports::UserReader for InMemoryStore {
    async fn user_by_id(&self, id: i32) -> Result<Option<User>, anyhow::Error> {
        let tables = self.read().context("Fetching a user by id")?;

        Ok(tables.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let tables = self.read().context("Fetching a user by email")?;

        Ok(tables
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

impl domain::user::driven_ports::UserWriter for InMemoryStore {
    async fn create_user(
        &self,
        user: &CreateUser,
    ) -> Result<Result<User, DuplicateUser>, anyhow::Error> {
        let mut tables = self.write().context("Inserting new user")?;

        // Signup checks for duplicates first, but another signup may have landed in between
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Ok(Err(DuplicateUser::Email));
        }
        if tables
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Ok(Err(DuplicateUser::Username));
        }

        let id = tables.user_ids.next();
        let created = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            name: user.name.clone(),
        };
        tables.users.insert(id, created.clone());

        Ok(Ok(created))
    }
}
