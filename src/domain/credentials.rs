use anyhow::{Context, anyhow};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tokio::task;

/// Hashes a password into a PHC string (Argon2id with a random salt). Runs on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let password = password.to_owned();

    task::spawn_blocking(move || hash_blocking(&password))
        .await
        .context("password hashing task did not finish")?
}

/// Checks a password against a PHC string produced by [hash_password]. A malformed stored hash
/// is an error rather than a mismatch. Runs on the blocking pool.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool, anyhow::Error> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();

    task::spawn_blocking(move || verify_blocking(&password, &stored_hash))
        .await
        .context("password verification task did not finish")?
}

fn hash_blocking(password: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

fn verify_blocking(password: &str, stored_hash: &str) -> Result<bool, anyhow::Error> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|err| anyhow!("stored password hash is malformed: {err}"))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(anyhow!("failed to verify password: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn hashes_verify_against_original_password() {
        let hash = hash_password("password123").await.expect("hashing failed");

        assert_that!(hash.as_str()).starts_with("$argon2id$");
        assert_that!(verify_password("password123", &hash).await).is_ok_containing(true);
        assert_that!(verify_password("password124", &hash).await).is_ok_containing(false);
    }

    #[tokio::test]
    async fn same_password_gets_different_salts() {
        let first = hash_password("hunter22").await.expect("hashing failed");
        let second = hash_password("hunter22").await.expect("hashing failed");

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert_that!(verify_password("password123", "password123").await).is_err();
    }
}
