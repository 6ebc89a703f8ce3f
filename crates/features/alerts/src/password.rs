use crate::error::AlertsError;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};

/// Hashes `password` into an Argon2id PHC string with a fresh random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, AlertsError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AlertsError::Internal {
            message: e.to_string().into(),
            context: Some("Hashing password".into()),
        })
}

/// Runs [`hash_password`] on the blocking pool so Argon2 does not stall the executor.
pub(crate) async fn hash_password_blocking(password: String) -> Result<String, AlertsError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await.map_err(|e| {
        AlertsError::Internal {
            message: e.to_string().into(),
            context: Some("Hashing password".into()),
        }
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    #[test]
    fn hash_verifies_and_hides_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("correct horse"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[tokio::test]
    async fn blocking_hash_runs_off_the_executor() {
        let hash = hash_password_blocking("correct horse".to_owned()).await.unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
    }
}
