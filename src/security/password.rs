//! Password hashing and verification using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use once_cell::sync::Lazy;

use crate::error::AppError;

/// Hash checked when no account matches, so an unknown email costs the same
/// Argon2 work as a wrong password.
static DECOY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("hnetdb-decoy").ok());

/// Hashes a password with a random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// Verifies a password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "password verification failed: {}",
            e
        ))),
    }
}

/// Runs a verification against the decoy hash and discards the result.
pub fn verify_decoy(password: &str) {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// Whether [`verify_decoy`] has run at least once in this process.
#[cfg(test)]
pub(crate) fn decoy_used() -> bool {
    Lazy::get(&DECOY_HASH).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_roundtrip() {
        let hash = hash_password("s3cr3t").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cr3t", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("s3cr3t").unwrap();
        let b = hash_password("s3cr3t").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_plaintext_is_not_a_hash() {
        assert!(verify_password("s3cr3t", "s3cr3t").is_err());
    }

    #[test]
    fn test_decoy_costs_like_a_real_hash() {
        verify_decoy("anything");
        let decoy = DECOY_HASH.as_deref().unwrap();
        let real = hash_password("s3cr3t").unwrap();

        let params = |hash: &str| {
            let parsed = PasswordHash::new(hash).unwrap();
            (parsed.algorithm.to_string(), parsed.params.to_string())
        };
        assert_eq!(params(decoy), params(&real));
        assert!(decoy_used());
    }
}
