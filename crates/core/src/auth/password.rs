//! Argon2id password hashing and the password policy.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use runway_shared::AppError;

/// Shortest password accepted on reset.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Password errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Verification failed for a reason other than a mismatch.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password is shorter than the policy allows.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Minimum length.
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    Mismatch,
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } | PasswordError::Mismatch => {
                Self::Validation(err.to_string())
            }
            _ => Self::Internal(err.to_string()),
        }
    }
}

/// Checks a new password and its confirmation.
///
/// # Errors
///
/// Returns `TooShort` or `Mismatch`.
pub fn check_password_policy(password: &str, confirmation: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if password != confirmation {
        return Err(PasswordError::Mismatch);
    }
    Ok(())
}

/// Hashes a password into a PHC string.
///
/// # Errors
///
/// Returns `HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use runway_core::auth::hash_password;
///
/// let hash = hash_password("correct horse battery").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; only malformed hashes and internal failures
/// are errors.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("founder-pass-1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("founder-pass-1", &hash).unwrap());
        assert!(!verify_password("founder-pass-2", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert_eq!(
            verify_password("password", "not-a-phc-string"),
            Err(PasswordError::InvalidHash)
        );
    }

    #[test]
    fn test_policy() {
        assert!(check_password_policy("longenough", "longenough").is_ok());
        assert_eq!(
            check_password_policy("short", "short"),
            Err(PasswordError::TooShort { min: 8 })
        );
        assert_eq!(
            check_password_policy("longenough", "longenougH"),
            Err(PasswordError::Mismatch)
        );
    }
}
