//! Authentication building blocks: password hashing, the profile gate and
//! password-reset link parsing.

mod password;
pub mod profile;
pub mod reset;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, check_password_policy, hash_password, verify_password,
};
pub use profile::{MissingField, NextStep, ProfileStatus};
pub use reset::{
    CredentialVerifier, ResetCredential, ResetParams, ResetTokenError, resolve_candidates,
    resolve_user,
};
