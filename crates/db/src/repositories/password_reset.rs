//! Single-use password reset tokens.
//!
//! Only the SHA-256 hash of a token is stored; the raw value travels in the
//! reset email and is consumed on first successful use. Recovery grants
//! handed out after a verified link are kept in the same table under their
//! JWT id.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};
use thiserror::Error;
use uuid::Uuid;

use super::hash_token;
use crate::entities::password_reset_tokens;

/// Reset token lookup failures.
#[derive(Debug, Error)]
pub enum PasswordResetError {
    /// Unknown or already consumed token.
    #[error("Reset token is invalid or was already used")]
    Invalid,

    /// Token is past its expiry.
    #[error("Reset token has expired")]
    Expired,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Password reset token repository.
#[derive(Debug, Clone)]
pub struct PasswordResetRepository {
    db: DatabaseConnection,
}

impl PasswordResetRepository {
    /// Creates a new password reset repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates a URL-safe random token.
    #[must_use]
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        base64_url::encode(&bytes)
    }

    /// Issues a new token for a user, invalidating earlier ones.
    /// Returns the raw token to be mailed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_token(&self, user_id: Uuid, ttl_minutes: i64) -> Result<String, DbErr> {
        let raw_token = Self::generate_token();
        self.issue_token(user_id, &raw_token, ttl_minutes).await?;
        Ok(raw_token)
    }

    /// Records a caller-chosen single-use token, invalidating earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn issue_token(
        &self,
        user_id: Uuid,
        raw_token: &str,
        ttl_minutes: i64,
    ) -> Result<(), DbErr> {
        self.invalidate_user_tokens(user_id).await?;
        let now = Utc::now();

        password_reset_tokens::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            token_hash: Set(hash_token(raw_token)),
            expires_at: Set((now + Duration::minutes(ttl_minutes)).into()),
            used_at: Set(None),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        Ok(())
    }

    /// Marks a token used and returns its user.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for unknown or used tokens and `Expired` for stale ones.
    pub async fn consume_token(&self, raw_token: &str) -> Result<Uuid, PasswordResetError> {
        let token = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::TokenHash.eq(hash_token(raw_token)))
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(PasswordResetError::Invalid)?;

        let now = Utc::now();
        if token.expires_at < now {
            return Err(PasswordResetError::Expired);
        }

        // Guarded on used_at so two concurrent consumers cannot both win.
        let result = password_reset_tokens::Entity::update_many()
            .col_expr(password_reset_tokens::Column::UsedAt, Expr::value(now))
            .filter(password_reset_tokens::Column::Id.eq(token.id))
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(PasswordResetError::Invalid);
        }
        Ok(token.user_id)
    }

    /// Invalidates all outstanding tokens for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn invalidate_user_tokens(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let result = password_reset_tokens::Entity::update_many()
            .col_expr(password_reset_tokens::Column::UsedAt, Expr::value(Utc::now()))
            .filter(password_reset_tokens::Column::UserId.eq(user_id))
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Deletes expired tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn cleanup_expired(&self) -> Result<u64, DbErr> {
        let result = password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::ExpiresAt.lt(Utc::now()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_url_safe_and_distinct() {
        let first = PasswordResetRepository::generate_token();
        let second = PasswordResetRepository::generate_token();
        assert_ne!(first, second);
        assert_eq!(first.len(), 43);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
