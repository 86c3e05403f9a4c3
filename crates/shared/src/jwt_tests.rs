//! Unit tests for JWT functionality.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{Claims, TokenKind};
use crate::jwt::{JwtConfig, JwtError, JwtService};

fn create_test_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        ..JwtConfig::default()
    })
}

#[test]
fn test_claims_new_sets_correct_fields() {
    let user_id = Uuid::new_v4();
    let startup_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let claims = Claims::new(user_id, Some(startup_id), TokenKind::Access, expires_at);

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.startup_id(), Some(startup_id));
    assert_eq!(claims.kind, TokenKind::Access);
    assert!(claims.iat <= Utc::now().timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
}

#[test]
fn test_access_token_round_trip() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();
    let startup_id = Uuid::new_v4();

    let token = service
        .generate_access_token(user_id, Some(startup_id))
        .unwrap();
    let claims = service.validate_kind(&token, TokenKind::Access).unwrap();

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.startup_id(), Some(startup_id));
}

#[test]
fn test_refresh_token_without_startup() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let token = service.generate_refresh_token(user_id, None).unwrap();
    let claims = service.validate_kind(&token, TokenKind::Refresh).unwrap();

    assert_eq!(claims.startup_id(), None);
}

#[test]
fn test_kind_mismatch_rejected() {
    let service = create_test_service();
    let token = service
        .generate_recovery_token(Uuid::new_v4(), Uuid::new_v4())
        .unwrap();

    let result = service.validate_kind(&token, TokenKind::Access);
    assert!(matches!(
        result,
        Err(JwtError::WrongKind {
            expected: TokenKind::Access,
            actual: TokenKind::Recovery
        })
    ));
}

#[test]
fn test_recovery_token_carries_grant_id() {
    let service = create_test_service();
    let grant = Uuid::new_v4();
    let token = service.generate_recovery_token(Uuid::new_v4(), grant).unwrap();

    let claims = service.validate_kind(&token, TokenKind::Recovery).unwrap();
    assert_eq!(claims.jti, grant);
}

#[test]
fn test_tokens_are_unique() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let first = service.generate_access_token(user_id, None).unwrap();
    let second = service.generate_access_token(user_id, None).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_other_secret_rejected() {
    let service = create_test_service();
    let other = JwtService::new(JwtConfig {
        secret: "another-secret".to_string(),
        ..JwtConfig::default()
    });

    let token = other.generate_access_token(Uuid::new_v4(), None).unwrap();
    assert!(matches!(
        service.validate_token(&token),
        Err(JwtError::DecodingError(_))
    ));
}

#[test]
fn test_expired_token() {
    let service = JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expires_minutes: -5,
        ..JwtConfig::default()
    });

    let token = service.generate_access_token(Uuid::new_v4(), None).unwrap();
    assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
}

#[test]
fn test_invalid_token() {
    let service = create_test_service();
    assert!(service.validate_token("invalid.token.here").is_err());
}

#[test]
fn test_expires_in_seconds() {
    let service = create_test_service();
    assert_eq!(service.access_token_expires_in(), 15 * 60);
    assert_eq!(service.refresh_token_expires_days(), 7);
}
