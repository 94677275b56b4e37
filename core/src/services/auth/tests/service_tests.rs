//! Unit tests for the authentication service

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::audit::AuditEventType;
use crate::domain::entities::session::RevocationReason;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::audit::{AuditLogRepository, MockAuditLogRepository};
use crate::repositories::mock::InMemoryAuthStore;
use crate::repositories::token::RefreshTokenRepository;
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::auth::AuthService;
use crate::services::rotation::{RotationConfig, RotationService};
use crate::services::session::{SessionService, SessionServiceConfig};
use crate::services::token::{TokenService, TokenServiceConfig};

use super::mocks::MockUserDirectory;

type TestAuthService =
    AuthService<MockUserDirectory, InMemoryAuthStore, InMemoryAuthStore, MockAuditLogRepository>;

struct Harness {
    store: InMemoryAuthStore,
    users: Arc<MockUserDirectory>,
    audit: Arc<MockAuditLogRepository>,
    auth: TestAuthService,
}

fn harness() -> Harness {
    let store = InMemoryAuthStore::new();
    let users = Arc::new(MockUserDirectory::new());
    let audit = Arc::new(MockAuditLogRepository::new());
    let token_service =
        Arc::new(TokenService::new(TokenServiceConfig::for_testing()).unwrap());
    let audit_service = Arc::new(AuditService::new(
        Arc::clone(&audit),
        AuditServiceConfig { async_writes: false },
    ));

    let session_service = Arc::new(SessionService::new(
        Arc::new(store.clone()),
        SessionServiceConfig::default(),
    ));
    let rotation_service = Arc::new(RotationService::with_audit(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::clone(&users),
        Arc::clone(&token_service),
        Arc::clone(&audit_service),
        RotationConfig::default(),
    ));

    let auth = AuthService::with_audit(
        Arc::clone(&users),
        session_service,
        rotation_service,
        token_service,
        audit_service,
    );

    Harness {
        store,
        users,
        audit,
        auth,
    }
}

#[tokio::test]
async fn test_login_returns_token_pair() {
    let h = harness();
    let user = h.users.add_account("alice@example.com", "hunter2", true);

    let response = h
        .auth
        .login("alice@example.com", "hunter2", Some("10.0.0.1".to_string()), None)
        .await
        .unwrap();

    assert!(!response.access_token.is_empty());
    assert!(!response.refresh_token.is_empty());
    assert_eq!(h.store.session_count(), 1);
    assert_eq!(h.store.token_count(), 1);
    assert_eq!(h.audit.count_of(AuditEventType::LoginSuccess), 1);

    let entries = h.audit.find_by_subject(user.id, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_login_with_wrong_password_writes_nothing() {
    let h = harness();
    h.users.add_account("alice@example.com", "hunter2", true);

    let result = h
        .auth
        .login("alice@example.com", "wrong", None, None)
        .await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Auth(AuthError::InvalidCredentials)
    ));
    assert_eq!(h.store.session_count(), 0);
    assert_eq!(h.store.token_count(), 0);
    assert_eq!(h.audit.count_of(AuditEventType::LoginFailure), 1);
}

#[tokio::test]
async fn test_login_with_unknown_email_fails() {
    let h = harness();

    let result = h.auth.login("nobody@example.com", "pw", None, None).await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Auth(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_login_with_inactive_account_fails() {
    let h = harness();
    h.users.add_account("bob@example.com", "hunter2", false);

    let result = h.auth.login("bob@example.com", "hunter2", None, None).await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Auth(AuthError::AccountInactive)
    ));
    assert_eq!(h.store.session_count(), 0);
}

#[tokio::test]
async fn test_login_refresh_logout_flow() {
    let h = harness();
    let user = h.users.add_account("alice@example.com", "hunter2", true);

    let login = h
        .auth
        .login("alice@example.com", "hunter2", None, None)
        .await
        .unwrap();

    let refreshed = h.auth.refresh(&login.refresh_token).await.unwrap();
    assert_ne!(refreshed.refresh_token, login.refresh_token);

    let session_id = h.store.find_used().await.unwrap()[0].session_id;

    h.auth.logout(user.id, session_id).await.unwrap();

    let result = h.auth.refresh(&refreshed.refresh_token).await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::InvalidRefreshToken)
    ));
    assert_eq!(h.audit.count_of(AuditEventType::Logout), 1);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = harness();
    let user = h.users.add_account("alice@example.com", "hunter2", true);
    h.auth
        .login("alice@example.com", "hunter2", None, None)
        .await
        .unwrap();

    let session_id = h.store.find_live(Utc::now()).await.unwrap()[0].session_id;

    h.auth.logout(user.id, session_id).await.unwrap();
    h.auth.logout(user.id, session_id).await.unwrap();

    let session = h.store.session(session_id).unwrap();
    assert_eq!(session.revocation_reason, Some(RevocationReason::UserLogout));
}

#[tokio::test]
async fn test_logout_of_unknown_session_succeeds() {
    let h = harness();
    let result = h.auth.logout(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_password_change_revokes_every_session() {
    let h = harness();
    let user = h.users.add_account("alice@example.com", "hunter2", true);

    // Two devices, two sessions
    let phone = h
        .auth
        .login("alice@example.com", "hunter2", None, Some("phone".to_string()))
        .await
        .unwrap();
    let laptop = h
        .auth
        .login("alice@example.com", "hunter2", None, Some("laptop".to_string()))
        .await
        .unwrap();

    let revoked = h
        .auth
        .revoke_all_sessions(user.id, RevocationReason::PasswordChange)
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    for secret in [&phone.refresh_token, &laptop.refresh_token] {
        let result = h.auth.refresh(secret).await;
        assert!(matches!(
            result.unwrap_err(),
            DomainError::Token(TokenError::InvalidRefreshToken)
        ));
    }
    assert_eq!(h.audit.count_of(AuditEventType::SessionsRevokedForUser), 1);
}
