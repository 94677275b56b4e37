//! End-to-end tests for the auth endpoints against an in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, test, web};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pv_api::app::create_app;
use pv_api::routes::auth::AppState;
use pv_core::domain::entities::session::{RevocationReason, Session};
use pv_core::domain::entities::token::RefreshTokenRecord;
use pv_core::domain::entities::user::UserIdentity;
use pv_core::errors::{DomainError, TokenError};
use pv_core::repositories::audit::NoOpAuditLogRepository;
use pv_core::repositories::session::SessionRepository;
use pv_core::repositories::token::RefreshTokenRepository;
use pv_core::repositories::user::UserDirectory;
use pv_core::services::auth::AuthService;
use pv_core::services::rotation::{RotationConfig, RotationService};
use pv_core::services::session::{SessionService, SessionServiceConfig};
use pv_core::services::token::{TokenService, TokenServiceConfig};

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, Session>,
    tokens: HashMap<Uuid, RefreshTokenRecord>,
}

/// In-memory store backing both repository traits for the test server
#[derive(Clone, Default)]
struct TestStore {
    inner: Arc<Mutex<Inner>>,
}

#[async_trait]
impl SessionRepository for TestStore {
    async fn insert(&self, session: Session) -> Result<Session, DomainError> {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        Ok(self.inner.lock().unwrap().sessions.get(&session_id).cloned())
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<bool, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let newly_revoked = match inner.sessions.get_mut(&session_id) {
            Some(session) if !session.revoked => {
                session.revoke(reason);
                true
            }
            _ => false,
        };
        inner.tokens.retain(|_, t| t.session_id != session_id);
        Ok(newly_revoked)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let mut revoked = Vec::new();
        for session in inner.sessions.values_mut() {
            if session.user_id == user_id && !session.revoked {
                session.revoke(reason);
                revoked.push(session.id);
            }
        }
        inner.tokens.retain(|_, t| !revoked.contains(&t.session_id));
        Ok(revoked.len())
    }

    async fn touch_activity(&self, session_id: Uuid) -> Result<(), DomainError> {
        if let Some(session) = self.inner.lock().unwrap().sessions.get_mut(&session_id) {
            session.touch();
        }
        Ok(())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.sessions.len();
        let expired: Vec<Uuid> = inner
            .sessions
            .values()
            .filter(|s| s.expires_at < cutoff)
            .map(|s| s.id)
            .collect();
        inner.sessions.retain(|id, _| !expired.contains(id));
        inner.tokens.retain(|_, t| !expired.contains(&t.session_id));
        Ok(before - inner.sessions.len())
    }
}

#[async_trait]
impl RefreshTokenRepository for TestStore {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_live(&self, now: DateTime<Utc>) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tokens
            .values()
            .filter(|t| t.used_at.is_none() && t.expires_at > now)
            .cloned()
            .collect())
    }

    async fn find_used(&self) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tokens
            .values()
            .filter(|t| t.used_at.is_some())
            .cloned()
            .collect())
    }

    async fn rotate(
        &self,
        parent_id: Uuid,
        child: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.tokens.get_mut(&parent_id) {
            Some(parent) if parent.used_at.is_none() => {
                parent.used_at = Some(Utc::now());
            }
            _ => return Err(DomainError::Token(TokenError::TokenAlreadyUsed)),
        }
        inner.tokens.insert(child.id, child.clone());
        Ok(child)
    }

    async fn delete_for_session(&self, session_id: Uuid) -> Result<usize, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.tokens.len();
        inner.tokens.retain(|_, t| t.session_id != session_id);
        Ok(before - inner.tokens.len())
    }

    async fn find_by_family(&self, family: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tokens
            .values()
            .filter(|t| t.token_family == family)
            .cloned()
            .collect())
    }
}

/// Single-account directory for the test server
struct TestDirectory {
    user: UserIdentity,
    password: String,
}

#[async_trait]
impl UserDirectory for TestDirectory {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        Ok((self.user.email == email && self.password == password)
            .then(|| self.user.clone()))
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserIdentity>, DomainError> {
        Ok((self.user.id == user_id).then(|| self.user.clone()))
    }
}

type TestAppState = AppState<TestDirectory, TestStore, TestStore, NoOpAuditLogRepository>;

fn build_state() -> (web::Data<TestAppState>, Arc<TokenService>) {
    let store = TestStore::default();
    let directory = Arc::new(TestDirectory {
        user: UserIdentity::new(Uuid::new_v4(), "alice@example.com", Some("member".to_string())),
        password: "hunter2".to_string(),
    });

    let token_service = Arc::new(
        TokenService::new(TokenServiceConfig {
            hash_memory_kib: 8,
            hash_time_cost: 1,
            hash_parallelism: 1,
            ..Default::default()
        })
        .unwrap(),
    );

    let session_service = Arc::new(SessionService::new(
        Arc::new(store.clone()),
        SessionServiceConfig::default(),
    ));
    let rotation_service = Arc::new(RotationService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::clone(&directory),
        Arc::clone(&token_service),
        RotationConfig::default(),
    ));
    let auth_service = Arc::new(AuthService::new(
        directory,
        session_service,
        rotation_service,
        Arc::clone(&token_service),
    ));

    (web::Data::new(AppState { auth_service }), token_service)
}

fn login_body() -> serde_json::Value {
    serde_json::json!({ "email": "alice@example.com", "password": "hunter2" })
}

#[actix_web::test]
async fn test_login_returns_tokens() {
    let (state, token_service) = build_state();
    let app = test::init_service(create_app(state, token_service)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(login_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["access_token"].as_str().unwrap().contains('.'));
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(body["expires_in"], 600);
}

#[actix_web::test]
async fn test_login_with_bad_password_is_401() {
    let (state, token_service) = build_state();
    let app = test::init_service(create_app(state, token_service)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(serde_json::json!({ "email": "alice@example.com", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_rotates_and_replay_is_rejected() {
    let (state, token_service) = build_state();
    let app = test::init_service(create_app(state, token_service)).await;

    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(login_body())
        .to_request();
    let tokens: serde_json::Value =
        test::read_body_json(test::call_service(&app, login).await).await;
    let refresh1 = tokens["refresh_token"].as_str().unwrap().to_string();

    // First rotation succeeds with a fresh secret
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": refresh1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rotated: serde_json::Value = test::read_body_json(resp).await;
    let refresh2 = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(refresh1, refresh2);

    // Replaying the consumed secret is rejected
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": refresh1 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // The replay killed the session, so the fresh secret is dead too
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": refresh2 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_logout_revokes_session_and_is_idempotent() {
    let (state, token_service) = build_state();
    let app = test::init_service(create_app(state, token_service)).await;

    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(login_body())
        .to_request();
    let tokens: serde_json::Value =
        test::read_body_json(test::call_service(&app, login).await).await;
    let access = tokens["access_token"].as_str().unwrap().to_string();
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    // The session's refresh chain died with it
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": refresh }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_logout_without_token_is_401() {
    let (state, token_service) = build_state();
    let app = test::init_service(create_app(state, token_service)).await;

    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
