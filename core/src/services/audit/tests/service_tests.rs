//! Unit tests for the audit service

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::audit::AuditEventType;
use crate::domain::entities::session::RevocationReason;
use crate::repositories::audit::{AuditLogRepository, MockAuditLogRepository};
use crate::services::audit::{AuditService, AuditServiceConfig};

fn sync_service(repository: Arc<MockAuditLogRepository>) -> AuditService<MockAuditLogRepository> {
    AuditService::new(repository, AuditServiceConfig { async_writes: false })
}

#[tokio::test]
async fn test_login_events_recorded() {
    let repository = Arc::new(MockAuditLogRepository::new());
    let service = sync_service(Arc::clone(&repository));
    let user_id = Uuid::new_v4();
    let session_id = Uuid::new_v4();

    service
        .log_login_success(user_id, session_id, Some("10.0.0.1".to_string()), None)
        .await;
    service.log_login_failure("bob@example.com", None, None).await;

    assert_eq!(repository.count_of(AuditEventType::LoginSuccess), 1);
    assert_eq!(repository.count_of(AuditEventType::LoginFailure), 1);

    let entries = repository.find_by_subject(user_id, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].resource_id, Some(session_id));
}

#[tokio::test]
async fn test_login_failure_masks_email() {
    let repository = Arc::new(MockAuditLogRepository::new());
    let service = sync_service(Arc::clone(&repository));

    service.log_login_failure("bob@example.com", None, None).await;

    let entries = repository.entries();
    let metadata = entries[0].metadata.as_ref().unwrap();
    assert_eq!(metadata["email"], "b***@example.com");
}

#[tokio::test]
async fn test_reuse_event_carries_family() {
    let repository = Arc::new(MockAuditLogRepository::new());
    let service = sync_service(Arc::clone(&repository));
    let session_id = Uuid::new_v4();
    let family = Uuid::new_v4();

    service.log_reuse_detected(None, session_id, family).await;

    let entries = repository.entries();
    assert_eq!(entries[0].event_type, AuditEventType::TokenReuseDetected);
    assert_eq!(entries[0].resource_id, Some(session_id));
    assert_eq!(
        entries[0].metadata.as_ref().unwrap()["token_family"],
        serde_json::json!(family)
    );
}

#[tokio::test]
async fn test_revocation_reason_in_metadata() {
    let repository = Arc::new(MockAuditLogRepository::new());
    let service = sync_service(Arc::clone(&repository));

    service
        .log_sessions_revoked_for_user(Uuid::new_v4(), RevocationReason::PasswordChange, 2)
        .await;

    let entries = repository.entries();
    let metadata = entries[0].metadata.as_ref().unwrap();
    assert_eq!(metadata["reason"], "PASSWORD_CHANGE");
    assert_eq!(metadata["count"], 2);
}
