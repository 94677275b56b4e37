//! Test doubles for the rotation engine

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::user::UserIdentity;
use crate::errors::DomainError;
use crate::repositories::user::UserDirectory;

/// Mock user directory backed by a map
pub struct MockUserDirectory {
    users: Mutex<HashMap<Uuid, UserIdentity>>,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn add(&self, user: UserIdentity) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn remove(&self, user_id: Uuid) {
        self.users.lock().unwrap().remove(&user_id);
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn verify_credentials(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        Ok(None)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserIdentity>, DomainError> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}
