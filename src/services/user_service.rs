use super::{non_empty, patch};
use crate::backend::{Collection, DocumentStore};
use crate::error::ServiceResult;
use crate::models::{Record, UserDetails, AVATARS};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Profile fields stored under the user's id.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    uid: String,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, uid: &str) -> Self {
        UserService {
            store,
            uid: uid.to_string(),
        }
    }

    pub async fn details(&self) -> ServiceResult<Option<UserDetails>> {
        match self.store.get(Collection::UserDetails, &self.uid).await? {
            Some(doc) => UserDetails::from_document(doc).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the stored details, creating them on first sign-in.
    pub async fn ensure_details(&self, default_name: &str) -> ServiceResult<UserDetails> {
        if let Some(details) = self.details().await? {
            return Ok(details);
        }
        let details = UserDetails {
            uid: self.uid.clone(),
            name: default_name.trim().to_string(),
            avatar: 0,
            created_at: Utc::now(),
        };
        self.store
            .set(Collection::UserDetails, &self.uid, details.to_fields()?)
            .await?;
        Ok(details)
    }

    pub async fn update_name(&self, name: &str) -> ServiceResult<String> {
        let name = non_empty(name, "Name cannot be empty.")?;
        self.store
            .update(Collection::UserDetails, &self.uid, patch([("name", json!(name))]))
            .await?;
        Ok(name)
    }

    pub async fn set_avatar(&self, avatar: usize) -> ServiceResult<usize> {
        let avatar = avatar % AVATARS.len();
        self.store
            .update(
                Collection::UserDetails,
                &self.uid,
                patch([("avatar", json!(avatar))]),
            )
            .await?;
        Ok(avatar)
    }
}

/// Display name derived from an email address.
pub fn name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::SessionHandle;

    fn service() -> UserService {
        let store: Arc<dyn DocumentStore> =
            Arc::new(MemoryBackend::new(Arc::new(SessionHandle::default())));
        UserService::new(store, "u1")
    }

    #[tokio::test]
    async fn test_ensure_details_creates_once() {
        let users = service();
        assert!(users.details().await.unwrap().is_none());

        let created = users.ensure_details("ada").await.unwrap();
        assert_eq!(created.name, "ada");
        assert_eq!(created.uid, "u1");

        users.update_name("Ada L.").await.unwrap();
        let again = users.ensure_details("ignored").await.unwrap();
        assert_eq!(again.name, "Ada L.");
        assert_eq!(again.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_avatar_wraps_into_range() {
        let users = service();
        users.ensure_details("ada").await.unwrap();
        assert_eq!(users.set_avatar(AVATARS.len()).await.unwrap(), 0);
        assert_eq!(users.set_avatar(2).await.unwrap(), 2);
        assert_eq!(users.details().await.unwrap().unwrap().avatar, 2);
    }

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email("grace@example.com"), "grace");
        assert_eq!(name_from_email("plain"), "plain");
    }
}
