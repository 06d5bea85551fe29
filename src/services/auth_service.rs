use super::user_service::name_from_email;
use super::UserService;
use crate::backend::{AuthBackend, Collection, DocumentStore, Filter, Session};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{UserDetails, OWNER_FIELD};
use futures::future::try_join_all;
use log::{info, warn};
use std::sync::Arc;

pub struct AuthService {
    auth: Arc<dyn AuthBackend>,
    store: Arc<dyn DocumentStore>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthBackend>, store: Arc<dyn DocumentStore>) -> Self {
        AuthService { auth, store }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<Session> {
        let email = required_email(email)?;
        let session = self.auth.sign_in(&email, password).await?;
        info!("event=sign_in uid={}", session.uid);
        Ok(session)
    }

    /// Creates the account and its profile document.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> ServiceResult<(Session, UserDetails)> {
        let email = required_email(email)?;
        if password != confirm {
            return Err(ServiceError::Validation("Passwords do not match."));
        }
        let session = self.auth.sign_up(&email, password).await?;
        let details = UserService::new(self.store.clone(), &session.uid)
            .ensure_details(&name_from_email(&email))
            .await?;
        info!("event=sign_up uid={}", session.uid);
        Ok((session, details))
    }

    pub async fn sign_out(&self) -> ServiceResult<()> {
        self.auth.sign_out().await?;
        info!("event=sign_out");
        Ok(())
    }

    pub async fn send_password_reset(&self, email: &str) -> ServiceResult<()> {
        let email = required_email(email)?;
        self.auth.send_password_reset(&email).await?;
        Ok(())
    }

    /// Removes everything the user owns, then the account itself.
    pub async fn delete_account(&self, session: &Session) -> ServiceResult<()> {
        let owner = [Filter::eq(OWNER_FIELD, session.uid.as_str())];
        let mut removed = 0;
        for collection in [Collection::ListItems, Collection::Lists, Collection::Tasks] {
            let docs = self.store.query(collection, &owner).await?;
            removed += docs.len();
            try_join_all(docs.iter().map(|doc| self.store.delete(collection, &doc.id))).await?;
        }
        self.store
            .delete(Collection::UserDetails, &session.uid)
            .await?;
        if let Err(err) = self.auth.delete_account().await {
            warn!("event=account_delete_failed uid={} err={}", session.uid, err);
            return Err(err.into());
        }
        info!(
            "event=account_delete uid={} documents={}",
            session.uid, removed
        );
        Ok(())
    }
}

fn required_email(email: &str) -> ServiceResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ServiceError::Validation("Please enter your email."));
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::SessionHandle;
    use crate::error::{AuthErrorCode, BackendError};
    use crate::models::NewTask;
    use crate::services::Workspace;

    fn setup() -> (AuthService, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new(Arc::new(SessionHandle::default())));
        (AuthService::new(backend.clone(), backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_sign_up_checks_confirmation_first() {
        let (auth, _) = setup();
        let result = auth.sign_up("ada@example.com", "secret1", "secret2").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        // nothing was registered, so signing in still fails
        let result = auth.sign_in("ada@example.com", "secret1").await;
        assert!(matches!(
            result,
            Err(ServiceError::Backend(BackendError::Auth(
                AuthErrorCode::UserNotFound
            )))
        ));
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile() {
        let (auth, backend) = setup();
        let (session, details) = auth
            .sign_up(" ada@example.com ", "secret1", "secret1")
            .await
            .unwrap();
        assert_eq!(details.name, "ada");
        assert_eq!(session.email, "ada@example.com");
        assert_eq!(backend.document_count(Collection::UserDetails), 1);
    }

    #[tokio::test]
    async fn test_empty_email_is_validation_error() {
        let (auth, _) = setup();
        assert!(matches!(
            auth.send_password_reset("  ").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_account_removes_owned_documents() {
        let (auth, backend) = setup();
        let (other, _) = auth
            .sign_up("bob@example.com", "secret1", "secret1")
            .await
            .unwrap();
        let bob = Workspace::new(backend.clone(), &other.uid);
        bob.tasks
            .create(NewTask {
                title: "Bob's".to_string(),
                ..NewTask::default()
            })
            .await
            .unwrap();

        let (session, _) = auth
            .sign_up("ada@example.com", "secret1", "secret1")
            .await
            .unwrap();
        let ada = Workspace::new(backend.clone(), &session.uid);
        let list = ada.lists.create_list("Trip").await.unwrap();
        ada.lists.add_item(&list.id, "passport").await.unwrap();
        ada.tasks
            .create(NewTask {
                title: "Pack".to_string(),
                ..NewTask::default()
            })
            .await
            .unwrap();

        auth.delete_account(&session).await.unwrap();

        assert_eq!(backend.document_count(Collection::ListItems), 0);
        assert_eq!(backend.document_count(Collection::Lists), 0);
        assert_eq!(backend.document_count(Collection::Tasks), 1);
        assert_eq!(backend.document_count(Collection::UserDetails), 1);
        assert!(auth.sign_in("ada@example.com", "secret1").await.is_err());
        assert!(auth.sign_in("bob@example.com", "secret1").await.is_ok());
    }
}
