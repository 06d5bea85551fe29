//! In-process backend used in demo mode and by tests.
//!
//! Follows the hosted services' observable rules (duplicate emails, weak
//! passwords, merge-on-update, missing-document errors) so services behave
//! the same against either implementation.

use super::{
    AuthBackend, Collection, DocumentStore, Fields, Filter, Session, SessionHandle,
    StoredDocument,
};
use crate::error::{AuthErrorCode, BackendError, BackendResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    documents: BTreeMap<Collection, BTreeMap<String, Fields>>,
}

pub struct MemoryBackend {
    state: Mutex<State>,
    session: Arc<SessionHandle>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new(session: Arc<SessionHandle>) -> Self {
        MemoryBackend {
            state: Mutex::new(State::default()),
            session,
            fail_writes: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers an account without signing in; returns its uid.
    pub fn register(&self, email: &str, password: &str) -> BackendResult<String> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(BackendError::Auth(AuthErrorCode::MissingPassword));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::Auth(AuthErrorCode::WeakPassword));
        }
        let mut state = self.state();
        let key = email.to_ascii_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(BackendError::Auth(AuthErrorCode::EmailInUse));
        }
        let uid = Uuid::new_v4().simple().to_string();
        state.accounts.insert(
            key,
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        Ok(uid)
    }

    /// Makes every subsequent write fail until switched off again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> BackendResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable("write rejected".to_string()))
        } else {
            Ok(())
        }
    }

    /// Number of documents stored in a collection, across all owners.
    pub fn document_count(&self, collection: Collection) -> usize {
        self.state()
            .documents
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    fn start_session(&self, email: &str, uid: String) -> Session {
        let session = Session {
            uid,
            email: email.to_string(),
            id_token: Uuid::new_v4().simple().to_string(),
            refresh_token: Uuid::new_v4().simple().to_string(),
        };
        self.session.set(session.clone());
        session
    }
}

fn validate_email(email: &str) -> BackendResult<()> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(BackendError::Auth(AuthErrorCode::InvalidEmail)),
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(BackendError::Auth(AuthErrorCode::MissingPassword));
        }
        let uid = {
            let state = self.state();
            let account = state
                .accounts
                .get(&email.to_ascii_lowercase())
                .ok_or(BackendError::Auth(AuthErrorCode::UserNotFound))?;
            if account.password != password {
                return Err(BackendError::Auth(AuthErrorCode::InvalidCredential));
            }
            account.uid.clone()
        };
        Ok(self.start_session(email, uid))
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        let uid = self.register(email, password)?;
        Ok(self.start_session(email, uid))
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.session.clear();
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> BackendResult<()> {
        validate_email(email)?;
        if self.state().accounts.contains_key(&email.to_ascii_lowercase()) {
            Ok(())
        } else {
            Err(BackendError::Auth(AuthErrorCode::UserNotFound))
        }
    }

    async fn delete_account(&self) -> BackendResult<()> {
        let session = self.session.current().ok_or(BackendError::Unauthenticated)?;
        self.state()
            .accounts
            .retain(|_, account| account.uid != session.uid);
        self.session.clear();
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create(&self, collection: Collection, fields: Fields) -> BackendResult<String> {
        self.check_writable()?;
        let id = Uuid::new_v4().simple().to_string();
        self.state()
            .documents
            .entry(collection)
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> BackendResult<Option<StoredDocument>> {
        let state = self.state();
        let doc = state
            .documents
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| StoredDocument {
                id: id.to_string(),
                fields: fields.clone(),
            });
        Ok(doc)
    }

    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> BackendResult<()> {
        self.check_writable()?;
        self.state()
            .documents
            .entry(collection)
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> BackendResult<()> {
        self.check_writable()?;
        let mut state = self.state();
        let existing = state
            .documents
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| BackendError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            })?;
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> BackendResult<()> {
        self.check_writable()?;
        if let Some(docs) = self.state().documents.get_mut(&collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> BackendResult<Vec<StoredDocument>> {
        let state = self.state();
        let docs: Vec<StoredDocument> = state
            .documents
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| filters.iter().all(|filter| filter.matches(fields)))
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> MemoryBackend {
        MemoryBackend::new(Arc::new(SessionHandle::default()))
    }

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_rules() {
        let backend = backend();
        let weak = backend.sign_up("ada@example.com", "abc").await;
        assert!(matches!(
            weak,
            Err(BackendError::Auth(AuthErrorCode::WeakPassword))
        ));

        let session = backend.sign_up("ada@example.com", "secret1").await.unwrap();
        assert_eq!(backend.session.current(), Some(session));

        let duplicate = backend.sign_up("ADA@example.com", "secret2").await;
        assert!(matches!(
            duplicate,
            Err(BackendError::Auth(AuthErrorCode::EmailInUse))
        ));
    }

    #[tokio::test]
    async fn test_sign_in_errors_are_classified() {
        let backend = backend();
        backend.register("ada@example.com", "secret1").unwrap();

        let unknown = backend.sign_in("bob@example.com", "secret1").await;
        assert!(matches!(
            unknown,
            Err(BackendError::Auth(AuthErrorCode::UserNotFound))
        ));
        let wrong = backend.sign_in("ada@example.com", "nope!!").await;
        assert!(matches!(
            wrong,
            Err(BackendError::Auth(AuthErrorCode::InvalidCredential))
        ));
        let bad_email = backend.sign_in("ada", "secret1").await;
        assert!(matches!(
            bad_email,
            Err(BackendError::Auth(AuthErrorCode::InvalidEmail))
        ));
        assert!(backend.sign_in("ada@example.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_merges_and_requires_document() {
        let backend = backend();
        let id = backend
            .create(Collection::Lists, fields(json!({"name": "Books", "userId": "u1"})))
            .await
            .unwrap();
        backend
            .update(Collection::Lists, &id, fields(json!({"name": "Novels"})))
            .await
            .unwrap();

        let doc = backend.get(Collection::Lists, &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["name"], json!("Novels"));
        assert_eq!(doc.fields["userId"], json!("u1"));

        let missing = backend
            .update(Collection::Lists, "nope", fields(json!({"name": "x"})))
            .await;
        assert!(matches!(missing, Err(BackendError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_query_applies_all_filters() {
        let backend = backend();
        for (owner, list) in [("u1", "a"), ("u1", "b"), ("u2", "a")] {
            backend
                .create(
                    Collection::ListItems,
                    fields(json!({"userId": owner, "listId": list})),
                )
                .await
                .unwrap();
        }
        let hits = backend
            .query(
                Collection::ListItems,
                &[Filter::eq("userId", "u1"), Filter::eq("listId", "a")],
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection_blocks_writes_only() {
        let backend = backend();
        let id = backend
            .create(Collection::Tasks, fields(json!({"title": "a"})))
            .await
            .unwrap();
        backend.fail_writes(true);
        assert!(backend.delete(Collection::Tasks, &id).await.is_err());
        assert!(backend.get(Collection::Tasks, &id).await.unwrap().is_some());
        backend.fail_writes(false);
        backend.delete(Collection::Tasks, &id).await.unwrap();
        assert_eq!(backend.document_count(Collection::Tasks), 0);
    }
}
