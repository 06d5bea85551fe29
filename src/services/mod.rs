//! Thin CRUD wrappers over the hosted backend.
//!
//! Every service except [`AuthService`] is bound to one signed-in user and
//! scopes all reads and writes to documents that user owns.

pub mod auth_service;
pub mod list_service;
pub mod task_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use list_service::ListService;
pub use task_service::TaskService;
pub use user_service::UserService;

use crate::backend::{DocumentStore, Fields, Filter};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Record, OWNER_FIELD};
use serde_json::Value;
use std::sync::Arc;

/// Services for one signed-in user.
#[derive(Clone)]
pub struct Workspace {
    pub tasks: TaskService,
    pub lists: ListService,
    pub users: UserService,
}

impl Workspace {
    pub fn new(store: Arc<dyn DocumentStore>, owner: &str) -> Self {
        Workspace {
            tasks: TaskService::new(store.clone(), owner),
            lists: ListService::new(store.clone(), owner),
            users: UserService::new(store, owner),
        }
    }
}

/// Loads one document and checks that `owner` owns it.
pub(crate) async fn fetch_owned<R: Record>(
    store: &dyn DocumentStore,
    owner: &str,
    id: &str,
) -> ServiceResult<R> {
    let not_found = || ServiceError::NotFound {
        kind: R::KIND,
        id: id.to_string(),
    };
    let doc = store.get(R::COLLECTION, id).await?.ok_or_else(not_found)?;
    if doc.fields.get(OWNER_FIELD).and_then(Value::as_str) != Some(owner) {
        return Err(not_found());
    }
    R::from_document(doc)
}

/// Every document of `R` owned by `owner` that also matches `extra`.
pub(crate) async fn query_owned<R: Record>(
    store: &dyn DocumentStore,
    owner: &str,
    extra: &[Filter],
) -> ServiceResult<Vec<R>> {
    let mut filters = vec![Filter::eq(OWNER_FIELD, owner)];
    filters.extend_from_slice(extra);
    store
        .query(R::COLLECTION, &filters)
        .await?
        .into_iter()
        .map(R::from_document)
        .collect()
}

/// Builds a partial document for merge updates.
pub(crate) fn patch<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub(crate) fn non_empty(value: &str, message: &'static str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::Validation(message))
    } else {
        Ok(trimmed.to_string())
    }
}
