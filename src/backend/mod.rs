//! Seams to the hosted backend.
//!
//! The front end never talks to storage directly: authentication goes through
//! [`AuthBackend`] and every read or write goes through [`DocumentStore`].
//! `rest` reaches the hosted services over HTTPS, `memory` keeps everything
//! in-process for demo mode and tests.

pub mod firestore;
pub mod memory;
pub mod rest;

use crate::error::BackendResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::RwLock;

pub type Fields = serde_json::Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Tasks,
    Lists,
    ListItems,
    UserDetails,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Tasks,
        Collection::Lists,
        Collection::ListItems,
        Collection::UserDetails,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Lists => "lists",
            Collection::ListItems => "listItems",
            Collection::UserDetails => "userDetails",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

/// Equality filter; a query matches documents satisfying every filter.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
}

/// The signed-in session shared by the auth client and the document store.
#[derive(Debug, Default)]
pub struct SessionHandle {
    inner: RwLock<Option<Session>>,
}

impl SessionHandle {
    pub fn set(&self, session: Session) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(session);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.id_token)
    }
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Signs in and records the session on success.
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session>;
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session>;
    async fn sign_out(&self) -> BackendResult<()>;
    async fn send_password_reset(&self, email: &str) -> BackendResult<()>;
    /// Deletes the signed-in account and clears the session.
    async fn delete_account(&self) -> BackendResult<()>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document with a generated id and returns that id.
    async fn create(&self, collection: Collection, fields: Fields) -> BackendResult<String>;
    async fn get(&self, collection: Collection, id: &str) -> BackendResult<Option<StoredDocument>>;
    /// Creates or fully overwrites the document with the given id.
    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> BackendResult<()>;
    /// Merges `fields` into an existing document.
    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> BackendResult<()>;
    async fn delete(&self, collection: Collection, id: &str) -> BackendResult<()>;
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> BackendResult<Vec<StoredDocument>>;
}
