use super::firestore::{
    decode_document, decode_query_response, encode_fields, structured_query,
};
use super::{
    AuthBackend, Collection, DocumentStore, Fields, Filter, Session, SessionHandle,
    StoredDocument,
};
use crate::config::BackendConfig;
use crate::error::{AuthErrorCode, BackendError, BackendResult};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct IdentityResponse {
    id_token: String,
    email: Option<String>,
    refresh_token: String,
    local_id: String,
}

#[derive(Deserialize, Debug)]
struct IdentityErrorBody {
    error: IdentityErrorDetail,
}

#[derive(Deserialize, Debug)]
struct IdentityErrorDetail {
    message: String,
}

/// Client for the hosted identity REST API.
pub struct RestAuth {
    client: Client,
    auth_url: String,
    api_key: String,
    session: Arc<SessionHandle>,
}

impl RestAuth {
    pub fn new(config: &BackendConfig, session: Arc<SessionHandle>) -> Self {
        RestAuth {
            client: Client::new(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            session,
        }
    }

    async fn call(&self, method: &str, body: Value) -> BackendResult<Response> {
        let url = format!("{}/v1/accounts:{}?key={}", self.auth_url, method, self.api_key);
        let res = self.client.post(&url).json(&body).send().await?;

        if res.status().is_success() {
            Ok(res)
        } else {
            Err(identity_error(res).await)
        }
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> BackendResult<Session> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        });
        let identity = self.call(method, body).await?.json::<IdentityResponse>().await?;
        let session = Session {
            uid: identity.local_id,
            email: identity.email.unwrap_or_else(|| email.to_string()),
            id_token: identity.id_token,
            refresh_token: identity.refresh_token,
        };
        self.session.set(session.clone());
        Ok(session)
    }
}

async fn identity_error(res: Response) -> BackendError {
    let status = res.status().as_u16();
    let text = match res.text().await {
        Ok(text) => text,
        Err(err) => return BackendError::Http(err),
    };
    match serde_json::from_str::<IdentityErrorBody>(&text) {
        Ok(body) => {
            let code = AuthErrorCode::from_message(&body.error.message);
            debug!("event=identity_error status={} code={:?}", status, code);
            BackendError::Auth(code)
        }
        Err(_) => BackendError::Status { status, body: text },
    }
}

#[async_trait]
impl AuthBackend for RestAuth {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_out(&self) -> BackendResult<()> {
        // Tokens are stateless on the hosted side; forgetting them signs out.
        self.session.clear();
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> BackendResult<()> {
        let body = json!({ "requestType": "PASSWORD_RESET", "email": email });
        self.call("sendOobCode", body).await?;
        Ok(())
    }

    async fn delete_account(&self) -> BackendResult<()> {
        let token = self.session.token().ok_or(BackendError::Unauthenticated)?;
        self.call("delete", json!({ "idToken": token })).await?;
        self.session.clear();
        Ok(())
    }
}

/// Client for the hosted document REST API.
pub struct RestStore {
    client: Client,
    base_url: String,
    session: Arc<SessionHandle>,
}

impl RestStore {
    pub fn new(config: &BackendConfig, session: Arc<SessionHandle>) -> Self {
        let base_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            config.documents_url.trim_end_matches('/'),
            config.project_id
        );
        RestStore {
            client: Client::new(),
            base_url,
            session,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> BackendResult<RequestBuilder> {
        let token = self.session.token().ok_or(BackendError::Unauthenticated)?;
        Ok(request.header("Authorization", format!("Bearer {}", token)))
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection.as_str(), id)
    }
}

async fn check_status(res: Response) -> BackendResult<Response> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status().as_u16();
    let body = res.text().await?;
    warn!("event=document_request_failed status={}", status);
    Err(BackendError::Status { status, body })
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn create(&self, collection: Collection, fields: Fields) -> BackendResult<String> {
        let url = format!("{}/{}", self.base_url, collection.as_str());
        let body = json!({ "fields": encode_fields(&fields) });
        let res = self.authorized(self.client.post(&url))?.json(&body).send().await?;
        let doc = check_status(res).await?.json::<Value>().await?;
        let created = decode_document(&doc)?;
        debug!(
            "event=document_create collection={} id={}",
            collection.as_str(),
            created.id
        );
        Ok(created.id)
    }

    async fn get(&self, collection: Collection, id: &str) -> BackendResult<Option<StoredDocument>> {
        let url = self.document_url(collection, id);
        let res = self.authorized(self.client.get(&url))?.send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc = check_status(res).await?.json::<Value>().await?;
        decode_document(&doc).map(Some)
    }

    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> BackendResult<()> {
        let url = self.document_url(collection, id);
        let body = json!({ "fields": encode_fields(&fields) });
        let res = self.authorized(self.client.patch(&url))?.json(&body).send().await?;
        check_status(res).await?;
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> BackendResult<()> {
        let url = self.document_url(collection, id);
        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let body = json!({ "fields": encode_fields(&fields) });
        let res = self
            .authorized(self.client.patch(&url))?
            .query(&params)
            .json(&body)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            });
        }
        check_status(res).await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> BackendResult<()> {
        let url = self.document_url(collection, id);
        let res = self.authorized(self.client.delete(&url))?.send().await?;
        check_status(res).await?;
        debug!("event=document_delete collection={} id={}", collection.as_str(), id);
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> BackendResult<Vec<StoredDocument>> {
        let url = format!("{}:runQuery", self.base_url);
        let body = structured_query(collection, filters);
        let res = self.authorized(self.client.post(&url))?.json(&body).send().await?;
        let rows = check_status(res).await?.json::<Vec<Value>>().await?;
        decode_query_response(&rows)
    }
}
