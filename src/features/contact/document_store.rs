//! 托管文档数据库（Firestore 兼容 REST 接口）存储。
//!
//! 写入：`POST {base}/{collection}?documentId={id}`，字段编码为
//! `{"fields": {"name": {"stringValue": ...}, "createdAt": {"timestampValue": ...}}}`。
//! 列表：`GET {base}/{collection}?pageSize=N&orderBy=createdAt desc`。

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::Client;
use serde_json::{Map, Value, json};

use crate::config::ContactConfig;
use crate::error::StoreError;

use super::models::ContactSubmission;
use super::store::ContactStore;

/// 错误响应体截断长度，避免把上游大段 HTML 写进日志
const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Debug, Clone)]
pub struct DocumentStore {
    client: Client,
    collection_url: String,
    api_key: Option<String>,
}

impl DocumentStore {
    pub fn new(client: Client, base_url: &str, collection: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            collection_url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                collection.trim_matches('/')
            ),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn from_config(cfg: &ContactConfig) -> Result<Self, StoreError> {
        let client = crate::http::client_upstream()?.clone();
        Ok(Self::new(
            client,
            &cfg.document_base_url,
            &cfg.document_collection,
            cfg.document_api_key.clone(),
        ))
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.query(&[("key", key.as_str())]),
            None => req,
        }
    }

    async fn create_document(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        let req = self
            .client
            .post(&self.collection_url)
            .query(&[("documentId", submission.id.as_str())])
            .json(&encode_document(submission));
        let resp = self.with_key(req).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn list_documents(&self, limit: u32) -> Result<Vec<ContactSubmission>, StoreError> {
        let page_size = limit.to_string();
        let req = self
            .client
            .get(&self.collection_url)
            .query(&[("pageSize", page_size.as_str()), ("orderBy", "createdAt desc")]);
        let resp = ensure_success(self.with_key(req).send().await?).await?;
        let body: Value = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let docs = body
            .get("documents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        docs.iter().map(decode_document).collect()
    }
}

impl ContactStore for DocumentStore {
    fn insert<'a>(&'a self, submission: &'a ContactSubmission) -> BoxFuture<'a, Result<(), StoreError>> {
        self.create_document(submission).boxed()
    }

    fn recent(&self, limit: u32) -> BoxFuture<'_, Result<Vec<ContactSubmission>, StoreError>> {
        self.list_documents(limit).boxed()
    }

    fn backend_name(&self) -> &'static str {
        "document"
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

fn string_value(v: &str) -> Value {
    json!({ "stringValue": v })
}

pub(crate) fn encode_document(s: &ContactSubmission) -> Value {
    let phone = match &s.phone {
        Some(p) => string_value(p),
        None => json!({ "nullValue": null }),
    };
    json!({
        "fields": {
            "name": string_value(&s.name),
            "email": string_value(&s.email),
            "phone": phone,
            "message": string_value(&s.message),
            "createdAt": { "timestampValue": s.created_at.to_rfc3339() },
        }
    })
}

pub(crate) fn decode_document(doc: &Value) -> Result<ContactSubmission, StoreError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("document 缺少 name".into()))?;
    // 文档名形如 projects/p/databases/(default)/documents/contacts/<id>
    let id = name.rsplit('/').next().unwrap_or(name).to_string();

    let empty = Map::new();
    let fields = doc
        .get("fields")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let text = |key: &str| -> Option<String> {
        fields
            .get(key)
            .and_then(|f| f.get("stringValue"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let required = |key: &str| -> Result<String, StoreError> {
        text(key).ok_or_else(|| StoreError::Decode(format!("document {id} 缺少字段 {key}")))
    };

    let created_at = fields
        .get("createdAt")
        .and_then(|f| f.get("timestampValue"))
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode(format!("document {id} 缺少字段 createdAt")))
        .and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| StoreError::Decode(format!("createdAt '{raw}': {e}")))
        })?;

    Ok(ContactSubmission {
        name: required("name")?,
        email: required("email")?,
        phone: text("phone"),
        message: required("message")?,
        created_at,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::StatusCode,
        routing::post,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(HashMap<String, String>, Value)>>>;

    fn sample() -> ContactSubmission {
        ContactSubmission {
            id: "abc123".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            phone: None,
            message: "hello".to_string(),
            created_at: Utc::now(),
        }
    }

    async fn start_fake_backend(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/v1/documents/contacts",
                post(
                    move |State(c): State<Captured>,
                          Query(q): Query<HashMap<String, String>>,
                          Json(body): Json<Value>| async move {
                        c.lock().unwrap().push((q, body));
                        (status, Json(json!({})))
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}/v1/documents"), captured)
    }

    #[test]
    fn encoded_document_decodes_back() {
        let s = ContactSubmission {
            phone: Some("+1 555".to_string()),
            ..sample()
        };
        let mut doc = encode_document(&s);
        doc["name"] = json!("projects/p/databases/(default)/documents/contacts/abc123");
        let back = decode_document(&doc).expect("decode");
        assert_eq!(back.id, "abc123");
        assert_eq!(back.phone.as_deref(), Some("+1 555"));
        assert_eq!(back.created_at.timestamp(), s.created_at.timestamp());
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let doc = json!({ "name": "x/contacts/1", "fields": { "name": { "stringValue": "Ann" } } });
        assert!(matches!(decode_document(&doc), Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn insert_posts_fields_with_document_id_and_key() {
        let (base, captured) = start_fake_backend(StatusCode::OK).await;
        let store = DocumentStore::new(Client::new(), &base, "contacts", Some("k1".to_string()));

        store.insert(&sample()).await.expect("insert");

        let calls = captured.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        let (query, body) = &calls[0];
        assert_eq!(query.get("documentId").map(String::as_str), Some("abc123"));
        assert_eq!(query.get("key").map(String::as_str), Some("k1"));
        assert_eq!(body["fields"]["email"]["stringValue"], "ann@example.com");
        assert!(body["fields"]["phone"]["nullValue"].is_null());
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_status_error() {
        let (base, _) = start_fake_backend(StatusCode::SERVICE_UNAVAILABLE).await;
        let store = DocumentStore::new(Client::new(), &base, "contacts", None);

        let err = store.insert(&sample()).await.expect_err("should fail");
        assert!(matches!(err, StoreError::Status { status: 503, .. }), "got {err:?}");
    }
}
