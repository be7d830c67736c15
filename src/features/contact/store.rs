use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{ConnectOptions, Row, SqlitePool};

use crate::config::{ContactBackend, ContactConfig};
use crate::error::StoreError;

use super::document_store::DocumentStore;
use super::models::ContactSubmission;

/// 联系表单存储接缝：每次提交只做一次写入，不重试。
pub trait ContactStore: Send + Sync {
    fn insert<'a>(&'a self, submission: &'a ContactSubmission) -> BoxFuture<'a, Result<(), StoreError>>;

    /// 最近的提交（按时间倒序），用于管理端仪表盘
    fn recent(&self, limit: u32) -> BoxFuture<'_, Result<Vec<ContactSubmission>, StoreError>>;

    fn backend_name(&self) -> &'static str;
}

/// 按配置构建存储后端
pub async fn build_store(cfg: &ContactConfig) -> Result<Arc<dyn ContactStore>, StoreError> {
    let store: Arc<dyn ContactStore> = match cfg.backend {
        ContactBackend::Sqlite => {
            let path = Path::new(&cfg.sqlite_path);
            if let Some(dir) = path.parent() {
                tokio::fs::create_dir_all(dir).await.ok();
            }
            let store = SqliteStore::connect(path).await?;
            store.init_schema().await?;
            Arc::new(store)
        }
        ContactBackend::Document => Arc::new(DocumentStore::from_config(cfg)?),
        ContactBackend::Memory => {
            tracing::warn!("联系表单使用内存存储，进程退出后数据将丢失");
            Arc::new(MemoryStore::default())
        }
    };
    tracing::info!("联系表单存储后端: {}", store.backend_name());
    Ok(store)
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<ContactSubmission>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.items.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<ContactSubmission> {
        self.items
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

impl ContactStore for MemoryStore {
    fn insert<'a>(&'a self, submission: &'a ContactSubmission) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = self
            .items
            .lock()
            .map(|mut g| g.push(submission.clone()))
            .map_err(|e| StoreError::Database(format!("memory store poisoned: {e}")));
        futures_util::future::ready(result).boxed()
    }

    fn recent(&self, limit: u32) -> BoxFuture<'_, Result<Vec<ContactSubmission>, StoreError>> {
        let mut items = self.snapshot();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit as usize);
        futures_util::future::ready(Ok(items)).boxed()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// SQLite 存储
#[derive(Clone)]
pub struct SqliteStore {
    pub pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(path: &Path) -> Result<Self, StoreError> {
        let opt = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .disable_statement_logging();
        let pool = SqlitePool::connect_with(opt).await?;
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&pool)
            .await
            .ok();
        Ok(Self { pool })
    }

    /// 内存数据库（单连接，保证所有查询看到同一个库）
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let opt = SqliteConnectOptions::new()
            .in_memory(true)
            .disable_statement_logging();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS contact_submissions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_contact_created_at ON contact_submissions(created_at DESC);
        "#;
        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(())
    }
}

impl SqliteStore {
    async fn insert_row(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO contact_submissions(id, name, email, phone, message, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&submission.id)
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(submission.phone.as_deref())
        .bind(&submission.message)
        .bind(submission.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn select_recent(&self, limit: u32) -> Result<Vec<ContactSubmission>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, email, phone, message, created_at FROM contact_submissions ORDER BY created_at DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| decode_row(&row)).collect()
    }
}

fn decode_row(row: &SqliteRow) -> Result<ContactSubmission, StoreError> {
    let created_raw: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map_err(|e| StoreError::Decode(format!("created_at '{created_raw}': {e}")))?
        .with_timezone(&Utc);
    Ok(ContactSubmission {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        message: row.try_get("message")?,
        created_at,
    })
}

impl ContactStore for SqliteStore {
    fn insert<'a>(&'a self, submission: &'a ContactSubmission) -> BoxFuture<'a, Result<(), StoreError>> {
        self.insert_row(submission).boxed()
    }

    fn recent(&self, limit: u32) -> BoxFuture<'_, Result<Vec<ContactSubmission>, StoreError>> {
        self.select_recent(limit).boxed()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
