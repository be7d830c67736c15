use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 默认日志过滤（`RUST_LOG` 优先）
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "estate_site=info,tower_http=info".to_string(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API 路由前缀
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
        }
    }
}

/// 资源目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// 页面模板目录
    pub templates_path: String,
    /// 站点内容（YAML）目录
    pub content_path: String,
    /// 静态资源目录（/images、/css）
    pub static_path: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            templates_path: "./resources/templates".to_string(),
            content_path: "./resources/content".to_string(),
            static_path: "./static".to_string(),
        }
    }
}

/// 资源预取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimerConfig {
    /// 启动时是否预取关键资源
    #[serde(default = "PrimerConfig::default_enabled")]
    pub enabled: bool,
    /// 图片回源地址（如 CDN）；为空时使用本服务自身地址
    #[serde(default)]
    pub asset_origin: Option<String>,
}

impl PrimerConfig {
    fn default_enabled() -> bool {
        true
    }
}

impl Default for PrimerConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            asset_origin: None,
        }
    }
}

/// 联系表单存储后端
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactBackend {
    /// 托管文档数据库（REST）
    #[default]
    Document,
    /// 本地 SQLite（仅开发）
    Sqlite,
    /// 进程内存（仅开发/测试）
    Memory,
}

/// 联系表单配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    #[serde(default)]
    pub backend: ContactBackend,
    /// SQLite 文件路径
    #[serde(default = "ContactConfig::default_sqlite_path")]
    pub sqlite_path: String,
    /// 文档数据库根地址，生产环境形如
    /// `https://firestore.googleapis.com/v1/projects/<id>/databases/(default)/documents`；
    /// 默认指向本地模拟器
    #[serde(default = "ContactConfig::default_document_base_url")]
    pub document_base_url: String,
    /// 集合名
    #[serde(default = "ContactConfig::default_collection")]
    pub document_collection: String,
    /// 可选 API Key（以 `key` 查询参数附带）
    #[serde(default)]
    pub document_api_key: Option<String>,
}

impl ContactConfig {
    fn default_sqlite_path() -> String {
        "./data/contact.db".to_string()
    }

    fn default_document_base_url() -> String {
        "http://127.0.0.1:8080/v1/projects/estate-site/databases/(default)/documents".to_string()
    }

    fn default_collection() -> String {
        "contacts".to_string()
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            backend: ContactBackend::default(),
            sqlite_path: Self::default_sqlite_path(),
            document_base_url: Self::default_document_base_url(),
            document_collection: Self::default_collection(),
            document_api_key: None,
        }
    }
}

/// 管理端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// 管理口令；未配置时管理页关闭
    #[serde(default)]
    pub token: Option<String>,
    /// 仪表盘展示的最近提交条数
    #[serde(default = "AdminConfig::default_recent_limit")]
    pub recent_limit: u32,
}

impl AdminConfig {
    fn default_recent_limit() -> u32 {
        20
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token: None,
            recent_limit: Self::default_recent_limit(),
        }
    }
}

/// 站点设置（设置接口原样返回）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteSettings {
    pub site_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    /// 前端主题（light/dark）
    pub theme: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Horizon Estates".to_string(),
            contact_email: "hello@horizon-estates.example".to_string(),
            contact_phone: "+1 555 0100".to_string(),
            address: "100 Harbour Road, Suite 4".to_string(),
            theme: "light".to_string(),
        }
    }
}

/// 页面缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    #[serde(default = "PagesConfig::default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "PagesConfig::default_cache_max_entries")]
    pub cache_max_entries: u64,
}

impl PagesConfig {
    fn default_cache_ttl_secs() -> u64 {
        300
    }

    fn default_cache_max_entries() -> u64 {
        256
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: Self::default_cache_ttl_secs(),
            cache_max_entries: Self::default_cache_max_entries(),
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout_secs() -> u64 {
        15
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub primer: PrimerConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub settings: SiteSettings,
    #[serde(default)]
    pub pages: PagesConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从 `config.toml`（可缺省）加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    /// 从指定文件加载配置；环境变量示例：`APP_SERVER__PORT=8080`、`APP_ADMIN__TOKEN=...`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, env_source())
    }

    fn load_with_env(path: &Path, env: Environment) -> Result<Self, ConfigError> {
        tracing::info!("正在从 {:?} 加载配置文件", path);

        let builder = ConfigBuilder::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(env)
            .build()?;

        let config: Self = builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.prefix.starts_with('/') || self.api.prefix.len() < 2 {
            return Err(ConfigError::Message(format!(
                "api.prefix 必须以 / 开头且不能为根路径: {}",
                self.api.prefix
            )));
        }
        if self.contact.backend == ContactBackend::Document
            && self.contact.document_base_url.trim().is_empty()
        {
            return Err(ConfigError::Message(
                "contact.backend = document 时必须配置 contact.document_base_url".to_string(),
            ));
        }
        Ok(())
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn templates_path(&self) -> PathBuf {
        PathBuf::from(&self.resources.templates_path)
    }

    pub fn content_path(&self) -> PathBuf {
        PathBuf::from(&self.resources.content_path)
    }

    pub fn static_path(&self) -> PathBuf {
        PathBuf::from(&self.resources.static_path)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
