#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tower::ServiceExt;

use estate_site::AppState;
use estate_site::app::build_app;
use estate_site::config::{AdminConfig, AppConfig, ResourcesConfig};
use estate_site::error::{PrimeError, StoreError};
use estate_site::features::contact::{ContactStore, ContactSubmission};
use estate_site::features::pages::PageRenderer;
use estate_site::features::primer::{HeadHints, ImageLoader, ResourcePrimer};
use estate_site::startup::load_site_content;

/// 记录“开始加载”的图片 URL，始终成功
#[derive(Default)]
pub struct CountingLoader {
    pub started: Mutex<Vec<String>>,
}

impl CountingLoader {
    pub fn count(&self, url: &str) -> usize {
        self.started
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

impl ImageLoader for CountingLoader {
    fn load(&self, url: &str) -> BoxFuture<'static, Result<(), PrimeError>> {
        self.started.lock().unwrap().push(url.to_string());
        futures_util::future::ready(Ok(())).boxed()
    }
}

/// 写入总是失败的存储
pub struct FailingStore;

impl ContactStore for FailingStore {
    fn insert<'a>(&'a self, _s: &'a ContactSubmission) -> BoxFuture<'a, Result<(), StoreError>> {
        futures_util::future::ready(Err(StoreError::Status {
            status: 503,
            body: "unavailable".into(),
        }))
        .boxed()
    }

    fn recent(&self, _limit: u32) -> BoxFuture<'_, Result<Vec<ContactSubmission>, StoreError>> {
        futures_util::future::ready(Err(StoreError::Timeout)).boxed()
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

async fn explode() -> Result<(), StoreError> {
    panic!("driver exploded")
}

/// 写入时 panic 的存储（模拟意外异常）
pub struct PanickingStore;

impl ContactStore for PanickingStore {
    fn insert<'a>(&'a self, _s: &'a ContactSubmission) -> BoxFuture<'a, Result<(), StoreError>> {
        explode().boxed()
    }

    fn recent(&self, _limit: u32) -> BoxFuture<'_, Result<Vec<ContactSubmission>, StoreError>> {
        futures_util::future::ready(Ok(Vec::new())).boxed()
    }

    fn backend_name(&self) -> &'static str {
        "panicking"
    }
}

pub struct TestApp {
    pub router: Router,
    pub loader: Arc<CountingLoader>,
    pub hints: Arc<HeadHints>,
    pub primer: ResourcePrimer,
}

pub fn bundled_config() -> AppConfig {
    let root = env!("CARGO_MANIFEST_DIR");
    AppConfig {
        resources: ResourcesConfig {
            templates_path: format!("{root}/resources/templates"),
            content_path: format!("{root}/resources/content"),
            static_path: format!("{root}/static"),
        },
        ..AppConfig::default()
    }
}

/// 构建与 main 相同组合方式的应用（图片加载替换为计数实现）
pub fn build_test_app(store: Arc<dyn ContactStore>, admin_token: Option<&str>) -> TestApp {
    let mut config = bundled_config();
    config.admin = AdminConfig {
        token: admin_token.map(str::to_string),
        ..AdminConfig::default()
    };

    let content = Arc::new(load_site_content(&config.content_path()).expect("content"));
    let loader = Arc::new(CountingLoader::default());
    let hints = Arc::new(HeadHints::new());
    let primer = ResourcePrimer::new(loader.clone(), hints.clone());
    primer.prime_critical_resources();

    let renderer = Arc::new(PageRenderer::new(
        &config.templates_path(),
        &content,
        hints.clone(),
        &config.pages,
    ));

    let state = AppState {
        content,
        renderer,
        primer: primer.clone(),
        head_hints: hints.clone(),
        contact_store: store,
        settings: Arc::new(config.settings.clone()),
        admin: Arc::new(config.admin.clone()),
        api_prefix: config.api.prefix.clone(),
    };

    TestApp {
        router: build_app(state, &config),
        loader,
        hints,
        primer,
    }
}

pub async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
    router.clone().oneshot(req).await.expect("call app")
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// 读取页面 HTML，并还原模板自动转义的 `/` 与 `'`，便于按原文断言
pub async fn page_html(resp: Response<Body>) -> String {
    body_string(resp)
        .await
        .replace("&#x2f;", "/")
        .replace("&#x27;", "'")
}
