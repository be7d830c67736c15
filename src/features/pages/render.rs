use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::{Environment, Value, context};
use moka::future::Cache;

use crate::config::PagesConfig;
use crate::error::AppError;
use crate::features::primer::HeadHints;

use super::models::SiteContent;

/// 页面渲染器：minijinja 模板 + 公共页面 HTML 缓存。
///
/// 模板位于 `resources/templates/*.html`，所有页面继承 `base.html`。
/// 每次渲染都会注入当前的预取提示，由 `base.html` 输出为 `<link rel="prefetch">`。
pub struct PageRenderer {
    env: Environment<'static>,
    cache: Cache<String, String>,
    hints: Arc<HeadHints>,
}

impl PageRenderer {
    pub fn new(
        templates_dir: &Path,
        content: &SiteContent,
        hints: Arc<HeadHints>,
        cfg: &PagesConfig,
    ) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(templates_dir.to_path_buf()));
        env.add_global("company", Value::from_serialize(&content.company));
        env.add_global("year", chrono::Utc::now().format("%Y").to_string());

        let cache = Cache::builder()
            .max_capacity(cfg.cache_max_entries)
            .time_to_live(Duration::from_secs(cfg.cache_ttl_secs.max(1)))
            .build();

        Self { env, cache, hints }
    }

    /// 渲染模板（不走缓存）
    pub fn render(&self, template_name: &str, ctx: Value) -> Result<String, AppError> {
        let tpl = self.env.get_template(template_name)?;
        let full = context! {
            prefetch_hints => self.hints.snapshot(),
            ..ctx
        };
        Ok(tpl.render(full)?)
    }

    /// 以请求路径为键缓存渲染结果，仅用于不含敏感信息的公共页面。
    pub async fn render_cached<F>(
        &self,
        key: &str,
        template_name: &str,
        build_ctx: F,
    ) -> Result<String, AppError>
    where
        F: FnOnce() -> Value,
    {
        if let Some(hit) = self.cache.get(key).await {
            return Ok(hit);
        }
        let html = self.render(template_name, build_ctx())?;
        self.cache.insert(key.to_string(), html.clone()).await;
        Ok(html)
    }

    /// 渲染错误页；错误页自身渲染失败时退回 Problem Details。
    pub fn error_page(&self, status: StatusCode, message: &str) -> Response {
        let ctx = context! {
            title => status.canonical_reason().unwrap_or("Error"),
            status => status.as_u16(),
            message => message,
        };
        match self.render("error.html", ctx) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => e.into_response(),
        }
    }

    /// 已缓存的页面数（近似值）
    pub fn cached_entries(&self) -> u64 {
        self.cache.entry_count()
    }
}
