use std::sync::Arc;

use axum::extract::{OriginalUri, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::contact::create_contact_router;
use crate::features::health::handler::health_check;
use crate::features::pages::create_pages_router;
use crate::features::primer::{HeadHints, HttpImageLoader, ResourcePrimer};
use crate::features::settings::create_settings_router;
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 构建会话级预取器：图片经 HTTP 回源到 `origin`，路由提示写入 `hints`。
pub fn build_primer(origin: &str, hints: Arc<HeadHints>) -> Result<ResourcePrimer, AppError> {
    let client = crate::http::client_speculative()
        .map_err(|e| AppError::Internal(format!("HTTP client init: {e}")))?
        .clone();
    Ok(ResourcePrimer::new(
        Arc::new(HttpImageLoader::new(client, origin)),
        hints,
    ))
}

fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    // 图片本身已压缩，压缩收益极低
    SizeAbove::default()
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
}

/// 为静态资源（`/images/*`、`/css/*`）添加缓存头。
async fn static_cache_control_middleware(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let is_static = path.starts_with("/images/") || path.starts_with("/css/");
    let mut res = next.run(req).await;
    if is_static
        && res.status().is_success()
        && res.headers().get(header::CACHE_CONTROL).is_none()
    {
        res.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=86400"),
        );
    }
    res
}

/// 接口前缀下的未知路径返回 Problem Details，其余渲染 404 页面。
async fn not_found(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Response {
    let path = uri.path();
    let under_api = path
        .strip_prefix(state.api_prefix.as_str())
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
    if under_api {
        return AppError::NotFound(format!("接口不存在: {path}")).into_response();
    }
    state
        .renderer
        .error_page(StatusCode::NOT_FOUND, "The page you requested does not exist.")
}

/// 组装完整路由：页面、业务接口、静态资源、文档与中间件。
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let api_router = Router::<AppState>::new()
        .merge(create_contact_router())
        .merge(create_settings_router());

    let static_dir = config.static_path();
    Router::<AppState>::new()
        .route("/health", get(health_check))
        .merge(create_pages_router())
        .nest(&config.api.prefix, api_router)
        .nest_service("/images", ServeDir::new(static_dir.join("images")))
        .nest_service("/css", ServeDir::new(static_dir.join("css")))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(static_cache_control_middleware))
        .layer(CompressionLayer::new().compress_when(compression_predicate()))
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod compression_predicate_tests {
    use super::compression_predicate;
    use axum::body::Body;
    use axum::http::{Response as HttpResponse, header};
    use tower_http::compression::predicate::Predicate;

    fn should_compress_for(ct: &str) -> bool {
        let body_bytes = vec![b'x'; 2048];
        let resp = HttpResponse::builder()
            .header(header::CONTENT_TYPE, ct)
            .body(Body::from(body_bytes))
            .unwrap();
        compression_predicate().should_compress(&resp)
    }

    #[test]
    fn html_pages_are_compressed() {
        assert!(should_compress_for("text/html; charset=utf-8"));
        assert!(should_compress_for("text/css"));
    }

    #[test]
    fn images_are_not_compressed() {
        assert!(!should_compress_for("image/jpeg"));
        assert!(!should_compress_for("image/png"));
    }
}
