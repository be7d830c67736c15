use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use minijinja::context;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let content = state.content.clone();
    let html = state
        .renderer
        .render_cached("/", "home.html", move || {
            context! {
                active => "home",
                description => content.company.tagline.clone(),
                featured => content.featured_projects(),
                services => &content.services,
            }
        })
        .await?;
    Ok(Html(html))
}

pub async fn about(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let content = state.content.clone();
    let html = state
        .renderer
        .render_cached("/about", "about.html", move || {
            context! {
                active => "about",
                title => "About Us",
                description => format!("About {}", content.company.name),
            }
        })
        .await?;
    Ok(Html(html))
}

pub async fn services(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let content = state.content.clone();
    let html = state
        .renderer
        .render_cached("/services", "services.html", move || {
            context! {
                active => "services",
                title => "Services",
                description => "Buying, selling, leasing and property management.",
                services => &content.services,
            }
        })
        .await?;
    Ok(Html(html))
}

pub async fn contact(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let api_prefix = state.api_prefix.clone();
    let html = state
        .renderer
        .render_cached("/contact", "contact.html", move || {
            context! {
                active => "contact",
                title => "Contact",
                description => "Get in touch with our agents.",
                contact_endpoint => format!("{api_prefix}/contact"),
            }
        })
        .await?;
    Ok(Html(html))
}

pub async fn projects(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    // 列表页出现后，详情页封面大概率会被访问
    state.primer.prime_images(state.content.project_images());

    let content = state.content.clone();
    let html = state
        .renderer
        .render_cached("/projects", "projects.html", move || {
            context! {
                active => "projects",
                title => "Projects",
                description => "Current, upcoming and completed developments.",
                projects => &content.projects,
            }
        })
        .await?;
    Ok(Html(html))
}

pub async fn project_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let Some(project) = state.content.project(&slug) else {
        return Ok(state
            .renderer
            .error_page(StatusCode::NOT_FOUND, "This project could not be found."));
    };

    let key = format!("/projects/{slug}");
    let project = project.clone();
    let html = state
        .renderer
        .render_cached(&key, "project_detail.html", move || {
            context! {
                active => "projects",
                title => project.title.clone(),
                description => project.summary.clone(),
                status_label => project.status.label(),
                project => project,
            }
        })
        .await?;
    Ok(Html(html).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    token: Option<String>,
}

/// 管理端仪表盘（不缓存）
pub async fn admin_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
) -> Result<Response, AppError> {
    let Some(expected) = state.admin.token.as_deref().filter(|t| !t.is_empty()) else {
        return Ok(state
            .renderer
            .error_page(StatusCode::NOT_FOUND, "The admin dashboard is disabled."));
    };

    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(query.token);
    if !provided.is_some_and(|p| token_matches(p.as_bytes(), expected.as_bytes())) {
        tracing::warn!("管理端口令缺失或无效");
        return Ok(state
            .renderer
            .error_page(StatusCode::UNAUTHORIZED, "A valid admin token is required."));
    }

    let (submissions, store_error) = match state
        .contact_store
        .recent(state.admin.recent_limit)
        .await
    {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!("读取最近提交失败: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    let html = state.renderer.render(
        "admin.html",
        context! {
            active => "admin",
            title => "Admin Dashboard",
            description => "Site overview",
            project_total => state.content.projects.len(),
            status_counts => state.content.status_counts(),
            service_total => state.content.services.len(),
            submissions => submissions,
            store_backend => state.contact_store.backend_name(),
            store_error => store_error,
        },
    )?;
    Ok(Html(html).into_response())
}

/// 口令比较耗时只与长度有关，不因首个不同字节提前返回
fn token_matches(provided: &[u8], expected: &[u8]) -> bool {
    let len_diff = provided.len() ^ expected.len();
    let byte_diff = provided
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    len_diff == 0 && byte_diff == 0
}

pub fn create_pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/services", get(services))
        .route("/contact", get(contact))
        .route("/projects", get(projects))
        .route("/projects/:slug", get(project_detail))
        .route("/admin", get(admin_dashboard))
}
