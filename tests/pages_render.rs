mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;

use common::{FailingStore, body_string, build_test_app, get, page_html, send};
use estate_site::features::contact::{ContactStore, ContactSubmission, MemoryStore};
use estate_site::features::primer::{CRITICAL_IMAGES, CRITICAL_ROUTES};

#[tokio::test]
async fn home_page_emits_prefetch_hints_for_critical_routes() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = page_html(resp).await;

    for route in CRITICAL_ROUTES {
        let tag = format!(r#"<link rel="prefetch" href="{route}">"#);
        assert_eq!(html.matches(&tag).count(), 1, "expected one hint for {route}");
    }
    assert!(html.contains("Horizon Estates"));
}

#[tokio::test]
async fn repeated_priming_does_not_duplicate_hints() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);
    app.primer.prime_critical_resources();
    app.primer.prime_route("/projects");

    assert_eq!(app.hints.len(), CRITICAL_ROUTES.len());
    assert_eq!(app.loader.count("/images/hero-bg.jpg"), 1);
    assert_eq!(app.loader.count("/images/logo.png"), 1);
    assert_eq!(app.loader.count("/images/placeholder.jpg"), 1);
}

#[tokio::test]
async fn projects_listing_primes_cover_images_once() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    for _ in 0..3 {
        let resp = send(&app.router, get("/projects")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(app.loader.count("/images/projects/harbour-view.jpg"), 1);
    assert_eq!(app.loader.count("/images/projects/cedar-grove.jpg"), 1);
    assert!(app.primer.is_image_primed("/images/projects/market-square.jpg"));
}

#[tokio::test]
async fn static_pages_render() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);
    for (uri, needle) in [
        ("/about", "About Horizon Estates"),
        ("/services", "Property management"),
        ("/contact", r#"action="/api/contact""#),
    ] {
        let resp = send(&app.router, get(uri)).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let html = page_html(resp).await;
        assert!(html.contains(needle), "{uri} should contain {needle}");
    }
}

#[tokio::test]
async fn project_detail_renders_known_slug() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/projects/harbour-view-residences")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = page_html(resp).await;
    assert!(html.contains("Harbour View Residences"));
    assert!(html.contains("Rooftop garden and pool"));
    assert!(html.contains("Ongoing"));
}

#[tokio::test]
async fn unknown_project_slug_is_not_found_page() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/projects/does-not-exist")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(page_html(resp).await.contains("could not be found"));
}

#[tokio::test]
async fn unknown_path_falls_back_to_not_found_page() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/nowhere")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_api_path_is_problem_json() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/api/nope")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
}

#[tokio::test]
async fn admin_is_disabled_without_configured_token() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/admin")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_requires_matching_token() {
    let app = build_test_app(Arc::new(MemoryStore::default()), Some("s3cret"));

    let resp = send(&app.router, get("/admin")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app.router, get("/admin?token=wrong")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app.router, get("/admin?token=s3cret-extra")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app.router, get("/admin?token=s3cret")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_lists_recent_submissions() {
    let store = Arc::new(MemoryStore::default());
    store
        .insert(&ContactSubmission {
            id: "sub-1".to_string(),
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: None,
            message: "Viewing on Saturday?".to_string(),
            created_at: Utc::now(),
        })
        .await
        .expect("seed");
    let app = build_test_app(store, Some("s3cret"));

    let req = Request::builder()
        .uri("/admin")
        .header("x-admin-token", "s3cret")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app.router, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = page_html(resp).await;
    assert!(html.contains("Grace Hopper"));
    assert!(html.contains("(memory)"));
}

#[tokio::test]
async fn admin_survives_store_listing_failure() {
    let app = build_test_app(Arc::new(FailingStore), Some("s3cret"));

    let resp = send(&app.router, get("/admin?token=s3cret")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = page_html(resp).await;
    assert!(html.contains("Could not load enquiries"));
    assert!(html.contains("No enquiries yet."));
}

#[tokio::test]
async fn settings_endpoint_returns_fixed_record() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/api/settings")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v: Value = serde_json::from_str(&body_string(resp).await).expect("json");
    assert_eq!(v["siteName"], "Horizon Estates");
    assert_eq!(v["theme"], "light");
}

#[tokio::test]
async fn health_reports_backend_and_hint_count() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let resp = send(&app.router, get("/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v: Value = serde_json::from_str(&body_string(resp).await).expect("json");
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["contactBackend"], "memory");
    assert_eq!(v["prefetchHints"], 4);
}

#[tokio::test]
async fn critical_and_project_images_are_served() {
    let app = build_test_app(Arc::new(MemoryStore::default()), None);

    let project_images = [
        "/images/projects/harbour-view.jpg",
        "/images/projects/cedar-grove.jpg",
        "/images/projects/market-square.jpg",
    ];
    for path in CRITICAL_IMAGES.into_iter().chain(project_images) {
        let resp = send(&app.router, get(path)).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("image/"), "{path}: {content_type}");
        assert_eq!(
            resp.headers()
                .get("cache-control")
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=86400")
        );
    }
}
