use std::sync::Arc;

use estate_site::app::{build_app, build_primer};
use estate_site::config::AppConfig;
use estate_site::features::contact::build_store;
use estate_site::features::pages::PageRenderer;
use estate_site::features::primer::HeadHints;
use estate_site::startup::{load_site_content, run_startup_checks};
use estate_site::{AppState, ShutdownManager};

#[tokio::main]
async fn main() {
    // 配置加载先于日志初始化，需要默认过滤先兜底
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config init failed: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .init();

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_startup_checks(&config) {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    let content = match load_site_content(&config.content_path()) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("Failed to load site content: {}", e);
            std::process::exit(1);
        }
    };

    let contact_store = match build_store(&config.contact).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Contact store init failed: {}", e);
            std::process::exit(1);
        }
    };

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    // 图片预热默认回源到本服务自身（监听 0.0.0.0 时改用回环地址）
    let origin = config.primer.asset_origin.clone().unwrap_or_else(|| {
        let port = listener
            .local_addr()
            .map(|a| a.port())
            .unwrap_or(config.server.port);
        format!("http://127.0.0.1:{port}")
    });

    let head_hints = Arc::new(HeadHints::new());
    let primer = match build_primer(&origin, head_hints.clone()) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Resource primer init failed: {}", e);
            std::process::exit(1);
        }
    };
    if config.primer.enabled {
        primer.prime_critical_resources();
        tracing::info!(
            "关键资源预取已发起: {} 条路由提示, 图片回源 {}",
            head_hints.len(),
            origin
        );
    }

    let renderer = Arc::new(PageRenderer::new(
        &config.templates_path(),
        &content,
        head_hints.clone(),
        &config.pages,
    ));

    let state = AppState {
        content,
        renderer,
        primer,
        head_hints,
        contact_store,
        settings: Arc::new(config.settings.clone()),
        admin: Arc::new(config.admin.clone()),
        api_prefix: config.api.prefix.clone(),
    };

    let app = build_app(state, &config);

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Contact API: http://{}{}/contact", addr, config.api.prefix);

    let shutdown_timeout = config.shutdown.timeout_duration();
    let manager_for_signal = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = manager_for_signal.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    // 收到退出信号后，最多等待 shutdown_timeout 让进行中的请求完成
    let serve = tokio::spawn(async move { graceful.await });
    let result = tokio::select! {
        joined = serve => joined.map_err(|e| e.to_string()).and_then(|r| r.map_err(|e| e.to_string())),
        _ = async {
            shutdown_manager.wait_for_shutdown().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!("优雅退出超时（{}秒），强制退出", config.shutdown.timeout_secs);
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务器已优雅关闭");
}
