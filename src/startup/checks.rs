use crate::config::AppConfig;
use crate::error::AppError;

/// 页面渲染所需的模板
pub const REQUIRED_TEMPLATES: [&str; 9] = [
    "base.html",
    "home.html",
    "about.html",
    "services.html",
    "contact.html",
    "projects.html",
    "project_detail.html",
    "admin.html",
    "error.html",
];

/// 执行启动检查
///
/// 1. 模板目录与必需模板（缺失即失败）
/// 2. 内容目录（缺失即失败）
/// 3. 静态资源目录（缺失仅告警）
pub fn run_startup_checks(config: &AppConfig) -> Result<(), AppError> {
    tracing::info!("🔍 开始执行启动检查...");

    ensure_templates(config)?;

    let content = config.content_path();
    if !content.is_dir() {
        return Err(AppError::Content(format!("content 目录不存在: {:?}", content)));
    }

    let static_dir = config.static_path();
    if !static_dir.is_dir() {
        tracing::warn!("⚠️ 静态资源目录不存在，/images 与 /css 将返回 404: {:?}", static_dir);
    }

    if config.admin.token.as_deref().is_none_or(str::is_empty) {
        tracing::info!("💡 未配置 admin.token，管理端仪表盘已关闭");
    }

    tracing::info!("✅ 启动检查完成");
    Ok(())
}

fn ensure_templates(config: &AppConfig) -> Result<(), AppError> {
    let dir = config.templates_path();
    let missing: Vec<&str> = REQUIRED_TEMPLATES
        .iter()
        .copied()
        .filter(|name| !dir.join(name).is_file())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Template(format!(
            "模板目录 {:?} 缺少: {}",
            dir,
            missing.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourcesConfig;

    fn bundled_config() -> AppConfig {
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

    #[test]
    fn bundled_resources_pass_checks() {
        run_startup_checks(&bundled_config()).expect("checks");
    }

    #[test]
    fn missing_templates_fail() {
        let mut cfg = bundled_config();
        cfg.resources.templates_path = "/nonexistent/templates".to_string();
        let err = run_startup_checks(&cfg).expect_err("should fail");
        assert!(matches!(err, AppError::Template(_)));
    }
}
