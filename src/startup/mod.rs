/// 站点内容加载器（site.yaml / projects.yaml）
pub mod content_loader;
/// 启动检查
pub mod checks;

pub use checks::run_startup_checks;
pub use content_loader::load_site_content;
