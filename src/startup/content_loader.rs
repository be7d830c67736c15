use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::features::pages::models::{Company, Project, Service, SiteContent};

#[derive(Debug, Deserialize)]
struct SiteFile {
    company: Company,
    #[serde(default)]
    services: Vec<Service>,
}

#[derive(Debug, Deserialize)]
struct ProjectsFile {
    #[serde(default)]
    projects: Vec<Project>,
}

/// 从 content 目录加载 `site.yaml` 与 `projects.yaml`
pub fn load_site_content(content_path: &Path) -> Result<SiteContent, AppError> {
    if !content_path.exists() {
        return Err(AppError::Content(format!(
            "content 目录不存在: {:?}",
            content_path
        )));
    }

    let site: SiteFile = read_yaml(&content_path.join("site.yaml"))?;
    let projects: ProjectsFile = read_yaml(&content_path.join("projects.yaml"))?;

    let mut seen = HashSet::new();
    for p in &projects.projects {
        if p.slug.trim().is_empty() {
            return Err(AppError::Content(format!("项目 '{}' 缺少 slug", p.title)));
        }
        if !is_valid_slug(&p.slug) {
            return Err(AppError::Content(format!("项目 slug 含非法字符: {}", p.slug)));
        }
        if !seen.insert(p.slug.as_str()) {
            return Err(AppError::Content(format!("项目 slug 重复: {}", p.slug)));
        }
    }

    tracing::info!(
        "站点内容加载完成: {} 个服务, {} 个项目",
        site.services.len(),
        projects.projects.len()
    );

    Ok(SiteContent {
        company: site.company,
        services: site.services,
        projects: projects.projects,
    })
}

fn read_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Content(format!("打开 {:?} 失败: {}", path, e)))?;
    serde_yaml::from_reader(file)
        .map_err(|e| AppError::Content(format!("解析 {:?} 失败: {}", path, e)))
}

fn is_valid_slug(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
