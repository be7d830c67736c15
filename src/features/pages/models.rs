use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 公司介绍
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub tagline: String,
    /// 关于页段落
    #[serde(default)]
    pub about: Vec<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// 首页亮点数字，如 “成交套数”
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub slug: String,
    pub title: String,
    pub summary: String,
}

/// 项目状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Upcoming => "Upcoming",
            ProjectStatus::Ongoing => "Ongoing",
            ProjectStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub location: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub price_label: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    /// 封面图（站内路径或绝对地址）
    pub image: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// 首页精选
    #[serde(default)]
    pub featured: bool,
}

/// 站点内容（启动时从 YAML 加载，运行期只读）
#[derive(Debug, Clone, Serialize)]
pub struct SiteContent {
    pub company: Company,
    pub services: Vec<Service>,
    pub projects: Vec<Project>,
}

impl SiteContent {
    pub fn project(&self, slug: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.slug == slug)
    }

    pub fn featured_projects(&self) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.featured).collect()
    }

    /// 按状态统计项目数（管理端仪表盘）
    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for p in &self.projects {
            *counts.entry(p.status.label()).or_insert(0) += 1;
        }
        counts
    }

    pub fn project_images(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(|p| p.image.as_str())
    }
}
