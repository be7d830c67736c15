use std::sync::Arc;

use crate::config::{AdminConfig, SiteSettings};
use crate::features::contact::ContactStore;
use crate::features::pages::{PageRenderer, SiteContent};
use crate::features::primer::{HeadHints, ResourcePrimer};

/// 聚合的应用共享状态（组合根在 main 中显式构建并注入各处理器）
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<SiteContent>,
    pub renderer: Arc<PageRenderer>,
    /// 会话级资源预取器（与 `head_hints` 共享同一份文档头部）
    pub primer: ResourcePrimer,
    pub head_hints: Arc<HeadHints>,
    pub contact_store: Arc<dyn ContactStore>,
    pub settings: Arc<SiteSettings>,
    pub admin: Arc<AdminConfig>,
    /// 业务接口前缀（页面中的表单提交地址依赖它）
    pub api_prefix: String,
}
