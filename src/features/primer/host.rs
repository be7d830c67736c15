//! 预取器与宿主环境之间的边界。
//!
//! 预取器本身不关心“图片如何下载”“提示挂到哪里”“悬停/可见性事件从哪来”，
//! 这些能力由宿主通过以下 trait 提供：服务端使用 HTTP 回源与页面头部提示，
//! 测试使用可计数的假实现。

use futures_util::future::BoxFuture;
use serde::Serialize;

use crate::error::PrimeError;

/// 文档级预取提示（渲染为 `<link rel="prefetch" href="...">`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefetchHint {
    pub rel: &'static str,
    pub href: String,
}

impl PrefetchHint {
    pub fn prefetch(href: impl Into<String>) -> Self {
        Self {
            rel: "prefetch",
            href: href.into(),
        }
    }
}

/// 图片加载原语。
///
/// `load` 的同步部分即“开始加载”；返回的 future 在后台运行，结果只用于日志。
pub trait ImageLoader: Send + Sync {
    fn load(&self, url: &str) -> BoxFuture<'static, Result<(), PrimeError>>;
}

/// 可挂载预取提示的文档。
pub trait PrefetchDocument: Send + Sync {
    fn attach_hint(&self, hint: PrefetchHint);
}

pub type PointerEnterHandler = Box<dyn Fn() + Send + Sync>;

/// 支持 pointer-enter 事件注册的元素。
pub trait HoverTarget {
    fn on_pointer_enter(&self, handler: PointerEnterHandler);
}

/// 一次相交观测结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    /// 可见面积占比（0.0 ~ 1.0）
    pub intersection_ratio: f64,
}

/// 回调告知宿主是否继续观测该元素。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveControl {
    Continue,
    Unobserve,
}

pub type IntersectionCallback = Box<dyn FnMut(IntersectionEntry) -> ObserveControl + Send>;

/// 支持视口相交观测的元素。
///
/// 宿主在每次跨越 `threshold` 时调用回调；回调返回 `Unobserve` 后宿主必须停止投递。
pub trait VisibilityTarget {
    fn observe(&self, threshold: f64, callback: IntersectionCallback);
}
