use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

use crate::error::PrimeError;

use super::host::{
    HoverTarget, ImageLoader, IntersectionEntry, ObserveControl, PrefetchDocument, PrefetchHint,
    VisibilityTarget,
};

/// 触发可见性回调所需的最小可见面积占比
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

/// 首屏关键图片
pub const CRITICAL_IMAGES: [&str; 3] = [
    "/images/hero-bg.jpg",
    "/images/logo.png",
    "/images/placeholder.jpg",
];

/// 顶层导航路由
pub const CRITICAL_ROUTES: [&str; 4] = ["/projects", "/about", "/contact", "/admin"];

/// 资源预取器：对图片与导航目标做去重的投机预取。
///
/// 两个集合只增不减，生命周期与实例一致；实例可廉价 clone，内部共享同一份状态。
#[derive(Clone)]
pub struct ResourcePrimer {
    inner: Arc<PrimerInner>,
}

struct PrimerInner {
    loader: Arc<dyn ImageLoader>,
    document: Arc<dyn PrefetchDocument>,
    primed_images: Mutex<HashSet<String>>,
    primed_routes: Mutex<HashSet<String>>,
    discarded_failures: AtomicU64,
}

impl ResourcePrimer {
    pub fn new(loader: Arc<dyn ImageLoader>, document: Arc<dyn PrefetchDocument>) -> Self {
        Self {
            inner: Arc::new(PrimerInner {
                loader,
                document,
                primed_images: Mutex::new(HashSet::new()),
                primed_routes: Mutex::new(HashSet::new()),
                discarded_failures: AtomicU64::new(0),
            }),
        }
    }

    /// 对尚未预取过的图片发起后台加载（不等待、不报错）。
    pub fn prime_images<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            let url = url.as_ref();
            if !insert_new(&self.inner.primed_images, url) {
                continue;
            }
            let load = self.inner.loader.load(url);
            self.spawn_speculative(url.to_string(), load);
        }
    }

    /// 为尚未预取过的路由挂载一条预取提示。
    pub fn prime_route(&self, route: &str) {
        if !insert_new(&self.inner.primed_routes, route) {
            return;
        }
        self.inner.document.attach_hint(PrefetchHint::prefetch(route));
        tracing::debug!(route, "已挂载路由预取提示");
    }

    /// 预取首屏关键图片与顶层导航路由。
    pub fn prime_critical_resources(&self) {
        self.prime_images(CRITICAL_IMAGES);
        for route in CRITICAL_ROUTES {
            self.prime_route(route);
        }
    }

    /// 元素被悬停时预取路由。
    ///
    /// 监听器不会被移除：它持有预取器的一个 clone，生命周期与元素一致。
    /// 多次触发是安全的，`prime_route` 自身去重。
    pub fn prime_on_hover(&self, element: &dyn HoverTarget, route: impl Into<String>) {
        let primer = self.clone();
        let route = route.into();
        element.on_pointer_enter(Box::new(move || primer.prime_route(&route)));
    }

    /// 元素可见面积首次达到阈值时调用一次 `callback`，随后停止观测。
    pub fn prime_on_visible<F>(&self, element: &dyn VisibilityTarget, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = Some(callback);
        element.observe(
            VISIBILITY_THRESHOLD,
            Box::new(move |entry| {
                if !is_qualifying(&entry) {
                    return ObserveControl::Continue;
                }
                // 宿主在 Unobserve 之后仍投递也只会执行一次
                if let Some(cb) = pending.take() {
                    cb();
                }
                ObserveControl::Unobserve
            }),
        );
    }

    pub fn is_image_primed(&self, url: &str) -> bool {
        contains(&self.inner.primed_images, url)
    }

    pub fn is_route_primed(&self, route: &str) -> bool {
        contains(&self.inner.primed_routes, route)
    }

    /// 已丢弃的投机加载失败次数
    pub fn discarded_failures(&self) -> u64 {
        self.inner.discarded_failures.load(Ordering::Relaxed)
    }

    fn spawn_speculative(&self, url: String, load: BoxFuture<'static, Result<(), PrimeError>>) {
        let inner = Arc::clone(&self.inner);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = load.await {
                        discard_failure(&inner, &url, e);
                    }
                });
            }
            Err(_) => discard_failure(&inner, &url, PrimeError::NoRuntime),
        }
    }
}

/// 投机加载失败的唯一出口：计数并记录 debug 日志，不向任何调用方传播。
fn discard_failure(inner: &PrimerInner, url: &str, err: PrimeError) {
    inner.discarded_failures.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(url, error = %err, "投机预取失败，已忽略");
}

fn is_qualifying(entry: &IntersectionEntry) -> bool {
    entry.is_intersecting && entry.intersection_ratio >= VISIBILITY_THRESHOLD
}

/// 检查并插入在同一临界区内完成，避免并发调用方重复发起。
fn insert_new(set: &Mutex<HashSet<String>>, key: &str) -> bool {
    let mut guard = set.lock().unwrap_or_else(|e| e.into_inner());
    if guard.contains(key) {
        return false;
    }
    guard.insert(key.to_string())
}

fn contains(set: &Mutex<HashSet<String>>, key: &str) -> bool {
    set.lock()
        .unwrap_or_else(|e| e.into_inner())
        .contains(key)
}
