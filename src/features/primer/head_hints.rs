use std::sync::RwLock;

use super::host::{PrefetchDocument, PrefetchHint};

/// 服务端的“文档头部”：收集预取提示，由页面渲染为 `<link rel="prefetch">`。
#[derive(Debug, Default)]
pub struct HeadHints {
    hints: RwLock<Vec<PrefetchHint>>,
}

impl HeadHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前已挂载的提示（按挂载顺序）
    pub fn snapshot(&self) -> Vec<PrefetchHint> {
        self.hints
            .read()
            .map(|g| g.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.hints.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PrefetchDocument for HeadHints {
    fn attach_hint(&self, hint: PrefetchHint) {
        let mut guard = self.hints.write().unwrap_or_else(|e| e.into_inner());
        guard.push(hint);
    }
}
