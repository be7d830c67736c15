use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::Client;

use crate::error::PrimeError;

use super::host::ImageLoader;

/// 通过 HTTP GET 回源预热图片（CDN/静态文件缓存），响应体读取后直接丢弃。
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: Client,
    origin: String,
}

impl HttpImageLoader {
    pub fn new(client: Client, origin: impl Into<String>) -> Self {
        Self {
            client,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// 绝对地址原样使用，站内路径拼接到 origin 之后。
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        if url.starts_with('/') {
            format!("{}{}", self.origin, url)
        } else {
            format!("{}/{}", self.origin, url)
        }
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, url: &str) -> BoxFuture<'static, Result<(), PrimeError>> {
        let client = self.client.clone();
        let target = self.resolve(url);
        async move {
            let resp = client.get(&target).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(PrimeError::Status(status.as_u16()));
            }
            let bytes = resp.bytes().await?;
            tracing::trace!(url = %target, size = bytes.len(), "图片预热完成");
            Ok(())
        }
        .boxed()
    }
}
