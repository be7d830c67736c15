use once_cell::sync::OnceCell;
use reqwest::Client;
use std::time::Duration;

/// 全局复用的 HTTP Client（统一连接池/Keep-Alive），避免每次请求重复创建。
///
/// 按用途拆分 timeout：投机预热要尽快放弃，文档数据库写入允许更长等待。
static CLIENT_SPECULATIVE: OnceCell<Client> = OnceCell::new();
static CLIENT_UPSTREAM: OnceCell<Client> = OnceCell::new();

/// timeout=10s 的 HTTP Client，用于图片预热等“尽力而为”的请求。
pub fn client_speculative() -> Result<&'static Client, reqwest::Error> {
    CLIENT_SPECULATIVE
        .get_or_try_init(|| Client::builder().timeout(Duration::from_secs(10)).build())
}

/// timeout=30s 的 HTTP Client，用于联系表单写入托管文档数据库。
pub fn client_upstream() -> Result<&'static Client, reqwest::Error> {
    CLIENT_UPSTREAM.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
    })
}
