use reqwest::Client;
use std::time::Duration;

/// 按配置超时构造拉取封面用的 HTTP Client。
///
/// 渲染器在构造期调用一次并持有复用（统一连接池/Keep-Alive），
/// 避免每次请求重复创建；`Client` 本身是线程安全的。
pub fn artwork_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    if timeout.is_zero() {
        return Client::builder().build();
    }
    Client::builder().timeout(timeout).build()
}
