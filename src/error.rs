use thiserror::Error;

/// 应用统一错误类型
///
/// 所有变体只携带 String，保证 `Clone`：moka 的 `try_get_with` 会把
/// 加载错误包在 `Arc` 里共享给被合并的并发调用方，取出时需要克隆。
#[derive(Error, Debug, Clone)]
pub enum ThumbError {
    /// 网络请求错误
    #[error("网络错误: {0}")]
    Network(String),
    /// 上游请求超时（包含 connect/read 等阶段）
    #[error("请求超时: {0}")]
    Timeout(String),
    /// 上游返回非成功状态码
    #[error("上游状态码异常: {0}")]
    Status(String),

    /// 图片解码错误
    #[error("图片解码错误: {0}")]
    Decode(String),

    /// 图像渲染错误
    #[error("图像渲染错误: {0}")]
    Render(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(String),

    /// 参数校验错误
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 内部错误（阻塞任务 join 失败等）
    #[error("内部错误: {0}")]
    Internal(String),
}

// =============== Error conversions for common external errors ===============

impl From<reqwest::Error> for ThumbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ThumbError::Timeout(err.to_string())
        } else if err.is_status() {
            ThumbError::Status(err.to_string())
        } else {
            ThumbError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ThumbError {
    fn from(err: std::io::Error) -> Self {
        ThumbError::Io(err.to_string())
    }
}

impl From<image::ImageError> for ThumbError {
    fn from(err: image::ImageError) -> Self {
        ThumbError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ThumbError;
    use std::time::Duration;

    async fn start_hanging_http_server() -> std::net::SocketAddr {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind tcp listener");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            loop {
                let (socket, _) = match listener.accept().await {
                    Ok(v) => v,
                    Err(_) => break,
                };
                tokio::spawn(async move {
                    // 不返回任何 HTTP 响应，触发客户端 read timeout。
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    drop(socket);
                });
            }
        });

        addr
    }

    #[tokio::test]
    async fn thumb_error_from_reqwest_timeout_is_timeout() {
        let addr = start_hanging_http_server().await;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("build reqwest client");

        let err = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .expect_err("expected timeout");
        assert!(err.is_timeout(), "expected reqwest timeout, got: {err}");

        let te: ThumbError = err.into();
        assert!(
            matches!(te, ThumbError::Timeout(_)),
            "expected ThumbError::Timeout, got: {te:?}"
        );
    }

    #[tokio::test]
    async fn thumb_error_from_connection_refused_is_network() {
        // 绑定后立刻释放端口，得到一个大概率无人监听的地址。
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind tcp listener");
            listener.local_addr().expect("local addr")
        };

        let client = reqwest::Client::new();
        let err = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .expect_err("expected connection error");

        let te: ThumbError = err.into();
        assert!(
            matches!(te, ThumbError::Network(_)),
            "expected ThumbError::Network, got: {te:?}"
        );
    }
}
