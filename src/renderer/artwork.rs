use std::path::{Path, PathBuf};

use crate::error::ThumbError;

/// 封面临时下载文件的 RAII 守卫。
///
/// 无论渲染成功或中途出错，守卫析构时都会删除临时文件，
/// 避免失败路径在 cache 目录里残留 temp_*.jpg。
pub struct TempDownload {
    path: PathBuf,
}

impl TempDownload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDownload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("清理临时封面失败 '{}': {}", self.path.display(), e);
            }
        }
    }
}

/// 下载封面到临时路径，返回持有该路径的守卫。
///
/// 非 2xx 状态视为失败（映射为 [`ThumbError::Status`]），超时映射为 [`ThumbError::Timeout`]。
pub async fn fetch_artwork(
    client: &reqwest::Client,
    url: &str,
    temp_path: PathBuf,
) -> Result<TempDownload, ThumbError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    tokio::fs::write(&temp_path, &bytes).await?;
    tracing::debug!("封面已下载: {} ({} 字节)", temp_path.display(), bytes.len());

    Ok(TempDownload { path: temp_path })
}

#[cfg(test)]
mod tests {
    use super::TempDownload;

    #[test]
    fn guard_removes_file_on_drop() {
        let path = std::env::temp_dir().join(format!("thumbgen_guard_{}.jpg", std::process::id()));
        std::fs::write(&path, b"jpeg bytes").expect("write temp file");
        assert!(path.exists());

        drop(TempDownload { path: path.clone() });
        assert!(!path.exists());
    }

    #[test]
    fn guard_tolerates_missing_file() {
        let path = std::env::temp_dir().join("thumbgen_guard_never_created.jpg");
        // 文件不存在时析构不应 panic
        drop(TempDownload { path });
    }
}
