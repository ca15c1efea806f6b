//! 缩略图渲染器：下载封面、分层合成、产物落盘的总装配。

pub mod layout;

mod artwork;
mod overlay;
mod surface;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use resvg::usvg::fontdb;

use crate::config::ThumbConfig;
use crate::error::ThumbError;
use crate::http;
use crate::song::Song;

/// 默认画布尺寸（宽 × 高）
pub const DEFAULT_CANVAS: (u32, u32) = (1280, 720);

/// 渲染产物的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// 磁盘缓存命中，未发起网络请求
    CacheHit,
    /// 本次调用落盘的新渲染
    Fresh,
}

/// 一次成功渲染的结果
#[derive(Debug, Clone)]
pub struct Rendered {
    /// 产物路径，固定为 `cache/{id}.png`
    pub path: PathBuf,
    pub outcome: RenderOutcome,
}

/// 缩略图渲染器。构造一次后可并发共享。
///
/// 内部持有复用的 HTTP Client 与只读字体库；
/// 同 id 的并发请求通过 moka 去重，共享同一个渲染 future。
pub struct ThumbnailRenderer {
    config: ThumbConfig,
    fonts: Arc<fontdb::Database>,
    client: reqwest::Client,
    memo: moka::future::Cache<String, PathBuf>,
}

impl ThumbnailRenderer {
    pub fn new(config: ThumbConfig) -> Result<Self, ThumbError> {
        let client = http::artwork_client(config.http.timeout())?;
        let fonts = overlay::load_font_db(&config.fonts_dir());
        let memo = moka::future::Cache::builder()
            .time_to_live(Duration::from_secs(config.render.dedup_ttl_secs))
            .build();
        Ok(Self {
            config,
            fonts,
            client,
            memo,
        })
    }

    /// 生成缩略图，任何失败都回退为默认图路径（本方法不返回错误）。
    pub async fn generate(&self, song: &Song) -> PathBuf {
        match self.try_generate(song).await {
            Ok(rendered) => rendered.path,
            Err(e) => {
                tracing::warn!("缩略图生成失败 (id={})，回退默认图: {}", song.id, e);
                self.config.fallback_path()
            }
        }
    }

    /// 按默认画布尺寸生成，返回带来源标记的结果。
    pub async fn try_generate(&self, song: &Song) -> Result<Rendered, ThumbError> {
        self.try_generate_sized(song, DEFAULT_CANVAS).await
    }

    /// 按指定画布尺寸生成。缓存命中直接返回既有路径。
    pub async fn try_generate_sized(
        &self,
        song: &Song,
        canvas: (u32, u32),
    ) -> Result<Rendered, ThumbError> {
        if song.id.trim().is_empty() {
            return Err(ThumbError::Validation("歌曲 id 不能为空".to_string()));
        }
        if canvas.0 == 0 || canvas.1 == 0 {
            return Err(ThumbError::Validation(format!(
                "非法画布尺寸: {}x{}",
                canvas.0, canvas.1
            )));
        }

        let output = self.config.cache_dir().join(format!("{}.png", song.id));
        if tokio::fs::try_exists(&output).await? {
            tracing::debug!("缩略图缓存命中: {}", output.display());
            return Ok(Rendered {
                path: output,
                outcome: RenderOutcome::CacheHit,
            });
        }

        let path = self
            .memo
            .try_get_with(song.id.clone(), self.render_uncached(song, canvas, output))
            .await
            .map_err(|e: Arc<ThumbError>| (*e).clone())?;
        // 产物已落盘，后续调用由磁盘检查服务；清掉 memo 项，
        // 避免产物被外部删除后还返回陈旧路径
        self.memo.invalidate(&song.id).await;
        Ok(Rendered {
            path,
            outcome: RenderOutcome::Fresh,
        })
    }

    async fn render_uncached(
        &self,
        song: &Song,
        canvas: (u32, u32),
        output: PathBuf,
    ) -> Result<PathBuf, ThumbError> {
        // 排队等待期间可能已被并发任务写出
        if tokio::fs::try_exists(&output).await? {
            return Ok(output);
        }

        let total = Instant::now();
        let temp_path = self.config.cache_dir().join(format!("temp_{}.jpg", song.id));
        let art_guard = artwork::fetch_artwork(&self.client, &song.thumbnail, temp_path).await?;
        let art_bytes = tokio::fs::read(art_guard.path()).await?;
        let t_fetch = total.elapsed();

        let fonts_cfg = self.config.fonts.clone();
        let font_db = Arc::clone(&self.fonts);
        let optimize_speed = self.config.render.optimize_speed;
        let title = song.title.clone();
        let duration = song.duration.clone();

        // CPU 密集的解码/合成/栅格化移出异步运行时
        let png_bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ThumbError> {
            let t0 = Instant::now();
            let art_src = image::load_from_memory(&art_bytes)?;
            let t_decode = t0.elapsed();

            let plan = layout::ThumbLayout::new(canvas.0, canvas.1);
            let background =
                surface::background_raster(&art_src, canvas.0, canvas.1, optimize_speed);
            let art = surface::art_raster(&art_src, plan.art_size as u32, optimize_speed);
            let background_uri = surface::jpeg_data_uri(&background)?;
            let art_uri = surface::jpeg_data_uri(&art)?;
            let t_raster = t0.elapsed();

            let svg = overlay::compose_svg(
                &plan,
                &fonts_cfg,
                &title,
                &duration,
                &background_uri,
                &art_uri,
            )?;
            let png =
                overlay::rasterize_to_png(&svg, font_db, &fonts_cfg.bold_family, optimize_speed)?;

            tracing::debug!(
                "渲染分段: 解码={:?}, 底图/封面={:?}, SVG栅格化={:?}",
                t_decode,
                t_raster - t_decode,
                t0.elapsed() - t_raster
            );
            Ok(png)
        })
        .await
        .map_err(|e| ThumbError::Internal(format!("渲染任务 join 失败: {e}")))??;

        tokio::fs::write(&output, &png_bytes).await?;
        tracing::info!(
            "缩略图已生成: {} (下载 {:?}, 总耗时 {:?})",
            output.display(),
            t_fetch,
            total.elapsed()
        );

        // 产物落盘之后才清理临时封面
        drop(art_guard);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_song_id_is_rejected() {
        let renderer = ThumbnailRenderer::new(ThumbConfig::default()).expect("renderer");
        let song = Song {
            id: "  ".to_string(),
            title: "T".to_string(),
            thumbnail: "http://127.0.0.1:1/x.jpg".to_string(),
            duration: "01:00".to_string(),
        };
        assert!(matches!(
            renderer.try_generate(&song).await,
            Err(ThumbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn zero_canvas_is_rejected() {
        let renderer = ThumbnailRenderer::new(ThumbConfig::default()).expect("renderer");
        let song = Song {
            id: "z".to_string(),
            title: "T".to_string(),
            thumbnail: "http://127.0.0.1:1/x.jpg".to_string(),
            duration: "01:00".to_string(),
        };
        assert!(matches!(
            renderer.try_generate_sized(&song, (0, 720)).await,
            Err(ThumbError::Validation(_))
        ));
    }
}
