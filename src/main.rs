use clap::Parser;
use tracing_subscriber::EnvFilter;

use thumbgen::{Song, ThumbConfig, ThumbnailRenderer};

/// 为歌曲生成「正在播放」缩略图并输出产物路径
#[derive(Parser, Debug)]
#[command(name = "thumbgen", version, about)]
struct Cli {
    /// 歌曲 id，同时作为缓存键
    #[arg(long)]
    id: String,

    /// 歌曲标题
    #[arg(long)]
    title: String,

    /// 封面图 URL
    #[arg(long)]
    thumbnail: String,

    /// 预格式化的时长字符串，例如 03:21
    #[arg(long, default_value = "00:00")]
    duration: String,

    /// 画布尺寸，格式 WxH（默认 1280x720）
    #[arg(long, value_parser = parse_canvas)]
    canvas: Option<(u32, u32)>,
}

fn parse_canvas(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("画布尺寸格式应为 WxH: '{s}'"))?;
    let w: u32 = w.parse().map_err(|_| format!("非法宽度: '{w}'"))?;
    let h: u32 = h.parse().map_err(|_| format!("非法高度: '{h}'"))?;
    Ok((w, h))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ThumbConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("配置加载失败: {e}");
            std::process::exit(1);
        }
    };

    let default_filter = format!("thumbgen={}", config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    // 缓存目录由调用方保证存在
    if let Err(e) = std::fs::create_dir_all(config.cache_dir()) {
        eprintln!("创建缓存目录失败: {e}");
        std::process::exit(1);
    }

    let fallback = config.fallback_path();
    let renderer = match ThumbnailRenderer::new(config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("渲染器初始化失败: {e}");
            std::process::exit(1);
        }
    };

    let song = Song {
        id: cli.id,
        title: cli.title,
        thumbnail: cli.thumbnail,
        duration: cli.duration,
    };

    let path = match cli.canvas {
        Some(canvas) => match renderer.try_generate_sized(&song, canvas).await {
            Ok(rendered) => rendered.path,
            Err(e) => {
                tracing::warn!("缩略图生成失败 (id={})，回退默认图: {}", song.id, e);
                fallback
            }
        },
        None => renderer.generate(&song).await,
    };

    println!("{}", path.display());
}

#[cfg(test)]
mod tests {
    use super::parse_canvas;

    #[test]
    fn canvas_argument_parses_wxh() {
        assert_eq!(parse_canvas("1280x720"), Ok((1280, 720)));
        assert!(parse_canvas("1280").is_err());
        assert!(parse_canvas("axb").is_err());
    }
}
