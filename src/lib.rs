/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// HTTP Client 复用工具
pub mod http;

/// 歌曲输入模型
pub mod song;

/// 缩略图渲染模块
pub mod renderer;

// 导出常用类型供外部使用
pub use config::ThumbConfig;
pub use error::ThumbError;
pub use renderer::{RenderOutcome, Rendered, ThumbnailRenderer};
pub use song::Song;
