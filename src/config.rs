use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 缓存目录：临时下载（temp_{id}.jpg）与最终产物（{id}.png）均落在这里。
    /// 目录本身由调用方保证存在。
    #[serde(default = "CacheConfig::default_dir")]
    pub dir: String,
    /// 渲染失败时返回的兜底路径
    #[serde(default = "CacheConfig::default_fallback")]
    pub fallback_path: String,
}

impl CacheConfig {
    fn default_dir() -> String {
        "cache".to_string()
    }
    fn default_fallback() -> String {
        "default_thumb.png".to_string()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            fallback_path: Self::default_fallback(),
        }
    }
}

/// 字体配置
///
/// 两个字族在渲染器构造时一次性载入全局字体库，之后所有调用共享只读句柄。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontsConfig {
    /// 字体文件目录（ttf/otf）
    #[serde(default = "FontsConfig::default_dir")]
    pub dir: String,
    /// 标题粗体字族名
    #[serde(default = "FontsConfig::default_bold_family")]
    pub bold_family: String,
    /// 细体字族名（艺人名与时间标签）
    #[serde(default = "FontsConfig::default_light_family")]
    pub light_family: String,
}

impl FontsConfig {
    fn default_dir() -> String {
        "resources/fonts".to_string()
    }
    fn default_bold_family() -> String {
        "Raleway".to_string()
    }
    fn default_light_family() -> String {
        "Inter".to_string()
    }
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            bold_family: Self::default_bold_family(),
            light_family: Self::default_light_family(),
        }
    }
}

/// HTTP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// 拉取封面的请求超时（秒）
    #[serde(default = "HttpConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl HttpConfig {
    fn default_timeout() -> u64 {
        30
    }

    /// 获取请求超时时间
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 渲染配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// 是否优先速度渲染（OptimizeSpeed），提升栅格化性能，可能略降画质
    #[serde(default)]
    pub optimize_speed: bool,
    /// 同 id 并发去重的 memo TTL（秒）
    #[serde(default = "RenderConfig::default_dedup_ttl")]
    pub dedup_ttl_secs: u64,
}

impl RenderConfig {
    fn default_dedup_ttl() -> u64 {
        60
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            optimize_speed: false,
            dedup_ttl_secs: Self::default_dedup_ttl(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（RUST_LOG 未设置时的兜底）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThumbConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub fonts: FontsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ThumbConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    ///
    /// 配置文件缺省时退回默认值，便于库内嵌使用与测试。
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let builder = ConfigBuilder::builder()
            // 加载配置文件（允许缺省）
            .add_source(File::from(config_path).required(false))
            // 支持环境变量覆盖，例如：APP_CACHE_DIR
            .add_source(
                Environment::with_prefix("APP")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取配置文件路径
    fn get_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// 缓存目录路径
    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.cache.dir)
    }

    /// 字体目录路径
    pub fn fonts_dir(&self) -> PathBuf {
        PathBuf::from(&self.fonts.dir)
    }

    /// 兜底路径
    pub fn fallback_path(&self) -> PathBuf {
        PathBuf::from(&self.cache.fallback_path)
    }
}
