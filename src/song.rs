use serde::{Deserialize, Serialize};

/// 待渲染歌曲（调用方提供，本组件只读）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    /// 歌曲标识，同时作为缓存键：产物固定落在 `cache/{id}.png`
    pub id: String,
    /// 标题（超过 25 字符渲染时截断加省略号）
    pub title: String,
    /// 封面图 URL
    pub thumbnail: String,
    /// 预格式化的时长字符串，例如 "03:21"
    pub duration: String,
}
