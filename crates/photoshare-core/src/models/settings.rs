//! 应用程序设置数据模型

use serde::{Deserialize, Serialize};

/// 缩略图设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailSettings {
    /// 上传时是否生成缩略图
    pub enabled: bool,
    /// 缩略图最大边长（像素）
    pub size: u32,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 300,
        }
    }
}

/// 批量导入设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSettings {
    /// 允许导入的扩展名（小写，不含点）
    pub allowed_extensions: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![String::from("jpg"), String::from("png")],
        }
    }
}

/// 应用程序设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// 日志级别（可被 RUST_LOG 覆盖）
    pub log_level: String,
    /// 是否写入滚动日志文件
    pub log_to_file: bool,
    /// 缩略图设置
    pub thumbnail: ThumbnailSettings,
    /// 导入设置
    pub import: ImportSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            log_to_file: false,
            thumbnail: ThumbnailSettings::default(),
            import: ImportSettings::default(),
        }
    }
}
