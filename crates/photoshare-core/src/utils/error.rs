//! PhotoShare 错误处理模块
//!
//! 定义核心库错误类型

use serde::Serialize;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误（原样向上传播）
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 图像处理错误
    #[error("图像处理错误: {0}")]
    Image(#[from] image::ImageError),

    /// JSON 序列化错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 路径无效
    #[error("路径无效: {0}")]
    InvalidPath(String),

    /// 不支持的格式
    #[error("不支持的格式: {0}")]
    UnsupportedFormat(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 记录不存在
    #[error("记录不存在: {0}")]
    NotFound(String),

    /// 通用错误
    #[error("{0}")]
    General(String),
}

/// 返回给外部调用方（HTTP 层等）的错误包装
#[derive(Debug, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl CommandError {
    /// 对应的 HTTP 状态码
    pub fn status(&self) -> u16 {
        match self.code.as_str() {
            "E_NOT_FOUND" => 404,
            "E_PATH_INVALID" | "E_UNSUPPORTED_FORMAT" => 400,
            _ => 500,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::Database(_) => "E_DB_ERROR",
            AppError::Io(_) => "E_IO_ERROR",
            AppError::Image(_) => "E_IMAGE_ERROR",
            AppError::Json(_) => "E_JSON_ERROR",
            AppError::InvalidPath(_) => "E_PATH_INVALID",
            AppError::UnsupportedFormat(_) => "E_UNSUPPORTED_FORMAT",
            AppError::Config(_) => "E_CONFIG",
            AppError::NotFound(_) => "E_NOT_FOUND",
            AppError::General(_) => "E_GENERAL",
        };

        CommandError {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

/// 应用程序结果类型别名
pub type AppResult<T> = Result<T, AppError>;
