//! PhotoShare 工具模块
//!
//! 包含错误类型和通用工具函数

pub mod error;
pub mod sanitize;

pub use error::*;
pub use sanitize::*;
