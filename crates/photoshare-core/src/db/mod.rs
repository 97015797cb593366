//! PhotoShare 数据库模块
//!
//! 包含数据库连接管理和数据访问层

pub mod schema;
pub mod connection;
pub mod photo_dao;
pub mod tag_dao;
pub mod user_dao;
pub mod search;

// 重新导出常用类型
pub use connection::{Database, LOWER_FN};
pub use search::{SearchQuery, MAX_SEARCH_TERMS};
