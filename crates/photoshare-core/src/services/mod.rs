//! PhotoShare 服务模块
//!
//! 包含照片目录、文件存储、清理队列、批量导入和设置服务

pub mod catalog;
pub mod cleanup;
pub mod importer;
pub mod settings;
pub mod storage;

// 重新导出常用类型
pub use catalog::PhotoCatalog;
pub use cleanup::CleanupQueue;
pub use importer::{ImportReport, Importer};
pub use settings::SettingsManager;
pub use storage::{content_type_for, extension_for, FileStorage, PhotoStorage, SUPPORTED_CONTENT_TYPES};
