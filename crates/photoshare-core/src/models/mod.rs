//! PhotoShare 数据模型模块
//!
//! 包含所有数据结构定义以及分页计算

pub mod photo;
pub mod settings;
pub mod tag;
pub mod user;

// 重新导出常用类型
pub use photo::{Permissions, Photo, PhotoDetail};
pub use settings::{AppSettings, ImportSettings, ThumbnailSettings};
pub use tag::{Tag, TagCount};
pub use user::{Anonymous, CreateUser, Identity, User};

/// 每页照片数量（对外契约的一部分，调用方不得假设其他值）
pub const PAGE_SIZE: i64 = 12;

/// 页码转换为偏移量
///
/// 不做下界校验：`page_num <= 0` 会得到零或负偏移，原样交给存储层。
pub fn page_offset(page_num: i64) -> i64 {
    (page_num - 1) * PAGE_SIZE
}

/// 总数转换为总页数，`total == 0` 时为 0
pub fn num_pages(total: i64) -> i64 {
    ((total as f64) / (PAGE_SIZE as f64)).ceil() as i64
}

/// 分页的照片列表
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoList {
    #[serde(rename = "photos")]
    pub items: Vec<Photo>,
    pub total: i64,
    /// 当前页码（1 起始，由调用方提供，不做截断）
    pub current_page: i64,
    pub num_pages: i64,
}

impl PhotoList {
    pub fn new(items: Vec<Photo>, total: i64, page_num: i64) -> Self {
        Self {
            items,
            total,
            current_page: page_num,
            num_pages: num_pages(total),
        }
    }

    /// 空结果（如空搜索词）
    pub fn empty(page_num: i64) -> Self {
        Self::new(Vec::new(), 0, page_num)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 照片列表排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhotoOrder {
    /// 按创建时间倒序
    #[default]
    Newest,
    /// 按得票（赞成 - 反对）倒序
    Votes,
}

impl PhotoOrder {
    /// 解析排序参数，"votes" 以外的值一律回退为按创建时间
    pub fn from_param(order_by: &str) -> Self {
        match order_by {
            "votes" => PhotoOrder::Votes,
            _ => PhotoOrder::Newest,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            PhotoOrder::Newest => "ORDER BY created_at DESC, photo_id DESC",
            PhotoOrder::Votes => {
                "ORDER BY (up_votes - down_votes) DESC, created_at DESC, photo_id DESC"
            }
        }
    }
}
