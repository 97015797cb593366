//! 照片数据模型

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::user::Identity;

/// 照片信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// 照片ID（插入前为 0）
    #[serde(rename = "id")]
    pub photo_id: i64,
    /// 上传者ID
    pub owner_id: i64,
    /// 创建时间（插入时写入，之后不变）
    pub created_at: DateTime<Utc>,
    /// 标题
    pub title: String,
    /// 存储文件名（由存储服务生成）
    #[serde(rename = "photo")]
    pub filename: String,
    /// 标签（单独存储在 photo_tags 中）
    #[serde(default)]
    pub tags: Vec<String>,
    /// 赞成票
    pub up_votes: i64,
    /// 反对票
    pub down_votes: i64,
}

impl Photo {
    /// 创建新照片记录（用于插入前）
    pub fn new(owner_id: i64, title: String, filename: String, tags: Vec<String>) -> Self {
        Self {
            photo_id: 0, // 插入后由数据库分配
            owner_id,
            created_at: now_utc(),
            title,
            filename,
            tags,
            up_votes: 0,
            down_votes: 0,
        }
    }

    /// 得票分数
    pub fn score(&self) -> i64 {
        self.up_votes - self.down_votes
    }

    /// 管理员或上传者可以编辑
    pub fn can_edit(&self, caller: Option<&dyn Identity>) -> bool {
        match caller {
            Some(user) if user.is_authenticated() => {
                user.is_admin() || user.id() == self.owner_id
            }
            _ => false,
        }
    }

    pub fn can_delete(&self, caller: Option<&dyn Identity>) -> bool {
        self.can_edit(caller)
    }

    /// 已登录、不是上传者且尚未投票时可以投票
    pub fn can_vote(&self, caller: Option<&dyn Identity>) -> bool {
        match caller {
            Some(user) if user.is_authenticated() => {
                user.id() != self.owner_id && !user.has_voted(self.photo_id)
            }
            _ => false,
        }
    }

    /// 计算调用方对该照片的权限
    pub fn permissions(&self, caller: Option<&dyn Identity>) -> Permissions {
        Permissions {
            edit: self.can_edit(caller),
            delete: self.can_delete(caller),
            vote: self.can_vote(caller),
        }
    }
}

/// 针对单次请求计算出的权限（不持久化）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub edit: bool,
    pub delete: bool,
    pub vote: bool,
}

/// 照片详情
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDetail {
    #[serde(flatten)]
    pub photo: Photo,
    /// 上传者显示名
    pub owner_name: String,
    #[serde(rename = "perms")]
    pub permissions: Permissions,
}

/// 当前 UTC 时间，截断到微秒以保证存储往返一致
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 定宽 RFC 3339 格式，保证按文本排序即按时间排序
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 解析存储的时间字符串
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
