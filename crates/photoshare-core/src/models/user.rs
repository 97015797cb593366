//! 用户与调用方身份模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 调用方身份（由会话层提供）
pub trait Identity {
    fn id(&self) -> i64;

    fn is_authenticated(&self) -> bool;

    fn is_admin(&self) -> bool;

    /// 是否已对该照片投过票
    fn has_voted(&self, photo_id: i64) -> bool;
}

/// 未登录的调用方
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Identity for Anonymous {
    fn id(&self) -> i64 {
        0
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_admin(&self) -> bool {
        false
    }

    fn has_voted(&self, _photo_id: i64) -> bool {
        false
    }
}

/// 用户
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "id")]
    pub user_id: i64,
    /// 显示名
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    /// 会话层在认证成功后设置，不持久化
    #[serde(skip)]
    pub is_authenticated: bool,
    /// 已投票的照片ID
    #[serde(default)]
    pub votes: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 标记为已认证（会话层使用）
    pub fn authenticated(mut self) -> Self {
        self.is_authenticated = true;
        self
    }
}

impl Identity for User {
    fn id(&self) -> i64 {
        self.user_id
    }

    fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn has_voted(&self, photo_id: i64) -> bool {
        self.votes.contains(&photo_id)
    }
}

/// 用于创建新用户的输入结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}
