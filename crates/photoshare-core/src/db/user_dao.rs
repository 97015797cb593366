//! 用户数据访问层
//!
//! 供身份协作方使用：按邮箱查找用户、查找活跃用户、记录投票历史。

use rusqlite::{params, Row};

use crate::models::photo::{format_timestamp, now_utc};
use crate::models::{CreateUser, User};
use crate::utils::error::{AppError, AppResult};

use super::connection::{get_timestamp, Database};

/// 从数据库行映射到 User 结构
fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let votes_json: String = row.get("votes")?;
    let votes: Vec<i64> = serde_json::from_str(&votes_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(User {
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        is_admin: row.get::<_, i32>("is_admin")? != 0,
        is_active: row.get::<_, i32>("is_active")? != 0,
        is_authenticated: false,
        votes,
        created_at: get_timestamp(row, "created_at")?,
    })
}

impl Database {
    /// 创建用户
    pub fn create_user(&self, user: &CreateUser) -> AppResult<i64> {
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO users (name, email, is_admin, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.name,
                user.email.trim().to_lowercase(),
                user.is_admin as i32,
                format_timestamp(&now_utc()),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 根据 ID 获取用户
    pub fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            "SELECT * FROM users WHERE user_id = ?1",
            params![user_id],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// 根据邮箱获取用户（不区分大小写）
    pub fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            "SELECT * FROM users WHERE email = ?1",
            params![email.trim().to_lowercase()],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// 获取活跃用户，停用或不存在时返回 None
    pub fn get_active_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            "SELECT * FROM users WHERE user_id = ?1 AND is_active = 1",
            params![user_id],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// 设置用户是否活跃
    pub fn set_user_active(&self, user_id: i64, is_active: bool) -> AppResult<bool> {
        let conn = self.connection()?;
        let rows = conn.execute(
            "UPDATE users SET is_active = ?1 WHERE user_id = ?2",
            params![is_active as i32, user_id],
        )?;
        Ok(rows > 0)
    }

    /// 记录用户对照片的投票，已投过时返回 false
    pub fn register_vote(&self, user_id: i64, photo_id: i64) -> AppResult<bool> {
        self.transaction(|conn| {
            let votes_json: String = conn.query_row(
                "SELECT votes FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;

            let mut votes: Vec<i64> = serde_json::from_str(&votes_json)?;
            if votes.contains(&photo_id) {
                return Ok(false);
            }
            votes.push(photo_id);

            conn.execute(
                "UPDATE users SET votes = ?1 WHERE user_id = ?2",
                params![serde_json::to_string(&votes)?, user_id],
            )?;

            Ok(true)
        })
    }
}
