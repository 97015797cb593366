//! 照片数据访问层

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::photo::format_timestamp;
use crate::models::{Photo, PhotoOrder};
use crate::utils::error::{AppError, AppResult};

use super::connection::{get_timestamp, Database};
use super::search::SearchQuery;
use super::tag_dao::tag_names_for_photo;

/// 从数据库行映射到 Photo 结构（标签不在行内，需单独读取）
fn row_to_photo(row: &Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        photo_id: row.get("photo_id")?,
        owner_id: row.get("owner_id")?,
        created_at: get_timestamp(row, "created_at")?,
        title: row.get("title")?,
        filename: row.get("filename")?,
        tags: Vec::new(),
        up_votes: row.get("up_votes")?,
        down_votes: row.get("down_votes")?,
    })
}

/// 插入照片行，返回新分配的 ID
pub(crate) fn insert_photo_row(conn: &Connection, photo: &Photo) -> AppResult<i64> {
    conn.execute(
        r#"
        INSERT INTO photos (owner_id, created_at, title, filename, up_votes, down_votes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            photo.owner_id,
            format_timestamp(&photo.created_at),
            photo.title,
            photo.filename,
            photo.up_votes,
            photo.down_votes,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// 删除照片行，返回被删除行的存储文件名（关联的 photo_tags 由外键级联删除）
pub(crate) fn delete_photo_row(conn: &Connection, photo_id: i64) -> AppResult<Option<String>> {
    let filename = conn
        .query_row(
            "DELETE FROM photos WHERE photo_id = ?1 RETURNING filename",
            params![photo_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(filename)
}

impl Database {
    // ==================== Photo CRUD ====================

    /// 创建照片记录（不含标签）
    pub fn create_photo(&self, photo: &Photo) -> AppResult<i64> {
        let conn = self.connection()?;
        insert_photo_row(&conn, photo)
    }

    /// 根据 ID 获取照片，不存在时返回 None
    pub fn get_photo(&self, photo_id: i64) -> AppResult<Option<Photo>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            "SELECT * FROM photos WHERE photo_id = ?1",
            params![photo_id],
            row_to_photo,
        );

        match result {
            Ok(photo) => Ok(Some(photo)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// 获取照片、上传者名称和标签
    pub fn get_photo_with_owner(&self, photo_id: i64) -> AppResult<Option<(Photo, String)>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            r#"
            SELECT p.*, u.name AS owner_name
            FROM photos p
            INNER JOIN users u ON u.user_id = p.owner_id
            WHERE p.photo_id = ?1
            "#,
            params![photo_id],
            |row| Ok((row_to_photo(row)?, row.get::<_, String>("owner_name")?)),
        );

        let (mut photo, owner_name) = match result {
            Ok(found) => found,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(AppError::Database(e)),
        };

        photo.tags = tag_names_for_photo(&conn, photo.photo_id)?;

        Ok(Some((photo, owner_name)))
    }

    /// 更新标题和票数（不修改标签、文件名、上传者和创建时间）
    pub fn update_photo(&self, photo: &Photo) -> AppResult<bool> {
        let conn = self.connection()?;

        let rows = conn.execute(
            "UPDATE photos SET title = ?1, up_votes = ?2, down_votes = ?3 WHERE photo_id = ?4",
            params![photo.title, photo.up_votes, photo.down_votes, photo.photo_id],
        )?;

        Ok(rows > 0)
    }

    /// 照片总数
    pub fn count_photos(&self) -> AppResult<i64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 某个用户的照片数
    pub fn count_photos_by_owner(&self, owner_id: i64) -> AppResult<i64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 获取一页照片
    pub fn list_photos(&self, order: PhotoOrder, limit: i64, offset: i64) -> AppResult<Vec<Photo>> {
        let conn = self.connection()?;

        let sql = format!("SELECT * FROM photos {} LIMIT ?1 OFFSET ?2", order.as_sql());

        let mut stmt = conn.prepare(&sql)?;
        let photos = stmt
            .query_map(params![limit, offset], row_to_photo)?
            .collect::<Result<Vec<Photo>, _>>()?;

        Ok(photos)
    }

    /// 获取某个用户的一页照片（按得票、再按创建时间倒序）
    pub fn list_photos_by_owner(&self, owner_id: i64, limit: i64, offset: i64) -> AppResult<Vec<Photo>> {
        let conn = self.connection()?;

        let sql = format!(
            "SELECT * FROM photos WHERE owner_id = ?1 {} LIMIT ?2 OFFSET ?3",
            PhotoOrder::Votes.as_sql()
        );

        let mut stmt = conn.prepare(&sql)?;
        let photos = stmt
            .query_map(params![owner_id, limit, offset], row_to_photo)?
            .collect::<Result<Vec<Photo>, _>>()?;

        Ok(photos)
    }

    /// 搜索照片，返回 (当前页, 匹配总数)
    pub fn search_photos(&self, query: &SearchQuery, limit: i64, offset: i64) -> AppResult<(Vec<Photo>, i64)> {
        let conn = self.connection()?;

        let patterns = query.patterns();
        let mut params_vec: Vec<&dyn rusqlite::ToSql> =
            patterns.iter().map(|p| p as &dyn rusqlite::ToSql).collect();

        let total: i64 = conn.query_row(&query.count_sql(), params_vec.as_slice(), |row| row.get(0))?;

        params_vec.push(&limit);
        params_vec.push(&offset);

        let sql = query.page_sql();
        tracing::debug!("搜索照片: {} 个关键词, limit={}, offset={}", query.terms().len(), limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let photos = stmt
            .query_map(params_vec.as_slice(), row_to_photo)?
            .collect::<Result<Vec<Photo>, _>>()?;

        Ok((photos, total))
    }
}
