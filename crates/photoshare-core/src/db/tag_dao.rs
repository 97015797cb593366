//! 标签数据访问层

use rusqlite::{params, Connection, Row};

use crate::models::{Tag, TagCount};
use crate::utils::error::AppResult;

use super::connection::Database;

/// 从数据库行映射到 Tag 结构
fn row_to_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        tag_id: row.get("tag_id")?,
        tag_name: row.get("tag_name")?,
    })
}

/// `?2, ?3, ...` 形式的占位符，`?1` 留给 photo_id
fn name_placeholders(count: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 删除照片的全部标签关联
pub(crate) fn clear_photo_tags(conn: &Connection, photo_id: i64) -> AppResult<usize> {
    let rows = conn.execute("DELETE FROM photo_tags WHERE photo_id = ?1", params![photo_id])?;
    Ok(rows)
}

/// 集合式重写照片的标签关联
///
/// 按名称补建缺失的标签，删除不再存在的关联，添加新关联。
/// 调用方负责提供事务，使三步对外表现为一个原子操作。
pub(crate) fn replace_photo_tags(conn: &Connection, photo_id: i64, names: &[String]) -> AppResult<()> {
    if names.is_empty() {
        clear_photo_tags(conn, photo_id)?;
        return Ok(());
    }

    {
        let mut stmt = conn.prepare_cached("INSERT OR IGNORE INTO tags (tag_name) VALUES (?1)")?;
        for name in names {
            stmt.execute(params![name])?;
        }
    }

    let mut bind: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(names.len() + 1);
    bind.push(&photo_id);
    for name in names {
        bind.push(name);
    }

    let placeholders = name_placeholders(names.len());

    conn.execute(
        &format!(
            "DELETE FROM photo_tags WHERE photo_id = ?1 AND tag_id NOT IN \
             (SELECT tag_id FROM tags WHERE tag_name IN ({}))",
            placeholders
        ),
        bind.as_slice(),
    )?;

    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO photo_tags (photo_id, tag_id) \
             SELECT ?1, tag_id FROM tags WHERE tag_name IN ({})",
            placeholders
        ),
        bind.as_slice(),
    )?;

    Ok(())
}

/// 读取照片的标签名（按名称排序）
pub(crate) fn tag_names_for_photo(conn: &Connection, photo_id: i64) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT t.tag_name FROM tags t
        INNER JOIN photo_tags pt ON pt.tag_id = t.tag_id
        WHERE pt.photo_id = ?1
        ORDER BY t.tag_name
        "#,
    )?;

    let names = stmt
        .query_map(params![photo_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(names)
}

impl Database {
    /// 在单个事务中重写照片的标签（名称须已规范化）
    pub fn set_photo_tags(&self, photo_id: i64, names: &[String]) -> AppResult<()> {
        self.transaction(|conn| replace_photo_tags(conn, photo_id, names))
    }

    /// 移除照片的所有标签
    pub fn remove_all_tags_from_photo(&self, photo_id: i64) -> AppResult<usize> {
        self.transaction(|conn| clear_photo_tags(conn, photo_id))
    }

    /// 获取照片的所有标签
    pub fn get_tags_for_photo(&self, photo_id: i64) -> AppResult<Vec<Tag>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT t.* FROM tags t
            INNER JOIN photo_tags pt ON t.tag_id = pt.tag_id
            WHERE pt.photo_id = ?1
            ORDER BY t.tag_name
            "#,
        )?;

        let tags = stmt
            .query_map(params![photo_id], row_to_tag)?
            .collect::<Result<Vec<Tag>, _>>()?;

        Ok(tags)
    }

    /// 获取照片的标签名
    pub fn get_tag_names_for_photo(&self, photo_id: i64) -> AppResult<Vec<String>> {
        let conn = self.connection()?;
        tag_names_for_photo(&conn, photo_id)
    }

    /// 获取所有标签
    pub fn get_all_tags(&self) -> AppResult<Vec<Tag>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare("SELECT * FROM tags ORDER BY tag_name")?;
        let tags = stmt
            .query_map([], row_to_tag)?
            .collect::<Result<Vec<Tag>, _>>()?;

        Ok(tags)
    }

    /// 读取标签统计视图
    pub fn get_tag_counts(&self) -> AppResult<Vec<TagCount>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(
            "SELECT name, photo, num_photos FROM tag_counts ORDER BY num_photos DESC, name",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(TagCount {
                    name: row.get("name")?,
                    photo: row.get("photo")?,
                    num_photos: row.get("num_photos")?,
                })
            })?
            .collect::<Result<Vec<TagCount>, _>>()?;

        Ok(counts)
    }
}
