//! 数据库 Schema 定义
//!
//! 包含所有表的 CREATE 语句和迁移脚本

/// 数据库版本
pub const SCHEMA_VERSION: i32 = 2;

/// 初始化 Schema SQL
pub const INIT_SCHEMA: &str = r#"
-- 用户表
CREATE TABLE IF NOT EXISTS users (
    user_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    is_admin        INTEGER NOT NULL DEFAULT 0,
    is_active       INTEGER NOT NULL DEFAULT 1,
    votes           TEXT NOT NULL DEFAULT '[]',
    created_at      TEXT NOT NULL
);

-- 照片表
CREATE TABLE IF NOT EXISTS photos (
    photo_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id        INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL,
    title           TEXT NOT NULL,
    filename        TEXT NOT NULL UNIQUE,
    up_votes        INTEGER NOT NULL DEFAULT 0 CHECK(up_votes >= 0),
    down_votes      INTEGER NOT NULL DEFAULT 0 CHECK(down_votes >= 0)
);

-- 标签表
CREATE TABLE IF NOT EXISTS tags (
    tag_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    tag_name        TEXT NOT NULL UNIQUE
);

-- 照片-标签关联表
CREATE TABLE IF NOT EXISTS photo_tags (
    photo_id        INTEGER NOT NULL REFERENCES photos(photo_id) ON DELETE CASCADE,
    tag_id          INTEGER NOT NULL REFERENCES tags(tag_id) ON DELETE CASCADE,
    PRIMARY KEY (photo_id, tag_id)
);

-- 数据库版本表
CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      TEXT NOT NULL
);

-- 标签统计视图：标签名、最新一张照片的文件名、照片数量
CREATE VIEW IF NOT EXISTS tag_counts AS
SELECT
    t.tag_name AS name,
    (
        SELECT p.filename FROM photos p
        INNER JOIN photo_tags spt ON spt.photo_id = p.photo_id
        WHERE spt.tag_id = t.tag_id
        ORDER BY p.created_at DESC, p.photo_id DESC
        LIMIT 1
    ) AS photo,
    COUNT(pt.photo_id) AS num_photos
FROM tags t
INNER JOIN photo_tags pt ON pt.tag_id = t.tag_id
GROUP BY t.tag_id, t.tag_name;

-- 索引
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

CREATE INDEX IF NOT EXISTS idx_photos_owner_id ON photos(owner_id);
CREATE INDEX IF NOT EXISTS idx_photos_created_at ON photos(created_at);

CREATE INDEX IF NOT EXISTS idx_tags_tag_name ON tags(tag_name);

CREATE INDEX IF NOT EXISTS idx_photo_tags_photo_id ON photo_tags(photo_id);
CREATE INDEX IF NOT EXISTS idx_photo_tags_tag_id ON photo_tags(tag_id);

CREATE INDEX IF NOT EXISTS idx_photos_score ON photos((up_votes - down_votes), created_at);
"#;

/// 迁移脚本
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// 所有迁移脚本列表
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Add score expression index for vote ordering",
    sql: r#"
            CREATE INDEX IF NOT EXISTS idx_photos_score ON photos((up_votes - down_votes), created_at);
        "#,
}];
