//! SQLite 存储句柄
//!
//! 打开连接、设置 PRAGMA、注册自定义函数，以及建表和版本迁移

use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::photo::{format_timestamp, now_utc, parse_timestamp};
use crate::paths::PathProvider;
use crate::utils::error::{AppError, AppResult};

use super::schema::{INIT_SCHEMA, MIGRATIONS, SCHEMA_VERSION};

/// Unicode 小写函数，搜索时两侧都先转小写再做 LIKE
pub const LOWER_FN: &str = "photoshare_lower";

const CONNECTION_PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA temp_store = MEMORY;
PRAGMA busy_timeout = 5000;
"#;

/// 存储句柄
///
/// 由调用方显式构造并交给 `PhotoCatalog`，不存在全局实例。
/// 克隆共享同一个连接。
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// 打开或创建数据库文件
    pub fn open(path: PathBuf) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let conn = Connection::open_with_flags(&path, flags)?;

        Self::with_connection(conn, path)
    }

    /// 打开 PathProvider 指定位置的数据库
    pub fn open_with_provider(provider: &dyn PathProvider) -> AppResult<Self> {
        Self::open(provider.database_path())
    }

    /// 内存数据库，每次调用都是独立的库
    pub fn open_in_memory() -> AppResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, path: PathBuf) -> AppResult<Self> {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        register_functions(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// 建表或把已有库迁移到最新版本
    pub fn init(&self) -> AppResult<()> {
        let mut conn = self.connection()?;

        match installed_version(&conn)? {
            None => {
                tracing::info!("初始化数据库 Schema...");
                let tx = conn.transaction()?;
                tx.execute_batch(INIT_SCHEMA)?;
                record_version(&tx, SCHEMA_VERSION)?;
                tx.commit()?;
                tracing::info!("数据库 Schema 初始化完成，版本: {}", SCHEMA_VERSION);
            }
            Some(version) => {
                tracing::info!("当前数据库版本: {}", version);
                for migration in MIGRATIONS.iter().filter(|m| m.version > version) {
                    tracing::info!("执行迁移 v{}: {}", migration.version, migration.description);
                    let tx = conn.transaction()?;
                    tx.execute_batch(migration.sql)?;
                    record_version(&tx, migration.version)?;
                    tx.commit()?;
                }
            }
        }

        Ok(())
    }

    /// 独占连接
    pub fn connection(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AppError::General(format!("数据库连接锁失效: {}", e)))
    }

    /// 在事务中执行 `f`
    ///
    /// `f` 返回错误或提交失败时，事务在 drop 时回滚。
    pub fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// 已安装的 Schema 版本，未建表时返回 None
fn installed_version(conn: &Connection) -> AppResult<Option<i32>> {
    let has_table: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(None);
    }

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(Some(version.unwrap_or(0)))
}

fn record_version(conn: &Connection, version: i32) -> AppResult<()> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        params![version, format_timestamp(&now_utc())],
    )?;
    Ok(())
}

/// SQLite 自带的 LOWER/UPPER/LIKE 只处理 ASCII
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|s| s.to_lowercase()))
        },
    )
}

/// 读取时间列
pub(crate) fn get_timestamp(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(column)?;
    parse_timestamp(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
