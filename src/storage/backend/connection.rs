//! 数据库连接构造
//!
//! SQLite 走定制的 sqlx 连接选项（自动建库 + WAL + 性能 pragma），
//! MySQL/PostgreSQL 走 SeaORM 的通用连接池。两条路径最终都交出
//! 同一个 `DatabaseConnection`，上层不感知差异。

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{Result, VidgateError};
use migration::{Migrator, MigratorTrait};

/// 访客读多写少，SQLite 上 WAL + 放宽同步换吞吐
const SQLITE_PRAGMAS: &[(&str, &str)] = &[
    ("cache_size", "-64000"),
    ("temp_store", "memory"),
    ("mmap_size", "536870912"),
    ("wal_autocheckpoint", "1000"),
];

/// 连接 SQLite（文件不存在时自动创建）
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| VidgateError::database_config(format!("SQLite URL 解析失败: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(5));
    for (key, value) in SQLITE_PRAGMAS {
        options = options.pragma(*key, *value);
    }

    let pool = SqlitePool::connect_with(options).await.map_err(|e| {
        VidgateError::database_connection(format!("无法连接到 SQLite 数据库: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 MySQL/PostgreSQL，按配置的池大小建连接池
pub async fn connect_generic(
    database_url: &str,
    backend_name: &str,
    pool_size: u32,
) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(pool_size)
        .min_connections(pool_size.min(5))
        .connect_timeout(std::time::Duration::from_secs(8))
        .acquire_timeout(std::time::Duration::from_secs(8))
        .idle_timeout(std::time::Duration::from_secs(300))
        .max_lifetime(std::time::Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(options).await.map_err(|e| {
        VidgateError::database_connection(format!(
            "无法连接到 {} 数据库: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

/// 把 schema 迁移追到最新
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| VidgateError::database_operation(format!("迁移失败: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
