//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod records;

use crate::config::AppConfig;
use crate::errors::{Result, SRSystemError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStore {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStore {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        // TLS 提供者允许重复安装，失败即已装过
        let _ = rustls::crypto::ring::default_provider().install_default();

        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| SRSystemError::database_migration(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {db_url}");

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SRSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        // 内存库的生命周期绑定在连接上，必须固定为常驻单连接
        let is_memory = url.contains(":memory:");
        let max_connections = if is_memory { 1 } else { pool_size };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout));
        pool_options = if is_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .connect_with(opt)
            .await
            .map_err(|e| SRSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| SRSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SRSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// RecordStore trait 实现
use crate::context::record::{Record, RecordKey};
use crate::storage::{RecordStore, StagedWrite, WriteReceipt};
use async_trait::async_trait;

#[async_trait]
impl RecordStore for SeaOrmStore {
    async fn fetch(&self, key: RecordKey) -> Result<Option<Record>> {
        self.fetch_impl(key).await
    }

    async fn commit(&self, writes: Vec<StagedWrite>) -> Result<Vec<WriteReceipt>> {
        self.commit_impl(writes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DataContext, EntityState};
    use crate::entity::prelude::*;
    use std::sync::Arc;

    fn init_tracing() {
        let filter = tracing_subscriber::EnvFilter::from_default_env();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    async fn memory_store() -> SeaOrmStore {
        init_tracing();
        SeaOrmStore::connect(":memory:", 1, 5)
            .await
            .expect("内存库应能完成初始化与迁移")
    }

    fn new_role(name: &str) -> RoleModel {
        RoleModel {
            id: 0,
            name: name.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_build_database_url_inference() {
        assert_eq!(
            SeaOrmStore::build_database_url("data/app.db").unwrap(),
            "sqlite://data/app.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStore::build_database_url(":memory:").unwrap(),
            "sqlite://:memory:?mode=rwc"
        );
        assert_eq!(
            SeaOrmStore::build_database_url("postgres://user@host/db").unwrap(),
            "postgres://user@host/db"
        );
        assert!(SeaOrmStore::build_database_url("oracle://somewhere").is_err());
    }

    #[tokio::test]
    async fn test_empty_commit_is_noop() {
        let store = memory_store().await;
        let receipts = store.commit(Vec::new()).await.unwrap();
        assert!(receipts.is_empty());
    }

    #[tokio::test]
    async fn test_add_save_mutate_save_roundtrip() {
        let store = Arc::new(memory_store().await);
        let mut ctx = DataContext::new(store.clone());

        ctx.add(new_role("student")).unwrap();
        let before = chrono::Utc::now().timestamp();
        assert_eq!(ctx.save_changes().await.unwrap(), 1);
        let after = chrono::Utc::now().timestamp();

        // 自增主键由数据库分配并回填
        let Some(Record::Role(saved)) = ctx.find(RecordKey::Role(1)).await.unwrap() else {
            panic!("角色应已入库");
        };
        assert!((before..=after).contains(&saved.created_at.unwrap()));
        assert_eq!(saved.updated_at, None);

        // 新会话读取、修改、再保存
        let mut ctx2 = DataContext::new(store.clone());
        let Some(Record::Role(mut role)) = ctx2.find(RecordKey::Role(1)).await.unwrap() else {
            panic!("新会话应能读到角色");
        };
        let created = role.created_at;
        role.name = "teacher".to_string();
        ctx2.update(role).unwrap();
        let before2 = chrono::Utc::now().timestamp();
        assert_eq!(ctx2.save_changes().await.unwrap(), 1);
        let after2 = chrono::Utc::now().timestamp();

        let mut ctx3 = DataContext::new(store);
        let Some(Record::Role(reread)) = ctx3.find(RecordKey::Role(1)).await.unwrap() else {
            panic!("修改后应能读到角色");
        };
        assert_eq!(reread.name, "teacher");
        assert_eq!(reread.created_at, created);
        assert!((before2..=after2).contains(&reread.updated_at.unwrap()));
    }

    #[tokio::test]
    async fn test_constraint_violation_rolls_back() {
        let store = Arc::new(memory_store().await);
        let mut ctx = DataContext::new(store.clone());

        ctx.add(UserModel {
            id: 0,
            role_id: 999, // 不存在的角色
            first_name: "安娜".to_string(),
            last_name: "李".to_string(),
            patronymic: None,
            email: None,
            created_at: None,
            updated_at: None,
        })
        .unwrap();

        let err = ctx.save_changes().await.unwrap_err();
        assert_eq!(err.code(), "E003");
        assert!(ctx.has_pending_changes());

        // 回滚后库里没有任何用户
        assert_eq!(store.fetch(RecordKey::User(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_row_fails_commit() {
        let store = Arc::new(memory_store().await);
        let mut ctx = DataContext::new(store);

        // 绕过缓存直接标记修改：目标行不存在，保存整体失败
        ctx.update(RoleModel {
            id: 77,
            name: "ghost".to_string(),
            created_at: Some(1),
            updated_at: None,
        })
        .unwrap();

        let err = ctx.save_changes().await.unwrap_err();
        assert_eq!(err.code(), "E003");
    }

    #[tokio::test]
    async fn test_delete_missing_row_reports_zero() {
        let store = Arc::new(memory_store().await);
        let mut ctx = DataContext::new(store);

        ctx.remove(WeekTypeModel {
            id: 404,
            index: 1,
            name: None,
            created_at: None,
            updated_at: None,
        })
        .unwrap();

        assert_eq!(ctx.save_changes().await.unwrap(), 0);
        assert!(!ctx.has_pending_changes());
    }

    #[tokio::test]
    async fn test_link_rows_insert_and_delete() {
        let store = Arc::new(memory_store().await);
        let mut ctx = DataContext::new(store.clone());

        // 先准备两端的行
        ctx.add(new_role("student")).unwrap();
        ctx.add(PermissionModel {
            id: 0,
            name: "can_view_grades".to_string(),
            created_at: None,
            updated_at: None,
        })
        .unwrap();
        assert_eq!(ctx.save_changes().await.unwrap(), 2);
        assert_eq!(ctx.state_of(RecordKey::Role(1)), EntityState::Unchanged);

        // 插入关联行
        ctx.add(RolePermissionLinkModel {
            role_id: 1,
            permission_id: 1,
        })
        .unwrap();
        assert_eq!(ctx.save_changes().await.unwrap(), 1);
        assert!(
            store
                .fetch(RecordKey::RolePermissionLink(1, 1))
                .await
                .unwrap()
                .is_some()
        );

        // 删除关联行
        ctx.remove(RolePermissionLinkModel {
            role_id: 1,
            permission_id: 1,
        })
        .unwrap();
        assert_eq!(ctx.save_changes().await.unwrap(), 1);
        assert_eq!(
            store
                .fetch(RecordKey::RolePermissionLink(1, 1))
                .await
                .unwrap(),
            None
        );
    }
}
