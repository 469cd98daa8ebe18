//! 数据上下文
//!
//! 面向会话的工作单元：围绕存储边界维护一份暂存缓存，保存时先写
//! 审计时间戳，再委托存储在单个事务中提交。
//!
//! 缓存使用备忘：
//! - `add`    → 记录进入 Added，保存时 INSERT；
//! - `update` → 记录进入 Modified，保存时 UPDATE（目标行需已存在）；
//! - `attach` → 记录进入 Unchanged，只入缓存，不产生写入；
//! - `remove` → 记录进入 Deleted，保存时 DELETE（Added 条目直接解除追踪）；
//! - `find`   → 先查缓存（身份映射），未命中再读存储并附加为 Unchanged。
//!
//! 修改检测依赖缓存：调用方应先通过 `find`/`attach` 把行放入缓存，
//! 再 `update` 改动后的快照。绕过缓存直接 `update` 未追踪的记录同样
//! 会暂存 UPDATE，但目标行不存在时整个保存会失败回滚。

pub mod record;
pub mod tracker;

pub use record::{Record, RecordKey, RecordKind};
pub use tracker::{ChangeTracker, EntityState, EntryToken, TrackedEntry};

use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, SRSystemError};
use crate::storage::RecordStore;

/// 学籍数据上下文（每个逻辑事务一个实例，保存或回滚后丢弃）
pub struct DataContext {
    store: Arc<dyn RecordStore>,
    tracker: ChangeTracker,
}

impl DataContext {
    /// 在给定存储之上创建一个空会话
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            tracker: ChangeTracker::new(),
        }
    }

    /// 暂存一条新记录（Added）
    pub fn add(&mut self, record: impl Into<Record>) -> Result<()> {
        self.tracker.track_added(record.into()).map(|_| ())
    }

    /// 暂存一条修改（Modified）；记录必须携带主键
    pub fn update(&mut self, record: impl Into<Record>) -> Result<()> {
        self.tracker.track_modified(record.into()).map(|_| ())
    }

    /// 把已存在的行放入缓存（Unchanged），不产生写入
    pub fn attach(&mut self, record: impl Into<Record>) -> Result<()> {
        self.tracker.track_attached(record.into()).map(|_| ())
    }

    /// 暂存一条删除（Deleted）；对 Added 条目直接解除追踪
    pub fn remove(&mut self, record: impl Into<Record>) -> Result<()> {
        self.tracker.track_removed(record.into()).map(|_| ())
    }

    /// 按主键查找：缓存命中直接返回快照（Deleted 视为不存在），
    /// 未命中时读存储并附加为 Unchanged
    pub async fn find(&mut self, key: RecordKey) -> Result<Option<Record>> {
        if let Some(entry) = self.tracker.entry_by_key(key) {
            return Ok(match entry.state() {
                EntityState::Deleted => None,
                _ => Some(entry.record().clone()),
            });
        }

        match self.store.fetch(key).await? {
            Some(record) => {
                self.tracker.track_attached(record.clone())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// 保存所有暂存变更，返回受影响的行数
    ///
    /// 流程：
    /// 1. 盖章：取一次墙钟时间，Added 条目写 created_at，
    ///    Modified 条目写 updated_at，其余不动；
    /// 2. 委托：把写入计划按暂存顺序交给存储在单个事务中提交，
    ///    存储错误原样向上传播，所有条目状态保持不变；
    /// 3. 接受：Added/Modified 转为 Unchanged（回填生成的主键），
    ///    Deleted 条目解除追踪。
    pub async fn save_changes(&mut self) -> Result<u64> {
        self.stamp_audit_timestamps();

        let writes = self.tracker.pending_writes();
        if writes.is_empty() {
            return Ok(0);
        }
        debug!("提交暂存写入 {} 条", writes.len());

        let receipts = self.store.commit(writes).await?;
        let affected: u64 = receipts.iter().map(|r| r.rows_affected).sum();
        self.tracker.apply_receipts(&receipts);

        debug!("保存完成，影响行数: {affected}");
        Ok(affected)
    }

    /// `save_changes` 的同步形式
    ///
    /// 必须在 Tokio 多线程运行时内调用（内部通过 `block_in_place`
    /// 驱动异步保存）；运行时之外或单线程运行时内调用返回
    /// AsyncRuntime 错误。
    pub fn save_changes_blocking(&mut self) -> Result<u64> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            SRSystemError::async_runtime("同步保存必须在 Tokio 多线程运行时内调用")
        })?;
        if !matches!(
            handle.runtime_flavor(),
            tokio::runtime::RuntimeFlavor::MultiThread
        ) {
            return Err(SRSystemError::async_runtime(
                "同步保存不支持单线程运行时（block_in_place 限制）",
            ));
        }
        tokio::task::block_in_place(|| handle.block_on(self.save_changes()))
    }

    /// 主键对应的追踪状态；未追踪返回 Detached
    pub fn state_of(&self, key: RecordKey) -> EntityState {
        self.tracker.state_of(key)
    }

    /// 是否存在待写入的变更
    pub fn has_pending_changes(&self) -> bool {
        self.tracker.has_pending()
    }

    /// 缓存中的条目数
    pub fn tracked_count(&self) -> usize {
        self.tracker.len()
    }

    /// 丢弃整个缓存（回滚会话，不触碰数据库）
    pub fn clear(&mut self) {
        self.tracker.clear();
    }

    /// 保存前的审计时间戳写入：一次取钟，Added 写创建时间，
    /// Modified 写更新时间。纯内存赋值，不会失败。
    fn stamp_audit_timestamps(&mut self) {
        let now = chrono::Utc::now().timestamp();
        for entry in self.tracker.entries_mut() {
            match entry.state() {
                EntityState::Added => entry.record_mut().stamp_created(now),
                EntityState::Modified => entry.record_mut().stamp_updated(now),
                _ => {}
            }
        }
    }
}
