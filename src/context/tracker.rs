//! 变更追踪器
//!
//! 会话内的暂存缓存：登记记录快照及其追踪状态，保存时按登记顺序
//! 产出写入计划，提交成功后接受回执完成状态迁移。
//!
//! 单会话模型（见 `DataContext`）：所有修改方法都要求 `&mut self`，
//! 不支持跨线程并发变更。

use std::collections::{BTreeMap, HashMap};

use super::record::{Record, RecordKey};
use crate::errors::{Result, SRSystemError};
use crate::storage::{StagedWrite, WriteOp, WriteReceipt};

/// 记录在会话中的追踪状态
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityState {
    /// 未被会话追踪
    Detached,
    /// 已追踪，与数据库最近一次快照一致
    Unchanged,
    /// 新增，保存时执行 INSERT
    Added,
    /// 已修改，保存时执行 UPDATE
    Modified,
    /// 待删除，保存时执行 DELETE
    Deleted,
}

impl EntityState {
    /// 是否有待写入的变更
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            EntityState::Added | EntityState::Modified | EntityState::Deleted
        )
    }
}

/// 追踪条目的会话内句柄，按登记顺序单调递增
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryToken(u64);

/// 一条追踪条目：记录快照加当前状态
#[derive(Clone, Debug)]
pub struct TrackedEntry {
    token: EntryToken,
    record: Record,
    state: EntityState,
}

impl TrackedEntry {
    pub fn token(&self) -> EntryToken {
        self.token
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub(crate) fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

/// 会话的暂存缓存
///
/// `entries` 按 token（即登记顺序）有序，`by_key` 是主键到条目的索引。
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: BTreeMap<EntryToken, TrackedEntry>,
    by_key: HashMap<RecordKey, EntryToken>,
    next_token: u64,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_token(&mut self) -> EntryToken {
        let token = EntryToken(self.next_token);
        self.next_token += 1;
        token
    }

    fn insert_entry(&mut self, record: Record, state: EntityState) -> EntryToken {
        let token = self.alloc_token();
        let key = record.key();
        self.entries.insert(
            token,
            TrackedEntry {
                token,
                record,
                state,
            },
        );
        if let Some(key) = key {
            self.by_key.insert(key, token);
        }
        token
    }

    /// 登记为 Added。主键已被其他条目占用时报冲突。
    pub(crate) fn track_added(&mut self, record: Record) -> Result<EntryToken> {
        if let Some(key) = record.key()
            && self.by_key.contains_key(&key)
        {
            return Err(SRSystemError::tracking_conflict(format!(
                "主键 {key:?} 已在会话中追踪，不能重复新增"
            )));
        }
        Ok(self.insert_entry(record, EntityState::Added))
    }

    /// 登记为 Unchanged（仅放入缓存，不产生写入）。要求记录携带主键。
    pub(crate) fn track_attached(&mut self, record: Record) -> Result<EntryToken> {
        let key = record
            .key()
            .ok_or_else(|| SRSystemError::missing_record_key("附加的记录缺少主键"))?;
        if self.by_key.contains_key(&key) {
            return Err(SRSystemError::tracking_conflict(format!(
                "主键 {key:?} 已在会话中追踪，不能重复附加"
            )));
        }
        Ok(self.insert_entry(record, EntityState::Unchanged))
    }

    /// 登记为 Modified。要求记录携带主键。
    ///
    /// 已追踪的条目被替换为新快照：Added 条目保持 Added，
    /// Unchanged/Modified 条目转为 Modified，Deleted 条目报冲突。
    /// 未追踪的主键会被直接登记为 Modified，由调用方自行保证
    /// 目标行存在，行不存在时在保存阶段报错。
    pub(crate) fn track_modified(&mut self, record: Record) -> Result<EntryToken> {
        let key = record
            .key()
            .ok_or_else(|| SRSystemError::missing_record_key("标记修改的记录缺少主键"))?;

        if let Some(&token) = self.by_key.get(&key)
            && let Some(entry) = self.entries.get_mut(&token)
        {
            match entry.state {
                EntityState::Deleted => {
                    return Err(SRSystemError::tracking_conflict(format!(
                        "主键 {key:?} 已标记删除，不能再标记修改"
                    )));
                }
                EntityState::Added => {
                    entry.record = record;
                }
                _ => {
                    entry.record = record;
                    entry.state = EntityState::Modified;
                }
            }
            return Ok(token);
        }

        Ok(self.insert_entry(record, EntityState::Modified))
    }

    /// 登记为 Deleted。要求记录携带主键。
    ///
    /// Added 条目直接解除追踪（从未入库的行不产生 DELETE），返回 None；
    /// 其余已追踪条目转为 Deleted；未追踪的主键登记为 Deleted。
    pub(crate) fn track_removed(&mut self, record: Record) -> Result<Option<EntryToken>> {
        let key = record
            .key()
            .ok_or_else(|| SRSystemError::missing_record_key("标记删除的记录缺少主键"))?;

        if let Some(&token) = self.by_key.get(&key) {
            let state = self
                .entries
                .get(&token)
                .map(|entry| entry.state)
                .unwrap_or(EntityState::Detached);
            if state == EntityState::Added {
                self.entries.remove(&token);
                self.by_key.remove(&key);
                return Ok(None);
            }
            if let Some(entry) = self.entries.get_mut(&token) {
                entry.state = EntityState::Deleted;
            }
            return Ok(Some(token));
        }

        Ok(Some(self.insert_entry(record, EntityState::Deleted)))
    }

    /// 按主键查找条目
    pub fn entry_by_key(&self, key: RecordKey) -> Option<&TrackedEntry> {
        self.by_key
            .get(&key)
            .and_then(|token| self.entries.get(token))
    }

    /// 主键对应的追踪状态；未追踪返回 Detached
    pub fn state_of(&self, key: RecordKey) -> EntityState {
        self.entry_by_key(key)
            .map(|entry| entry.state)
            .unwrap_or(EntityState::Detached)
    }

    /// 遍历全部条目（登记顺序），供保存前的时间戳写入
    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut TrackedEntry> {
        self.entries.values_mut()
    }

    /// 产出写入计划：登记顺序下所有待写条目的快照
    pub(crate) fn pending_writes(&self) -> Vec<StagedWrite> {
        self.entries
            .values()
            .filter_map(|entry| {
                let op = match entry.state {
                    EntityState::Added => WriteOp::Insert(entry.record.clone()),
                    EntityState::Modified => WriteOp::Update(entry.record.clone()),
                    EntityState::Deleted => WriteOp::Delete(entry.record.clone()),
                    EntityState::Unchanged | EntityState::Detached => return None,
                };
                Some(StagedWrite {
                    token: entry.token,
                    op,
                })
            })
            .collect()
    }

    /// 接受提交回执，完成状态迁移：
    /// Added → Unchanged（回填生成的主键并建立索引），
    /// Modified → Unchanged，Deleted → 解除追踪。
    pub(crate) fn apply_receipts(&mut self, receipts: &[WriteReceipt]) {
        for receipt in receipts {
            let Some(entry) = self.entries.get_mut(&receipt.token) else {
                continue;
            };
            let state = entry.state;
            match state {
                EntityState::Added => {
                    if let Some(key) = receipt.new_key {
                        entry.record.assign_key(key);
                    }
                    entry.state = EntityState::Unchanged;
                    if let Some(key) = entry.record.key() {
                        self.by_key.insert(key, receipt.token);
                    }
                }
                EntityState::Modified => {
                    entry.state = EntityState::Unchanged;
                }
                EntityState::Deleted => {
                    let key = entry.record.key();
                    self.entries.remove(&receipt.token);
                    if let Some(key) = key {
                        self.by_key.remove(&key);
                    }
                }
                EntityState::Unchanged | EntityState::Detached => {}
            }
        }
    }

    /// 是否存在待写入的变更
    pub fn has_pending(&self) -> bool {
        self.entries.values().any(|entry| entry.state.is_pending())
    }

    /// 追踪条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 丢弃整个缓存（会话生命周期的回滚分支）
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.by_key.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::record::RecordKind;

    fn department(id: i64, name: &str) -> Record {
        Record::Department(crate::entity::departments::Model {
            id,
            name: name.to_string(),
            created_at: None,
            updated_at: None,
        })
    }

    #[test]
    fn test_added_entry_is_pending_insert() {
        let mut tracker = ChangeTracker::new();
        let token = tracker.track_added(department(0, "物理系")).unwrap();

        assert!(tracker.has_pending());
        let writes = tracker.pending_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].token, token);
        assert!(matches!(writes[0].op, WriteOp::Insert(_)));
    }

    #[test]
    fn test_receipt_promotes_added_to_unchanged_with_key() {
        let mut tracker = ChangeTracker::new();
        let token = tracker.track_added(department(0, "物理系")).unwrap();

        tracker.apply_receipts(&[WriteReceipt {
            token,
            rows_affected: 1,
            new_key: Some(RecordKey::Department(41)),
        }]);

        assert_eq!(
            tracker.state_of(RecordKey::Department(41)),
            EntityState::Unchanged
        );
        assert!(!tracker.has_pending());
        let entry = tracker.entry_by_key(RecordKey::Department(41)).unwrap();
        assert_eq!(entry.record().kind(), RecordKind::Department);
    }

    #[test]
    fn test_attach_requires_key() {
        let mut tracker = ChangeTracker::new();
        let err = tracker.track_attached(department(0, "物理系")).unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[test]
    fn test_duplicate_key_conflicts() {
        let mut tracker = ChangeTracker::new();
        tracker.track_attached(department(5, "物理系")).unwrap();

        let err = tracker.track_added(department(5, "数学系")).unwrap_err();
        assert_eq!(err.code(), "E005");
        let err = tracker.track_attached(department(5, "数学系")).unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[test]
    fn test_update_untracked_stages_modified() {
        let mut tracker = ChangeTracker::new();
        tracker.track_modified(department(9, "改名后")).unwrap();

        assert_eq!(
            tracker.state_of(RecordKey::Department(9)),
            EntityState::Modified
        );
        let writes = tracker.pending_writes();
        assert!(matches!(writes[0].op, WriteOp::Update(_)));
    }

    #[test]
    fn test_update_added_entry_keeps_added() {
        let mut tracker = ChangeTracker::new();
        tracker.track_added(department(3, "初名")).unwrap();
        tracker.track_modified(department(3, "改名")).unwrap();

        assert_eq!(
            tracker.state_of(RecordKey::Department(3)),
            EntityState::Added
        );
        let writes = tracker.pending_writes();
        assert_eq!(writes.len(), 1);
        assert!(matches!(writes[0].op, WriteOp::Insert(_)));
    }

    #[test]
    fn test_update_deleted_entry_conflicts() {
        let mut tracker = ChangeTracker::new();
        tracker.track_attached(department(4, "物理系")).unwrap();
        tracker.track_removed(department(4, "物理系")).unwrap();

        let err = tracker.track_modified(department(4, "复活")).unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[test]
    fn test_remove_added_entry_detaches() {
        let mut tracker = ChangeTracker::new();
        tracker.track_added(department(8, "临时系")).unwrap();

        let token = tracker.track_removed(department(8, "临时系")).unwrap();
        assert_eq!(token, None);
        assert_eq!(
            tracker.state_of(RecordKey::Department(8)),
            EntityState::Detached
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_remove_untracked_stages_deleted() {
        let mut tracker = ChangeTracker::new();
        tracker.track_removed(department(6, "旧系")).unwrap();

        assert_eq!(
            tracker.state_of(RecordKey::Department(6)),
            EntityState::Deleted
        );
        let writes = tracker.pending_writes();
        assert!(matches!(writes[0].op, WriteOp::Delete(_)));
    }

    #[test]
    fn test_pending_writes_follow_staging_order() {
        let mut tracker = ChangeTracker::new();
        let t1 = tracker.track_added(department(0, "甲")).unwrap();
        let t2 = tracker.track_attached(department(2, "乙")).unwrap();
        let t3 = tracker.track_removed(department(7, "丙")).unwrap().unwrap();
        let t4 = tracker.track_modified(department(9, "丁")).unwrap();

        let tokens: Vec<_> = tracker.pending_writes().iter().map(|w| w.token).collect();
        assert_eq!(tokens, vec![t1, t3, t4]);
        assert!(t1 < t2 && t2 < t3 && t3 < t4);
    }

    #[test]
    fn test_deleted_receipt_detaches_entry() {
        let mut tracker = ChangeTracker::new();
        tracker.track_attached(department(4, "物理系")).unwrap();
        let token = tracker.track_removed(department(4, "物理系")).unwrap().unwrap();

        tracker.apply_receipts(&[WriteReceipt {
            token,
            rows_affected: 1,
            new_key: None,
        }]);

        assert!(tracker.is_empty());
        assert_eq!(
            tracker.state_of(RecordKey::Department(4)),
            EntityState::Detached
        );
    }

    #[test]
    fn test_clear_discards_cache() {
        let mut tracker = ChangeTracker::new();
        tracker.track_added(department(0, "甲")).unwrap();
        tracker.track_attached(department(2, "乙")).unwrap();

        tracker.clear();
        assert!(tracker.is_empty());
        assert!(!tracker.has_pending());
        assert_eq!(
            tracker.state_of(RecordKey::Department(2)),
            EntityState::Detached
        );
    }
}
