//! 记录级读写
//!
//! 把 `Record` 的插入 / 更新 / 删除落到各实体的 SeaORM 调用上，
//! 并在单个事务中按暂存顺序执行一批写入。

use super::SeaOrmStore;
use crate::context::record::{Record, RecordKey};
use crate::context::tracker::EntryToken;
use crate::entity::prelude::*;
use crate::errors::{Result, SRSystemError};
use crate::storage::{StagedWrite, WriteOp, WriteReceipt};
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, NotSet, PrimaryKeyTrait, Set,
    TransactionTrait,
};
use tracing::debug;

impl SeaOrmStore {
    /// 按主键读取单条记录
    pub(crate) async fn fetch_impl(&self, key: RecordKey) -> Result<Option<Record>> {
        let record = match key {
            RecordKey::User(id) => self.find_one::<Users>(id).await?.map(Record::from),
            RecordKey::Role(id) => self.find_one::<Roles>(id).await?.map(Record::from),
            RecordKey::Permission(id) => self.find_one::<Permissions>(id).await?.map(Record::from),
            RecordKey::Department(id) => self.find_one::<Departments>(id).await?.map(Record::from),
            RecordKey::Course(id) => self.find_one::<Courses>(id).await?.map(Record::from),
            RecordKey::Group(id) => self.find_one::<Groups>(id).await?.map(Record::from),
            RecordKey::WeekType(id) => self.find_one::<WeekTypes>(id).await?.map(Record::from),
            RecordKey::UserGroupLink(user_id, group_id) => self
                .find_one::<UserGroupLinks>((user_id, group_id))
                .await?
                .map(Record::from),
            RecordKey::RolePermissionLink(role_id, permission_id) => self
                .find_one::<RolePermissionLinks>((role_id, permission_id))
                .await?
                .map(Record::from),
        };
        Ok(record)
    }

    async fn find_one<E>(
        &self,
        id: impl Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    ) -> Result<Option<E::Model>>
    where
        E: EntityTrait,
    {
        E::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SRSystemError::database_operation(format!("查询记录失败: {e}")))
    }

    /// 在单个事务中按暂存顺序执行写入；任一失败则回滚并传播错误
    pub(crate) async fn commit_impl(&self, writes: Vec<StagedWrite>) -> Result<Vec<WriteReceipt>> {
        if writes.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SRSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let mut receipts = Vec::with_capacity(writes.len());
        for write in writes {
            // 出错时 txn 随 drop 回滚
            let receipt = Self::apply_write(&txn, write).await?;
            receipts.push(receipt);
        }

        txn.commit()
            .await
            .map_err(|e| SRSystemError::database_operation(format!("提交事务失败: {e}")))?;

        debug!("事务提交完成，共 {} 条写入", receipts.len());
        Ok(receipts)
    }

    async fn apply_write(txn: &DatabaseTransaction, write: StagedWrite) -> Result<WriteReceipt> {
        let token = write.token;
        match write.op {
            WriteOp::Insert(record) => Self::insert_record(txn, token, record).await,
            WriteOp::Update(record) => Self::update_record(txn, token, record).await,
            WriteOp::Delete(record) => Self::delete_record(txn, token, record).await,
        }
    }

    async fn insert_record(
        txn: &DatabaseTransaction,
        token: EntryToken,
        record: Record,
    ) -> Result<WriteReceipt> {
        macro_rules! insert_audited {
            ($model:expr, $key:path) => {{
                let generated = $model.id == 0;
                let mut active = $model.into_active();
                if generated {
                    active.id = NotSet;
                }
                let inserted = active
                    .insert(txn)
                    .await
                    .map_err(|e| SRSystemError::database_operation(format!("插入记录失败: {e}")))?;
                WriteReceipt {
                    token,
                    rows_affected: 1,
                    new_key: generated.then_some($key(inserted.id)),
                }
            }};
        }

        let receipt = match record {
            Record::User(m) => insert_audited!(m, RecordKey::User),
            Record::Role(m) => insert_audited!(m, RecordKey::Role),
            Record::Permission(m) => insert_audited!(m, RecordKey::Permission),
            Record::Department(m) => insert_audited!(m, RecordKey::Department),
            Record::Course(m) => insert_audited!(m, RecordKey::Course),
            Record::Group(m) => insert_audited!(m, RecordKey::Group),
            Record::WeekType(m) => insert_audited!(m, RecordKey::WeekType),
            Record::UserGroupLink(m) => {
                let active = UserGroupLinkActiveModel {
                    user_id: Set(m.user_id),
                    group_id: Set(m.group_id),
                };
                active
                    .insert(txn)
                    .await
                    .map_err(|e| SRSystemError::database_operation(format!("插入关联行失败: {e}")))?;
                WriteReceipt {
                    token,
                    rows_affected: 1,
                    new_key: None,
                }
            }
            Record::RolePermissionLink(m) => {
                let active = RolePermissionLinkActiveModel {
                    role_id: Set(m.role_id),
                    permission_id: Set(m.permission_id),
                };
                active
                    .insert(txn)
                    .await
                    .map_err(|e| SRSystemError::database_operation(format!("插入关联行失败: {e}")))?;
                WriteReceipt {
                    token,
                    rows_affected: 1,
                    new_key: None,
                }
            }
        };
        Ok(receipt)
    }

    async fn update_record(
        txn: &DatabaseTransaction,
        token: EntryToken,
        record: Record,
    ) -> Result<WriteReceipt> {
        macro_rules! update_audited {
            ($model:expr) => {{
                // 目标行不存在时 SeaORM 返回 RecordNotUpdated，原样上抛
                $model
                    .into_active()
                    .update(txn)
                    .await
                    .map_err(|e| SRSystemError::database_operation(format!("更新记录失败: {e}")))?;
                WriteReceipt {
                    token,
                    rows_affected: 1,
                    new_key: None,
                }
            }};
        }

        let receipt = match record {
            Record::User(m) => update_audited!(m),
            Record::Role(m) => update_audited!(m),
            Record::Permission(m) => update_audited!(m),
            Record::Department(m) => update_audited!(m),
            Record::Course(m) => update_audited!(m),
            Record::Group(m) => update_audited!(m),
            Record::WeekType(m) => update_audited!(m),
            // 纯关联行除主键外没有可更新的列
            Record::UserGroupLink(_) | Record::RolePermissionLink(_) => WriteReceipt {
                token,
                rows_affected: 0,
                new_key: None,
            },
        };
        Ok(receipt)
    }

    async fn delete_record(
        txn: &DatabaseTransaction,
        token: EntryToken,
        record: Record,
    ) -> Result<WriteReceipt> {
        macro_rules! delete_by_id {
            ($entity:ty, $id:expr) => {{
                <$entity>::delete_by_id($id)
                    .exec(txn)
                    .await
                    .map_err(|e| SRSystemError::database_operation(format!("删除记录失败: {e}")))?
                    .rows_affected
            }};
        }

        let rows_affected = match record {
            Record::User(m) => delete_by_id!(Users, m.id),
            Record::Role(m) => delete_by_id!(Roles, m.id),
            Record::Permission(m) => delete_by_id!(Permissions, m.id),
            Record::Department(m) => delete_by_id!(Departments, m.id),
            Record::Course(m) => delete_by_id!(Courses, m.id),
            Record::Group(m) => delete_by_id!(Groups, m.id),
            Record::WeekType(m) => delete_by_id!(WeekTypes, m.id),
            Record::UserGroupLink(m) => delete_by_id!(UserGroupLinks, (m.user_id, m.group_id)),
            Record::RolePermissionLink(m) => {
                delete_by_id!(RolePermissionLinks, (m.role_id, m.permission_id))
            }
        };

        Ok(WriteReceipt {
            token,
            rows_affected,
            new_key: None,
        })
    }
}
