//! 数据存储层
//!
//! 会话与持久化引擎之间的边界：按主键读取单条记录，以及在单个
//! 事务中按暂存顺序执行一批写入并返回回执。

use std::sync::Arc;

use crate::context::record::{Record, RecordKey};
use crate::context::tracker::EntryToken;
use crate::errors::Result;

pub mod sea_orm_store;

/// 一条暂存写入的操作内容
#[derive(Clone, Debug)]
pub enum WriteOp {
    /// 插入新行；自增主键为 0 时由数据库分配
    Insert(Record),
    /// 按主键全量更新；目标行不存在时提交失败
    Update(Record),
    /// 按主键删除；目标行不存在时回执 0 行
    Delete(Record),
}

/// 一条暂存写入，按 token（暂存顺序）提交
#[derive(Clone, Debug)]
pub struct StagedWrite {
    pub token: EntryToken,
    pub op: WriteOp,
}

/// 单条写入的执行回执
#[derive(Clone, Debug)]
pub struct WriteReceipt {
    pub token: EntryToken,
    pub rows_affected: u64,
    /// INSERT 后数据库分配的主键；主键由调用方提供时为 None
    pub new_key: Option<RecordKey>,
}

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// 按主键读取单条记录
    async fn fetch(&self, key: RecordKey) -> Result<Option<Record>>;

    /// 在单个事务中按序执行暂存写入，返回逐条回执；
    /// 任一写入失败则整体回滚，错误原样向上传播
    async fn commit(&self, writes: Vec<StagedWrite>) -> Result<Vec<WriteReceipt>>;
}

/// 按全局配置创建生产存储
pub async fn create_store() -> Result<Arc<dyn RecordStore>> {
    let store = sea_orm_store::SeaOrmStore::new_async().await?;
    Ok(Arc::new(store))
}
