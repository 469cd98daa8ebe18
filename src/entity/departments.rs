//! 院系实体
//!
//! 教学组织单元，课程按院系归属。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::courses::Entity")]
    Courses,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为所有字段均已置值的 ActiveModel（用于全量 UPDATE）
    pub(crate) fn into_active(self) -> ActiveModel {
        use sea_orm::Set;

        ActiveModel {
            id: Set(self.id),
            name: Set(self.name),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
