//! 课程实体
//!
//! 按年级划分的培养方向，隶属于某个院系。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub department_id: i64,
    pub grade: i32,
    pub name: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Department,
    #[sea_orm(has_many = "super::groups::Entity")]
    Groups,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为所有字段均已置值的 ActiveModel（用于全量 UPDATE）
    pub(crate) fn into_active(self) -> ActiveModel {
        use sea_orm::Set;

        ActiveModel {
            id: Set(self.id),
            department_id: Set(self.department_id),
            grade: Set(self.grade),
            name: Set(self.name),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
