//! 角色实体
//!
//! 安全角色，决定用户可执行的操作集合。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::users::Entity")]
    Users,
    #[sea_orm(has_many = "super::role_permission_links::Entity")]
    RolePermissionLinks,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::role_permission_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermissionLinks.def()
    }
}

// 多对多：角色 <-> 权限
impl Related<super::permissions::Entity> for Entity {
    fn to() -> RelationDef {
        super::role_permission_links::Relation::Permission.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::role_permission_links::Relation::Role.def().rev())
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
