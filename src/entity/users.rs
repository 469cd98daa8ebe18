//! 用户实体
//!
//! 学籍系统的核心身份记录，通过 role_id 关联安全角色。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub role_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::roles::Entity",
        from = "Column::RoleId",
        to = "super::roles::Column::Id"
    )]
    Role,
    #[sea_orm(has_many = "super::user_group_links::Entity")]
    UserGroupLinks,
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::user_group_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGroupLinks.def()
    }
}

// 多对多：用户 <-> 小组
impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_group_links::Relation::Group.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_group_links::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为所有字段均已置值的 ActiveModel（用于全量 UPDATE）
    pub(crate) fn into_active(self) -> ActiveModel {
        use sea_orm::Set;

        ActiveModel {
            id: Set(self.id),
            role_id: Set(self.role_id),
            first_name: Set(self.first_name),
            last_name: Set(self.last_name),
            patronymic: Set(self.patronymic),
            email: Set(self.email),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
