//! 小组实体
//!
//! 学生编组，隶属于某个课程，成员通过关联表维护。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::user_group_links::Entity")]
    UserGroupLinks,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::user_group_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGroupLinks.def()
    }
}

// 多对多：小组 <-> 用户
impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_group_links::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_group_links::Relation::Group.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为所有字段均已置值的 ActiveModel（用于全量 UPDATE）
    pub(crate) fn into_active(self) -> ActiveModel {
        use sea_orm::Set;

        ActiveModel {
            id: Set(self.id),
            course_id: Set(self.course_id),
            name: Set(self.name),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
