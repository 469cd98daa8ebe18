use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建角色表
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Roles::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Roles::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(Roles::UpdatedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // 创建权限表
        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Permissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Permissions::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Permissions::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(Permissions::UpdatedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // 创建院系表
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Departments::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(Departments::UpdatedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // 创建周类型表
        manager
            .create_table(
                Table::create()
                    .table(WeekTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeekTypes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WeekTypes::Index).integer().not_null())
                    .col(ColumnDef::new(WeekTypes::Name).string_len(32).null())
                    .col(ColumnDef::new(WeekTypes::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(WeekTypes::UpdatedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::RoleId).big_integer().not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(64).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(64).not_null())
                    .col(ColumnDef::new(Users::Patronymic).string_len(64).null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(254)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Courses::DepartmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::Grade).integer().not_null())
                    .col(ColumnDef::new(Courses::Name).string_len(64).null())
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建小组表
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Groups::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Groups::CreatedAt).big_integer().null())
                    .col(ColumnDef::new(Groups::UpdatedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Groups::Table, Groups::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建用户小组关联表
        manager
            .create_table(
                Table::create()
                    .table(UserGroupLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserGroupLinks::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserGroupLinks::GroupId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_user_group_links")
                            .col(UserGroupLinks::UserId)
                            .col(UserGroupLinks::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserGroupLinks::Table, UserGroupLinks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserGroupLinks::Table, UserGroupLinks::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建角色权限关联表
        manager
            .create_table(
                Table::create()
                    .table(RolePermissionLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RolePermissionLinks::RoleId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RolePermissionLinks::PermissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_role_permission_links")
                            .col(RolePermissionLinks::RoleId)
                            .col(RolePermissionLinks::PermissionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RolePermissionLinks::Table, RolePermissionLinks::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                RolePermissionLinks::Table,
                                RolePermissionLinks::PermissionId,
                            )
                            .to(Permissions::Table, Permissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 用户表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role_id")
                    .table(Users::Table)
                    .col(Users::RoleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await?;

        // 课程表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_courses_department_id")
                    .table(Courses::Table)
                    .col(Courses::DepartmentId)
                    .to_owned(),
            )
            .await?;

        // 小组表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_groups_course_id")
                    .table(Groups::Table)
                    .col(Groups::CourseId)
                    .to_owned(),
            )
            .await?;

        // 关联表反向查询索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_group_links_group_id")
                    .table(UserGroupLinks::Table)
                    .col(UserGroupLinks::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_role_permission_links_permission_id")
                    .table(RolePermissionLinks::Table)
                    .col(RolePermissionLinks::PermissionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(RolePermissionLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserGroupLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WeekTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    RoleId,
    FirstName,
    LastName,
    Patronymic,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Roles {
    #[sea_orm(iden = "roles")]
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Permissions {
    #[sea_orm(iden = "permissions")]
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Departments {
    #[sea_orm(iden = "departments")]
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    DepartmentId,
    Grade,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Groups {
    #[sea_orm(iden = "groups")]
    Table,
    Id,
    CourseId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WeekTypes {
    #[sea_orm(iden = "week_types")]
    Table,
    Id,
    Index,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserGroupLinks {
    #[sea_orm(iden = "user_group_links")]
    Table,
    UserId,
    GroupId,
}

#[derive(DeriveIden)]
enum RolePermissionLinks {
    #[sea_orm(iden = "role_permission_links")]
    Table,
    RoleId,
    PermissionId,
}
