//! 预导入模块，方便使用

pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::departments::{
    ActiveModel as DepartmentActiveModel, Entity as Departments, Model as DepartmentModel,
};
pub use super::groups::{ActiveModel as GroupActiveModel, Entity as Groups, Model as GroupModel};
pub use super::permissions::{
    ActiveModel as PermissionActiveModel, Entity as Permissions, Model as PermissionModel,
};
pub use super::role_permission_links::{
    ActiveModel as RolePermissionLinkActiveModel, Entity as RolePermissionLinks,
    Model as RolePermissionLinkModel,
};
pub use super::roles::{ActiveModel as RoleActiveModel, Entity as Roles, Model as RoleModel};
pub use super::user_group_links::{
    ActiveModel as UserGroupLinkActiveModel, Entity as UserGroupLinks, Model as UserGroupLinkModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::week_types::{
    ActiveModel as WeekTypeActiveModel, Entity as WeekTypes, Model as WeekTypeModel,
};
