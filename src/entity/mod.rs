//! SeaORM 实体定义
//!
//! 这些实体直接映射数据库表结构，context 模块在其上叠加变更追踪，
//! storage 层使用它们执行 CRUD 操作。

pub mod prelude;

pub mod courses;
pub mod departments;
pub mod groups;
pub mod permissions;
pub mod role_permission_links;
pub mod roles;
pub mod user_group_links;
pub mod users;
pub mod week_types;
