//! 会话追踪的记录类型
//!
//! 使用宏在九种实体模型之上生成封闭枚举：七种带审计字段的主实体
//! 由宏展开，两张纯关联表（复合主键、无审计字段）单独列出。

use crate::entity::prelude::{RolePermissionLinkModel, UserGroupLinkModel};

/// 定义可追踪记录的宏
///
/// 自动生成：
/// - `Record` / `RecordKind` / `RecordKey` 枚举
/// - `From<Model>` 转换
/// - 主键与审计字段的统一访问方法
macro_rules! define_tracked_records {
    ($(
        $variant:ident($module:ident, $table:literal)
    ),* $(,)?) => {
        /// 会话中的一条记录快照
        #[derive(Clone, Debug, PartialEq)]
        pub enum Record {
            $($variant(crate::entity::$module::Model),)*
            UserGroupLink(UserGroupLinkModel),
            RolePermissionLink(RolePermissionLinkModel),
        }

        /// 记录类别
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum RecordKind {
            $($variant,)*
            UserGroupLink,
            RolePermissionLink,
        }

        /// 记录主键；自增主键为 0 时视为尚未分配
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum RecordKey {
            $($variant(i64),)*
            UserGroupLink(i64, i64),
            RolePermissionLink(i64, i64),
        }

        $(
            impl From<crate::entity::$module::Model> for Record {
                fn from(model: crate::entity::$module::Model) -> Self {
                    Record::$variant(model)
                }
            }
        )*

        impl From<UserGroupLinkModel> for Record {
            fn from(model: UserGroupLinkModel) -> Self {
                Record::UserGroupLink(model)
            }
        }

        impl From<RolePermissionLinkModel> for Record {
            fn from(model: RolePermissionLinkModel) -> Self {
                Record::RolePermissionLink(model)
            }
        }

        impl Record {
            /// 记录类别
            pub fn kind(&self) -> RecordKind {
                match self {
                    $(Record::$variant(_) => RecordKind::$variant,)*
                    Record::UserGroupLink(_) => RecordKind::UserGroupLink,
                    Record::RolePermissionLink(_) => RecordKind::RolePermissionLink,
                }
            }

            /// 记录主键；主键尚未分配时返回 None
            pub fn key(&self) -> Option<RecordKey> {
                match self {
                    $(Record::$variant(m) => {
                        (m.id != 0).then_some(RecordKey::$variant(m.id))
                    })*
                    Record::UserGroupLink(m) => (m.user_id != 0 && m.group_id != 0)
                        .then_some(RecordKey::UserGroupLink(m.user_id, m.group_id)),
                    Record::RolePermissionLink(m) => (m.role_id != 0 && m.permission_id != 0)
                        .then_some(RecordKey::RolePermissionLink(m.role_id, m.permission_id)),
                }
            }

            /// 回填数据库分配的主键；类别不匹配时不做任何事
            pub(crate) fn assign_key(&mut self, key: RecordKey) {
                match (self, key) {
                    $((Record::$variant(m), RecordKey::$variant(id)) => m.id = id,)*
                    (Record::UserGroupLink(m), RecordKey::UserGroupLink(user_id, group_id)) => {
                        m.user_id = user_id;
                        m.group_id = group_id;
                    }
                    (
                        Record::RolePermissionLink(m),
                        RecordKey::RolePermissionLink(role_id, permission_id),
                    ) => {
                        m.role_id = role_id;
                        m.permission_id = permission_id;
                    }
                    _ => {}
                }
            }

            /// 创建时间戳（关联行没有审计字段，恒为 None）
            pub fn created_at(&self) -> Option<i64> {
                match self {
                    $(Record::$variant(m) => m.created_at,)*
                    Record::UserGroupLink(_) | Record::RolePermissionLink(_) => None,
                }
            }

            /// 更新时间戳（关联行没有审计字段，恒为 None）
            pub fn updated_at(&self) -> Option<i64> {
                match self {
                    $(Record::$variant(m) => m.updated_at,)*
                    Record::UserGroupLink(_) | Record::RolePermissionLink(_) => None,
                }
            }

            /// 写入创建时间戳；对关联行是空操作
            pub(crate) fn stamp_created(&mut self, now: i64) {
                match self {
                    $(Record::$variant(m) => m.created_at = Some(now),)*
                    Record::UserGroupLink(_) | Record::RolePermissionLink(_) => {}
                }
            }

            /// 写入更新时间戳；对关联行是空操作
            pub(crate) fn stamp_updated(&mut self, now: i64) {
                match self {
                    $(Record::$variant(m) => m.updated_at = Some(now),)*
                    Record::UserGroupLink(_) | Record::RolePermissionLink(_) => {}
                }
            }
        }

        impl RecordKind {
            /// 对应的数据库表名
            pub fn table_name(&self) -> &'static str {
                match self {
                    $(RecordKind::$variant => $table,)*
                    RecordKind::UserGroupLink => "user_group_links",
                    RecordKind::RolePermissionLink => "role_permission_links",
                }
            }
        }

        impl RecordKey {
            /// 键所属的记录类别
            pub fn kind(&self) -> RecordKind {
                match self {
                    $(RecordKey::$variant(_) => RecordKind::$variant,)*
                    RecordKey::UserGroupLink(_, _) => RecordKind::UserGroupLink,
                    RecordKey::RolePermissionLink(_, _) => RecordKind::RolePermissionLink,
                }
            }
        }
    };
}

define_tracked_records! {
    User(users, "users"),
    Role(roles, "roles"),
    Permission(permissions, "permissions"),
    Department(departments, "departments"),
    Course(courses, "courses"),
    Group(groups, "groups"),
    WeekType(week_types, "week_types"),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64) -> Record {
        Record::Role(crate::entity::roles::Model {
            id,
            name: "student".to_string(),
            created_at: None,
            updated_at: None,
        })
    }

    #[test]
    fn test_key_is_none_until_assigned() {
        assert_eq!(role(0).key(), None);
        assert_eq!(role(7).key(), Some(RecordKey::Role(7)));
    }

    #[test]
    fn test_assign_key_fills_generated_id() {
        let mut record = role(0);
        record.assign_key(RecordKey::Role(12));
        assert_eq!(record.key(), Some(RecordKey::Role(12)));

        // 类别不匹配的键不生效
        record.assign_key(RecordKey::User(99));
        assert_eq!(record.key(), Some(RecordKey::Role(12)));
    }

    #[test]
    fn test_stamping_touches_only_audit_fields() {
        let mut record = role(1);
        record.stamp_created(100);
        assert_eq!(record.created_at(), Some(100));
        assert_eq!(record.updated_at(), None);

        record.stamp_updated(200);
        assert_eq!(record.created_at(), Some(100));
        assert_eq!(record.updated_at(), Some(200));
    }

    #[test]
    fn test_link_rows_have_no_audit_fields() {
        let mut link = Record::UserGroupLink(crate::entity::user_group_links::Model {
            user_id: 1,
            group_id: 2,
        });
        link.stamp_created(100);
        link.stamp_updated(200);
        assert_eq!(link.created_at(), None);
        assert_eq!(link.updated_at(), None);
        assert_eq!(link.key(), Some(RecordKey::UserGroupLink(1, 2)));
    }

    #[test]
    fn test_kind_and_table_name() {
        assert_eq!(role(1).kind(), RecordKind::Role);
        assert_eq!(RecordKind::Role.table_name(), "roles");
        assert_eq!(RecordKind::UserGroupLink.table_name(), "user_group_links");
        assert_eq!(RecordKey::WeekType(3).kind(), RecordKind::WeekType);
    }
}
