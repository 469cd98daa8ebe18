//! SRSystem - 学籍管理平台持久化核心
//!
//! 基于 SeaORM 构建的学籍数据层：实体定义、变更追踪会话与存储边界。
//!
//! # 架构
//! - `config`: 配置管理
//! - `context`: 数据上下文（变更追踪工作单元）
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `storage`: 数据存储层（SeaORM）

pub mod config;
pub mod context;
pub mod entity;
pub mod errors;
pub mod storage;
