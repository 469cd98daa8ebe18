//! 配置管理模块
//!
//! 支持从配置文件和环境变量加载配置。

mod r#impl;
mod structs;

pub use structs::*;
