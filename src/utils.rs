//! 工具函数模块
//!
//! 此模块包含了项目中使用的各种工具函数：
//! - MIME 类型猜测
//! - 路径处理工具（扩展名获取、对象键提取）

pub mod headers;
pub mod path;
