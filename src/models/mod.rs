//! 核心数据模型模块
//!
//! 定义检索结果（SearchRecord）与对话相关的数据结构。

pub mod chat;
pub mod search_record;

pub use chat::*;
pub use search_record::*;
