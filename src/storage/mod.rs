//! 存储层模块
//!
//! 会话历史的键值存储抽象，默认实现为进程内存储。

pub mod history;

pub use history::{HistoryStore, InMemoryHistoryStore};
