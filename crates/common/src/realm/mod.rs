//! Realm 管理模块
//!
//! 提供组合树（Realm Tree）的只读遍历能力：
//! - `model.rs` - Realm 节点数据结构
//! - `tree.rs` - Arena 形式的组合树与祖先遍历
//! - `error.rs` - 错误类型

pub mod error;
pub mod model;
pub mod tree;

pub use error::RealmError;
pub use model::{Realm, RealmId};
pub use tree::{Ancestors, RealmTree};
