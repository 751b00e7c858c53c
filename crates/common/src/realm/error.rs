//! Realm 错误类型定义
//!
//! 定义了 Realm 树操作相关的错误类型

use super::RealmId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RealmError {
    #[error("Realm not found: {0}")]
    NotFound(RealmId),

    #[error("Realm {parent} already has a child named {name}")]
    DuplicateChild { parent: RealmId, name: String },
}
