//! 验证相关错误类型
//!
//! Errors produced while shape-checking service descriptors. Every variant
//! carries the path of the offending field so callers can tell which
//! descriptor of a multi-descriptor call was rejected.

use thiserror::Error;

/// 验证相关错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("\"{field}\" is required (at {path})")]
    Required { field: String, path: String },

    #[error("\"{field}\" must not be empty (at {path})")]
    Empty { field: String, path: String },

    #[error("\"{field}\" must be {expected} (at {path})")]
    InvalidType {
        field: String,
        expected: String,
        path: String,
    },

    #[error("\"{field}\" is not allowed (at {path})")]
    NotAllowed { field: String, path: String },

    #[error("\"{field}\" contains a duplicate value: {value} (at {path})")]
    Duplicate {
        field: String,
        value: String,
        path: String,
    },
}

impl ValidationError {
    pub fn required(field: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Required {
            field: field.into(),
            path: path.into(),
        }
    }

    pub fn empty(field: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Empty {
            field: field.into(),
            path: path.into(),
        }
    }

    pub fn invalid_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected: expected.into(),
            path: path.into(),
        }
    }

    pub fn not_allowed(field: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotAllowed {
            field: field.into(),
            path: path.into(),
        }
    }

    pub fn duplicate(
        field: impl Into<String>,
        value: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            field: field.into(),
            value: value.into(),
            path: path.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field, .. }
            | Self::Empty { field, .. }
            | Self::InvalidType { field, .. }
            | Self::NotAllowed { field, .. }
            | Self::Duplicate { field, .. } => field,
        }
    }

    /// Location of the field inside the input, e.g. `[1].services[0]`.
    pub fn path(&self) -> &str {
        match self {
            Self::Required { path, .. }
            | Self::Empty { path, .. }
            | Self::InvalidType { path, .. }
            | Self::NotAllowed { path, .. }
            | Self::Duplicate { path, .. } => path,
        }
    }
}
