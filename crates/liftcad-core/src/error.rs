//! 核心错误定义

use crate::entity::ElementId;
use crate::layer::LayerId;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// 数据完整性错误：能力表顺序错误、块循环引用等。只中止发现它的操作。
    #[error("Data integrity error in {context}: {reason}")]
    DataIntegrity { context: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("Element {0} is locked")]
    ElementLocked(ElementId),

    #[error("The last remaining layer cannot be deleted")]
    LastLayer,

    #[error("Unknown block definition: {0}")]
    UnknownBlock(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl CoreError {
    pub fn integrity(context: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::DataIntegrity {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
