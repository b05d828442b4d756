//! 文件操作错误定义

use liftcad_core::error::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    /// 编解码器产生的记录少于它声明的数量
    #[error("Import incomplete: expected {expected} records, codec produced {produced}")]
    ImportPartial { expected: usize, produced: usize },

    #[error("Model error: {0}")]
    Model(#[from] CoreError),
}
