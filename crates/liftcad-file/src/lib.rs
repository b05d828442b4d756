//! LiftCAD 文件处理
//!
//! 支持：
//! - 外部编解码器产生的逻辑图元导入
//! - 供渲染器使用的只读快照
//! - `.lift` 原生格式（MessagePack + Zstd）

pub mod error;
pub mod import;
pub mod native;
pub mod snapshot;

pub use error::FileError;
pub use import::{import_records, ImportBatch, ImportRecord, ImportReport, ImportShape};
pub use native::{load, save, DocumentMetadata, LiftDocument};
pub use snapshot::DrawingSnapshot;
