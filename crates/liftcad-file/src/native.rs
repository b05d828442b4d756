//! LiftCAD 原生文件格式（.lift）
//!
//! 基于 MessagePack + Zstd 的紧凑二进制格式：
//! 16 字节文件头（魔数、版本、标志位、压缩后长度）后接压缩数据。

use crate::error::FileError;
use chrono::{DateTime, Utc};
use liftcad_core::drawing::Drawing;
use liftcad_core::entity::DrawingElement;
use liftcad_core::layer::LayerTable;
use liftcad_core::snap::SnapSettings;
use liftcad_tools::config::SessionConfig;
use liftcad_tools::state::EditorSession;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use uuid::Uuid;

/// 文件魔数 "LIFT"
const MAGIC: &[u8; 4] = b"LIFT";

/// 当前文件格式版本
const FORMAT_VERSION: u32 = 1;

/// Zstd 压缩级别（1-22，3 是默认值，平衡速度和压缩比）
const COMPRESSION_LEVEL: i32 = 3;

/// 文件头（16 字节）
#[derive(Debug)]
struct FileHeader {
    magic: [u8; 4],
    version: u32,
    /// 标志位（预留）
    flags: u32,
    compressed_size: u32,
}

impl FileHeader {
    fn new(compressed_size: u32) -> Self {
        Self {
            magic: *MAGIC,
            version: FORMAT_VERSION,
            flags: 0,
            compressed_size,
        }
    }

    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        Ok(())
    }

    fn read(reader: &mut impl Read) -> Result<Self, FileError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;

        if &magic != MAGIC {
            return Err(FileError::InvalidFormat(
                "Invalid magic number, not a LiftCAD file".to_string(),
            ));
        }

        let mut buf = [0u8; 4];

        reader.read_exact(&mut buf)?;
        let version = u32::from_le_bytes(buf);

        reader.read_exact(&mut buf)?;
        let flags = u32::from_le_bytes(buf);

        reader.read_exact(&mut buf)?;
        let compressed_size = u32::from_le_bytes(buf);

        Ok(Self {
            magic,
            version,
            flags,
            compressed_size,
        })
    }
}

/// 文档元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub id: Uuid,
    pub title: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// 写入文件的程序版本
    pub generator: String,
}

impl DocumentMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created: now,
            modified: now,
            generator: concat!("liftcad ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

/// 文件内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftDocument {
    pub metadata: DocumentMetadata,
    pub layers: LayerTable,
    pub elements: Vec<DrawingElement>,
    pub snap: SnapSettings,
}

impl LiftDocument {
    /// 从会话收集文件内容（撤销历史不保存）
    pub fn from_session(session: &EditorSession, mut metadata: DocumentMetadata) -> Self {
        metadata.touch();
        let drawing = session.drawing();
        Self {
            metadata,
            layers: drawing.layers().clone(),
            elements: drawing.elements().to_vec(),
            snap: session.snap_settings().clone(),
        }
    }

    /// 重建图纸，校验图元ID和图层引用
    pub fn into_drawing(self) -> Result<(Drawing, SnapSettings, DocumentMetadata), FileError> {
        let drawing = Drawing::from_parts(self.layers, self.elements)?;
        Ok((drawing, self.snap, self.metadata))
    }

    /// 重建编辑会话；文件中的捕捉设置覆盖配置中的
    pub fn into_session(self, mut config: SessionConfig) -> Result<(EditorSession, DocumentMetadata), FileError> {
        let (drawing, snap, metadata) = self.into_drawing()?;
        config.snap = snap;
        Ok((EditorSession::with_drawing(drawing, config), metadata))
    }

    /// 编码为文件字节
    pub fn to_bytes(&self) -> Result<Vec<u8>, FileError> {
        let msgpack_data = rmp_serde::to_vec_named(self)?;
        let compressed_data = zstd::encode_all(msgpack_data.as_slice(), COMPRESSION_LEVEL)?;
        let compressed_size = u32::try_from(compressed_data.len())
            .map_err(|_| FileError::InvalidFormat("document exceeds 4 GiB compressed".to_string()))?;

        let mut bytes = Vec::with_capacity(16 + compressed_data.len());
        FileHeader::new(compressed_size).write(&mut bytes)?;
        bytes.extend_from_slice(&compressed_data);
        Ok(bytes)
    }

    /// 从字节流解码
    pub fn from_reader(reader: &mut impl Read) -> Result<Self, FileError> {
        let header = FileHeader::read(reader)?;

        if header.version > FORMAT_VERSION {
            return Err(FileError::UnsupportedVersion(format!(
                "File version {} is newer than supported version {}",
                header.version, FORMAT_VERSION
            )));
        }
        tracing::debug!(version = header.version, flags = header.flags, "read file header");

        let mut compressed_data = vec![0u8; header.compressed_size as usize];
        reader.read_exact(&mut compressed_data)?;

        let msgpack_data = zstd::decode_all(compressed_data.as_slice())?;
        Ok(rmp_serde::from_slice(&msgpack_data)?)
    }
}

/// 保存文档到文件
pub fn save(document: &LiftDocument, path: &Path) -> Result<(), FileError> {
    let bytes = document.to_bytes()?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;

    tracing::info!(
        "Saved {} elements, {} layers to {} ({} bytes)",
        document.elements.len(),
        document.layers.count(),
        path.display(),
        bytes.len()
    );

    Ok(())
}

/// 从文件加载文档
pub fn load(path: &Path) -> Result<LiftDocument, FileError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let document = LiftDocument::from_reader(&mut reader)?;

    tracing::info!(
        "Loaded {} elements, {} layers from {}",
        document.elements.len(),
        document.layers.count(),
        path.display()
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_core::block_library::{BlockLibrary, Placement};
    use liftcad_core::drawing::{ChangeSet, NewElement};
    use liftcad_core::entity::ElementKind;
    use liftcad_core::math::Point2;
    use liftcad_core::snap::{SnapMask, SnapType};

    fn sample_session() -> EditorSession {
        let mut session = EditorSession::new(SessionConfig::default());
        let drawing = session.drawing_mut();
        let people = drawing.add_layer("people");
        let person = BlockLibrary::with_builtins()
            .instantiate("person", Placement::at(Point2::new(5.0, 5.0)).rotated(30.0), people)
            .unwrap();
        drawing
            .commit(
                ChangeSet::new()
                    .add(NewElement::new(ElementKind::rectangle(Point2::new(0.0, 0.0), Point2::new(8.0, 3.0))))
                    .add(NewElement::new(ElementKind::Block(person)).on_layer(people)),
            )
            .unwrap();
        session.snap_settings_mut().mask = SnapMask::only(SnapType::Grid);
        session
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.lift");

        let session = sample_session();
        let document = LiftDocument::from_session(&session, DocumentMetadata::new("Tower lift"));
        save(&document, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.metadata, document.metadata);
        assert_eq!(loaded.elements, session.drawing().elements());

        let (restored, metadata) = loaded.into_session(SessionConfig::default()).unwrap();
        assert_eq!(metadata.title, "Tower lift");
        assert_eq!(restored.drawing().element_count(), 2);
        assert_eq!(restored.drawing().layers().count(), 2);
        assert_eq!(restored.snap_settings().mask, SnapMask::only(SnapType::Grid));
    }

    #[test]
    fn test_header_layout() {
        let session = sample_session();
        let bytes = LiftDocument::from_session(&session, DocumentMetadata::new("x"))
            .to_bytes()
            .unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), FORMAT_VERSION);
        let size = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
        assert_eq!(bytes.len(), 16 + size);
    }

    #[test]
    fn test_invalid_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.lift");

        let mut file = File::create(&path).unwrap();
        file.write_all(b"XXXX").unwrap();
        file.write_all(&[0u8; 12]).unwrap();

        assert!(matches!(load(&path), Err(FileError::InvalidFormat(_))));
    }

    #[test]
    fn test_newer_version_rejected() {
        let session = sample_session();
        let mut bytes = LiftDocument::from_session(&session, DocumentMetadata::new("x"))
            .to_bytes()
            .unwrap();
        bytes[4..8].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
        assert!(matches!(
            LiftDocument::from_reader(&mut bytes.as_slice()),
            Err(FileError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let session = sample_session();
        let bytes = LiftDocument::from_session(&session, DocumentMetadata::new("x"))
            .to_bytes()
            .unwrap();
        let truncated = &bytes[..bytes.len() - 4];
        assert!(matches!(
            LiftDocument::from_reader(&mut &truncated[..]),
            Err(FileError::Io(_))
        ));
    }
}
