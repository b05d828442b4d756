//! 逻辑图元导入
//!
//! 外部编解码器（DXF、SVG 等）先把文件转换成 [`ImportRecord`] 列表，
//! 这里再把记录转换成图元。无法表示的记录被拒绝并计入 `skipped`，不会静默丢弃。
//!
//! 导入是一次提交：缺失的图层、全部图元要么一起生效，要么都不生效。
//! 角度按编解码器惯例以度为单位。

use crate::error::FileError;
use liftcad_core::block_library::{BlockLibrary, Placement};
use liftcad_core::drawing::{ChangeSet, Drawing, NewElement};
use liftcad_core::entity::ElementKind;
use liftcad_core::error::CoreError;
use liftcad_core::geometry::Arc;
use liftcad_core::layer::LayerId;
use liftcad_core::math::{Point2, EPSILON};
use liftcad_core::properties::{Color, Style};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 编解码器产生的几何记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportShape {
    Line {
        from: Point2,
        to: Point2,
    },
    Rectangle {
        corner1: Point2,
        corner2: Point2,
    },
    Circle {
        center: Point2,
        radius: f64,
    },
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Polyline {
        vertices: Vec<Point2>,
        #[serde(default)]
        closed: bool,
    },
    Text {
        anchor: Point2,
        content: String,
        height: f64,
        #[serde(default)]
        rotation: f64,
    },
    Dimension {
        from: Point2,
        to: Point2,
        location: Point2,
        #[serde(default)]
        text: Option<String>,
        #[serde(default = "default_text_height")]
        text_height: f64,
    },
    /// 块库中的符号
    Block {
        name: String,
        at: Point2,
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default)]
        rotation: f64,
    },
    /// 编解码器认识但模型无法表示的实体（如 HATCH、SPLINE）
    Unsupported {
        kind: String,
    },
}

fn default_text_height() -> f64 {
    2.5
}

fn default_scale() -> f64 {
    1.0
}

impl ImportShape {
    pub fn kind(&self) -> &str {
        match self {
            ImportShape::Line { .. } => "line",
            ImportShape::Rectangle { .. } => "rectangle",
            ImportShape::Circle { .. } => "circle",
            ImportShape::Arc { .. } => "arc",
            ImportShape::Polyline { .. } => "polyline",
            ImportShape::Text { .. } => "text",
            ImportShape::Dimension { .. } => "dimension",
            ImportShape::Block { .. } => "block",
            ImportShape::Unsupported { kind } => kind,
        }
    }
}

/// 一条导入记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// 图层名，缺省放在当前图层
    #[serde(default)]
    pub layer: Option<String>,
    /// 描边颜色 `#RRGGBB`
    #[serde(default)]
    pub color: Option<String>,
    #[serde(flatten)]
    pub shape: ImportShape,
}

impl ImportRecord {
    pub fn new(shape: ImportShape) -> Self {
        Self {
            layer: None,
            color: None,
            shape,
        }
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }
}

/// 导入的图层属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLayer {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub locked: bool,
}

/// 一个编解码器的完整输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    /// 源文件声明的实体数量，编解码器不知道时为 `None`
    #[serde(default)]
    pub declared_count: Option<usize>,
    #[serde(default)]
    pub layers: Vec<ImportLayer>,
    #[serde(default)]
    pub records: Vec<ImportRecord>,
}

impl ImportBatch {
    pub fn from_json(json: &str) -> Result<Self, FileError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 被拒绝的记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// 在批次中的下标
    pub index: usize,
    pub kind: String,
    pub reason: String,
}

/// 导入结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// 成功创建的图元数
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
    /// 源文件声明的实体数
    pub expected: usize,
    /// 编解码器实际产生的记录数
    pub produced: usize,
    pub layers_created: Vec<String>,
}

impl ImportReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// 编解码器产生的记录少于声明数量时报错
    pub fn ensure_complete(&self) -> Result<(), FileError> {
        if self.produced < self.expected {
            return Err(FileError::ImportPartial {
                expected: self.expected,
                produced: self.produced,
            });
        }
        Ok(())
    }
}

/// 导入一批记录
///
/// 记录级的问题（未知块、非法尺寸、不支持的实体）只拒绝该记录；
/// 模型级错误（图层锁定、块循环引用）中止整个导入，图纸保持原状。
pub fn import_records(
    drawing: &mut Drawing,
    batch: &ImportBatch,
    library: &BlockLibrary,
) -> Result<ImportReport, FileError> {
    let mut staged = drawing.clone();
    let mut report = ImportReport {
        expected: batch.declared_count.unwrap_or(batch.records.len()),
        produced: batch.records.len(),
        ..Default::default()
    };

    for layer in &batch.layers {
        let id = ensure_layer(&mut staged, &layer.name, &mut report);
        if let Some(color) = layer.color.as_deref().and_then(Color::from_hex) {
            staged.set_layer_color(id, color)?;
        }
    }

    let mut changes = ChangeSet::new();
    let mut locks = Vec::new();
    for (index, record) in batch.records.iter().enumerate() {
        let layer = match &record.layer {
            Some(name) => ensure_layer(&mut staged, name, &mut report),
            None => staged.layers().current(),
        };
        match convert(record, layer, library) {
            Ok(element) => {
                changes = changes.add(element);
                report.imported += 1;
            }
            Err(Rejection::Record(reason)) => {
                warn!(index, kind = record.shape.kind(), %reason, "import record rejected");
                report.skipped.push(SkippedRecord {
                    index,
                    kind: record.shape.kind().to_string(),
                    reason,
                });
            }
            Err(Rejection::Model(e)) => {
                warn!(index, "import aborted: {}", e);
                return Err(e.into());
            }
        }
    }

    // 先放入图元再锁定图层
    for layer in &batch.layers {
        if layer.locked {
            if let Some(found) = staged.layers().find_by_name(&layer.name) {
                locks.push(found.id);
            }
        }
    }

    if !changes.is_empty() {
        staged.commit(changes)?;
    }
    for id in locks {
        staged.set_layer_locked(id, true)?;
    }
    *drawing = staged;

    info!(
        imported = report.imported,
        skipped = report.skipped_count(),
        expected = report.expected,
        produced = report.produced,
        "import finished"
    );
    Ok(report)
}

fn ensure_layer(drawing: &mut Drawing, name: &str, report: &mut ImportReport) -> LayerId {
    if let Some(layer) = drawing.layers().find_by_name(name) {
        return layer.id;
    }
    report.layers_created.push(name.to_string());
    drawing.ensure_layer(name)
}

enum Rejection {
    Record(String),
    Model(CoreError),
}

fn convert(record: &ImportRecord, layer: LayerId, library: &BlockLibrary) -> Result<NewElement, Rejection> {
    let reject = |reason: &str| Err(Rejection::Record(reason.to_string()));

    let points_finite = |points: &[Point2]| points.iter().all(|p| p.x.is_finite() && p.y.is_finite());
    let positive = |value: f64| value.is_finite() && value > EPSILON;

    let kind = match &record.shape {
        ImportShape::Line { from, to } => {
            if !points_finite(&[*from, *to]) {
                return reject("non-finite coordinate");
            }
            ElementKind::line(*from, *to)
        }
        ImportShape::Rectangle { corner1, corner2 } => {
            if !points_finite(&[*corner1, *corner2]) {
                return reject("non-finite coordinate");
            }
            if (corner1.x - corner2.x).abs() <= EPSILON || (corner1.y - corner2.y).abs() <= EPSILON {
                return reject("rectangle has zero width or height");
            }
            ElementKind::rectangle(*corner1, *corner2)
        }
        ImportShape::Circle { center, radius } => {
            if !points_finite(&[*center]) || !positive(*radius) {
                return reject("circle needs a finite center and positive radius");
            }
            ElementKind::circle(*center, *radius)
        }
        ImportShape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            if !points_finite(&[*center]) || !positive(*radius) {
                return reject("arc needs a finite center and positive radius");
            }
            if !start_angle.is_finite() || !end_angle.is_finite() {
                return reject("non-finite arc angle");
            }
            ElementKind::arc(Arc::new(
                *center,
                *radius,
                start_angle.to_radians(),
                end_angle.to_radians(),
            ))
        }
        ImportShape::Polyline { vertices, closed } => {
            if vertices.len() < 2 {
                return reject("polyline needs at least two vertices");
            }
            if !points_finite(vertices.as_slice()) {
                return reject("non-finite coordinate");
            }
            ElementKind::Polyline {
                vertices: vertices.clone(),
                closed: *closed,
            }
        }
        ImportShape::Text {
            anchor,
            content,
            height,
            rotation,
        } => {
            if !points_finite(&[*anchor]) || !positive(*height) {
                return reject("text needs a finite anchor and positive height");
            }
            ElementKind::Text {
                anchor: *anchor,
                content: content.clone(),
                height: *height,
                rotation: rotation.to_radians(),
            }
        }
        ImportShape::Dimension {
            from,
            to,
            location,
            text,
            text_height,
        } => {
            if !points_finite(&[*from, *to, *location]) || !positive(*text_height) {
                return reject("invalid dimension geometry");
            }
            ElementKind::Dimension {
                from: *from,
                to: *to,
                line_location: *location,
                text_override: text.clone(),
                text_height: *text_height,
            }
        }
        ImportShape::Block {
            name,
            at,
            scale,
            rotation,
        } => {
            if !points_finite(&[*at]) || !positive(*scale) {
                return reject("block needs a finite insertion point and positive scale");
            }
            let placement = Placement::at(*at).rotated(*rotation).scaled(*scale);
            match library.instantiate(name, placement, layer) {
                Ok(block) => ElementKind::Block(block),
                Err(CoreError::UnknownBlock(name)) => {
                    return Err(Rejection::Record(format!("unknown block '{}'", name)));
                }
                Err(e) => return Err(Rejection::Model(e)),
            }
        }
        ImportShape::Unsupported { kind } => {
            return Err(Rejection::Record(format!("'{}' cannot be represented", kind)));
        }
    };

    let mut style = Style::default();
    if let Some(hex) = &record.color {
        match Color::from_hex(hex) {
            Some(color) => style = style.with_stroke(color),
            None => return Err(Rejection::Record(format!("invalid color '{}'", hex))),
        }
    }

    Ok(NewElement::new(kind).with_style(style).on_layer(layer))
}
