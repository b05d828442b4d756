//! 导出快照
//!
//! 供外部渲染器（光栅、矢量、打印）使用的只读视图：可见图元、图层、
//! 当前图层、捕捉设置和视图。本 crate 不做任何光栅化。

use crate::error::FileError;
use liftcad_core::entity::{DrawingElement, ElementId};
use liftcad_core::layer::{Layer, LayerId};
use liftcad_core::math::BoundingBox2;
use liftcad_core::snap::SnapSettings;
use liftcad_tools::state::{EditorSession, Viewport};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingSnapshot {
    /// 可见图层上的图元，按图纸顺序
    pub elements: Vec<DrawingElement>,
    pub layers: Vec<Layer>,
    pub current_layer: LayerId,
    pub snap: SnapSettings,
    pub viewport: Viewport,
    pub selection: Vec<ElementId>,
    /// 可见图元的范围；没有可见图元时为 `None`
    pub extents: Option<BoundingBox2>,
}

impl DrawingSnapshot {
    pub fn capture(session: &EditorSession) -> Self {
        let drawing = session.drawing();
        let elements: Vec<DrawingElement> = drawing.visible_elements().cloned().collect();

        let mut extents = BoundingBox2::empty();
        for el in &elements {
            extents.merge(&el.bounding_box());
        }

        Self {
            elements,
            layers: drawing.layers().iter().cloned().collect(),
            current_layer: drawing.layers().current(),
            snap: session.snap_settings().clone(),
            viewport: *session.viewport(),
            selection: session.selection().to_vec(),
            extents: (!extents.is_empty()).then_some(extents),
        }
    }

    pub fn to_json(&self) -> Result<String, FileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_core::drawing::{ChangeSet, NewElement};
    use liftcad_core::entity::ElementKind;
    use liftcad_core::math::Point2;
    use liftcad_tools::config::SessionConfig;

    #[test]
    fn test_snapshot_skips_hidden_layers() {
        let mut session = EditorSession::new(SessionConfig::default());
        let drawing = session.drawing_mut();
        let hidden = drawing.add_layer("hidden");
        drawing
            .commit(
                ChangeSet::new()
                    .add(NewElement::new(ElementKind::line(Point2::new(0.0, 0.0), Point2::new(10.0, 5.0))))
                    .add(NewElement::new(ElementKind::circle(Point2::new(50.0, 50.0), 1.0)).on_layer(hidden)),
            )
            .unwrap();
        drawing.set_layer_visible(hidden, false).unwrap();

        let snapshot = DrawingSnapshot::capture(&session);
        assert_eq!(snapshot.elements.len(), 1);
        assert_eq!(snapshot.layers.len(), 2);
        assert_eq!(
            snapshot.extents,
            Some(BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 5.0)))
        );
    }

    #[test]
    fn test_empty_snapshot_json() {
        let session = EditorSession::new(SessionConfig::default());
        let snapshot = DrawingSnapshot::capture(&session);
        assert!(snapshot.extents.is_none());

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["layers"][0]["name"], "0");
        assert_eq!(json["viewport"]["zoom"], 1.0);
        assert!(json["elements"].as_array().unwrap().is_empty());
    }
}
