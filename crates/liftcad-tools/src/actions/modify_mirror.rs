//! 镜像 Action
//!
//! 参考 LibreCAD 的 RS_ActionModifyMirror 实现

use crate::action::{
    toggle_pick, Action, ActionContext, ActionResult, ActionType, Pick, PreviewGeometry, Step, StepInput,
};
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::ElementId;
use liftcad_core::geometry::{Geometry, Line};
use liftcad_core::math::Point2;
use liftcad_core::transform::Transform2D;

/// 镜像状态
#[derive(Debug, Clone, PartialEq)]
enum Status {
    /// 等待选择对象
    SelectObjects,
    /// 等待指定镜像线第一点
    SetPoint1,
    /// 等待指定镜像线第二点
    SetPoint2,
}

/// 镜像 Action
pub struct MirrorAction {
    status: Status,
    /// 选中的图元 ID
    entity_ids: Vec<ElementId>,
    /// 镜像线第一点
    point1: Option<Point2>,
    /// 是否删除原对象
    delete_original: bool,
}

impl MirrorAction {
    pub fn new() -> Self {
        Self {
            status: Status::SelectObjects,
            entity_ids: Vec::new(),
            point1: None,
            delete_original: false,
        }
    }

    fn execute(&self, ctx: &ActionContext, axis: Transform2D) -> ActionResult {
        let mut changes = ChangeSet::new();
        for id in &self.entity_ids {
            let Some(el) = ctx.drawing.get(*id) else {
                return ActionResult::reject(format!("element {} no longer exists", id));
            };
            changes = changes.add(NewElement::new(el.kind.transformed(&axis)).with_style(el.style.clone()));
            if self.delete_original {
                changes = changes.remove(*id);
            }
        }
        ActionResult::commit(changes)
    }
}

impl Default for MirrorAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for MirrorAction {
    fn action_type(&self) -> ActionType {
        ActionType::Mirror
    }

    fn init(&mut self, ctx: &ActionContext) {
        // 预先选中的对象直接进入选择集
        self.entity_ids = ctx
            .selection
            .iter()
            .copied()
            .filter(|id| ctx.drawing.contains(*id))
            .collect();
    }

    fn reset(&mut self) {
        self.status = Status::SelectObjects;
        self.entity_ids.clear();
        self.point1 = None;
        self.delete_original = false;
    }

    fn step(&self) -> Step {
        match self.status {
            Status::SelectObjects => Step::new(1, "select objects", StepInput::Element),
            Status::SetPoint1 => Step::new(2, "first axis point", StepInput::Point),
            Status::SetPoint2 => Step::new(2, "second axis point", StepInput::Point),
        }
    }

    fn reference_point(&self) -> Option<Point2> {
        self.point1
    }

    fn on_pick(&mut self, _ctx: &ActionContext, pick: Pick) -> ActionResult {
        if self.status == Status::SelectObjects {
            if let Some(id) = pick.element {
                toggle_pick(&mut self.entity_ids, id);
            }
        }
        ActionResult::Continue
    }

    fn on_point(&mut self, ctx: &ActionContext, coord: Point2) -> ActionResult {
        match (&self.status, self.point1) {
            (Status::SetPoint2, Some(p1)) => match Transform2D::mirror(p1, coord) {
                Some(axis) => self.execute(ctx, axis),
                None => ActionResult::reject("mirror axis has zero length"),
            },
            (Status::SelectObjects, _) => ActionResult::Continue,
            _ => {
                self.point1 = Some(coord);
                self.status = Status::SetPoint2;
                ActionResult::Continue
            }
        }
    }

    fn on_text(&mut self, _ctx: &ActionContext, cmd: &str) -> Option<ActionResult> {
        let cmd_upper = cmd.trim().to_uppercase();

        match cmd_upper.as_str() {
            "Y" | "YES" => {
                self.delete_original = true;
                Some(ActionResult::Continue)
            }
            "N" | "NO" => {
                self.delete_original = false;
                Some(ActionResult::Continue)
            }
            _ => None,
        }
    }

    fn on_confirm(&mut self, _ctx: &ActionContext) -> ActionResult {
        match self.status {
            Status::SelectObjects if self.entity_ids.is_empty() => {
                ActionResult::reject("no objects selected")
            }
            Status::SelectObjects => {
                self.status = Status::SetPoint1;
                ActionResult::Continue
            }
            _ => ActionResult::Cancel,
        }
    }

    fn step_back(&mut self) {
        if self.status == Status::SetPoint2 {
            self.point1 = None;
            self.status = Status::SetPoint1;
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SelectObjects => "选择要镜像的对象:",
            Status::SetPoint1 => "指定镜像线的第一点 或 [删除源对象(Y)/保留(N)]:",
            Status::SetPoint2 => "指定镜像线的第二点:",
        }
    }

    fn get_available_commands(&self) -> Vec<&str> {
        match self.status {
            Status::SelectObjects => vec![],
            _ => vec!["Y", "N"],
        }
    }

    fn get_preview(&self, ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        let mut previews = Vec::new();

        if self.status == Status::SetPoint2 {
            if let Some(p1) = self.point1 {
                // 绘制镜像线
                previews.push(PreviewGeometry::reference(Geometry::Line(Line::new(p1, cursor))));
                if let Some(axis) = Transform2D::mirror(p1, cursor) {
                    for id in &self.entity_ids {
                        if let Some(el) = ctx.drawing.get(*id) {
                            previews.extend(
                                el.world_geometry()
                                    .iter()
                                    .map(|g| PreviewGeometry::new(g.transformed(&axis))),
                            );
                        }
                    }
                }
            }
        }

        previews
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_core::drawing::Drawing;
    use liftcad_core::entity::ElementKind;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn drawing_with_segment(start: Point2, end: Point2) -> (Drawing, ElementId) {
        let mut drawing = Drawing::new();
        let receipt = drawing
            .commit(ChangeSet::new().add(NewElement::new(ElementKind::line(start, end))))
            .unwrap();
        (drawing, receipt.added[0])
    }

    fn mirror_once(drawing: &Drawing, id: ElementId, a: Point2, b: Point2) -> ChangeSet {
        let ctx = ActionContext {
            drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = MirrorAction::new();
        action.init(&ctx);
        action.on_pick(&ctx, Pick { element: Some(id), point: Point2::origin() });
        assert!(matches!(action.on_confirm(&ctx), ActionResult::Continue));
        action.on_point(&ctx, a);
        match action.on_point(&ctx, b) {
            ActionResult::Commit { changes, finished: true } => changes,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mirror_across_y_axis() {
        let (drawing, id) = drawing_with_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let changes = mirror_once(&drawing, id, Point2::new(0.0, 0.0), Point2::new(0.0, 4.0));
        assert!(changes.removed.is_empty());
        match &changes.added[0].kind {
            ElementKind::Line { start, end } => {
                assert!((start - Point2::new(0.0, 0.0)).norm() < 1e-9);
                assert!((end - Point2::new(-4.0, 0.0)).norm() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mirror_and_delete() {
        let (drawing, id) = drawing_with_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[id],
            join_tolerance: 1e-6,
        };
        let mut action = MirrorAction::new();
        action.init(&ctx);
        action.on_confirm(&ctx);
        assert!(matches!(action.on_text(&ctx, "y"), Some(ActionResult::Continue)));
        action.on_point(&ctx, Point2::new(0.0, 0.0));
        match action.on_point(&ctx, Point2::new(1.0, 1.0)) {
            ActionResult::Commit { changes, .. } => assert_eq!(changes.removed, vec![id]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_selection_rejected() {
        let drawing = Drawing::new();
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = MirrorAction::new();
        assert!(matches!(action.on_confirm(&ctx), ActionResult::Rejected(_)));
        assert_eq!(action.step().index, 1);
    }

    #[test]
    fn test_repick_toggles_selection() {
        let (drawing, id) = drawing_with_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = MirrorAction::new();
        let pick = Pick { element: Some(id), point: Point2::origin() };
        action.on_pick(&ctx, pick);
        action.on_pick(&ctx, pick);
        assert!(matches!(action.on_confirm(&ctx), ActionResult::Rejected(_)));
    }

    #[test]
    fn test_degenerate_axis_rejected() {
        let (drawing, id) = drawing_with_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[id],
            join_tolerance: 1e-6,
        };
        let mut action = MirrorAction::new();
        action.init(&ctx);
        action.on_confirm(&ctx);
        action.on_point(&ctx, Point2::new(1.0, 1.0));
        assert!(matches!(action.on_point(&ctx, Point2::new(1.0, 1.0)), ActionResult::Rejected(_)));
    }

    proptest! {
        #[test]
        fn test_double_mirror_is_identity(
            x1 in -100.0..100.0f64, y1 in -100.0..100.0f64,
            x2 in -100.0..100.0f64, y2 in -100.0..100.0f64,
            ax in -50.0..50.0f64, ay in -50.0..50.0f64, angle in 0.0..std::f64::consts::PI,
        ) {
            let start = Point2::new(x1, y1);
            let end = Point2::new(x2, y2);
            let a = Point2::new(ax, ay);
            let b = a + liftcad_core::math::Vector2::new(angle.cos(), angle.sin()) * 10.0;

            let (drawing, id) = drawing_with_segment(start, end);
            let first = mirror_once(&drawing, id, a, b);
            let (drawing, id) = match &first.added[0].kind {
                ElementKind::Line { start, end } => drawing_with_segment(*start, *end),
                other => panic!("unexpected {:?}", other),
            };
            let second = mirror_once(&drawing, id, a, b);
            match &second.added[0].kind {
                ElementKind::Line { start: s, end: e } => {
                    prop_assert!(approx_eq!(f64, s.x, start.x, epsilon = 1e-6));
                    prop_assert!(approx_eq!(f64, s.y, start.y, epsilon = 1e-6));
                    prop_assert!(approx_eq!(f64, e.x, end.x, epsilon = 1e-6));
                    prop_assert!(approx_eq!(f64, e.y, end.y, epsilon = 1e-6));
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
