//! 绘制矩形 Action

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry, Step, StepInput};
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::ElementKind;
use liftcad_core::geometry::{Geometry, Line};
use liftcad_core::math::{Point2, EPSILON};

/// 矩形绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待设置第一个角点
    SetCorner1,
    /// 等待设置对角点
    SetCorner2,
}

/// 绘制矩形 Action
pub struct DrawRectangleAction {
    status: Status,
    corner1: Option<Point2>,
}

impl DrawRectangleAction {
    pub fn new() -> Self {
        Self {
            status: Status::SetCorner1,
            corner1: None,
        }
    }
}

impl Default for DrawRectangleAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawRectangleAction {
    fn action_type(&self) -> ActionType {
        ActionType::DrawRectangle
    }

    fn reset(&mut self) {
        self.status = Status::SetCorner1;
        self.corner1 = None;
    }

    fn step(&self) -> Step {
        match self.status {
            Status::SetCorner1 => Step::new(1, "first corner", StepInput::Point),
            Status::SetCorner2 => Step::new(2, "opposite corner", StepInput::Point),
        }
    }

    fn reference_point(&self) -> Option<Point2> {
        self.corner1
    }

    fn on_point(&mut self, _ctx: &ActionContext, point: Point2) -> ActionResult {
        match (self.status, self.corner1) {
            (Status::SetCorner2, Some(p1)) => {
                let size = point - p1;
                if size.x.abs() <= EPSILON || size.y.abs() <= EPSILON {
                    return ActionResult::reject("rectangle has zero width or height");
                }
                ActionResult::commit(ChangeSet::new().add(NewElement::new(ElementKind::rectangle(p1, point))))
            }
            _ => {
                self.corner1 = Some(point);
                self.status = Status::SetCorner2;
                ActionResult::Continue
            }
        }
    }

    fn step_back(&mut self) {
        self.reset();
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SetCorner1 => "指定第一个角点:",
            Status::SetCorner2 => "指定另一个角点:",
        }
    }

    fn get_preview(&self, _ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        let Some(p1) = self.corner1 else {
            return vec![];
        };
        let corners = [p1, Point2::new(cursor.x, p1.y), cursor, Point2::new(p1.x, cursor.y)];
        (0..4)
            .map(|i| PreviewGeometry::new(Geometry::Line(Line::new(corners[i], corners[(i + 1) % 4]))))
            .collect()
    }
}
