//! 绘制圆 Action

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry, Step, StepInput};
use crate::error::CommandError;
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::ElementKind;
use liftcad_core::geometry::{Circle, Geometry};
use liftcad_core::input_parser::InputParser;
use liftcad_core::math::{Point2, EPSILON};

/// 圆绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待设置圆心
    SetCenter,
    /// 等待设置半径
    SetRadius,
}

/// 绘制圆 Action
pub struct DrawCircleAction {
    status: Status,
    center: Option<Point2>,
}

impl DrawCircleAction {
    pub fn new() -> Self {
        Self {
            status: Status::SetCenter,
            center: None,
        }
    }

    fn create(center: Point2, radius: f64) -> ActionResult {
        ActionResult::commit(ChangeSet::new().add(NewElement::new(ElementKind::circle(center, radius))))
    }
}

impl Default for DrawCircleAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawCircleAction {
    fn action_type(&self) -> ActionType {
        ActionType::DrawCircle
    }

    fn reset(&mut self) {
        self.status = Status::SetCenter;
        self.center = None;
    }

    fn step(&self) -> Step {
        match self.status {
            Status::SetCenter => Step::new(1, "center", StepInput::Point),
            Status::SetRadius => Step::new(2, "radius", StepInput::Point),
        }
    }

    fn reference_point(&self) -> Option<Point2> {
        self.center
    }

    fn on_point(&mut self, _ctx: &ActionContext, point: Point2) -> ActionResult {
        match (self.status, self.center) {
            (Status::SetRadius, Some(center)) => {
                let radius = (point - center).norm();
                if radius <= EPSILON {
                    return ActionResult::Continue;
                }
                Self::create(center, radius)
            }
            _ => {
                self.center = Some(point);
                self.status = Status::SetRadius;
                ActionResult::Continue
            }
        }
    }

    fn on_text(&mut self, _ctx: &ActionContext, text: &str) -> Option<ActionResult> {
        // 直接输入半径值；坐标形式交给会话按点处理
        let center = match (self.status, self.center) {
            (Status::SetRadius, Some(center)) => center,
            _ => return None,
        };
        if text.contains(',') || text.contains('<') {
            return None;
        }
        Some(match InputParser::parse_positive(text, "radius") {
            Ok(radius) => Self::create(center, radius),
            Err(e) => ActionResult::Rejected(CommandError::from(e)),
        })
    }

    fn step_back(&mut self) {
        self.reset();
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SetCenter => "指定圆心:",
            Status::SetRadius => "指定圆上一点 或 输入半径:",
        }
    }

    fn get_preview(&self, _ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        match self.center {
            Some(center) if (cursor - center).norm() > EPSILON => {
                vec![PreviewGeometry::new(Geometry::Circle(Circle::new(
                    center,
                    (cursor - center).norm(),
                )))]
            }
            _ => vec![],
        }
    }
}
