//! 绘制线段 Action
//!
//! 连续画线：每确定一个终点就提交一条线段，终点成为下一条线段的起点。
//! 回车结束，`C` 闭合到第一点并结束。

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry, Step, StepInput};
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::ElementKind;
use liftcad_core::geometry::{Geometry, Line};
use liftcad_core::math::{Point2, EPSILON};

/// 线段绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待设置起点
    SetStartpoint,
    /// 等待设置终点
    SetEndpoint,
}

/// 绘制线段 Action
pub struct DrawLineAction {
    status: Status,
    /// 当前起点
    start_point: Option<Point2>,
    /// 已确定的点列表（用于闭合）
    points: Vec<Point2>,
    closing: bool,
}

impl DrawLineAction {
    pub fn new() -> Self {
        Self {
            status: Status::SetStartpoint,
            start_point: None,
            points: Vec::new(),
            closing: false,
        }
    }

    fn segment(start: Point2, end: Point2, finished: bool) -> ActionResult {
        ActionResult::Commit {
            changes: ChangeSet::new().add(NewElement::new(ElementKind::line(start, end))),
            finished,
        }
    }

    /// 闭合线段序列
    fn close(&mut self) -> ActionResult {
        match (self.start_point, self.points.first()) {
            (Some(start), Some(&first)) if self.points.len() >= 3 && (start - first).norm() > EPSILON => {
                self.closing = true;
                Self::segment(start, first, true)
            }
            _ => ActionResult::reject("need at least two segments to close"),
        }
    }
}

impl Default for DrawLineAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for DrawLineAction {
    fn action_type(&self) -> ActionType {
        ActionType::DrawLine
    }

    fn reset(&mut self) {
        self.status = Status::SetStartpoint;
        self.start_point = None;
        self.points.clear();
        self.closing = false;
    }

    fn step(&self) -> Step {
        match self.status {
            Status::SetStartpoint => Step::new(1, "first point", StepInput::Point),
            Status::SetEndpoint => Step::new(2, "next point", StepInput::Point),
        }
    }

    fn reference_point(&self) -> Option<Point2> {
        self.start_point
    }

    fn on_point(&mut self, _ctx: &ActionContext, point: Point2) -> ActionResult {
        match self.status {
            Status::SetStartpoint => {
                self.start_point = Some(point);
                self.points.clear();
                self.points.push(point);
                self.status = Status::SetEndpoint;
                ActionResult::Continue
            }
            Status::SetEndpoint => {
                let Some(start) = self.start_point else {
                    return ActionResult::Continue;
                };
                // 零长度线段：重新提示
                if (point - start).norm() <= EPSILON {
                    return ActionResult::Continue;
                }
                self.start_point = Some(point);
                self.points.push(point);
                Self::segment(start, point, false)
            }
        }
    }

    fn on_text(&mut self, _ctx: &ActionContext, text: &str) -> Option<ActionResult> {
        match text.trim().to_uppercase().as_str() {
            "C" | "CLOSE" if self.status == Status::SetEndpoint => Some(self.close()),
            _ => None,
        }
    }

    fn on_confirm(&mut self, _ctx: &ActionContext) -> ActionResult {
        if self.points.len() >= 2 {
            ActionResult::Finish
        } else {
            ActionResult::Cancel
        }
    }

    fn step_back(&mut self) {
        // 最后一段没有提交，终点退回
        if std::mem::take(&mut self.closing) {
            return;
        }
        if self.points.len() >= 2 {
            self.points.pop();
            self.start_point = self.points.last().copied();
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SetStartpoint => "指定第一点:",
            Status::SetEndpoint => {
                if self.points.len() >= 3 {
                    "指定下一点 或 [闭合(C)]:"
                } else {
                    "指定下一点:"
                }
            }
        }
    }

    fn get_available_commands(&self) -> Vec<&str> {
        if self.status == Status::SetEndpoint && self.points.len() >= 3 {
            vec!["close"]
        } else {
            vec![]
        }
    }

    fn get_preview(&self, _ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        match self.start_point {
            Some(start) if self.status == Status::SetEndpoint => {
                vec![PreviewGeometry::new(Geometry::Line(Line::new(start, cursor)))]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_core::drawing::Drawing;

    fn ctx(drawing: &Drawing) -> ActionContext<'_> {
        ActionContext {
            drawing,
            selection: &[],
            join_tolerance: 1e-6,
        }
    }

    #[test]
    fn test_continuous_segments() {
        let drawing = Drawing::new();
        let ctx = ctx(&drawing);
        let mut action = DrawLineAction::new();

        assert!(matches!(action.on_point(&ctx, Point2::new(0.0, 0.0)), ActionResult::Continue));
        assert_eq!(action.step().index, 2);
        assert!(matches!(
            action.on_point(&ctx, Point2::new(1.0, 0.0)),
            ActionResult::Commit { finished: false, .. }
        ));
        assert_eq!(action.reference_point(), Some(Point2::new(1.0, 0.0)));
        assert!(matches!(
            action.on_point(&ctx, Point2::new(1.0, 1.0)),
            ActionResult::Commit { finished: false, .. }
        ));
        match action.on_text(&ctx, "c") {
            Some(ActionResult::Commit { changes, finished: true }) => {
                assert_eq!(
                    changes.added[0].kind,
                    ElementKind::line(Point2::new(1.0, 1.0), Point2::new(0.0, 0.0))
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_zero_length_reprompts() {
        let drawing = Drawing::new();
        let ctx = ctx(&drawing);
        let mut action = DrawLineAction::new();
        action.on_point(&ctx, Point2::new(2.0, 2.0));
        assert!(matches!(action.on_point(&ctx, Point2::new(2.0, 2.0)), ActionResult::Continue));
        assert_eq!(action.step().index, 2);
    }

    #[test]
    fn test_confirm_without_segments_cancels() {
        let drawing = Drawing::new();
        let ctx = ctx(&drawing);
        let mut action = DrawLineAction::new();
        action.on_point(&ctx, Point2::new(2.0, 2.0));
        assert!(matches!(action.on_confirm(&ctx), ActionResult::Cancel));
    }
}
