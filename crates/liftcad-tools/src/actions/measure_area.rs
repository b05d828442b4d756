//! 测量面积 Action（只读）
//!
//! 逐点指定多边形顶点，回车后报告面积和周长。

use crate::action::{Action, ActionContext, ActionResult, ActionType, Measurement, PreviewGeometry, Step, StepInput};
use liftcad_core::geometry::{path_length, polygon_area, Geometry, Line};
use liftcad_core::math::{Point2, EPSILON};

/// 测量面积 Action
pub struct MeasureAreaAction {
    points: Vec<Point2>,
}

impl MeasureAreaAction {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }
}

impl Default for MeasureAreaAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for MeasureAreaAction {
    fn action_type(&self) -> ActionType {
        ActionType::MeasureArea
    }

    fn reset(&mut self) {
        self.points.clear();
    }

    fn step(&self) -> Step {
        Step::new(self.points.len().min(2) + 1, "next vertex", StepInput::Point)
    }

    fn reference_point(&self) -> Option<Point2> {
        self.points.last().copied()
    }

    fn on_point(&mut self, _ctx: &ActionContext, point: Point2) -> ActionResult {
        // 与上一点重合的顶点忽略
        if let Some(last) = self.points.last() {
            if (point - last).norm() <= EPSILON {
                return ActionResult::Continue;
            }
        }
        self.points.push(point);
        ActionResult::Continue
    }

    fn on_confirm(&mut self, _ctx: &ActionContext) -> ActionResult {
        if self.points.len() < 3 {
            return ActionResult::reject("area needs at least three points");
        }
        ActionResult::Report(Measurement::Area {
            points: self.points.clone(),
            area: polygon_area(&self.points),
            perimeter: path_length(&self.points, true),
        })
    }

    fn get_prompt(&self) -> &str {
        if self.points.len() >= 3 {
            "指定下一点 或 回车计算:"
        } else {
            "指定下一点:"
        }
    }

    fn get_preview(&self, _ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        let mut previews: Vec<PreviewGeometry> = self
            .points
            .windows(2)
            .map(|w| PreviewGeometry::reference(Geometry::Line(Line::new(w[0], w[1]))))
            .collect();
        if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
            previews.push(PreviewGeometry::reference(Geometry::Line(Line::new(*last, cursor))));
            previews.push(PreviewGeometry::reference(Geometry::Line(Line::new(cursor, *first))));
        }
        previews
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_core::drawing::Drawing;

    #[test]
    fn test_area_of_square() {
        let drawing = Drawing::new();
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = MeasureAreaAction::new();
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)] {
            action.on_point(&ctx, Point2::new(x, y));
        }
        action.on_point(&ctx, Point2::new(0.0, 10.0));
        match action.on_confirm(&ctx) {
            ActionResult::Report(Measurement::Area { area, perimeter, .. }) => {
                assert_eq!(area, 100.0);
                assert_eq!(perimeter, 40.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_too_few_points_rejected() {
        let drawing = Drawing::new();
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = MeasureAreaAction::new();
        action.on_point(&ctx, Point2::new(0.0, 0.0));
        action.on_point(&ctx, Point2::new(0.0, 0.0));
        action.on_point(&ctx, Point2::new(1.0, 0.0));
        assert!(matches!(action.on_confirm(&ctx), ActionResult::Rejected(_)));
    }
}
