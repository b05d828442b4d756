//! 测量距离 Action（只读）

use crate::action::{Action, ActionContext, ActionResult, ActionType, Measurement, PreviewGeometry, Step, StepInput};
use liftcad_core::geometry::{Geometry, Line};
use liftcad_core::math::Point2;

/// 两点间距离
pub fn measure(from: Point2, to: Point2) -> Measurement {
    let delta = to - from;
    Measurement::Distance {
        from,
        to,
        distance: delta.norm(),
        dx: delta.x,
        dy: delta.y,
    }
}

/// 测量距离 Action
pub struct MeasureDistanceAction {
    first: Option<Point2>,
}

impl MeasureDistanceAction {
    pub fn new() -> Self {
        Self { first: None }
    }
}

impl Default for MeasureDistanceAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for MeasureDistanceAction {
    fn action_type(&self) -> ActionType {
        ActionType::MeasureDistance
    }

    fn reset(&mut self) {
        self.first = None;
    }

    fn step(&self) -> Step {
        match self.first {
            None => Step::new(1, "first point", StepInput::Point),
            Some(_) => Step::new(2, "second point", StepInput::Point),
        }
    }

    fn reference_point(&self) -> Option<Point2> {
        self.first
    }

    fn on_point(&mut self, _ctx: &ActionContext, point: Point2) -> ActionResult {
        match self.first {
            Some(first) => ActionResult::Report(measure(first, point)),
            None => {
                self.first = Some(point);
                ActionResult::Continue
            }
        }
    }

    fn get_prompt(&self) -> &str {
        match self.first {
            None => "指定第一点:",
            Some(_) => "指定第二点:",
        }
    }

    fn get_preview(&self, _ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        self.first
            .map(|first| vec![PreviewGeometry::reference(Geometry::Line(Line::new(first, cursor)))])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_core::drawing::Drawing;

    #[test]
    fn test_distance_report() {
        let drawing = Drawing::new();
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = MeasureDistanceAction::new();
        action.on_point(&ctx, Point2::new(1.0, 1.0));
        match action.on_point(&ctx, Point2::new(4.0, 5.0)) {
            ActionResult::Report(Measurement::Distance { distance, dx, dy, .. }) => {
                assert_eq!(distance, 5.0);
                assert_eq!((dx, dy), (3.0, 4.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
