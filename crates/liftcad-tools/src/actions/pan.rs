//! 平移视图 Action

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry, Step, StepInput};
use liftcad_core::geometry::{Geometry, Line};
use liftcad_core::math::Point2;

/// 平移 Action：从基点拖到目标点，视图随之移动
pub struct PanAction {
    base: Option<Point2>,
}

impl PanAction {
    pub fn new() -> Self {
        Self { base: None }
    }
}

impl Default for PanAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for PanAction {
    fn action_type(&self) -> ActionType {
        ActionType::Pan
    }

    fn reset(&mut self) {
        self.base = None;
    }

    fn step(&self) -> Step {
        match self.base {
            None => Step::new(1, "base point", StepInput::Point),
            Some(_) => Step::new(2, "second point", StepInput::Point),
        }
    }

    fn reference_point(&self) -> Option<Point2> {
        self.base
    }

    fn on_point(&mut self, _ctx: &ActionContext, point: Point2) -> ActionResult {
        match self.base {
            Some(base) => ActionResult::Pan(point - base),
            None => {
                self.base = Some(point);
                ActionResult::Continue
            }
        }
    }

    fn get_prompt(&self) -> &str {
        match self.base {
            None => "指定基点:",
            Some(_) => "指定第二点:",
        }
    }

    fn get_preview(&self, _ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        self.base
            .map(|base| vec![PreviewGeometry::reference(Geometry::Line(Line::new(base, cursor)))])
            .unwrap_or_default()
    }
}
