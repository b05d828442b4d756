//! 矩形阵列 Action（单行）
//!
//! 选择对象后输入 `数量,间距` 或 `数量,间距<角度`，
//! 数量包含原对象，副本沿给定方向等距排列。

use crate::action::{
    toggle_pick, Action, ActionContext, ActionResult, ActionType, Pick, PreviewGeometry, Step, StepInput,
};
use crate::error::CommandError;
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::ElementId;
use liftcad_core::input_parser::{ArrayParams, InputParser};
use liftcad_core::math::{Point2, Vector2, EPSILON};
use liftcad_core::transform::Transform2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    SelectObjects,
    SetParameters,
}

/// 阵列 Action
pub struct ArrayAction {
    status: Status,
    entity_ids: Vec<ElementId>,
}

impl ArrayAction {
    pub fn new() -> Self {
        Self {
            status: Status::SelectObjects,
            entity_ids: Vec::new(),
        }
    }

    fn execute(&self, ctx: &ActionContext, params: ArrayParams) -> ActionResult {
        if params.spacing.abs() <= EPSILON {
            return ActionResult::reject("array spacing must be non-zero");
        }
        let step = Vector2::new(params.angle.cos(), params.angle.sin()) * params.spacing;

        let mut changes = ChangeSet::new();
        for i in 1..params.count {
            let shift = Transform2D::translation(step * i as f64);
            for id in &self.entity_ids {
                let Some(el) = ctx.drawing.get(*id) else {
                    return ActionResult::reject(format!("element {} no longer exists", id));
                };
                changes = changes.add(NewElement::new(el.kind.transformed(&shift)).with_style(el.style.clone()));
            }
        }
        ActionResult::commit(changes)
    }
}

impl Default for ArrayAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for ArrayAction {
    fn action_type(&self) -> ActionType {
        ActionType::Array
    }

    fn init(&mut self, ctx: &ActionContext) {
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
    }

    fn step(&self) -> Step {
        match self.status {
            Status::SelectObjects => Step::new(1, "select objects", StepInput::Element),
            Status::SetParameters => Step::new(2, "count and spacing", StepInput::Value),
        }
    }

    fn on_pick(&mut self, _ctx: &ActionContext, pick: Pick) -> ActionResult {
        if let (Status::SelectObjects, Some(id)) = (self.status, pick.element) {
            toggle_pick(&mut self.entity_ids, id);
        }
        ActionResult::Continue
    }

    fn on_text(&mut self, ctx: &ActionContext, text: &str) -> Option<ActionResult> {
        if self.status != Status::SetParameters {
            return None;
        }
        Some(match InputParser::parse_array(text) {
            Ok(params) => self.execute(ctx, params),
            Err(e) => ActionResult::Rejected(CommandError::from(e)),
        })
    }

    fn on_confirm(&mut self, _ctx: &ActionContext) -> ActionResult {
        match self.status {
            Status::SelectObjects if self.entity_ids.is_empty() => ActionResult::reject("no objects selected"),
            Status::SelectObjects => {
                self.status = Status::SetParameters;
                ActionResult::Continue
            }
            Status::SetParameters => ActionResult::Cancel,
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SelectObjects => "选择要阵列的对象:",
            Status::SetParameters => "输入 数量,间距[<角度]:",
        }
    }

    fn get_preview(&self, ctx: &ActionContext, _cursor: Point2) -> Vec<PreviewGeometry> {
        self.entity_ids
            .iter()
            .filter_map(|id| ctx.drawing.get(*id))
            .flat_map(|el| el.world_geometry())
            .map(PreviewGeometry::reference)
            .collect()
    }
}
