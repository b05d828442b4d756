//! 偏移 Action
//!
//! 拾取一个线段、圆、圆弧或矩形，输入偏移距离，再指定偏移到哪一侧。
//! 向内偏移到半径或边长不再为正时拒绝。

use crate::action::{Action, ActionContext, ActionResult, ActionType, Pick, PreviewGeometry, Step, StepInput};
use crate::error::{CommandError, CommandResult};
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::{ElementId, ElementKind};
use liftcad_core::geometry::{Arc, Line};
use liftcad_core::input_parser::InputParser;
use liftcad_core::math::{cross, Point2, Vector2, EPSILON};

/// 计算偏移后的图元
pub fn offset_kind(kind: &ElementKind, distance: f64, side: Point2) -> CommandResult<ElementKind> {
    match kind {
        ElementKind::Line { start, end } => {
            let line = Line::new(*start, *end);
            if line.is_degenerate() {
                return Err(CommandError::operand("cannot offset a zero-length line"));
            }
            let dir = line.vector() / line.length();
            let turn = cross(&dir, &(side - start));
            if turn.abs() <= EPSILON {
                return Err(CommandError::operand("side point lies on the line"));
            }
            let normal = Vector2::new(-dir.y, dir.x) * distance * turn.signum();
            Ok(ElementKind::line(start + normal, end + normal))
        }
        ElementKind::Circle { center, radius } => {
            let radius = offset_radius(*center, *radius, distance, side)?;
            Ok(ElementKind::circle(*center, radius))
        }
        ElementKind::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let radius = offset_radius(*center, *radius, distance, side)?;
            Ok(ElementKind::arc(Arc::new(*center, radius, *start_angle, *end_angle)))
        }
        ElementKind::Rectangle { corners } => offset_rectangle(corners, distance, side),
        other => Err(CommandError::operand(format!("cannot offset a {}", other.type_name()))),
    }
}

fn offset_radius(center: Point2, radius: f64, distance: f64, side: Point2) -> CommandResult<f64> {
    let from_center = (side - center).norm();
    if (from_center - radius).abs() <= EPSILON {
        return Err(CommandError::operand("side point lies on the curve"));
    }
    let offset = if from_center < radius {
        radius - distance
    } else {
        radius + distance
    };
    if offset <= EPSILON {
        return Err(CommandError::operand("inner offset collapses the curve"));
    }
    Ok(offset)
}

/// 矩形在自身坐标系中向内或向外等距缩放，角点顺序不变
fn offset_rectangle(corners: &[Point2; 4], distance: f64, side: Point2) -> CommandResult<ElementKind> {
    let along = corners[1] - corners[0];
    let across = corners[3] - corners[0];
    let (width, height) = (along.norm(), across.norm());
    if width <= EPSILON || height <= EPSILON {
        return Err(CommandError::operand("cannot offset a degenerate rectangle"));
    }
    let (u, v) = (along / width, across / height);
    let center = corners[0] + (along + across) / 2.0;

    let local = side - center;
    let (lu, lv) = (local.dot(&u).abs(), local.dot(&v).abs());
    let inside = lu < width / 2.0 && lv < height / 2.0;
    let delta = if inside { -2.0 * distance } else { 2.0 * distance };
    let (w, h) = (width + delta, height + delta);
    if w <= EPSILON || h <= EPSILON {
        return Err(CommandError::operand("inner offset collapses the rectangle"));
    }

    let (hu, hv) = (u * w / 2.0, v * h / 2.0);
    Ok(ElementKind::Rectangle {
        corners: [center - hu - hv, center + hu - hv, center + hu + hv, center - hu + hv],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 选择要偏移的对象
    SelectObject,
    /// 输入偏移距离
    SetDistance,
    /// 指定偏移方向
    SetSide,
}

/// 偏移 Action
pub struct OffsetAction {
    status: Status,
    target: Option<ElementId>,
    distance: f64,
}

impl OffsetAction {
    pub fn new() -> Self {
        Self {
            status: Status::SelectObject,
            target: None,
            distance: 0.0,
        }
    }

    fn target_kind<'a>(&self, ctx: &'a ActionContext) -> Option<&'a ElementKind> {
        self.target.and_then(|id| ctx.drawing.get(id)).map(|el| &el.kind)
    }
}

impl Default for OffsetAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for OffsetAction {
    fn action_type(&self) -> ActionType {
        ActionType::Offset
    }

    fn reset(&mut self) {
        self.status = Status::SelectObject;
        self.target = None;
        self.distance = 0.0;
    }

    fn step(&self) -> Step {
        match self.status {
            Status::SelectObject => Step::new(1, "object to offset", StepInput::Element),
            Status::SetDistance => Step::new(2, "offset distance", StepInput::Value),
            Status::SetSide => Step::new(3, "side to offset", StepInput::Point),
        }
    }

    fn on_pick(&mut self, ctx: &ActionContext, pick: Pick) -> ActionResult {
        if self.status != Status::SelectObject {
            return ActionResult::Continue;
        }
        let Some(el) = pick.element.and_then(|id| ctx.drawing.get(id)) else {
            return ActionResult::Continue;
        };
        match el.kind {
            ElementKind::Line { .. }
            | ElementKind::Circle { .. }
            | ElementKind::Arc { .. }
            | ElementKind::Rectangle { .. } => {
                self.target = Some(el.id);
                self.status = Status::SetDistance;
                ActionResult::Continue
            }
            _ => ActionResult::reject(format!("cannot offset a {}", el.type_name())),
        }
    }

    fn on_text(&mut self, _ctx: &ActionContext, text: &str) -> Option<ActionResult> {
        if self.status != Status::SetDistance {
            return None;
        }
        Some(match InputParser::parse_positive(text, "distance") {
            Ok(distance) => {
                self.distance = distance;
                self.status = Status::SetSide;
                ActionResult::Continue
            }
            Err(e) => ActionResult::Rejected(CommandError::from(e)),
        })
    }

    fn on_point(&mut self, ctx: &ActionContext, point: Point2) -> ActionResult {
        if self.status != Status::SetSide {
            return ActionResult::Continue;
        }
        let (Some(id), Some(kind)) = (self.target, self.target_kind(ctx)) else {
            return ActionResult::reject("offset object no longer exists");
        };
        let style = ctx.drawing.get(id).map(|el| el.style.clone()).unwrap_or_default();
        match offset_kind(kind, self.distance, point) {
            Ok(kind) => ActionResult::commit(ChangeSet::new().add(NewElement::new(kind).with_style(style))),
            Err(e) => ActionResult::Rejected(e),
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SelectObject => "选择要偏移的对象:",
            Status::SetDistance => "指定偏移距离:",
            Status::SetSide => "指定要偏移的那一侧上的点:",
        }
    }

    fn get_preview(&self, ctx: &ActionContext, cursor: Point2) -> Vec<PreviewGeometry> {
        if self.status != Status::SetSide {
            return vec![];
        }
        let Some(kind) = self.target_kind(ctx) else {
            return vec![];
        };
        let Ok(offset) = offset_kind(kind, self.distance, cursor) else {
            return vec![];
        };
        offset
            .world_geometry()
            .into_iter()
            .map(PreviewGeometry::new)
            .collect()
    }
}
