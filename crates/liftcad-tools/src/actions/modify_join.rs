//! 合并 Action
//!
//! 依次拾取首尾相接的线段或开放多段线。第二个相容的图元一拾取就合并为
//! 一条多段线并删除原图元；类型不符或端点不相接的拾取被拒绝并丢弃。

use crate::action::{Action, ActionContext, ActionResult, ActionType, Pick, PreviewGeometry, Step, StepInput};
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::{ElementFamily, ElementId, ElementKind};
use liftcad_core::math::{points_coincide, Point2};

/// 连接两条顶点链，返回合并后的顶点；端点不相接时返回 `None`
pub fn join_chain(a: &[Point2], b: &[Point2], tolerance: f64) -> Option<Vec<Point2>> {
    let (a_first, a_last) = (*a.first()?, *a.last()?);
    let (b_first, b_last) = (*b.first()?, *b.last()?);
    let reversed = |v: &[Point2]| v.iter().rev().copied().collect::<Vec<_>>();

    let (head, tail) = if points_coincide(&a_last, &b_first, tolerance) {
        (a.to_vec(), b.to_vec())
    } else if points_coincide(&a_last, &b_last, tolerance) {
        (a.to_vec(), reversed(b))
    } else if points_coincide(&a_first, &b_last, tolerance) {
        (b.to_vec(), a.to_vec())
    } else if points_coincide(&a_first, &b_first, tolerance) {
        (reversed(b), a.to_vec())
    } else {
        return None;
    };

    let mut merged = head;
    merged.extend(tail.into_iter().skip(1));
    Some(merged)
}

fn chain_of(kind: &ElementKind) -> Option<Vec<Point2>> {
    if kind.family() != ElementFamily::Linear {
        return None;
    }
    match kind {
        ElementKind::Line { start, end } => Some(vec![*start, *end]),
        ElementKind::Polyline { vertices, .. } => Some(vertices.clone()),
        _ => None,
    }
}

/// 合并 Action
pub struct JoinAction {
    first: Option<ElementId>,
}

impl JoinAction {
    pub fn new() -> Self {
        Self { first: None }
    }

    fn merge(&self, ctx: &ActionContext, first: ElementId, second: ElementId) -> ActionResult {
        let (Some(a), Some(b)) = (ctx.drawing.get(first), ctx.drawing.get(second)) else {
            return ActionResult::reject("picked element no longer exists");
        };
        let Some(second_chain) = chain_of(&b.kind) else {
            return ActionResult::reject(format!("cannot join a {} to a {}", b.type_name(), a.type_name()));
        };
        let Some(first_chain) = chain_of(&a.kind) else {
            return ActionResult::reject(format!("cannot join a {}", a.type_name()));
        };
        let Some(mut vertices) = join_chain(&first_chain, &second_chain, ctx.join_tolerance) else {
            return ActionResult::reject("endpoints are not adjacent");
        };

        // 首尾相接时闭合
        let closed = vertices.len() > 3
            && points_coincide(&vertices[0], &vertices[vertices.len() - 1], ctx.join_tolerance);
        if closed {
            vertices.pop();
        }

        ActionResult::commit(
            ChangeSet::new()
                .add(NewElement::new(ElementKind::Polyline { vertices, closed }).with_style(a.style.clone()))
                .remove(first)
                .remove(second),
        )
    }
}

impl Default for JoinAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for JoinAction {
    fn action_type(&self) -> ActionType {
        ActionType::Join
    }

    fn reset(&mut self) {
        self.first = None;
    }

    fn step(&self) -> Step {
        Step::new(1, "objects to join", StepInput::Element)
    }

    fn on_pick(&mut self, ctx: &ActionContext, pick: Pick) -> ActionResult {
        let Some(id) = pick.element else {
            return ActionResult::Continue;
        };
        match self.first {
            // 重复拾取取消选择
            Some(first) if first == id => {
                self.first = None;
                ActionResult::Continue
            }
            Some(first) => self.merge(ctx, first, id),
            None => {
                let compatible = ctx.drawing.get(id).and_then(|el| chain_of(&el.kind)).is_some();
                if !compatible {
                    return ActionResult::reject("only lines and open polylines can be joined");
                }
                self.first = Some(id);
                ActionResult::Continue
            }
        }
    }

    fn on_confirm(&mut self, _ctx: &ActionContext) -> ActionResult {
        if self.first.is_some() {
            ActionResult::reject("select at least two objects to join")
        } else {
            ActionResult::Cancel
        }
    }

    fn get_prompt(&self) -> &str {
        match self.first {
            None => "选择要合并的第一个对象:",
            Some(_) => "选择要合并的下一个对象:",
        }
    }

    fn get_preview(&self, ctx: &ActionContext, _cursor: Point2) -> Vec<PreviewGeometry> {
        self.first
            .and_then(|id| ctx.drawing.get(id))
            .map(|el| el.world_geometry().into_iter().map(PreviewGeometry::reference).collect())
            .unwrap_or_default()
    }
}
