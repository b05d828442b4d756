//! 修剪 Action
//!
//! 先拾取剪切边，再拾取要修剪的目标。目标在离拾取点最近的交点处断开，
//! 拾取点所在的一段被剪掉，另一段替换原图元（ID 不变）。
//! 没有交点时停留在选择目标的步骤。

use crate::action::{Action, ActionContext, ActionResult, ActionType, Pick, PreviewGeometry, Step, StepInput};
use crate::error::CommandError;
use liftcad_core::drawing::ChangeSet;
use liftcad_core::entity::{ElementId, ElementKind};
use liftcad_core::geometry::{Arc, Circle, Geometry, Line};
use liftcad_core::intersection::{closest_to, intersect};
use liftcad_core::math::{normalize_angle, Point2, EPSILON};

/// 修剪的结果：保留段与剪掉段
#[derive(Debug, Clone, PartialEq)]
pub struct TrimSplit {
    pub retained: ElementKind,
    pub removed: ElementKind,
}

/// 在 `cut` 处断开线段，剪掉包含 `pick` 的一段
///
/// `cut` 落在端点上（或线段外）时无法断开，返回 `None`。
pub fn split_line(line: &Line, cut: Point2, pick: Point2) -> Option<TrimSplit> {
    if line.is_degenerate() {
        return None;
    }
    let tol = EPSILON / line.length();
    let t_cut = line.parameter_of(&cut);
    if t_cut <= tol || t_cut >= 1.0 - tol {
        return None;
    }
    let cut = line.point_at(t_cut);
    let head = ElementKind::line(line.start, cut);
    let tail = ElementKind::line(cut, line.end);
    if line.parameter_of(&pick) < t_cut {
        Some(TrimSplit {
            retained: tail,
            removed: head,
        })
    } else {
        Some(TrimSplit {
            retained: head,
            removed: tail,
        })
    }
}

/// 在 `cut` 处断开圆弧，剪掉包含 `pick` 的一段
pub fn split_arc(arc: &Arc, cut: Point2, pick: Point2) -> Option<TrimSplit> {
    let circle = arc.circle();
    let sweep = arc.sweep_angle();
    let cut_angle = circle.angle_of(&cut);
    let cut_offset = normalize_angle(cut_angle - arc.start_angle);
    if cut_offset <= EPSILON || cut_offset >= sweep - EPSILON {
        return None;
    }
    let head = ElementKind::arc(Arc::new(arc.center, arc.radius, arc.start_angle, cut_angle));
    let tail = ElementKind::arc(Arc::new(arc.center, arc.radius, cut_angle, arc.end_angle));
    let pick_offset = normalize_angle(circle.angle_of(&pick) - arc.start_angle);
    // 拾取点在弧外侧缺口时按离哪端近处理
    let pick_in_head = if pick_offset <= sweep {
        pick_offset < cut_offset
    } else {
        pick_offset - sweep > std::f64::consts::TAU - pick_offset
    };
    if pick_in_head {
        Some(TrimSplit {
            retained: tail,
            removed: head,
        })
    } else {
        Some(TrimSplit {
            retained: head,
            removed: tail,
        })
    }
}

/// 整圆需要两个切点：剪掉包含 `pick` 的一段圆弧，保留其余部分
pub fn split_circle(circle: &Circle, cuts: &[Point2], pick: Point2) -> Option<TrimSplit> {
    let mut angles: Vec<f64> = cuts.iter().map(|p| normalize_angle(circle.angle_of(p))).collect();
    angles.sort_by(f64::total_cmp);
    angles.dedup_by(|a, b| (*a - *b).abs() <= EPSILON);
    if angles.len() < 2 {
        return None;
    }
    let pick_angle = circle.angle_of(&pick);
    let lo = angles
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            normalize_angle(pick_angle - **a).total_cmp(&normalize_angle(pick_angle - **b))
        })
        .map(|(i, _)| i)?;
    let from = angles[lo];
    let to = angles[(lo + 1) % angles.len()];
    Some(TrimSplit {
        retained: ElementKind::arc(Arc::new(circle.center, circle.radius, to, from)),
        removed: ElementKind::arc(Arc::new(circle.center, circle.radius, from, to)),
    })
}

/// 修剪状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待选择剪切边
    SelectEdge,
    /// 等待选择要修剪的对象
    SelectTarget,
}

/// 修剪 Action
pub struct TrimAction {
    status: Status,
    edge: Option<ElementId>,
}

impl TrimAction {
    pub fn new() -> Self {
        Self {
            status: Status::SelectEdge,
            edge: None,
        }
    }

    fn trim(&self, ctx: &ActionContext, edge: ElementId, target: ElementId, pick: Point2) -> ActionResult {
        if edge == target {
            return ActionResult::reject("cutting edge cannot trim itself");
        }
        let (Some(edge_el), Some(target_el)) = (ctx.drawing.get(edge), ctx.drawing.get(target)) else {
            return ActionResult::reject("picked element no longer exists");
        };

        let target_geom = match &target_el.kind {
            ElementKind::Line { start, end } => Geometry::Line(Line::new(*start, *end)),
            ElementKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => Geometry::Arc(Arc::new(*center, *radius, *start_angle, *end_angle)),
            ElementKind::Circle { center, radius } => Geometry::Circle(Circle::new(*center, *radius)),
            other => {
                return ActionResult::reject(format!("cannot trim a {}", other.type_name()));
            }
        };

        let cuts: Vec<Point2> = edge_el
            .world_geometry()
            .iter()
            .flat_map(|g| intersect(g, &target_geom))
            .collect();

        let split = match &target_geom {
            Geometry::Line(line) => interior_cut(&cuts, pick, |cut| split_line(line, cut, pick)),
            Geometry::Arc(arc) => interior_cut(&cuts, pick, |cut| split_arc(arc, cut, pick)),
            Geometry::Circle(_) if cuts.len() == 1 => {
                return ActionResult::reject("a circle needs two cut points");
            }
            Geometry::Circle(circle) => split_circle(circle, &cuts, pick),
            Geometry::Point(_) => None,
        };

        match split {
            Some(split) => {
                tracing::debug!(?target, "trimmed {}", target_el.type_name());
                ActionResult::commit(ChangeSet::new().replace(target, split.retained))
            }
            None => ActionResult::Rejected(CommandError::NoIntersection),
        }
    }
}

/// 按离拾取点由近到远尝试各交点，取第一个能断开目标的
fn interior_cut(cuts: &[Point2], pick: Point2, split: impl Fn(Point2) -> Option<TrimSplit>) -> Option<TrimSplit> {
    let mut remaining = cuts.to_vec();
    while let Some((i, cut)) = closest_to(&remaining, &pick) {
        if let Some(result) = split(cut) {
            return Some(result);
        }
        remaining.remove(i);
    }
    None
}

impl Default for TrimAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for TrimAction {
    fn action_type(&self) -> ActionType {
        ActionType::Trim
    }

    fn reset(&mut self) {
        self.status = Status::SelectEdge;
        self.edge = None;
    }

    fn step(&self) -> Step {
        match self.status {
            Status::SelectEdge => Step::new(1, "cutting edge", StepInput::Element),
            Status::SelectTarget => Step::new(2, "object to trim", StepInput::Element),
        }
    }

    fn on_pick(&mut self, ctx: &ActionContext, pick: Pick) -> ActionResult {
        // 空拾取：重新提示
        let Some(id) = pick.element else {
            return ActionResult::Continue;
        };
        match (self.status, self.edge) {
            (Status::SelectTarget, Some(edge)) => self.trim(ctx, edge, id, pick.point),
            _ => {
                self.edge = Some(id);
                self.status = Status::SelectTarget;
                ActionResult::Continue
            }
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SelectEdge => "选择剪切边:",
            Status::SelectTarget => "选择要修剪的对象:",
        }
    }

    fn get_preview(&self, ctx: &ActionContext, _cursor: Point2) -> Vec<PreviewGeometry> {
        self.edge
            .and_then(|id| ctx.drawing.get(id))
            .map(|el| el.world_geometry().into_iter().map(PreviewGeometry::reference).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_core::drawing::{Drawing, NewElement};

    fn setup(kinds: Vec<ElementKind>) -> (Drawing, Vec<ElementId>) {
        let mut drawing = Drawing::new();
        let changes = kinds
            .into_iter()
            .fold(ChangeSet::new(), |c, k| c.add(NewElement::new(k)));
        let receipt = drawing.commit(changes).unwrap();
        (drawing, receipt.added)
    }

    fn pick(id: ElementId, x: f64, y: f64) -> Pick {
        Pick {
            element: Some(id),
            point: Point2::new(x, y),
        }
    }

    #[test]
    fn test_split_line_reconstructs_endpoints() {
        let line = Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let split = split_line(&line, Point2::new(4.0, 0.0), Point2::new(8.0, 0.0)).unwrap();
        assert_eq!(split.retained, ElementKind::line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)));
        assert_eq!(split.removed, ElementKind::line(Point2::new(4.0, 0.0), Point2::new(10.0, 0.0)));

        let (Some((a, b)), Some((c, d))) = (split.retained.open_ends(), split.removed.open_ends()) else {
            panic!("pieces must be open segments");
        };
        assert_eq!(a, line.start);
        assert_eq!(b, c);
        assert_eq!(d, line.end);
    }

    #[test]
    fn test_split_at_endpoint_is_none() {
        let line = Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        assert!(split_line(&line, Point2::new(10.0, 0.0), Point2::new(5.0, 0.0)).is_none());
    }

    #[test]
    fn test_trim_crossing_lines() {
        let (drawing, ids) = setup(vec![
            ElementKind::line(Point2::new(5.0, -5.0), Point2::new(5.0, 5.0)),
            ElementKind::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
        ]);
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = TrimAction::new();
        action.on_pick(&ctx, pick(ids[0], 5.0, 4.0));
        match action.on_pick(&ctx, pick(ids[1], 1.0, 0.0)) {
            ActionResult::Commit { changes, .. } => {
                assert_eq!(
                    changes.replaced,
                    vec![(ids[1], ElementKind::line(Point2::new(5.0, 0.0), Point2::new(10.0, 0.0)))]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    fn retained_line(result: ActionResult, target: ElementId) -> (Point2, Point2) {
        match result {
            ActionResult::Commit { changes, .. } => {
                assert_eq!(changes.replaced.len(), 1);
                let (id, kind) = &changes.replaced[0];
                assert_eq!(*id, target);
                match kind {
                    ElementKind::Line { start, end } => (*start, *end),
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    fn assert_near(a: Point2, b: Point2) {
        assert!((a - b).norm() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_trim_cuts_at_crossing_nearest_pick() {
        // 圆与直线交于 (2,0) 和 (8,0)
        let (drawing, ids) = setup(vec![
            ElementKind::circle(Point2::new(5.0, 0.0), 3.0),
            ElementKind::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
        ]);
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };

        let mut action = TrimAction::new();
        action.on_pick(&ctx, pick(ids[0], 5.0, 3.0));
        let (start, end) = retained_line(action.on_pick(&ctx, pick(ids[1], 9.0, 0.0)), ids[1]);
        assert_near(start, Point2::new(0.0, 0.0));
        assert_near(end, Point2::new(8.0, 0.0));

        let mut action = TrimAction::new();
        action.on_pick(&ctx, pick(ids[0], 5.0, 3.0));
        let (start, end) = retained_line(action.on_pick(&ctx, pick(ids[1], 3.0, 0.0)), ids[1]);
        assert_near(start, Point2::new(0.0, 0.0));
        assert_near(end, Point2::new(2.0, 0.0));
    }

    #[test]
    fn test_trim_skips_crossing_at_target_endpoint() {
        // 矩形右边经过目标端点 (10,0)，左边在 (6,0) 穿过目标
        let (drawing, ids) = setup(vec![
            ElementKind::rectangle(Point2::new(6.0, -5.0), Point2::new(10.0, 5.0)),
            ElementKind::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
        ]);
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = TrimAction::new();
        action.on_pick(&ctx, pick(ids[0], 6.0, 4.0));
        let (start, end) = retained_line(action.on_pick(&ctx, pick(ids[1], 9.5, 0.0)), ids[1]);
        assert_near(start, Point2::new(0.0, 0.0));
        assert_near(end, Point2::new(6.0, 0.0));
    }

    #[test]
    fn test_no_intersection_stays_in_target_step() {
        let (drawing, ids) = setup(vec![
            ElementKind::line(Point2::new(0.0, 5.0), Point2::new(10.0, 5.0)),
            ElementKind::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
        ]);
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = TrimAction::new();
        action.on_pick(&ctx, pick(ids[0], 1.0, 5.0));
        assert!(matches!(
            action.on_pick(&ctx, pick(ids[1], 1.0, 0.0)),
            ActionResult::Rejected(CommandError::NoIntersection)
        ));
        assert_eq!(action.step().index, 2);
    }

    #[test]
    fn test_trim_rejects_text() {
        let (drawing, ids) = setup(vec![
            ElementKind::line(Point2::new(0.0, 5.0), Point2::new(10.0, 5.0)),
            ElementKind::Text {
                anchor: Point2::new(1.0, 1.0),
                content: "A".into(),
                height: 2.5,
                rotation: 0.0,
            },
        ]);
        let ctx = ActionContext {
            drawing: &drawing,
            selection: &[],
            join_tolerance: 1e-6,
        };
        let mut action = TrimAction::new();
        action.on_pick(&ctx, pick(ids[0], 1.0, 5.0));
        assert!(matches!(
            action.on_pick(&ctx, pick(ids[1], 1.0, 1.0)),
            ActionResult::Rejected(CommandError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_trim_circle_between_cuts() {
        let circle = Circle::new(Point2::origin(), 5.0);
        let cuts = [Point2::new(0.0, 5.0), Point2::new(0.0, -5.0)];
        let split = split_circle(&circle, &cuts, Point2::new(5.0, 0.0)).unwrap();
        match split.retained {
            ElementKind::Arc { start_angle, end_angle, .. } => {
                assert!((start_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
                assert!((end_angle - 3.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_split_arc_keeps_far_side() {
        let arc = Arc::new(Point2::origin(), 5.0, 0.0, std::f64::consts::PI);
        let split = split_arc(&arc, Point2::new(0.0, 5.0), Point2::new(4.0, 3.0)).unwrap();
        match split.retained {
            ElementKind::Arc { start_angle, end_angle, .. } => {
                assert!((start_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
                assert!((end_angle - std::f64::consts::PI).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
