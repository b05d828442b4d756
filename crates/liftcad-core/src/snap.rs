//! 对象捕捉系统
//!
//! 根据光标位置、容差和启用的捕捉模式，从图元中选出最佳捕捉点。
//!
//! 支持的捕捉类型（按优先级从高到低）：
//! - 端点 (Endpoint)
//! - 交点 (Intersection)
//! - 圆心 (Center)
//! - 中点 (Midpoint)
//! - 垂足 (Perpendicular)
//! - 切点 (Tangent)
//! - 网格点 (Grid)
//!
//! 优先级高的候选总是胜出；同一优先级取屏幕距离最小者；
//! 完全相同的距离取按图元顺序最先发现的候选。

use crate::drawing::Drawing;
use crate::entity::{DrawingElement, ElementId};
use crate::geometry::{Arc, Circle, Geometry, Line};
use crate::intersection::{intersect, perpendicular_foot, tangent_points_from_external_point, FootMode};
use crate::math::{Point2, EPSILON};
use serde::{Deserialize, Serialize};

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapType {
    /// 端点捕捉
    Endpoint,
    /// 交点捕捉
    Intersection,
    /// 圆心捕捉
    Center,
    /// 中点捕捉
    Midpoint,
    /// 垂足捕捉
    Perpendicular,
    /// 切点捕捉
    Tangent,
    /// 网格点捕捉
    Grid,
}

impl SnapType {
    /// 按优先级排列的全部类型
    pub const ALL: [SnapType; 7] = [
        SnapType::Endpoint,
        SnapType::Intersection,
        SnapType::Center,
        SnapType::Midpoint,
        SnapType::Perpendicular,
        SnapType::Tangent,
        SnapType::Grid,
    ];

    /// 获取捕捉类型的名称
    pub fn name(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "端点",
            SnapType::Intersection => "交点",
            SnapType::Center => "圆心",
            SnapType::Midpoint => "中点",
            SnapType::Perpendicular => "垂足",
            SnapType::Tangent => "切点",
            SnapType::Grid => "网格点",
        }
    }

    /// 获取捕捉类型的快捷键
    pub fn shortcut(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "END",
            SnapType::Intersection => "INT",
            SnapType::Center => "CEN",
            SnapType::Midpoint => "MID",
            SnapType::Perpendicular => "PER",
            SnapType::Tangent => "TAN",
            SnapType::Grid => "GRI",
        }
    }

    /// 优先级，数值越小越优先
    pub fn priority(&self) -> u8 {
        match self {
            SnapType::Endpoint => 0,
            SnapType::Intersection => 1,
            SnapType::Center => 2,
            SnapType::Midpoint => 3,
            SnapType::Perpendicular => 4,
            SnapType::Tangent => 5,
            SnapType::Grid => 6,
        }
    }

    fn bit(&self) -> u16 {
        match self {
            SnapType::Endpoint => SnapMask::ENDPOINT,
            SnapType::Intersection => SnapMask::INTERSECTION,
            SnapType::Center => SnapMask::CENTER,
            SnapType::Midpoint => SnapMask::MIDPOINT,
            SnapType::Perpendicular => SnapMask::PERPENDICULAR,
            SnapType::Tangent => SnapMask::TANGENT,
            SnapType::Grid => SnapMask::GRID,
        }
    }
}

/// 捕捉结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// 捕捉到的世界坐标
    pub point: Point2,
    /// 产生该点的捕捉类型（用于绘制指示标记）
    pub snap_type: SnapType,
    /// 关联的图元（交点和网格点没有）
    pub element: Option<ElementId>,
    /// 距离光标的屏幕距离（像素）
    pub screen_distance: f64,
}

/// 捕捉掩码（位域，用于快速启用/禁用捕捉类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapMask {
    bits: u16,
}

impl SnapMask {
    pub const ENDPOINT: u16 = 1 << 0;
    pub const MIDPOINT: u16 = 1 << 1;
    pub const CENTER: u16 = 1 << 2;
    pub const INTERSECTION: u16 = 1 << 3;
    pub const PERPENDICULAR: u16 = 1 << 4;
    pub const TANGENT: u16 = 1 << 5;
    pub const GRID: u16 = 1 << 6;

    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ALL: SnapMask = SnapMask { bits: 0x7F };

    pub fn new(bits: u16) -> Self {
        Self { bits: bits & Self::ALL.bits }
    }

    /// 只启用一种捕捉类型
    pub fn only(snap_type: SnapType) -> Self {
        Self { bits: snap_type.bit() }
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn is_enabled(&self, snap_type: SnapType) -> bool {
        self.bits & snap_type.bit() != 0
    }

    pub fn set(&mut self, snap_type: SnapType, enabled: bool) {
        if enabled {
            self.bits |= snap_type.bit();
        } else {
            self.bits &= !snap_type.bit();
        }
    }

    pub fn toggle(&mut self, snap_type: SnapType) {
        let enabled = self.is_enabled(snap_type);
        self.set(snap_type, !enabled);
    }

    pub fn enabled_types(&self) -> impl Iterator<Item = SnapType> + '_ {
        SnapType::ALL.into_iter().filter(move |t| self.is_enabled(*t))
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        // 默认启用常用的捕捉类型
        Self {
            bits: Self::ENDPOINT | Self::MIDPOINT | Self::CENTER | Self::INTERSECTION,
        }
    }
}

/// 捕捉设置
///
/// 属于编辑会话，随时可由用户修改，每次指针移动时读取。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// 启用的捕捉类型
    pub mask: SnapMask,
    /// 捕捉容差（屏幕像素）
    pub tolerance: f64,
    /// 网格间距（世界单位）
    pub grid_spacing: f64,
    /// 是否显示捕捉标记
    pub show_indicators: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            mask: SnapMask::default(),
            tolerance: 10.0,
            grid_spacing: 10.0,
            show_indicators: true,
        }
    }
}

impl SnapSettings {
    pub fn with_mask(mut self, mask: SnapMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_grid_spacing(mut self, spacing: f64) -> Self {
        self.grid_spacing = spacing;
        self
    }
}

/// 单次查询的视图上下文
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapQuery {
    /// 光标的世界坐标
    pub cursor: Point2,
    /// 缩放（每世界单位的像素数）
    pub zoom: f64,
    /// 当前命令上一步确定的参考点，垂足捕捉需要它
    pub reference: Option<Point2>,
}

impl SnapQuery {
    pub fn new(cursor: Point2, zoom: f64) -> Self {
        Self {
            cursor,
            zoom,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: Option<Point2>) -> Self {
        self.reference = reference;
        self
    }
}

/// 捕捉引擎
///
/// 负责计算和管理对象捕捉
#[derive(Debug, Clone)]
pub struct SnapEngine {
    settings: SnapSettings,
    /// 候选捕捉点缓冲，跨查询复用
    candidates: Vec<SnapResult>,
}

impl SnapEngine {
    pub fn new(settings: SnapSettings) -> Self {
        Self {
            settings,
            candidates: Vec::with_capacity(64),
        }
    }

    /// 获取配置
    pub fn settings(&self) -> &SnapSettings {
        &self.settings
    }

    /// 获取配置（可变）
    pub fn settings_mut(&mut self) -> &mut SnapSettings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: SnapSettings) {
        self.settings = settings;
    }

    /// 对图纸中可见的图元求捕捉点
    pub fn resolve_in(&mut self, drawing: &Drawing, query: SnapQuery) -> Option<SnapResult> {
        let visible: Vec<&DrawingElement> = drawing.visible_elements().collect();
        self.resolve(&visible, query)
    }

    /// 寻找最佳捕捉点
    ///
    /// `elements` 应已按可见性过滤；锁定的图元同样参与捕捉。
    /// 返回 `None` 时调用方使用光标原始位置。
    pub fn resolve(&mut self, elements: &[&DrawingElement], query: SnapQuery) -> Option<SnapResult> {
        self.candidates.clear();

        if !(query.zoom > EPSILON) || !query.cursor.x.is_finite() || !query.cursor.y.is_finite() {
            return None;
        }
        let mask = self.settings.mask;
        if mask == SnapMask::NONE {
            return None;
        }

        // 世界坐标容差
        let world_tolerance = self.settings.tolerance / query.zoom;

        // 只有包围盒靠近光标的图元才可能产生容差内的候选
        let nearby: Vec<(ElementId, Vec<Geometry>)> = elements
            .iter()
            .filter(|el| el.bounding_box().inflate(world_tolerance).contains(&query.cursor))
            .map(|el| (el.id, el.world_geometry()))
            .collect();

        let mut collector = Collector {
            cursor: query.cursor,
            zoom: query.zoom,
            tolerance: self.settings.tolerance,
            out: &mut self.candidates,
        };

        for (id, geometry) in &nearby {
            for g in geometry {
                collect_geometry(&mut collector, mask, g, *id, query.reference);
            }
        }

        if mask.is_enabled(SnapType::Intersection) {
            for (_, geometry) in &nearby {
                for p in self_intersections(geometry) {
                    collector.push(p, SnapType::Intersection, None);
                }
            }
            for i in 0..nearby.len() {
                for j in (i + 1)..nearby.len() {
                    for g1 in &nearby[i].1 {
                        for g2 in &nearby[j].1 {
                            for p in intersect(g1, g2) {
                                collector.push(p, SnapType::Intersection, None);
                            }
                        }
                    }
                }
            }
        }

        if mask.is_enabled(SnapType::Grid) && self.settings.grid_spacing > EPSILON {
            let spacing = self.settings.grid_spacing;
            let grid_point = Point2::new(
                (query.cursor.x / spacing).round() * spacing,
                (query.cursor.y / spacing).round() * spacing,
            );
            collector.push(grid_point, SnapType::Grid, None);
        }

        let best = select_best(&self.candidates);
        if best.is_none() {
            tracing::trace!(x = query.cursor.x, y = query.cursor.y, "no snap candidate, free placement");
        }
        best
    }

    /// 上一次查询中容差内的全部候选
    pub fn candidates(&self) -> &[SnapResult] {
        &self.candidates
    }
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(SnapSettings::default())
    }
}

/// 同一图元内部各段之间的交点（自交的多段线、块内交叉的构件）
///
/// 相邻段的公共顶点不算交点。
fn self_intersections(geometry: &[Geometry]) -> Vec<Point2> {
    let mut out = Vec::new();
    for (i, g1) in geometry.iter().enumerate() {
        for g2 in &geometry[i + 1..] {
            let (ends1, ends2) = (open_ends(g1), open_ends(g2));
            out.extend(intersect(g1, g2).into_iter().filter(|p| {
                let shared = |ends: &[Point2]| ends.iter().any(|e| (e - p).norm() <= EPSILON);
                !(shared(ends1.as_slice()) && shared(ends2.as_slice()))
            }));
        }
    }
    out
}

fn open_ends(g: &Geometry) -> Vec<Point2> {
    match g {
        Geometry::Point(p) => vec![*p],
        Geometry::Line(l) => vec![l.start, l.end],
        Geometry::Arc(a) => vec![a.start_point(), a.end_point()],
        Geometry::Circle(_) => Vec::new(),
    }
}

/// 优先级最高者胜出，同优先级取距离最小者，完全相等时保留先发现的
fn select_best(candidates: &[SnapResult]) -> Option<SnapResult> {
    let mut best: Option<&SnapResult> = None;
    for c in candidates {
        let better = match best {
            None => true,
            Some(b) => {
                let (cp, bp) = (c.snap_type.priority(), b.snap_type.priority());
                cp < bp || (cp == bp && c.screen_distance < b.screen_distance)
            }
        };
        if better {
            best = Some(c);
        }
    }
    best.copied()
}

struct Collector<'a> {
    cursor: Point2,
    zoom: f64,
    tolerance: f64,
    out: &'a mut Vec<SnapResult>,
}

impl Collector<'_> {
    /// 超出容差的候选直接丢弃
    fn push(&mut self, point: Point2, snap_type: SnapType, element: Option<ElementId>) {
        let screen_distance = (point - self.cursor).norm() * self.zoom;
        if screen_distance <= self.tolerance {
            self.out.push(SnapResult {
                point,
                snap_type,
                element,
                screen_distance,
            });
        }
    }
}

fn collect_geometry(
    c: &mut Collector<'_>,
    mask: SnapMask,
    geometry: &Geometry,
    id: ElementId,
    reference: Option<Point2>,
) {
    match geometry {
        Geometry::Point(p) => {
            if mask.is_enabled(SnapType::Endpoint) {
                c.push(*p, SnapType::Endpoint, Some(id));
            }
        }
        Geometry::Line(line) => collect_line(c, mask, line, id, reference),
        Geometry::Circle(circle) => collect_circle(c, mask, circle, id),
        Geometry::Arc(arc) => collect_arc(c, mask, arc, id),
    }
}

/// 线段的捕捉点
fn collect_line(c: &mut Collector<'_>, mask: SnapMask, line: &Line, id: ElementId, reference: Option<Point2>) {
    if mask.is_enabled(SnapType::Endpoint) {
        c.push(line.start, SnapType::Endpoint, Some(id));
        c.push(line.end, SnapType::Endpoint, Some(id));
    }
    if mask.is_enabled(SnapType::Midpoint) {
        c.push(line.midpoint(), SnapType::Midpoint, Some(id));
    }
    // 垂足：光标到线段的正交投影，只在命令已有参考点时提供
    if mask.is_enabled(SnapType::Perpendicular) && reference.is_some() {
        if let Some(foot) = perpendicular_foot(line, &c.cursor, FootMode::WithinSegment) {
            c.push(foot, SnapType::Perpendicular, Some(id));
        }
    }
}

/// 圆的捕捉点
fn collect_circle(c: &mut Collector<'_>, mask: SnapMask, circle: &Circle, id: ElementId) {
    if mask.is_enabled(SnapType::Center) {
        c.push(circle.center, SnapType::Center, Some(id));
    }
    if mask.is_enabled(SnapType::Tangent) {
        for p in tangent_points_from_external_point(circle, &c.cursor) {
            c.push(p, SnapType::Tangent, Some(id));
        }
    }
}

/// 圆弧的捕捉点
fn collect_arc(c: &mut Collector<'_>, mask: SnapMask, arc: &Arc, id: ElementId) {
    if mask.is_enabled(SnapType::Endpoint) {
        c.push(arc.start_point(), SnapType::Endpoint, Some(id));
        c.push(arc.end_point(), SnapType::Endpoint, Some(id));
    }
    if mask.is_enabled(SnapType::Center) {
        c.push(arc.center, SnapType::Center, Some(id));
    }
    if mask.is_enabled(SnapType::Midpoint) {
        c.push(arc.mid_point(), SnapType::Midpoint, Some(id));
    }
    if mask.is_enabled(SnapType::Tangent) {
        for p in tangent_points_from_external_point(&arc.circle(), &c.cursor) {
            if arc.contains_point(&p) {
                c.push(p, SnapType::Tangent, Some(id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ElementKind;
    use crate::layer::LayerId;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn element(id: u64, kind: ElementKind) -> DrawingElement {
        DrawingElement::new(ElementId(id), kind, LayerId(0))
    }

    fn line(id: u64, x0: f64, y0: f64, x1: f64, y1: f64) -> DrawingElement {
        element(id, ElementKind::line(Point2::new(x0, y0), Point2::new(x1, y1)))
    }

    fn engine(mask: SnapMask) -> SnapEngine {
        SnapEngine::new(SnapSettings::default().with_mask(mask))
    }

    #[test]
    fn test_snap_mask() {
        let mut mask = SnapMask::default();
        assert!(mask.is_enabled(SnapType::Endpoint));
        assert!(mask.is_enabled(SnapType::Midpoint));
        assert!(!mask.is_enabled(SnapType::Grid));

        mask.set(SnapType::Grid, true);
        assert!(mask.is_enabled(SnapType::Grid));

        mask.toggle(SnapType::Endpoint);
        assert!(!mask.is_enabled(SnapType::Endpoint));
        assert_eq!(SnapMask::only(SnapType::Tangent).enabled_types().count(), 1);
    }

    #[test]
    fn test_grid_snap_on_square() {
        let square = element(1, ElementKind::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)));
        let mut engine = SnapEngine::new(
            SnapSettings::default()
                .with_mask(SnapMask::only(SnapType::Grid))
                .with_grid_spacing(1.0)
                .with_tolerance(20.0),
        );
        let result = engine
            .resolve(&[&square], SnapQuery::new(Point2::new(10.4, 10.4), 20.0))
            .unwrap();
        assert_eq!(result.snap_type, SnapType::Grid);
        assert!(approx_eq!(f64, result.point.x, 10.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, result.point.y, 10.0, epsilon = 1e-12));
    }

    #[test]
    fn test_priority_beats_distance() {
        // 中点更近，但端点优先
        let l = line(1, 0.0, 0.0, 1.0, 0.0);
        let mut engine = engine(SnapMask::ALL);
        let result = engine
            .resolve(&[&l], SnapQuery::new(Point2::new(0.45, 0.0), 10.0))
            .unwrap();
        assert_eq!(result.snap_type, SnapType::Endpoint);
        assert_eq!(result.point, Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_tolerance_is_in_pixels() {
        let l = line(1, 0.0, 0.0, 100.0, 0.0);
        let mut engine = engine(SnapMask::only(SnapType::Endpoint));
        // 世界距离 2，缩放 1 => 2px，在 10px 之内
        assert!(engine.resolve(&[&l], SnapQuery::new(Point2::new(2.0, 0.0), 1.0)).is_some());
        // 缩放 10 => 20px，超出容差
        assert!(engine.resolve(&[&l], SnapQuery::new(Point2::new(2.0, 0.0), 10.0)).is_none());
    }

    #[test]
    fn test_intersection_snap() {
        let a = line(1, 0.0, 0.0, 10.0, 10.0);
        let b = line(2, 0.0, 10.0, 10.0, 0.0);
        let mut engine = engine(SnapMask::only(SnapType::Intersection));
        let result = engine
            .resolve(&[&a, &b], SnapQuery::new(Point2::new(5.2, 4.9), 10.0))
            .unwrap();
        assert_eq!(result.snap_type, SnapType::Intersection);
        assert!(approx_eq!(f64, result.point.x, 5.0, epsilon = 1e-9));
        assert!(result.element.is_none());
    }

    #[test]
    fn test_self_crossing_polyline_offers_intersection() {
        let zigzag = element(
            1,
            ElementKind::Polyline {
                vertices: vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(10.0, 10.0),
                    Point2::new(10.0, 0.0),
                    Point2::new(0.0, 10.0),
                ],
                closed: false,
            },
        );
        let mut engine = engine(SnapMask::only(SnapType::Intersection));
        let result = engine
            .resolve(&[&zigzag], SnapQuery::new(Point2::new(5.2, 4.9), 10.0))
            .unwrap();
        assert!(approx_eq!(f64, result.point.x, 5.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, result.point.y, 5.0, epsilon = 1e-9));

        // 相邻段的公共顶点不是交点
        assert!(engine
            .resolve(&[&zigzag], SnapQuery::new(Point2::new(10.0, 0.1), 10.0))
            .is_none());
        let square = element(2, ElementKind::rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0)));
        assert!(engine
            .resolve(&[&square], SnapQuery::new(Point2::new(4.0, 4.0), 10.0))
            .is_none());
    }

    #[test]
    fn test_tie_goes_to_first_element() {
        // 两条线段共用端点
        let a = line(1, 0.0, 0.0, 5.0, 0.0);
        let b = line(2, 0.0, 0.0, 0.0, 5.0);
        let mut engine = engine(SnapMask::only(SnapType::Endpoint));
        let result = engine
            .resolve(&[&a, &b], SnapQuery::new(Point2::new(0.1, 0.1), 10.0))
            .unwrap();
        assert_eq!(result.element, Some(ElementId(1)));
    }

    #[test]
    fn test_perpendicular_requires_reference() {
        let l = line(1, 0.0, 0.0, 100.0, 0.0);
        let mut engine = engine(SnapMask::only(SnapType::Perpendicular));
        let cursor = Point2::new(50.0, 0.5);
        assert!(engine.resolve(&[&l], SnapQuery::new(cursor, 1.0)).is_none());

        let query = SnapQuery::new(cursor, 1.0).with_reference(Some(Point2::new(50.0, 30.0)));
        let result = engine.resolve(&[&l], query).unwrap();
        assert_eq!(result.snap_type, SnapType::Perpendicular);
        assert!(approx_eq!(f64, result.point.x, 50.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, result.point.y, 0.0, epsilon = 1e-9));
    }

    #[test]
    fn test_tangent_only_outside_circle() {
        let c = element(1, ElementKind::circle(Point2::origin(), 10.0));
        let mut engine = engine(SnapMask::only(SnapType::Tangent));

        // 圆内没有切点
        assert!(engine.resolve(&[&c], SnapQuery::new(Point2::new(9.0, 0.0), 1.0)).is_none());

        // 圆外：光标 (10.5, 0) 的切点靠近 (9.52, ±3.05)，容差放大到 20px
        engine.settings_mut().tolerance = 20.0;
        let result = engine
            .resolve(&[&c], SnapQuery::new(Point2::new(10.5, 0.0), 1.0))
            .unwrap();
        assert_eq!(result.snap_type, SnapType::Tangent);
        let radial = result.point - Point2::origin();
        let to_cursor = Point2::new(10.5, 0.0) - result.point;
        assert!(radial.dot(&to_cursor).abs() < 1e-9);
    }

    #[test]
    fn test_block_children_snap_in_world_space() {
        use crate::entity::BlockInstance;
        let child = line(0, 0.0, 0.0, 1.0, 0.0);
        let mut block = BlockInstance::new("bar", Point2::new(100.0, 100.0), vec![child]);
        block.scale = 2.0;
        let el = element(7, ElementKind::Block(block));
        let mut engine = engine(SnapMask::only(SnapType::Endpoint));

        // 局部 (1,0) 在世界坐标中为 (102,100)
        let result = engine
            .resolve(&[&el], SnapQuery::new(Point2::new(101.9, 100.1), 10.0))
            .unwrap();
        assert_eq!(result.point, Point2::new(102.0, 100.0));
        assert_eq!(result.element, Some(ElementId(7)));
        // 局部坐标处不会产生候选
        assert!(engine.resolve(&[&el], SnapQuery::new(Point2::new(1.0, 0.0), 10.0)).is_none());
    }

    #[test]
    fn test_disabled_modes_yield_none() {
        let l = line(1, 0.0, 0.0, 1.0, 0.0);
        let mut engine = engine(SnapMask::NONE);
        assert!(engine.resolve(&[&l], SnapQuery::new(Point2::new(0.0, 0.0), 1.0)).is_none());
    }

    #[test]
    fn test_resolve_in_skips_hidden_layers() {
        use crate::drawing::{ChangeSet, NewElement};
        let mut drawing = Drawing::new();
        drawing
            .commit(ChangeSet::new().add(NewElement::new(ElementKind::line(
                Point2::new(0.0, 0.0),
                Point2::new(5.0, 0.0),
            ))))
            .unwrap();
        let mut engine = engine(SnapMask::only(SnapType::Endpoint));
        let query = SnapQuery::new(Point2::new(0.1, 0.0), 10.0);
        assert!(engine.resolve_in(&drawing, query).is_some());
        drawing.set_layer_visible(LayerId(0), false).unwrap();
        assert!(engine.resolve_in(&drawing, query).is_none());
    }

    proptest! {
        #[test]
        fn test_snap_never_beyond_tolerance(
            segments in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0, -50.0f64..50.0, -50.0f64..50.0), 1..6),
            cx in -50.0f64..50.0,
            cy in -50.0f64..50.0,
            tolerance in 0.5f64..40.0,
            zoom in 0.1f64..20.0,
            grid in 0.5f64..10.0,
        ) {
            let elements: Vec<DrawingElement> = segments
                .iter()
                .enumerate()
                .map(|(i, (x0, y0, x1, y1))| line(i as u64, *x0, *y0, *x1, *y1))
                .collect();
            let refs: Vec<&DrawingElement> = elements.iter().collect();
            let mut engine = SnapEngine::new(
                SnapSettings::default()
                    .with_mask(SnapMask::ALL)
                    .with_tolerance(tolerance)
                    .with_grid_spacing(grid),
            );
            let cursor = Point2::new(cx, cy);
            let query = SnapQuery::new(cursor, zoom).with_reference(Some(Point2::origin()));
            if let Some(result) = engine.resolve(&refs, query) {
                prop_assert!((result.point - cursor).norm() * zoom <= tolerance);
            }
        }
    }
}
