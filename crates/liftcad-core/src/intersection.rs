//! 交点、切点与垂足构造
//!
//! 多个结果点的输出顺序是确定的：
//! - 线段与圆：按线段参数 t 递增
//! - 圆与圆：先左侧（沿圆心连线方向的逆时针侧）后右侧
//! - 切点：先逆时针侧后顺时针侧
//!
//! 调用方在等距候选之间取下标较小者，见 [`closest_to`]。

use crate::geometry::{Arc, Circle, Geometry, Line};
use crate::math::{cross, Point2, Vector2, EPSILON};

/// 线段-线段求交结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// 不相交
    None,
    /// 唯一交点
    Point(Point2),
    /// 共线重叠，没有唯一交点
    Overlap,
}

impl SegmentIntersection {
    /// 捕捉只关心唯一交点，重叠视为不相交
    pub fn point(self) -> Option<Point2> {
        match self {
            SegmentIntersection::Point(p) => Some(p),
            SegmentIntersection::None | SegmentIntersection::Overlap => None,
        }
    }
}

/// 线段-线段交点
pub fn segment_segment_intersection(l1: &Line, l2: &Line) -> SegmentIntersection {
    let d1 = l1.vector();
    let d2 = l2.vector();
    let len1 = d1.norm();
    let len2 = d2.norm();

    // 退化线段当作点处理
    if len1 < EPSILON || len2 < EPSILON {
        let (p, other) = if len1 < EPSILON { (l1.start, l2) } else { (l2.start, l1) };
        let on_other = crate::geometry::distance_point_to_segment(other, &p).distance < EPSILON;
        return if on_other {
            SegmentIntersection::Point(p)
        } else {
            SegmentIntersection::None
        };
    }

    let denom = cross(&d1, &d2);
    let d = l2.start - l1.start;

    // 平行
    if denom.abs() < EPSILON * len1 * len2 {
        if cross(&d, &d1).abs() >= EPSILON * len1 {
            return SegmentIntersection::None;
        }
        // 共线：把 l2 投影到 l1 的参数区间上
        let t0 = l1.parameter_of(&l2.start);
        let t1 = l1.parameter_of(&l2.end);
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        let tol = EPSILON / len1;
        if lo > hi + tol {
            return SegmentIntersection::None;
        }
        if (hi - lo).abs() <= tol {
            return SegmentIntersection::Point(l1.point_at(lo));
        }
        return SegmentIntersection::Overlap;
    }

    let t = cross(&d, &d2) / denom;
    let u = cross(&d, &d1) / denom;
    let tol_t = EPSILON / len1;
    let tol_u = EPSILON / len2;

    // 检查交点是否在两条线段上
    if t >= -tol_t && t <= 1.0 + tol_t && u >= -tol_u && u <= 1.0 + tol_u {
        SegmentIntersection::Point(l1.point_at(t.clamp(0.0, 1.0)))
    } else {
        SegmentIntersection::None
    }
}

/// 线段所在直线与圆的交点参数（不截断），按 t 递增
fn line_circle_parameters(line: &Line, circle: &Circle) -> Vec<f64> {
    let d = line.vector();
    let f = line.start - circle.center;

    let a = d.dot(&d);
    if a < EPSILON * EPSILON {
        return vec![];
    }
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - circle.radius * circle.radius;

    let discriminant = b * b - 4.0 * a * c;
    let scale = EPSILON * a.max(1.0) * circle.radius.max(1.0);

    if discriminant < -scale {
        return vec![];
    }

    if discriminant.abs() <= scale {
        // 相切
        return vec![-b / (2.0 * a)];
    }

    let sqrt_disc = discriminant.sqrt();
    vec![(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)]
}

/// 线段-圆交点，0~2 个，按线段方向排序
pub fn segment_circle_intersection(line: &Line, circle: &Circle) -> Vec<Point2> {
    let tol = if line.length() > 0.0 { EPSILON / line.length() } else { 0.0 };
    line_circle_parameters(line, circle)
        .into_iter()
        .filter(|t| *t >= -tol && *t <= 1.0 + tol)
        .map(|t| line.point_at(t.clamp(0.0, 1.0)))
        .collect()
}

/// 圆-圆交点，0~2 个；同心圆（包括重合）没有唯一交点，返回空
pub fn circle_circle_intersection(c1: &Circle, c2: &Circle) -> Vec<Point2> {
    let delta = c2.center - c1.center;
    let d = delta.norm();

    if d < EPSILON {
        return vec![];
    }
    let tol = EPSILON * d.max(1.0);
    if d > c1.radius + c2.radius + tol || d < (c1.radius - c2.radius).abs() - tol {
        return vec![];
    }

    let a = (c1.radius * c1.radius - c2.radius * c2.radius + d * d) / (2.0 * d);
    let h = (c1.radius * c1.radius - a * a).max(0.0).sqrt();

    let dir = delta / d;
    let p = c1.center + dir * a;
    let perp = Vector2::new(-dir.y, dir.x);

    if h < EPSILON {
        // 相切
        vec![p]
    } else {
        vec![p + perp * h, p - perp * h]
    }
}

/// 线段-圆弧交点
pub fn segment_arc_intersection(line: &Line, arc: &Arc) -> Vec<Point2> {
    segment_circle_intersection(line, &arc.circle())
        .into_iter()
        .filter(|p| arc.contains_point(p))
        .collect()
}

/// 从圆外一点到圆的切点；点在圆内或圆上时为空
pub fn tangent_points_from_external_point(circle: &Circle, point: &Point2) -> Vec<Point2> {
    let offset = point - circle.center;
    let d = offset.norm();

    if d <= circle.radius + EPSILON {
        return vec![];
    }

    let base = offset.y.atan2(offset.x);
    let spread = (circle.radius / d).acos();

    vec![
        circle.point_at_angle(base + spread),
        circle.point_at_angle(base - spread),
    ]
}

/// 垂足的截断方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootMode {
    /// 投影到无限长直线
    Unbounded,
    /// 截断到线段端点
    Clamped,
    /// 只接受落在线段上的垂足
    WithinSegment,
}

/// 点到直线的正交投影；线段退化时返回 `None`
pub fn perpendicular_foot(line: &Line, point: &Point2, mode: FootMode) -> Option<Point2> {
    if line.is_degenerate() {
        return None;
    }
    let t = line.parameter_of(point);
    match mode {
        FootMode::Unbounded => Some(line.point_at(t)),
        FootMode::Clamped => Some(line.point_at(t.clamp(0.0, 1.0))),
        FootMode::WithinSegment => {
            let tol = EPSILON / line.length();
            (t >= -tol && t <= 1.0 + tol).then(|| line.point_at(t.clamp(0.0, 1.0)))
        }
    }
}

/// 点关于直线 (a, b) 的镜像点
pub fn reflect_point(point: &Point2, a: &Point2, b: &Point2) -> Option<Point2> {
    let axis = Line::new(*a, *b);
    let foot = perpendicular_foot(&axis, point, FootMode::Unbounded)?;
    Some(foot + (foot - point))
}

/// 两个图元的全部交点
///
/// 共线重叠与同心圆没有唯一交点，不产生结果。
pub fn intersect(g1: &Geometry, g2: &Geometry) -> Vec<Point2> {
    match (g1, g2) {
        (Geometry::Line(l1), Geometry::Line(l2)) => {
            segment_segment_intersection(l1, l2).point().into_iter().collect()
        }
        (Geometry::Line(line), Geometry::Circle(circle))
        | (Geometry::Circle(circle), Geometry::Line(line)) => {
            segment_circle_intersection(line, circle)
        }
        (Geometry::Line(line), Geometry::Arc(arc)) | (Geometry::Arc(arc), Geometry::Line(line)) => {
            segment_arc_intersection(line, arc)
        }
        (Geometry::Circle(c1), Geometry::Circle(c2)) => circle_circle_intersection(c1, c2),
        (Geometry::Circle(circle), Geometry::Arc(arc))
        | (Geometry::Arc(arc), Geometry::Circle(circle)) => {
            circle_circle_intersection(circle, &arc.circle())
                .into_iter()
                .filter(|p| arc.contains_point(p))
                .collect()
        }
        (Geometry::Arc(a1), Geometry::Arc(a2)) => {
            circle_circle_intersection(&a1.circle(), &a2.circle())
                .into_iter()
                .filter(|p| a1.contains_point(p) && a2.contains_point(p))
                .collect()
        }
        (Geometry::Point(_), _) | (_, Geometry::Point(_)) => vec![],
    }
}

/// 离目标最近的点及其下标；等距时取下标较小者
pub fn closest_to(points: &[Point2], target: &Point2) -> Option<(usize, Point2)> {
    let mut best: Option<(usize, Point2, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = (p - target).norm();
        match best {
            Some((_, _, bd)) if d >= bd => {}
            _ => best = Some((i, *p, d)),
        }
    }
    best.map(|(i, p, _)| (i, p))
}
