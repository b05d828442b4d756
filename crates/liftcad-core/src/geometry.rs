//! 几何图元定义
//!
//! 世界坐标下的基本图元：
//! - 点 (Point)
//! - 线段 (Line)
//! - 圆 (Circle)
//! - 圆弧 (Arc)
//!
//! 所有图纸元素（矩形、多段线、块等）在做几何查询之前都会被展开为这些图元，
//! 见 [`crate::entity::DrawingElement::world_geometry`]。
//!
//! 本模块的函数都是纯函数，不持有任何共享状态。

use crate::math::{normalize_angle, BoundingBox2, Point2, Vector2, EPSILON};
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// 几何图元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point2),
    Line(Line),
    Circle(Circle),
    Arc(Arc),
}

impl Geometry {
    /// 获取几何的包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        match self {
            Geometry::Point(p) => BoundingBox2::new(*p, *p),
            Geometry::Line(l) => l.bounding_box(),
            Geometry::Circle(c) => c.bounding_box(),
            Geometry::Arc(a) => a.bounding_box(),
        }
    }

    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Line(_) => "Line",
            Geometry::Circle(_) => "Circle",
            Geometry::Arc(_) => "Arc",
        }
    }

    /// 点到图元的最近距离和最近点
    pub fn proximity(&self, point: &Point2) -> Proximity {
        match self {
            Geometry::Point(p) => Proximity {
                distance: (point - p).norm(),
                closest: *p,
            },
            Geometry::Line(l) => distance_point_to_segment(l, point),
            Geometry::Circle(c) => distance_point_to_circle(c, point),
            Geometry::Arc(a) => distance_point_to_arc(a, point),
        }
    }

    /// 应用变换
    pub fn transformed(&self, t: &Transform2D) -> Geometry {
        match self {
            Geometry::Point(p) => Geometry::Point(t.apply(p)),
            Geometry::Line(l) => Geometry::Line(l.transformed(t)),
            Geometry::Circle(c) => Geometry::Circle(c.transformed(t)),
            Geometry::Arc(a) => Geometry::Arc(a.transformed(t)),
        }
    }
}

/// 距离查询结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    /// 最小欧氏距离
    pub distance: f64,
    /// 图元上离查询点最近的点
    pub closest: Point2,
}

/// 线段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn vector(&self) -> Vector2 {
        self.end - self.start
    }

    /// 计算线段中点
    pub fn midpoint(&self) -> Point2 {
        Point2::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// 线段是否退化为一点
    pub fn is_degenerate(&self) -> bool {
        self.length() < EPSILON
    }

    /// 参数 t 处的点（t=0 起点，t=1 终点）
    pub fn point_at(&self, t: f64) -> Point2 {
        self.start + self.vector() * t
    }

    /// 点在直线上的投影参数（不截断）
    pub fn parameter_of(&self, point: &Point2) -> f64 {
        let v = self.vector();
        let len2 = v.dot(&v);
        if len2 < EPSILON * EPSILON {
            return 0.0;
        }
        (point - self.start).dot(&v) / len2
    }

    pub fn reversed(&self) -> Line {
        Line::new(self.end, self.start)
    }

    pub fn transformed(&self, t: &Transform2D) -> Line {
        Line::new(t.apply(&self.start), t.apply(&self.end))
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points([self.start, self.end])
    }
}

/// 圆
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 计算周长
    pub fn circumference(&self) -> f64 {
        TAU * self.radius
    }

    /// 计算面积
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// 获取圆上指定角度的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// 点相对圆心的方向角
    pub fn angle_of(&self, point: &Point2) -> f64 {
        (point.y - self.center.y).atan2(point.x - self.center.x)
    }

    pub fn contains_point(&self, point: &Point2) -> bool {
        (point - self.center).norm() < self.radius
    }

    pub fn transformed(&self, t: &Transform2D) -> Circle {
        Circle::new(t.apply(&self.center), self.radius * t.scale_factor())
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }
}

/// 圆弧（从起始角逆时针扫到终止角）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// 从三点创建圆弧，三点共线时返回 `None`
    pub fn from_three_points(p1: Point2, p2: Point2, p3: Point2) -> Option<Self> {
        let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));

        if d.abs() < EPSILON {
            return None;
        }

        let s1 = p1.x * p1.x + p1.y * p1.y;
        let s2 = p2.x * p2.x + p2.y * p2.y;
        let s3 = p3.x * p3.x + p3.y * p3.y;
        let ux = (s1 * (p2.y - p3.y) + s2 * (p3.y - p1.y) + s3 * (p1.y - p2.y)) / d;
        let uy = (s1 * (p3.x - p2.x) + s2 * (p1.x - p3.x) + s3 * (p2.x - p1.x)) / d;

        let center = Point2::new(ux, uy);
        let radius = (p1 - center).norm();
        let circle = Circle::new(center, radius);

        // 保证 p2 位于弧上：顺时针排列时交换起止点
        let (a1, a2, a3) = (circle.angle_of(&p1), circle.angle_of(&p2), circle.angle_of(&p3));
        if normalize_angle(a2 - a1) <= normalize_angle(a3 - a1) {
            Some(Self::new(center, radius, a1, a3))
        } else {
            Some(Self::new(center, radius, a3, a1))
        }
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }

    /// 计算扫过的角度，范围 [0, 2π)
    pub fn sweep_angle(&self) -> f64 {
        normalize_angle(self.end_angle - self.start_angle)
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.sweep_angle() * self.radius
    }

    pub fn start_point(&self) -> Point2 {
        self.circle().point_at_angle(self.start_angle)
    }

    pub fn end_point(&self) -> Point2 {
        self.circle().point_at_angle(self.end_angle)
    }

    /// 弧的中点
    pub fn mid_point(&self) -> Point2 {
        self.circle()
            .point_at_angle(self.start_angle + self.sweep_angle() / 2.0)
    }

    /// 检查角度是否在弧的范围内
    pub fn contains_angle(&self, angle: f64) -> bool {
        let offset = normalize_angle(angle - self.start_angle);
        offset <= self.sweep_angle() + EPSILON || offset >= TAU - EPSILON
    }

    /// 检查圆上的点是否落在弧的角度范围内
    pub fn contains_point(&self, point: &Point2) -> bool {
        self.contains_angle(self.circle().angle_of(point))
    }

    /// 镜像会反转弧的方向，起止点需要交换
    pub fn transformed(&self, t: &Transform2D) -> Arc {
        let center = t.apply(&self.center);
        let radius = self.radius * t.scale_factor();
        let a = t.apply_angle(self.start_angle);
        let b = t.apply_angle(self.end_angle);
        if t.is_reflection() {
            Arc::new(center, radius, b, a)
        } else {
            Arc::new(center, radius, a, b)
        }
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::from_points([self.start_point(), self.end_point()]);

        // 检查象限点
        for angle in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
            if self.contains_angle(angle) {
                bbox.expand_to_include(&self.circle().point_at_angle(angle));
            }
        }

        bbox
    }
}

/// 点到线段的最近距离；线段退化时返回到起点的距离
pub fn distance_point_to_segment(line: &Line, point: &Point2) -> Proximity {
    let v = line.vector();
    let w = point - line.start;

    let c1 = w.dot(&v);
    let closest = if c1 <= 0.0 {
        line.start
    } else {
        let c2 = v.dot(&v);
        if c2 <= c1 {
            line.end
        } else {
            line.start + v * (c1 / c2)
        }
    };

    Proximity {
        distance: (point - closest).norm(),
        closest,
    }
}

/// 点到圆周的最近距离；查询点恰在圆心时取 0° 方向的点
pub fn distance_point_to_circle(circle: &Circle, point: &Point2) -> Proximity {
    let d = point - circle.center;
    let len = d.norm();
    let closest = if len < EPSILON {
        circle.point_at_angle(0.0)
    } else {
        circle.center + d * (circle.radius / len)
    };
    Proximity {
        distance: (len - circle.radius).abs(),
        closest,
    }
}

/// 点到圆弧的最近距离
///
/// 投影角落在弧内时取径向投影，否则取较近的端点（等距时取起点）。
pub fn distance_point_to_arc(arc: &Arc, point: &Point2) -> Proximity {
    let circle = arc.circle();
    if (point - arc.center).norm() >= EPSILON && arc.contains_point(point) {
        return distance_point_to_circle(&circle, point);
    }

    let start = arc.start_point();
    let end = arc.end_point();
    let ds = (point - start).norm();
    let de = (point - end).norm();
    if de < ds {
        Proximity {
            distance: de,
            closest: end,
        }
    } else {
        Proximity {
            distance: ds,
            closest: start,
        }
    }
}

/// 多边形面积（鞋带公式，取绝对值）
pub fn polygon_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice.abs() / 2.0
}

/// 折线总长度，`closed` 为真时包含首尾闭合段
pub fn path_length(points: &[Point2], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut total: f64 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    if closed {
        total += (points[0] - points[points.len() - 1]).norm();
    }
    total
}
