//! 二维变换
//!
//! 只支持相似变换（等比缩放 + 旋转 + 平移）以及镜像，
//! 这样圆和圆弧在变换后仍然是圆和圆弧。

use crate::math::{Point2, Vector2, EPSILON};
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

/// 二维变换：`p' = linear * p + translation`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub linear: Matrix2<f64>,
    pub translation: Vector2,
}

impl Transform2D {
    pub fn identity() -> Self {
        Self {
            linear: Matrix2::identity(),
            translation: Vector2::zeros(),
        }
    }

    pub fn translation(offset: Vector2) -> Self {
        Self {
            linear: Matrix2::identity(),
            translation: offset,
        }
    }

    /// 绕原点旋转（弧度）
    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            linear: Matrix2::new(c, -s, s, c),
            translation: Vector2::zeros(),
        }
    }

    /// 绕点旋转（弧度）
    pub fn rotation_about(center: Point2, angle: f64) -> Self {
        Self::translation(center.coords)
            .after(&Self::rotation(angle).after(&Self::translation(-center.coords)))
    }

    /// 等比缩放
    pub fn scale(factor: f64) -> Self {
        Self {
            linear: Matrix2::identity() * factor,
            translation: Vector2::zeros(),
        }
    }

    /// 块插入变换：先缩放，再旋转（度），最后平移到插入点
    pub fn placement(origin: Point2, scale: f64, rotation_degrees: f64) -> Self {
        let (s, c) = rotation_degrees.to_radians().sin_cos();
        Self {
            linear: Matrix2::new(c * scale, -s * scale, s * scale, c * scale),
            translation: origin.coords,
        }
    }

    /// 关于直线 (p1, p2) 的镜像；两点重合时返回 `None`
    pub fn mirror(p1: Point2, p2: Point2) -> Option<Self> {
        let d = p2 - p1;
        if d.norm() < EPSILON {
            return None;
        }
        let theta = d.y.atan2(d.x);
        let (s2, c2) = (2.0 * theta).sin_cos();
        let linear = Matrix2::new(c2, s2, s2, -c2);
        let translation = p1.coords - linear * p1.coords;
        Some(Self { linear, translation })
    }

    /// 复合：先应用 `inner`，再应用 `self`
    pub fn after(&self, inner: &Transform2D) -> Transform2D {
        Transform2D {
            linear: self.linear * inner.linear,
            translation: self.linear * inner.translation + self.translation,
        }
    }

    /// 复合：先应用 `self`，再应用 `outer`
    pub fn then(&self, outer: &Transform2D) -> Transform2D {
        outer.after(self)
    }

    pub fn apply(&self, point: &Point2) -> Point2 {
        Point2::from(self.linear * point.coords + self.translation)
    }

    pub fn apply_vector(&self, v: &Vector2) -> Vector2 {
        self.linear * v
    }

    /// 等比缩放系数
    pub fn scale_factor(&self) -> f64 {
        self.linear.determinant().abs().sqrt()
    }

    /// 是否包含镜像（行列式为负）
    pub fn is_reflection(&self) -> bool {
        self.linear.determinant() < 0.0
    }

    /// 变换方向角（弧度）
    pub fn apply_angle(&self, angle: f64) -> f64 {
        let v = self.apply_vector(&Vector2::new(angle.cos(), angle.sin()));
        v.y.atan2(v.x)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}
