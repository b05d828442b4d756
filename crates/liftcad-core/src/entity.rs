//! 图纸元素
//!
//! `DrawingElement` 是图纸中的规范表示：一个封闭的图元种类（[`ElementKind`]）
//! 加上 ID、样式、图层和锁定标记。
//!
//! 块（[`BlockInstance`]）按值拥有子元素，子元素坐标位于块的局部坐标系中。
//! 世界坐标总是通过块的插入变换按需计算，不做缓存。

use crate::geometry::{Arc, Circle, Geometry, Line};
use crate::layer::LayerId;
use crate::math::{BoundingBox2, Point2, Vector2, EPSILON};
use crate::properties::Style;
use crate::transform::Transform2D;
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 块的最大嵌套深度
pub const MAX_BLOCK_DEPTH: usize = 8;

/// 图元ID，在图元生命周期内保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 图元族，用于判断两个图元能否合并
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementFamily {
    /// 线段与开放多段线
    Linear,
    /// 圆、圆弧
    Curve,
    /// 矩形、闭合多段线
    Closed,
    /// 标注、文字
    Annotation,
    Block,
}

/// 块实例
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    /// 块定义名（如 "person"、"crane:LTM-1050"）
    pub name: String,
    /// 插入点
    pub origin: Point2,
    pub scale: f64,
    /// 旋转角（度）
    pub rotation: f64,
    /// 插入前是否先沿局部 X 轴镜像
    #[serde(default)]
    pub mirrored: bool,
    /// 子元素（局部坐标）
    pub children: Vec<DrawingElement>,
}

impl BlockInstance {
    pub fn new(name: impl Into<String>, origin: Point2, children: Vec<DrawingElement>) -> Self {
        Self {
            name: name.into(),
            origin,
            scale: 1.0,
            rotation: 0.0,
            mirrored: false,
            children,
        }
    }

    /// 局部坐标到父坐标的变换
    pub fn placement(&self) -> Transform2D {
        let base = Transform2D::placement(self.origin, self.scale, self.rotation);
        if self.mirrored {
            let flip = Transform2D {
                linear: Matrix2::new(1.0, 0.0, 0.0, -1.0),
                translation: Vector2::zeros(),
            };
            base.after(&flip)
        } else {
            base
        }
    }

    /// 把外部变换并入插入参数，子元素保持不动
    fn transformed(&self, t: &Transform2D) -> BlockInstance {
        let combined = t.after(&self.placement());
        let mirrored = combined.is_reflection();
        let mut linear = combined.linear;
        if mirrored {
            linear = linear * Matrix2::new(1.0, 0.0, 0.0, -1.0);
        }
        let scale = linear.determinant().abs().sqrt();
        let rotation = linear[(1, 0)].atan2(linear[(0, 0)]).to_degrees();
        BlockInstance {
            name: self.name.clone(),
            origin: Point2::from(combined.translation),
            scale,
            rotation,
            mirrored,
            children: self.children.clone(),
        }
    }

    /// 嵌套深度（不含子块时为 1）
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| match &c.kind {
                ElementKind::Block(b) => b.depth(),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

/// 图元种类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Line {
        start: Point2,
        end: Point2,
    },
    /// 四个角点按顺序排列；镜像或旋转后不一定轴对齐
    Rectangle {
        corners: [Point2; 4],
    },
    Circle {
        center: Point2,
        radius: f64,
    },
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Polyline {
        vertices: Vec<Point2>,
        closed: bool,
    },
    Dimension {
        from: Point2,
        to: Point2,
        /// 标注线通过的位置
        line_location: Point2,
        text_override: Option<String>,
        text_height: f64,
    },
    Text {
        anchor: Point2,
        content: String,
        height: f64,
        /// 旋转角（弧度）
        rotation: f64,
    },
    Block(BlockInstance),
}

impl ElementKind {
    /// 由两个对角点生成轴对齐矩形
    pub fn rectangle(p1: Point2, p2: Point2) -> Self {
        ElementKind::Rectangle {
            corners: [p1, Point2::new(p2.x, p1.y), p2, Point2::new(p1.x, p2.y)],
        }
    }

    pub fn line(start: Point2, end: Point2) -> Self {
        ElementKind::Line { start, end }
    }

    pub fn circle(center: Point2, radius: f64) -> Self {
        ElementKind::Circle { center, radius }
    }

    pub fn arc(arc: Arc) -> Self {
        ElementKind::Arc {
            center: arc.center,
            radius: arc.radius,
            start_angle: arc.start_angle,
            end_angle: arc.end_angle,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Line { .. } => "line",
            ElementKind::Rectangle { .. } => "rectangle",
            ElementKind::Circle { .. } => "circle",
            ElementKind::Arc { .. } => "arc",
            ElementKind::Polyline { .. } => "polyline",
            ElementKind::Dimension { .. } => "dimension",
            ElementKind::Text { .. } => "text",
            ElementKind::Block(_) => "block",
        }
    }

    pub fn family(&self) -> ElementFamily {
        match self {
            ElementKind::Line { .. } => ElementFamily::Linear,
            ElementKind::Polyline { closed: false, .. } => ElementFamily::Linear,
            ElementKind::Polyline { closed: true, .. } | ElementKind::Rectangle { .. } => {
                ElementFamily::Closed
            }
            ElementKind::Circle { .. } | ElementKind::Arc { .. } => ElementFamily::Curve,
            ElementKind::Dimension { .. } | ElementKind::Text { .. } => ElementFamily::Annotation,
            ElementKind::Block(_) => ElementFamily::Block,
        }
    }

    /// 控制点序列（顶点，或圆/文字的锚点）
    pub fn points(&self) -> Vec<Point2> {
        match self {
            ElementKind::Line { start, end } => vec![*start, *end],
            ElementKind::Rectangle { corners } => corners.to_vec(),
            ElementKind::Circle { center, .. } | ElementKind::Arc { center, .. } => vec![*center],
            ElementKind::Polyline { vertices, .. } => vertices.clone(),
            ElementKind::Dimension {
                from,
                to,
                line_location,
                ..
            } => vec![*from, *to, *line_location],
            ElementKind::Text { anchor, .. } => vec![*anchor],
            ElementKind::Block(block) => vec![block.origin],
        }
    }

    /// 开放线性图元的两个端点
    pub fn open_ends(&self) -> Option<(Point2, Point2)> {
        match self {
            ElementKind::Line { start, end } => Some((*start, *end)),
            ElementKind::Polyline {
                vertices,
                closed: false,
            } if vertices.len() >= 2 => Some((vertices[0], vertices[vertices.len() - 1])),
            _ => None,
        }
    }

    /// 应用变换，返回新的图元种类
    pub fn transformed(&self, t: &Transform2D) -> ElementKind {
        match self {
            ElementKind::Line { start, end } => ElementKind::Line {
                start: t.apply(start),
                end: t.apply(end),
            },
            ElementKind::Rectangle { corners } => ElementKind::Rectangle {
                corners: corners.map(|c| t.apply(&c)),
            },
            ElementKind::Circle { center, radius } => ElementKind::Circle {
                center: t.apply(center),
                radius: radius * t.scale_factor(),
            },
            ElementKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => ElementKind::arc(Arc::new(*center, *radius, *start_angle, *end_angle).transformed(t)),
            ElementKind::Polyline { vertices, closed } => ElementKind::Polyline {
                vertices: vertices.iter().map(|v| t.apply(v)).collect(),
                closed: *closed,
            },
            ElementKind::Dimension {
                from,
                to,
                line_location,
                text_override,
                text_height,
            } => ElementKind::Dimension {
                from: t.apply(from),
                to: t.apply(to),
                line_location: t.apply(line_location),
                text_override: text_override.clone(),
                text_height: text_height * t.scale_factor(),
            },
            // 文字镜像后仍保持可读，只变换基线方向
            ElementKind::Text {
                anchor,
                content,
                height,
                rotation,
            } => ElementKind::Text {
                anchor: t.apply(anchor),
                content: content.clone(),
                height: height * t.scale_factor(),
                rotation: t.apply_angle(*rotation),
            },
            ElementKind::Block(block) => ElementKind::Block(block.transformed(t)),
        }
    }

    /// 展开为基本图元（块按插入变换递归展开）
    pub fn world_geometry(&self) -> Vec<Geometry> {
        let mut out = Vec::new();
        self.collect_geometry(&Transform2D::identity(), &mut out);
        out
    }

    /// 在给定父变换下展开为世界坐标图元
    fn collect_geometry(&self, t: &Transform2D, out: &mut Vec<Geometry>) {
        match self {
            ElementKind::Line { start, end } => {
                out.push(Geometry::Line(Line::new(t.apply(start), t.apply(end))));
            }
            ElementKind::Rectangle { corners } => {
                for i in 0..4 {
                    out.push(Geometry::Line(Line::new(
                        t.apply(&corners[i]),
                        t.apply(&corners[(i + 1) % 4]),
                    )));
                }
            }
            ElementKind::Circle { center, radius } => {
                out.push(Geometry::Circle(Circle::new(*center, *radius).transformed(t)));
            }
            ElementKind::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                out.push(Geometry::Arc(
                    Arc::new(*center, *radius, *start_angle, *end_angle).transformed(t),
                ));
            }
            ElementKind::Polyline { vertices, closed } => {
                if vertices.len() == 1 {
                    out.push(Geometry::Point(t.apply(&vertices[0])));
                }
                for w in vertices.windows(2) {
                    out.push(Geometry::Line(Line::new(t.apply(&w[0]), t.apply(&w[1]))));
                }
                if *closed && vertices.len() > 2 {
                    out.push(Geometry::Line(Line::new(
                        t.apply(&vertices[vertices.len() - 1]),
                        t.apply(&vertices[0]),
                    )));
                }
            }
            ElementKind::Dimension {
                from,
                to,
                line_location,
                ..
            } => {
                out.push(Geometry::Point(t.apply(from)));
                out.push(Geometry::Point(t.apply(to)));
                if let Some(line) = dimension_line(from, to, line_location) {
                    out.push(Geometry::Line(line.transformed(t)));
                }
            }
            ElementKind::Text { anchor, .. } => out.push(Geometry::Point(t.apply(anchor))),
            ElementKind::Block(block) => {
                let inner = t.after(&block.placement());
                for child in &block.children {
                    child.kind.collect_geometry(&inner, out);
                }
            }
        }
    }
}

/// 标注线：两个定义点沿垂直方向平移到 `location` 所在位置
fn dimension_line(from: &Point2, to: &Point2, location: &Point2) -> Option<Line> {
    let d = to - from;
    let len = d.norm();
    if len < EPSILON {
        return None;
    }
    let dir = d / len;
    let perp = Vector2::new(-dir.y, dir.x);
    let offset = perp * (location - from).dot(&perp);
    Some(Line::new(from + offset, to + offset))
}

/// 图纸元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub style: Style,
    /// 所属图层（非拥有引用）
    pub layer: LayerId,
    /// 锁定的图元不能被工具修改，但仍可被捕捉
    pub locked: bool,
}

impl DrawingElement {
    pub fn new(id: ElementId, kind: ElementKind, layer: LayerId) -> Self {
        Self {
            id,
            kind,
            style: Style::default(),
            layer,
            locked: false,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn points(&self) -> Vec<Point2> {
        self.kind.points()
    }

    /// 展开为世界坐标下的图元（递归经过块的插入变换）
    pub fn world_geometry(&self) -> Vec<Geometry> {
        self.kind.world_geometry()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::empty();
        for g in self.world_geometry() {
            bbox.merge(&g.bounding_box());
        }
        if let ElementKind::Text { .. } = self.kind {
            bbox.merge(&self.text_box());
        }
        bbox
    }

    /// 文字的估算包围盒（每字符宽约 0.6 倍字高，忽略旋转）
    fn text_box(&self) -> BoundingBox2 {
        match &self.kind {
            ElementKind::Text {
                anchor,
                content,
                height,
                ..
            } => {
                let width = content.chars().count() as f64 * height * 0.6;
                BoundingBox2::new(*anchor, Point2::new(anchor.x + width, anchor.y + height))
            }
            _ => BoundingBox2::empty(),
        }
    }

    /// 点到图元的最近世界距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        if let ElementKind::Text { .. } = self.kind {
            if self.text_box().contains(point) {
                return 0.0;
            }
        }
        self.world_geometry()
            .iter()
            .map(|g| g.proximity(point).distance)
            .fold(f64::MAX, f64::min)
    }

    /// 复制并应用变换（保留ID，由调用方决定是否分配新ID）
    pub fn transformed(&self, t: &Transform2D) -> DrawingElement {
        DrawingElement {
            id: self.id,
            kind: self.kind.transformed(t),
            style: self.style.clone(),
            layer: self.layer,
            locked: self.locked,
        }
    }

    /// 块嵌套深度，非块为 0
    pub fn block_depth(&self) -> usize {
        match &self.kind {
            ElementKind::Block(b) => b.depth(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point2, b: Point2) -> bool {
        (a - b).norm() < 1e-9
    }

    fn element(kind: ElementKind) -> DrawingElement {
        DrawingElement::new(ElementId(1), kind, LayerId(0))
    }

    #[test]
    fn test_rectangle_decomposes_to_four_lines() {
        let rect = element(ElementKind::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 5.0)));
        let geometry = rect.world_geometry();
        assert_eq!(geometry.len(), 4);
        assert!(geometry.iter().all(|g| matches!(g, Geometry::Line(_))));
        let bbox = rect.bounding_box();
        assert!(close(bbox.max, Point2::new(10.0, 5.0)));
    }

    #[test]
    fn test_block_children_in_world_space() {
        let child = DrawingElement::new(
            ElementId(0),
            ElementKind::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            LayerId(0),
        );
        let mut block = BlockInstance::new("bar", Point2::new(5.0, 5.0), vec![child]);
        block.scale = 2.0;
        block.rotation = 90.0;
        let el = element(ElementKind::Block(block));

        match &el.world_geometry()[0] {
            Geometry::Line(l) => {
                assert!(close(l.start, Point2::new(5.0, 5.0)));
                assert!(close(l.end, Point2::new(5.0, 7.0)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nested_block_composes_transforms() {
        let leaf = DrawingElement::new(
            ElementId(0),
            ElementKind::circle(Point2::new(1.0, 0.0), 0.5),
            LayerId(0),
        );
        let inner = BlockInstance::new("inner", Point2::new(1.0, 0.0), vec![leaf]);
        let inner_el = DrawingElement::new(ElementId(1), ElementKind::Block(inner), LayerId(0));
        let mut outer = BlockInstance::new("outer", Point2::new(10.0, 0.0), vec![inner_el]);
        outer.scale = 2.0;
        let el = element(ElementKind::Block(outer));

        assert_eq!(el.block_depth(), 2);
        match &el.world_geometry()[0] {
            Geometry::Circle(c) => {
                // (1,0) + (1,0) = (2,0)，放大 2 倍后平移到 (10,0)
                assert!(close(c.center, Point2::new(14.0, 0.0)));
                assert!((c.radius - 1.0).abs() < 1e-12);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_block_mirror_matches_child_mirror() {
        let child = DrawingElement::new(
            ElementId(0),
            ElementKind::line(Point2::new(0.0, 0.0), Point2::new(2.0, 1.0)),
            LayerId(0),
        );
        let mut block = BlockInstance::new("b", Point2::new(3.0, 1.0), vec![child]);
        block.rotation = 30.0;
        let el = element(ElementKind::Block(block));
        let axis = Transform2D::mirror(Point2::origin(), Point2::new(0.0, 1.0)).unwrap();

        let mirrored = el.transformed(&axis);
        let expected: Vec<Geometry> = el.world_geometry().iter().map(|g| g.transformed(&axis)).collect();
        match (&mirrored.world_geometry()[0], &expected[0]) {
            (Geometry::Line(a), Geometry::Line(b)) => {
                assert!(close(a.start, b.start));
                assert!(close(a.end, b.end));
            }
            _ => panic!("expected lines"),
        }
        if let ElementKind::Block(b) = &mirrored.kind {
            assert!(b.mirrored);
        }
    }

    #[test]
    fn test_dimension_geometry() {
        let dim = element(ElementKind::Dimension {
            from: Point2::new(0.0, 0.0),
            to: Point2::new(10.0, 0.0),
            line_location: Point2::new(5.0, 3.0),
            text_override: None,
            text_height: 2.5,
        });
        let geometry = dim.world_geometry();
        assert_eq!(geometry.len(), 3);
        match &geometry[2] {
            Geometry::Line(l) => {
                assert!(close(l.start, Point2::new(0.0, 3.0)));
                assert!(close(l.end, Point2::new(10.0, 3.0)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_text_hit_inside_box() {
        let text = element(ElementKind::Text {
            anchor: Point2::new(0.0, 0.0),
            content: "SWL 50t".to_string(),
            height: 2.0,
            rotation: 0.0,
        });
        assert_eq!(text.distance_to_point(&Point2::new(1.0, 1.0)), 0.0);
        assert!(text.distance_to_point(&Point2::new(0.0, 20.0)) > 10.0);
    }

    #[test]
    fn test_family_and_open_ends() {
        let line = ElementKind::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert_eq!(line.family(), ElementFamily::Linear);
        assert!(line.open_ends().is_some());
        let closed = ElementKind::Polyline {
            vertices: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
            closed: true,
        };
        assert_eq!(closed.family(), ElementFamily::Closed);
        assert!(closed.open_ends().is_none());
    }
}
