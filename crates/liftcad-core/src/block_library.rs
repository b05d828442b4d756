//! 块库
//!
//! 人员、吊钩等符号以声明式记录提供（局部坐标系中的命名线段和圆），
//! 在调用方给定的位置实例化为 `block` 图元。块定义可以引用其他块定义，
//! 实例化时深度优先展开；循环引用或嵌套过深属于数据完整性错误。

use crate::entity::{BlockInstance, DrawingElement, ElementId, ElementKind, MAX_BLOCK_DEPTH};
use crate::error::{CoreError, CoreResult};
use crate::layer::LayerId;
use crate::math::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 插入参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub origin: Point2,
    pub scale: f64,
    /// 旋转角（度）
    pub rotation: f64,
}

impl Placement {
    pub fn at(origin: Point2) -> Self {
        Self {
            origin,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// 应用到块实例
    pub fn apply(&self, block: &mut BlockInstance) {
        block.origin = self.origin;
        block.scale = self.scale;
        block.rotation = self.rotation;
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Point2::origin())
    }
}

/// 块定义中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockItem {
    Segment {
        name: String,
        from: Point2,
        to: Point2,
    },
    Circle {
        name: String,
        center: Point2,
        radius: f64,
    },
    /// 引用另一个块定义
    Nested {
        block: String,
        at: Point2,
        #[serde(default = "unit_scale")]
        scale: f64,
        #[serde(default)]
        rotation: f64,
    },
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    pub items: Vec<BlockItem>,
}

impl BlockDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn segment(mut self, name: &str, from: (f64, f64), to: (f64, f64)) -> Self {
        self.items.push(BlockItem::Segment {
            name: name.to_string(),
            from: Point2::new(from.0, from.1),
            to: Point2::new(to.0, to.1),
        });
        self
    }

    pub fn circle(mut self, name: &str, center: (f64, f64), radius: f64) -> Self {
        self.items.push(BlockItem::Circle {
            name: name.to_string(),
            center: Point2::new(center.0, center.1),
            radius,
        });
        self
    }

    pub fn nested(mut self, block: &str, at: (f64, f64)) -> Self {
        self.items.push(BlockItem::Nested {
            block: block.to_string(),
            at: Point2::new(at.0, at.1),
            scale: 1.0,
            rotation: 0.0,
        });
        self
    }

    fn validate(&self) -> CoreResult<()> {
        let context = || format!("block '{}'", self.name);
        if self.name.trim().is_empty() {
            return Err(CoreError::integrity("block library", "block name is empty"));
        }
        for item in &self.items {
            match item {
                BlockItem::Circle { name, radius, .. } if !(*radius > 0.0) => {
                    return Err(CoreError::integrity(
                        context(),
                        format!("circle '{}' has non-positive radius", name),
                    ));
                }
                BlockItem::Nested { scale, .. } if !(*scale > 0.0) => {
                    return Err(CoreError::integrity(context(), "nested scale must be positive"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// 块库
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockLibrary {
    definitions: BTreeMap<String, BlockDefinition>,
}

impl BlockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 带内置符号（`person`、`hook`、`rigging_team`）的块库
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        for def in builtin_definitions() {
            library.definitions.insert(def.name.clone(), def);
        }
        library
    }

    /// 从 JSON 数组加载块定义
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let definitions: Vec<BlockDefinition> = serde_json::from_str(json)
            .map_err(|e| CoreError::integrity("block library", e.to_string()))?;
        let mut library = Self::new();
        for def in definitions {
            library.define(def)?;
        }
        Ok(library)
    }

    /// 添加或替换块定义
    pub fn define(&mut self, definition: BlockDefinition) -> CoreResult<()> {
        definition.validate()?;
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&BlockDefinition> {
        self.definitions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// 在给定位置实例化块
    ///
    /// 子元素放在 `layer` 上。引用未知块、循环引用或嵌套超过
    /// [`MAX_BLOCK_DEPTH`] 时返回错误，不产生任何结果。
    pub fn instantiate(&self, name: &str, placement: Placement, layer: LayerId) -> CoreResult<BlockInstance> {
        let mut stack = Vec::new();
        let children = self.expand(name, layer, &mut stack).inspect_err(|e| {
            tracing::warn!(block = name, error = %e, "block instantiation failed");
        })?;
        let mut block = BlockInstance::new(name, placement.origin, children);
        placement.apply(&mut block);
        Ok(block)
    }

    fn expand(&self, name: &str, layer: LayerId, stack: &mut Vec<String>) -> CoreResult<Vec<DrawingElement>> {
        if stack.iter().any(|n| n == name) {
            let mut path = stack.join(" -> ");
            path.push_str(" -> ");
            path.push_str(name);
            return Err(CoreError::integrity(format!("block '{}'", name), format!("cyclic reference {}", path)));
        }
        if stack.len() >= MAX_BLOCK_DEPTH {
            return Err(CoreError::integrity(
                format!("block '{}'", name),
                format!("nesting deeper than {}", MAX_BLOCK_DEPTH),
            ));
        }
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| CoreError::UnknownBlock(name.to_string()))?;

        stack.push(name.to_string());
        let mut children = Vec::with_capacity(definition.items.len());
        for (i, item) in definition.items.iter().enumerate() {
            let id = ElementId(i as u64 + 1);
            let kind = match item {
                BlockItem::Segment { from, to, .. } => ElementKind::line(*from, *to),
                BlockItem::Circle { center, radius, .. } => ElementKind::circle(*center, *radius),
                BlockItem::Nested {
                    block,
                    at,
                    scale,
                    rotation,
                } => {
                    let nested = self.expand(block, layer, stack)?;
                    let mut instance = BlockInstance::new(block.clone(), *at, nested);
                    instance.scale = *scale;
                    instance.rotation = *rotation;
                    ElementKind::Block(instance)
                }
            };
            children.push(DrawingElement::new(id, kind, layer));
        }
        stack.pop();
        Ok(children)
    }
}

fn builtin_definitions() -> Vec<BlockDefinition> {
    vec![
        // 立面人形，脚底在原点，身高约 1.75
        BlockDefinition::new("person")
            .circle("head", (0.0, 1.62), 0.13)
            .segment("torso", (0.0, 1.49), (0.0, 0.9))
            .segment("arms", (-0.35, 1.3), (0.35, 1.3))
            .segment("left_leg", (0.0, 0.9), (-0.2, 0.0))
            .segment("right_leg", (0.0, 0.9), (0.2, 0.0)),
        // 吊钩，钩口中心在原点
        BlockDefinition::new("hook")
            .circle("throat", (0.0, 0.0), 0.25)
            .segment("shank", (0.0, 0.25), (0.0, 0.8))
            .segment("crosshead", (-0.2, 0.8), (0.2, 0.8)),
        BlockDefinition::new("rigging_team")
            .nested("person", (-1.0, 0.0))
            .nested("person", (1.0, 0.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    #[test]
    fn test_instantiate_person_at_placement() {
        let library = BlockLibrary::with_builtins();
        let block = library
            .instantiate("person", Placement::at(Point2::new(10.0, 5.0)), LayerId(0))
            .unwrap();
        assert_eq!(block.children.len(), 5);
        assert_eq!(block.origin, Point2::new(10.0, 5.0));

        let el = DrawingElement::new(ElementId(1), ElementKind::Block(block), LayerId(0));
        match &el.world_geometry()[0] {
            Geometry::Circle(c) => assert!((c.center - Point2::new(10.0, 6.62)).norm() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nested_definition_expands() {
        let library = BlockLibrary::with_builtins();
        let block = library
            .instantiate("rigging_team", Placement::default(), LayerId(0))
            .unwrap();
        assert_eq!(block.depth(), 2);
        assert_eq!(block.children.len(), 2);
    }

    #[test]
    fn test_cycle_is_data_integrity() {
        let mut library = BlockLibrary::new();
        library.define(BlockDefinition::new("a").nested("b", (0.0, 0.0))).unwrap();
        library.define(BlockDefinition::new("b").nested("a", (1.0, 0.0))).unwrap();
        match library.instantiate("a", Placement::default(), LayerId(0)) {
            Err(CoreError::DataIntegrity { reason, .. }) => assert!(reason.contains("a -> b -> a")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut library = BlockLibrary::new();
        library.define(BlockDefinition::new("loop").nested("loop", (0.0, 0.0))).unwrap();
        assert!(matches!(
            library.instantiate("loop", Placement::default(), LayerId(0)),
            Err(CoreError::DataIntegrity { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut library = BlockLibrary::new();
        library.define(BlockDefinition::new("level0").segment("s", (0.0, 0.0), (1.0, 0.0))).unwrap();
        for i in 1..=MAX_BLOCK_DEPTH {
            let name = format!("level{}", i);
            let inner = format!("level{}", i - 1);
            library.define(BlockDefinition::new(name).nested(&inner, (0.0, 0.0))).unwrap();
        }
        let ok = format!("level{}", MAX_BLOCK_DEPTH - 1);
        assert!(library.instantiate(&ok, Placement::default(), LayerId(0)).is_ok());
        let too_deep = format!("level{}", MAX_BLOCK_DEPTH);
        assert!(matches!(
            library.instantiate(&too_deep, Placement::default(), LayerId(0)),
            Err(CoreError::DataIntegrity { .. })
        ));
    }

    #[test]
    fn test_unknown_block() {
        let library = BlockLibrary::with_builtins();
        assert_eq!(
            library.instantiate("crane", Placement::default(), LayerId(0)),
            Err(CoreError::UnknownBlock("crane".to_string()))
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"name": "marker", "items": [
                {"kind": "circle", "name": "ring", "center": [0.0, 0.0], "radius": 0.5},
                {"kind": "segment", "name": "tick", "from": [0.0, 0.0], "to": [0.0, 1.0]}
            ]}
        ]"#;
        let library = BlockLibrary::from_json(json).unwrap();
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["marker"]);

        let bad = r#"[{"name": "x", "items": [{"kind": "circle", "name": "c", "center": [0, 0], "radius": 0}]}]"#;
        assert!(matches!(BlockLibrary::from_json(bad), Err(CoreError::DataIntegrity { .. })));
    }
}
