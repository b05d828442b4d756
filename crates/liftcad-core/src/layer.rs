//! 图层管理
//!
//! 任意时刻恰好有一个当前图层，新建的图元都放在当前图层上。
//! 删除图层（需要处理图层上的图元）由 [`crate::drawing::Drawing::delete_layer`] 负责。

use crate::error::{CoreError, CoreResult};
use crate::properties::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 图层ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// 图层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub color: Color,
    pub opacity: Option<f32>,
    pub line_weight: Option<f64>,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            locked: false,
            color: Color::WHITE,
            opacity: None,
            line_weight: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// 图层表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerTable {
    layers: Vec<Layer>,
    current: LayerId,
    next_id: u32,
}

impl LayerTable {
    /// 默认图层名
    pub const DEFAULT_LAYER: &'static str = "0";

    pub fn new() -> Self {
        Self::with_default_name(Self::DEFAULT_LAYER)
    }

    pub fn with_default_name(name: &str) -> Self {
        let first = Layer::new(LayerId(0), name);
        Self {
            layers: vec![first],
            current: LayerId(0),
            next_id: 1,
        }
    }

    /// 新建图层并返回其ID
    pub fn add(&mut self, name: impl Into<String>) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push(Layer::new(id, name));
        id
    }

    /// 按给定属性插入图层（用于加载文件），ID 冲突时分配新ID
    pub fn insert(&mut self, mut layer: Layer) -> LayerId {
        if self.contains(layer.id) {
            layer.id = LayerId(self.next_id);
        }
        self.next_id = self.next_id.max(layer.id.0 + 1);
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> CoreResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(CoreError::LayerNotFound(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn current(&self) -> LayerId {
        self.current
    }

    pub fn current_layer(&self) -> &Layer {
        // current 总是指向存在的图层
        self.get(self.current).unwrap_or(&self.layers[0])
    }

    pub fn set_current(&mut self, id: LayerId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::LayerNotFound(id));
        }
        self.current = id;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_visible(&self, id: LayerId) -> bool {
        self.get(id).map(|l| l.visible).unwrap_or(false)
    }

    pub fn is_locked(&self, id: LayerId) -> bool {
        self.get(id).map(|l| l.locked).unwrap_or(false)
    }

    /// 移除图层条目。当前图层被删除时切换到剩余的第一个图层。
    pub(crate) fn remove(&mut self, id: LayerId) -> CoreResult<Layer> {
        if self.layers.len() <= 1 {
            return Err(CoreError::LastLayer);
        }
        let index = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(CoreError::LayerNotFound(id))?;
        let removed = self.layers.remove(index);
        if self.current == id {
            self.current = self.layers[0].id;
        }
        Ok(removed)
    }
}

impl Default for LayerTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_current() {
        let mut table = LayerTable::new();
        assert_eq!(table.count(), 1);
        let cranes = table.add("Cranes");
        assert_ne!(cranes, table.current());
        table.set_current(cranes).unwrap();
        assert_eq!(table.current_layer().name, "Cranes");
        assert_eq!(table.set_current(LayerId(99)), Err(CoreError::LayerNotFound(LayerId(99))));
    }

    #[test]
    fn test_cannot_remove_last_layer() {
        let mut table = LayerTable::new();
        assert_eq!(table.remove(LayerId(0)), Err(CoreError::LastLayer));
    }

    #[test]
    fn test_remove_current_switches() {
        let mut table = LayerTable::new();
        let other = table.add("Rigging");
        table.set_current(other).unwrap();
        table.remove(other).unwrap();
        assert_eq!(table.current(), LayerId(0));
    }

    #[test]
    fn test_insert_reassigns_conflicting_id() {
        let mut table = LayerTable::new();
        let id = table.insert(Layer::new(LayerId(0), "dup"));
        assert_ne!(id, LayerId(0));
        assert_eq!(table.add("next").0, id.0 + 1);
    }
}
