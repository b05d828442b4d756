//! 图纸模型
//!
//! 持有全部图元与图层。所有图元修改都经过 [`Drawing::commit`]：
//! 先整体校验变更集，全部通过后才修改模型，失败时模型保持原样。
//!
//! 图元按插入顺序存储，这个顺序就是捕捉和拾取在平局时的优先顺序。

use crate::entity::{DrawingElement, ElementId, ElementKind, MAX_BLOCK_DEPTH};
use crate::error::{CoreError, CoreResult};
use crate::history::History;
use crate::layer::{Layer, LayerId, LayerTable};
use crate::math::Point2;
use crate::properties::{Color, Style};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 待创建的图元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewElement {
    pub kind: ElementKind,
    pub style: Style,
    /// `None` 表示放到当前图层
    pub layer: Option<LayerId>,
}

impl NewElement {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            style: Style::default(),
            layer: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn on_layer(mut self, layer: LayerId) -> Self {
        self.layer = Some(layer);
        self
    }
}

/// 变更集：一次提交中要新增、删除、替换的图元
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub added: Vec<NewElement>,
    pub removed: Vec<ElementId>,
    /// 保持ID不变、替换几何
    pub replaced: Vec<(ElementId, ElementKind)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, element: NewElement) -> Self {
        self.added.push(element);
        self
    }

    pub fn remove(mut self, id: ElementId) -> Self {
        self.removed.push(id);
        self
    }

    pub fn replace(mut self, id: ElementId, kind: ElementKind) -> Self {
        self.replaced.push((id, kind));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.replaced.is_empty()
    }
}

/// 提交结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReceipt {
    /// 新建图元的ID，顺序与 `ChangeSet::added` 一致
    pub added: Vec<ElementId>,
    pub removed: Vec<ElementId>,
    pub replaced: Vec<ElementId>,
}

/// 已生效的变更，用于撤销/重做
#[derive(Debug, Clone)]
struct AppliedChange {
    added: Vec<DrawingElement>,
    /// (删除前的下标, 图元)，按下标升序
    removed: Vec<(usize, DrawingElement)>,
    /// (替换前, 替换后)
    replaced: Vec<(DrawingElement, DrawingElement)>,
}

/// 删除图层时如何处理其上的图元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDeletion {
    /// 转移到另一个图层
    ReassignTo(LayerId),
    /// 一并删除
    DeleteElements,
}

/// 图纸
#[derive(Debug, Clone)]
pub struct Drawing {
    elements: Vec<DrawingElement>,
    layers: LayerTable,
    next_id: u64,
    history: History<AppliedChange>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::with_layers(LayerTable::new())
    }

    pub fn with_layers(layers: LayerTable) -> Self {
        Self {
            elements: Vec::new(),
            layers,
            next_id: 1,
            history: History::with_limit(256),
        }
    }

    /// 由已有数据重建图纸（用于加载文件），校验ID唯一和图层引用
    pub fn from_parts(layers: LayerTable, elements: Vec<DrawingElement>) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for el in &elements {
            if !seen.insert(el.id) {
                return Err(CoreError::integrity("drawing", format!("duplicate element id {}", el.id)));
            }
            if !layer_refs_valid(el, &layers) {
                return Err(CoreError::integrity(
                    "drawing",
                    format!("element {} references a missing layer", el.id),
                ));
            }
            if el.block_depth() > MAX_BLOCK_DEPTH {
                return Err(CoreError::integrity(
                    "drawing",
                    format!("block {} nests deeper than {}", el.id, MAX_BLOCK_DEPTH),
                ));
            }
        }
        let next_id = elements.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;
        Ok(Self {
            elements,
            layers,
            next_id,
            history: History::with_limit(256),
        })
    }

    // ========== 查询 ==========

    pub fn elements(&self) -> &[DrawingElement] {
        &self.elements
    }

    pub fn get(&self, id: ElementId) -> Option<&DrawingElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// 可见图层上的图元（锁定的图元仍然包含在内）
    pub fn visible_elements(&self) -> impl Iterator<Item = &DrawingElement> {
        self.elements
            .iter()
            .filter(move |e| self.layers.is_visible(e.layer))
    }

    /// 图元是否允许被工具修改
    pub fn is_editable(&self, id: ElementId) -> bool {
        self.get(id)
            .map(|e| !e.locked && !self.layers.is_locked(e.layer))
            .unwrap_or(false)
    }

    /// 拾取：返回容差内最近的可见图元，等距时取绘制顺序靠前者
    pub fn hit_test(&self, point: &Point2, tolerance: f64) -> Option<ElementId> {
        let mut best: Option<(ElementId, f64)> = None;
        for el in self.visible_elements() {
            let d = el.distance_to_point(point);
            if d > tolerance {
                continue;
            }
            match best {
                Some((_, bd)) if d >= bd => {}
                _ => best = Some((el.id, d)),
            }
        }
        best.map(|(id, _)| id)
    }

    // ========== 修改 ==========

    /// 事务性提交：全部生效或全部不生效
    pub fn commit(&mut self, changes: ChangeSet) -> CoreResult<CommitReceipt> {
        self.validate(&changes)?;

        let mut applied = AppliedChange {
            added: Vec::with_capacity(changes.added.len()),
            removed: Vec::with_capacity(changes.removed.len()),
            replaced: Vec::with_capacity(changes.replaced.len()),
        };
        let mut receipt = CommitReceipt::default();

        for (id, kind) in changes.replaced {
            if let Some(el) = self.elements.iter_mut().find(|e| e.id == id) {
                let before = el.clone();
                el.kind = kind;
                applied.replaced.push((before, el.clone()));
                receipt.replaced.push(id);
            }
        }

        let mut removal: Vec<(usize, ElementId)> = changes
            .removed
            .iter()
            .filter_map(|id| self.index_of(*id).map(|i| (i, *id)))
            .collect();
        removal.sort_by_key(|(i, _)| *i);
        for (index, id) in removal.iter().rev() {
            let el = self.elements.remove(*index);
            applied.removed.push((*index, el));
            receipt.removed.push(*id);
        }
        applied.removed.reverse();

        let current = self.layers.current();
        for new in changes.added {
            let id = self.allocate_id();
            let el = DrawingElement::new(id, new.kind, new.layer.unwrap_or(current)).with_style(new.style);
            self.elements.push(el.clone());
            applied.added.push(el);
            receipt.added.push(id);
        }

        tracing::info!(
            added = receipt.added.len(),
            removed = receipt.removed.len(),
            replaced = receipt.replaced.len(),
            "committed change set"
        );

        self.history.push(applied);
        Ok(receipt)
    }

    fn validate(&self, changes: &ChangeSet) -> CoreResult<()> {
        let mut touched = HashSet::new();
        for id in changes
            .removed
            .iter()
            .chain(changes.replaced.iter().map(|(id, _)| id))
        {
            if !touched.insert(*id) {
                return Err(CoreError::invalid("changes", format!("element {} touched twice", id)));
            }
            if !self.contains(*id) {
                return Err(CoreError::ElementNotFound(*id));
            }
            if !self.is_editable(*id) {
                return Err(CoreError::ElementLocked(*id));
            }
        }

        let current = self.layers.current();
        for new in &changes.added {
            let layer = new.layer.unwrap_or(current);
            let Some(target) = self.layers.get(layer) else {
                return Err(CoreError::LayerNotFound(layer));
            };
            if target.locked {
                return Err(CoreError::invalid("layer", format!("layer '{}' is locked", target.name)));
            }
            check_block(&new.kind, &self.layers)?;
        }
        for (_, kind) in &changes.replaced {
            check_block(kind, &self.layers)?;
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// 撤销最近一次提交，返回是否有可撤销的内容
    pub fn undo(&mut self) -> bool {
        let Some(change) = self.history.undo().cloned() else {
            return false;
        };
        let added: HashSet<ElementId> = change.added.iter().map(|e| e.id).collect();
        self.elements.retain(|e| !added.contains(&e.id));
        for (before, _) in &change.replaced {
            if let Some(el) = self.elements.iter_mut().find(|e| e.id == before.id) {
                *el = before.clone();
            }
        }
        for (index, el) in change.removed {
            let index = index.min(self.elements.len());
            self.elements.insert(index, el);
        }
        tracing::debug!("undo");
        true
    }

    /// 重做最近一次撤销的提交
    pub fn redo(&mut self) -> bool {
        let Some(change) = self.history.redo().cloned() else {
            return false;
        };
        for (_, after) in &change.replaced {
            if let Some(el) = self.elements.iter_mut().find(|e| e.id == after.id) {
                *el = after.clone();
            }
        }
        let removed: HashSet<ElementId> = change.removed.iter().map(|(_, e)| e.id).collect();
        self.elements.retain(|e| !removed.contains(&e.id));
        self.elements.extend(change.added);
        tracing::debug!("redo");
        true
    }

    /// 设置图元锁定状态（不进入撤销历史）
    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> CoreResult<()> {
        let el = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(CoreError::ElementNotFound(id))?;
        el.locked = locked;
        Ok(())
    }

    // ========== 图层 ==========

    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        self.layers.add(name)
    }

    pub fn insert_layer(&mut self, layer: Layer) -> LayerId {
        self.layers.insert(layer)
    }

    /// 按名称查找图层，不存在则创建
    pub fn ensure_layer(&mut self, name: &str) -> LayerId {
        match self.layers.find_by_name(name) {
            Some(layer) => layer.id,
            None => self.layers.add(name),
        }
    }

    pub fn set_current_layer(&mut self, id: LayerId) -> CoreResult<()> {
        self.layers.set_current(id)
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> CoreResult<()> {
        self.layers.get_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> CoreResult<()> {
        self.layers.get_mut(id)?.locked = locked;
        Ok(())
    }

    pub fn set_layer_color(&mut self, id: LayerId, color: Color) -> CoreResult<()> {
        self.layers.get_mut(id)?.color = color;
        Ok(())
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> CoreResult<()> {
        self.layers.get_mut(id)?.name = name.into();
        Ok(())
    }

    /// 删除图层
    ///
    /// 图层上的图元按 `policy` 转移或删除，块内引用该图层的子元素同样处理，
    /// 完成后没有任何图元引用被删除的图层。撤销历史会被清空，
    /// 以免撤销时重新引入对已删除图层的引用。
    pub fn delete_layer(&mut self, id: LayerId, policy: LayerDeletion) -> CoreResult<()> {
        if !self.layers.contains(id) {
            return Err(CoreError::LayerNotFound(id));
        }
        if self.layers.count() <= 1 {
            return Err(CoreError::LastLayer);
        }
        if let LayerDeletion::ReassignTo(target) = policy {
            if target == id {
                return Err(CoreError::invalid("target", "cannot reassign to the deleted layer"));
            }
            if !self.layers.contains(target) {
                return Err(CoreError::LayerNotFound(target));
            }
        }

        let moved = match policy {
            LayerDeletion::ReassignTo(target) => {
                let mut count = 0;
                for el in &mut self.elements {
                    if el.layer == id {
                        el.layer = target;
                        count += 1;
                    }
                    reassign_children(el, id);
                }
                count
            }
            LayerDeletion::DeleteElements => {
                let before = self.elements.len();
                self.elements.retain(|e| e.layer != id);
                for el in &mut self.elements {
                    reassign_children(el, id);
                }
                before - self.elements.len()
            }
        };

        self.layers.remove(id)?;
        self.history.clear();
        tracing::info!(layer = %id, ?policy, elements = moved, "deleted layer");
        Ok(())
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

/// 块内引用 `removed` 图层的子元素改为其父块的图层
fn reassign_children(el: &mut DrawingElement, removed: LayerId) {
    let parent_layer = el.layer;
    if let ElementKind::Block(block) = &mut el.kind {
        for child in &mut block.children {
            if child.layer == removed {
                child.layer = parent_layer;
            }
            reassign_children(child, removed);
        }
    }
}

/// 块的嵌套深度和子元素图层引用
fn check_block(kind: &ElementKind, layers: &LayerTable) -> CoreResult<()> {
    let ElementKind::Block(block) = kind else {
        return Ok(());
    };
    if block.depth() > MAX_BLOCK_DEPTH {
        return Err(CoreError::integrity(
            format!("block '{}'", block.name),
            format!("nesting deeper than {}", MAX_BLOCK_DEPTH),
        ));
    }
    if let Some(child) = block.children.iter().find(|c| !layer_refs_valid(c, layers)) {
        return Err(CoreError::integrity(
            format!("block '{}'", block.name),
            format!("child {} references a missing layer", child.id),
        ));
    }
    Ok(())
}

fn layer_refs_valid(el: &DrawingElement, layers: &LayerTable) -> bool {
    if !layers.contains(el.layer) {
        return false;
    }
    match &el.kind {
        ElementKind::Block(block) => block.children.iter().all(|c| layer_refs_valid(c, layers)),
        _ => true,
    }
}

/// 收集图元及其所有子元素引用的图层
pub fn referenced_layers(el: &DrawingElement, out: &mut Vec<LayerId>) {
    out.push(el.layer);
    if let ElementKind::Block(block) = &el.kind {
        for child in &block.children {
            referenced_layers(child, out);
        }
    }
}
