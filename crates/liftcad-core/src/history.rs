//! 撤销/重做历史
//!
//! 线性历史：在撤销之后压入新记录会截断重做分支。

use serde::{Deserialize, Serialize};

/// 通用的历史管理器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History<T> {
    items: Vec<T>,
    /// 已生效的记录数量，`items[..applied]` 可撤销，`items[applied..]` 可重做
    applied: usize,
    /// 最多保留的记录数，0 表示不限
    limit: usize,
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_limit(0)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            applied: 0,
            limit,
        }
    }

    pub fn push(&mut self, item: T) {
        // 截断 redo 历史
        self.items.truncate(self.applied);
        self.items.push(item);
        if self.limit > 0 && self.items.len() > self.limit {
            self.items.remove(0);
        }
        self.applied = self.items.len();
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.items.len()
    }

    /// 返回需要撤销的记录
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.applied -= 1;
        self.items.get(self.applied)
    }

    /// 返回需要重做的记录
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.applied += 1;
        self.items.get(self.applied - 1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.applied = 0;
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = History::new();
        history.push(1);
        history.push(2);
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&1));
        assert!(history.can_redo());
    }

    #[test]
    fn test_push_truncates_redo() {
        let mut history = History::new();
        history.push(1);
        history.push(2);
        history.undo();
        history.push(3);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_limit() {
        let mut history = History::with_limit(2);
        history.push(1);
        history.push(2);
        history.push(3);
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), None);
    }
}
