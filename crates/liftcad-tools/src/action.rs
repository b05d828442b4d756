//! Action 系统
//!
//! 每个工具命令是一个独立的 Action 实现，由若干命名步骤组成。
//! 每一步只接受一种输入（点、图元拾取或命令行文本），
//! Action 对输入返回 [`ActionResult`]，由会话负责执行副作用：
//!
//! ```text
//! IDLE → STEP_1 → … → STEP_N → EXECUTING → (COMMITTED | CANCELLED) → IDLE
//! ```
//!
//! Action 自身从不修改图纸。中间拾取都是临时状态，取消时直接丢弃。

use crate::error::CommandError;
use liftcad_core::drawing::{ChangeSet, Drawing};
use liftcad_core::entity::ElementId;
use liftcad_core::geometry::Geometry;
use liftcad_core::math::{Point2, Vector2};
use serde::Serialize;

/// Action 执行结果
#[derive(Debug, Clone)]
pub enum ActionResult {
    /// 继续当前步骤或已进入下一步
    Continue,
    /// 输入被拒绝，命令保持活动
    Rejected(CommandError),
    /// 提交变更；`finished` 为 false 时命令在提交后继续（连续画线）
    Commit { changes: ChangeSet, finished: bool },
    /// 只读命令的测量结果，命令结束
    Report(Measurement),
    /// 平移视图，命令结束
    Pan(Vector2),
    /// 无需修改即结束
    Finish,
    /// 取消当前 action
    Cancel,
}

impl ActionResult {
    pub fn commit(changes: ChangeSet) -> Self {
        ActionResult::Commit {
            changes,
            finished: true,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        ActionResult::Rejected(CommandError::operand(reason))
    }
}

/// 测量结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    Distance {
        from: Point2,
        to: Point2,
        distance: f64,
        dx: f64,
        dy: f64,
    },
    Area {
        points: Vec<Point2>,
        area: f64,
        perimeter: f64,
    },
}

/// Action 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionType {
    // 绘图
    DrawLine,
    DrawRectangle,
    DrawCircle,

    // 修改
    Mirror,
    Trim,
    Join,
    Array,
    Offset,

    // 查询
    MeasureDistance,
    MeasureArea,

    // 视图
    Pan,
}

impl ActionType {
    /// 获取 action 的名称
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::DrawLine => "Line",
            ActionType::DrawRectangle => "Rectangle",
            ActionType::DrawCircle => "Circle",
            ActionType::Mirror => "Mirror",
            ActionType::Trim => "Trim",
            ActionType::Join => "Join",
            ActionType::Array => "Array",
            ActionType::Offset => "Offset",
            ActionType::MeasureDistance => "Measure",
            ActionType::MeasureArea => "Area",
            ActionType::Pan => "Pan",
        }
    }

    /// 是否会修改图纸
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            ActionType::MeasureDistance | ActionType::MeasureArea | ActionType::Pan
        )
    }
}

/// 一个步骤期望的输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    /// 指定点（经过对象捕捉）
    Point,
    /// 拾取图元
    Element,
    /// 命令行输入数值
    Value,
}

/// 当前步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// 从 1 开始的步骤序号
    pub index: usize,
    pub name: &'static str,
    pub input: StepInput,
}

impl Step {
    pub const fn new(index: usize, name: &'static str, input: StepInput) -> Self {
        Self { index, name, input }
    }
}

/// 图元拾取
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    /// 拾取容差内最近的图元，空拾取为 `None`
    pub element: Option<ElementId>,
    /// 拾取位置（世界坐标，未经捕捉）
    pub point: Point2,
}

/// Action 上下文 - 传递给 Action 的运行时信息
pub struct ActionContext<'a> {
    pub drawing: &'a Drawing,
    /// 会话当前的选择集
    pub selection: &'a [ElementId],
    /// 合并端点的距离容差（世界单位）
    pub join_tolerance: f64,
}

/// 预览几何体
#[derive(Debug, Clone)]
pub struct PreviewGeometry {
    pub geometry: Geometry,
    pub is_reference: bool, // 是否是参考线（虚线显示）
}

impl PreviewGeometry {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            is_reference: false,
        }
    }

    pub fn reference(geometry: Geometry) -> Self {
        Self {
            geometry,
            is_reference: true,
        }
    }
}

/// Action trait - 所有工具命令的核心接口
pub trait Action {
    /// 获取 action 类型
    fn action_type(&self) -> ActionType;

    /// 获取 action 名称
    fn name(&self) -> &str {
        self.action_type().name()
    }

    /// 命令开始时调用，可读取当前选择集
    fn init(&mut self, _ctx: &ActionContext) {}

    /// 重置 action 状态
    fn reset(&mut self);

    /// 当前步骤
    fn step(&self) -> Step;

    /// 上一步确定的点，用于相对坐标输入和垂足捕捉
    fn reference_point(&self) -> Option<Point2> {
        None
    }

    // ========== 事件处理 ==========

    /// 点输入（鼠标点击经捕捉后的坐标，或命令行输入的坐标）
    fn on_point(&mut self, _ctx: &ActionContext, _point: Point2) -> ActionResult {
        ActionResult::Continue
    }

    /// 图元拾取
    fn on_pick(&mut self, _ctx: &ActionContext, _pick: Pick) -> ActionResult {
        ActionResult::Continue
    }

    /// 命令行文本（子命令或数值）；不处理时返回 `None`
    fn on_text(&mut self, _ctx: &ActionContext, _text: &str) -> Option<ActionResult> {
        None
    }

    /// 回车确认
    fn on_confirm(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Cancel
    }

    /// 提交失败后回到上一步
    fn step_back(&mut self) {}

    // ========== UI 提示 ==========

    /// 获取当前状态的提示文本
    fn get_prompt(&self) -> &str;

    /// 获取当前可用的子命令
    fn get_available_commands(&self) -> Vec<&str> {
        vec![]
    }

    // ========== 预览 ==========

    /// 获取预览几何体
    fn get_preview(&self, _ctx: &ActionContext, _cursor: Point2) -> Vec<PreviewGeometry> {
        vec![]
    }
}

/// 选择阶段的拾取：重复拾取同一图元即取消选择
pub(crate) fn toggle_pick(selected: &mut Vec<ElementId>, id: ElementId) {
    if let Some(pos) = selected.iter().position(|s| *s == id) {
        selected.remove(pos);
    } else {
        selected.push(id);
    }
}
