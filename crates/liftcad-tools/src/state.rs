//! 编辑会话状态
//!
//! 一个会话持有图纸、捕捉设置、视图、选择集和至多一个活动命令。
//! 所有输入（点击、指针移动、命令行文本、回车、取消）都经由会话分发给活动命令，
//! 命令返回的效果由会话执行：提交变更、报告测量结果或移动视图。
//!
//! 命令级错误以 `Err` 返回，命令保持活动。提交失败时模型不变，命令回到上一步。

use crate::action::{Action, ActionContext, ActionResult, ActionType, Measurement, Pick, PreviewGeometry, StepInput};
use crate::actions::create_action;
use crate::command_registry::{Command, CommandRegistry};
use crate::config::SessionConfig;
use crate::error::{CommandError, CommandResult};
use liftcad_core::drawing::{ChangeSet, CommitReceipt, Drawing};
use liftcad_core::entity::ElementId;
use liftcad_core::input_parser::InputParser;
use liftcad_core::layer::LayerTable;
use liftcad_core::math::{Point2, Vector2};
use liftcad_core::snap::{SnapEngine, SnapQuery, SnapResult, SnapSettings};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// 视图
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// 每世界单位的像素数
    pub zoom: f64,
    /// 视图原点对应的世界坐标
    pub offset: Vector2,
}

impl Viewport {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            offset: Vector2::zeros(),
        }
    }

    /// 屏幕像素换算成世界距离
    pub fn pixels_to_world(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }
}

/// 命令所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPhase {
    Idle,
    Step {
        action: ActionType,
        index: usize,
        name: &'static str,
        input: StepInput,
    },
}

/// 一次输入产生的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// 命令继续，等待下一步输入
    Prompt(String),
    Committed(CommitReceipt),
    Measured(Measurement),
    Cancelled,
    Finished,
    Help(Vec<String>),
    ViewChanged(Viewport),
    /// 是否有内容被撤销
    Undo(bool),
    Redo(bool),
    /// 选择集大小
    Selection(usize),
}

/// 编辑会话
pub struct EditorSession {
    drawing: Drawing,
    snap: SnapEngine,
    viewport: Viewport,
    selection: Vec<ElementId>,
    active: Option<Box<dyn Action>>,
    registry: CommandRegistry,
    config: SessionConfig,
    /// 指针的世界坐标（未经捕捉）
    cursor: Point2,
    last_snap: Option<SnapResult>,
}

impl EditorSession {
    pub fn new(config: SessionConfig) -> Self {
        let drawing = Drawing::with_layers(LayerTable::with_default_name(&config.default_layer));
        Self::with_drawing(drawing, config)
    }

    pub fn with_drawing(drawing: Drawing, config: SessionConfig) -> Self {
        let mut registry = CommandRegistry::new();
        for (alias, command) in &config.aliases {
            if let Err(e) = registry.add_alias(alias, command) {
                warn!(%alias, "ignoring alias: {}", e);
            }
        }
        Self {
            drawing,
            snap: SnapEngine::new(config.snap.clone()),
            viewport: Viewport::new(config.zoom),
            selection: Vec::new(),
            active: None,
            registry,
            config,
            cursor: Point2::origin(),
            last_snap: None,
        }
    }

    // ========== 访问 ==========

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// 图层操作等不经过命令的修改
    ///
    /// 有活动命令时不应调用，命令持有的图元ID可能失效。
    pub fn drawing_mut(&mut self) -> &mut Drawing {
        &mut self.drawing
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn snap_settings(&self) -> &SnapSettings {
        self.snap.settings()
    }

    pub fn snap_settings_mut(&mut self) -> &mut SnapSettings {
        self.snap.settings_mut()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn cursor(&self) -> Point2 {
        self.cursor
    }

    /// 最近一次指针移动的捕捉结果
    pub fn last_snap(&self) -> Option<&SnapResult> {
        self.last_snap.as_ref()
    }

    pub fn phase(&self) -> CommandPhase {
        match &self.active {
            None => CommandPhase::Idle,
            Some(action) => {
                let step = action.step();
                CommandPhase::Step {
                    action: action.action_type(),
                    index: step.index,
                    name: step.name,
                    input: step.input,
                }
            }
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.get_prompt())
    }

    pub fn preview(&self) -> Vec<PreviewGeometry> {
        let Some(action) = &self.active else {
            return vec![];
        };
        let ctx = ActionContext {
            drawing: &self.drawing,
            selection: &self.selection,
            join_tolerance: self.config.join_tolerance,
        };
        action.get_preview(&ctx, self.effective_point())
    }

    /// 捕捉点优先，否则为指针原始位置
    pub fn effective_point(&self) -> Point2 {
        self.last_snap.map(|s| s.point).unwrap_or(self.cursor)
    }

    // ========== 命令 ==========

    /// 启动命令；已有活动命令时先取消它
    pub fn start(&mut self, action_type: ActionType) -> SessionEvent {
        if self.active.is_some() {
            self.cancel();
        }
        let mut action = create_action(action_type);
        let ctx = ActionContext {
            drawing: &self.drawing,
            selection: &self.selection,
            join_tolerance: self.config.join_tolerance,
        };
        action.init(&ctx);
        debug!(command = action.name(), "command started");
        let prompt = action.get_prompt().to_string();
        self.active = Some(action);
        SessionEvent::Prompt(prompt)
    }

    /// 取消活动命令，不修改模型；没有活动命令时也返回 `Cancelled`
    pub fn cancel(&mut self) -> SessionEvent {
        if let Some(mut action) = self.active.take() {
            action.reset();
            debug!(command = action.name(), "command cancelled");
        }
        SessionEvent::Cancelled
    }

    /// 命令行文本
    ///
    /// 依次尝试：活动命令的子命令或数值、点坐标、命令词汇表。空文本等同回车。
    pub fn execute_text(&mut self, text: &str) -> CommandResult<SessionEvent> {
        let text = text.trim();
        if text.is_empty() {
            return self.confirm();
        }

        if self.active.is_some() {
            if let Some(result) = self.dispatch(|action, ctx| action.on_text(ctx, text))? {
                return self.apply(result);
            }
            if let Some(action) = &self.active {
                if action.step().input == StepInput::Point {
                    if let Ok(point) = InputParser::parse_point(text, action.reference_point()) {
                        return self.submit_point(point);
                    }
                }
            }
        }

        let command = self.registry.parse(text)?;
        self.run(command)
    }

    /// 执行词汇表中的命令
    pub fn run(&mut self, command: Command) -> CommandResult<SessionEvent> {
        match command {
            Command::Start(action_type) => Ok(self.start(action_type)),
            Command::Undo => {
                self.cancel();
                let done = self.drawing.undo();
                self.prune_selection();
                Ok(SessionEvent::Undo(done))
            }
            Command::Redo => {
                self.cancel();
                let done = self.drawing.redo();
                self.prune_selection();
                Ok(SessionEvent::Redo(done))
            }
            Command::ZoomIn => {
                self.viewport.zoom *= self.config.zoom_step;
                Ok(SessionEvent::ViewChanged(self.viewport))
            }
            Command::ZoomOut => {
                self.viewport.zoom /= self.config.zoom_step;
                Ok(SessionEvent::ViewChanged(self.viewport))
            }
            Command::SelectAll => {
                self.selection = self.drawing.visible_elements().map(|e| e.id).collect();
                Ok(SessionEvent::Selection(self.selection.len()))
            }
            Command::Deselect => {
                self.selection.clear();
                Ok(SessionEvent::Selection(0))
            }
            Command::Delete => self.delete_selection(),
            Command::Help => Ok(SessionEvent::Help(self.registry.help())),
        }
    }

    /// 删除选择集：有任何一个不可编辑则全部不删
    pub fn delete_selection(&mut self) -> CommandResult<SessionEvent> {
        if self.selection.is_empty() {
            return Err(CommandError::operand("nothing selected"));
        }
        let changes = self
            .selection
            .iter()
            .fold(ChangeSet::new(), |changes, id| changes.remove(*id));
        let receipt = self.drawing.commit(changes)?;
        self.selection.clear();
        Ok(SessionEvent::Committed(receipt))
    }

    // ========== 指针 ==========

    /// 指针移动：更新捕捉结果
    pub fn pointer_move(&mut self, world: Point2) -> Option<SnapResult> {
        self.cursor = world;
        let reference = self.active.as_ref().and_then(|a| a.reference_point());
        let query = SnapQuery::new(world, self.viewport.zoom).with_reference(reference);
        self.last_snap = self.snap.resolve_in(&self.drawing, query);
        trace!(snap = ?self.last_snap, "pointer moved");
        self.last_snap
    }

    /// 点击：拾取步骤做图元拾取，点步骤先经过对象捕捉；空闲时切换选择
    pub fn click(&mut self, world: Point2) -> CommandResult<SessionEvent> {
        let tolerance = self.viewport.pixels_to_world(self.config.pick_tolerance_px);

        let Some(input) = self.active.as_ref().map(|a| a.step().input) else {
            if let Some(id) = self.drawing.hit_test(&world, tolerance) {
                crate::action::toggle_pick(&mut self.selection, id);
            }
            return Ok(SessionEvent::Selection(self.selection.len()));
        };

        match input {
            StepInput::Element => {
                let pick = Pick {
                    element: self.drawing.hit_test(&world, tolerance),
                    point: world,
                };
                if pick.element.is_none() {
                    debug!(x = world.x, y = world.y, "empty pick");
                }
                let result = self.dispatch(|action, ctx| action.on_pick(ctx, pick))?;
                self.apply(result)
            }
            StepInput::Point => {
                let point = match self.pointer_move(world) {
                    Some(snap) => snap.point,
                    None => {
                        debug!(x = world.x, y = world.y, "no snap candidate, using cursor position");
                        world
                    }
                };
                self.submit_point(point)
            }
            StepInput::Value => Err(CommandError::InvalidInput(
                "this step expects a typed value".to_string(),
            )),
        }
    }

    /// 直接提交一个已确定的点（键入的坐标不经过捕捉）
    pub fn submit_point(&mut self, point: Point2) -> CommandResult<SessionEvent> {
        let result = self.dispatch(|action, ctx| action.on_point(ctx, point))?;
        self.apply(result)
    }

    /// 回车
    pub fn confirm(&mut self) -> CommandResult<SessionEvent> {
        let result = self.dispatch(|action, ctx| action.on_confirm(ctx))?;
        self.apply(result)
    }

    // ========== 内部 ==========

    fn dispatch<T>(&mut self, f: impl FnOnce(&mut dyn Action, &ActionContext) -> T) -> CommandResult<T> {
        let Some(action) = self.active.as_mut() else {
            return Err(CommandError::NoActiveCommand);
        };
        let ctx = ActionContext {
            drawing: &self.drawing,
            selection: &self.selection,
            join_tolerance: self.config.join_tolerance,
        };
        Ok(f(action.as_mut(), &ctx))
    }

    fn apply(&mut self, result: ActionResult) -> CommandResult<SessionEvent> {
        match result {
            ActionResult::Continue => {
                if let Some(action) = &self.active {
                    let step = action.step();
                    debug!(command = action.name(), step = step.index, name = step.name, "awaiting input");
                }
                Ok(SessionEvent::Prompt(self.prompt().unwrap_or_default().to_string()))
            }
            ActionResult::Rejected(e) => {
                warn!("input rejected: {}", e);
                Err(e)
            }
            ActionResult::Commit { changes, finished } => match self.drawing.commit(changes) {
                Ok(receipt) => {
                    self.prune_selection();
                    if finished {
                        self.end("committed");
                    }
                    Ok(SessionEvent::Committed(receipt))
                }
                Err(e) => {
                    warn!("commit failed: {}", e);
                    if let Some(action) = self.active.as_mut() {
                        action.step_back();
                    }
                    Err(e.into())
                }
            },
            ActionResult::Report(measurement) => {
                info!(?measurement, "measured");
                self.end("reported");
                Ok(SessionEvent::Measured(measurement))
            }
            ActionResult::Pan(delta) => {
                self.viewport.offset -= delta;
                self.end("panned");
                Ok(SessionEvent::ViewChanged(self.viewport))
            }
            ActionResult::Finish => {
                self.end("finished");
                Ok(SessionEvent::Finished)
            }
            ActionResult::Cancel => Ok(self.cancel()),
        }
    }

    fn end(&mut self, outcome: &str) {
        if let Some(action) = self.active.take() {
            debug!(command = action.name(), outcome, "command ended");
        }
    }

    fn prune_selection(&mut self) {
        self.selection.retain(|id| self.drawing.contains(*id));
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
