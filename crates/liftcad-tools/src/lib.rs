//! LiftCAD 工具命令
//!
//! 多步交互命令的状态机、命令行词汇表和编辑会话。

pub mod action;
pub mod actions;
pub mod command_registry;
pub mod config;
pub mod error;
pub mod state;

pub use action::{Action, ActionContext, ActionResult, ActionType, Measurement, Pick, PreviewGeometry, Step, StepInput};
pub use actions::create_action;
pub use command_registry::{Command, CommandRegistry};
pub use config::{ConfigError, SessionConfig};
pub use error::{CommandError, CommandResult};
pub use state::{CommandPhase, EditorSession, SessionEvent, Viewport};
