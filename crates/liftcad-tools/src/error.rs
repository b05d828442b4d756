//! 命令错误定义
//!
//! 命令级错误不会结束命令：会话保持当前命令并回到（或停留在）相应步骤。
//! 等距候选的平局在捕捉和拾取中确定性地解决，不作为错误出现。

use liftcad_core::error::CoreError;
use liftcad_core::input_parser::ParseError;
use thiserror::Error;

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// 当前步骤不接受该图元类型或参数
    #[error("Invalid operand: {reason}")]
    InvalidOperand { reason: String },

    /// 修剪时边界与目标没有交点，继续等待新的目标
    #[error("No intersection between cutting edge and target")]
    NoIntersection,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No active command")]
    NoActiveCommand,

    #[error(transparent)]
    Model(#[from] CoreError),
}

impl CommandError {
    pub fn operand(reason: impl Into<String>) -> Self {
        CommandError::InvalidOperand { reason: reason.into() }
    }
}

impl From<ParseError> for CommandError {
    fn from(e: ParseError) -> Self {
        CommandError::InvalidInput(e.to_string())
    }
}
