//! 命令注册表
//!
//! 参考 LibreCAD 的 RS_Commands 实现
//! 支持完整命令、快捷键、别名和 Tab 补全。
//! 输入先去掉首尾空白、合并中间空白并转为大写，因此 `zoom  in` 与 `ZOOM IN` 等价。

use crate::action::ActionType;
use crate::error::{CommandError, CommandResult};
use std::collections::HashMap;

/// 命令行词汇表中的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// 启动一个工具命令
    Start(ActionType),
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    SelectAll,
    Deselect,
    /// 删除选择集
    Delete,
    Help,
}

/// 命令注册表
///
/// 管理所有命令、快捷键和别名的映射
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    /// 完整命令 -> Command
    main_commands: HashMap<String, Command>,
    /// 快捷键/短命令 -> Command
    short_commands: HashMap<String, Command>,
    /// 用户别名 -> 完整命令
    aliases: HashMap<String, String>,
    /// Command -> 完整命令（反向查找）
    command_names: HashMap<Command, String>,
    /// 注册顺序，用于帮助列表
    order: Vec<String>,
}

/// 规范化命令文本
fn normalize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

impl CommandRegistry {
    /// 创建新的命令注册表
    pub fn new() -> Self {
        let mut registry = Self {
            main_commands: HashMap::new(),
            short_commands: HashMap::new(),
            aliases: HashMap::new(),
            command_names: HashMap::new(),
            order: Vec::new(),
        };

        // 注册默认命令
        registry.register_defaults();

        registry
    }

    /// 注册默认命令
    fn register_defaults(&mut self) {
        // 绘图命令
        self.register(Command::Start(ActionType::DrawLine), "LINE", &["L"]);
        self.register(Command::Start(ActionType::DrawRectangle), "RECT", &["REC", "RECTANGLE"]);
        self.register(Command::Start(ActionType::DrawCircle), "CIRCLE", &["C"]);

        // 修改命令
        self.register(Command::Start(ActionType::Mirror), "MIRROR", &["MI"]);
        self.register(Command::Start(ActionType::Trim), "TRIM", &["TR"]);
        self.register(Command::Start(ActionType::Join), "JOIN", &["J"]);
        self.register(Command::Start(ActionType::Array), "ARRAY", &["AR"]);
        self.register(Command::Start(ActionType::Offset), "OFFSET", &["O"]);

        // 查询
        self.register(Command::Start(ActionType::MeasureDistance), "MEASURE", &["DI", "DIST"]);
        self.register(Command::Start(ActionType::MeasureArea), "AREA", &["AA"]);

        // 编辑
        self.register(Command::Undo, "UNDO", &["U"]);
        self.register(Command::Redo, "REDO", &[]);
        self.register(Command::SelectAll, "SELECT ALL", &["ALL"]);
        self.register(Command::Deselect, "DESELECT", &[]);
        self.register(Command::Delete, "DELETE", &["E", "ERASE"]);

        // 视图
        self.register(Command::ZoomIn, "ZOOM IN", &["Z+"]);
        self.register(Command::ZoomOut, "ZOOM OUT", &["Z-"]);
        self.register(Command::Start(ActionType::Pan), "PAN", &["P"]);

        self.register(Command::Help, "HELP", &["?"]);
    }

    /// 注册命令
    ///
    /// # 参数
    /// - `command`: 命令
    /// - `full_cmd`: 完整命令名（如 "LINE"）
    /// - `shortcuts`: 快捷键/短命令列表（如 ["L"]）
    pub fn register(&mut self, command: Command, full_cmd: &str, shortcuts: &[&str]) {
        let full_cmd = normalize(full_cmd);

        // 注册完整命令
        if self.main_commands.insert(full_cmd.clone(), command).is_none() {
            self.order.push(full_cmd.clone());
        }

        // 注册反向映射
        self.command_names.insert(command, full_cmd);

        // 注册快捷键
        for shortcut in shortcuts {
            self.short_commands.insert(normalize(shortcut), command);
        }
    }

    /// 查找命令
    pub fn lookup(&self, input: &str) -> Option<Command> {
        let input = normalize(input);

        // 1. 先查完整命令
        if let Some(&command) = self.main_commands.get(&input) {
            return Some(command);
        }

        // 2. 再查快捷键
        if let Some(&command) = self.short_commands.get(&input) {
            return Some(command);
        }

        // 3. 查别名
        if let Some(cmd) = self.aliases.get(&input) {
            return self.main_commands.get(cmd).copied();
        }

        None
    }

    /// 解析命令文本，不在词汇表中的文本被拒绝
    pub fn parse(&self, input: &str) -> CommandResult<Command> {
        self.lookup(input)
            .ok_or_else(|| CommandError::UnknownCommand(input.trim().to_string()))
    }

    /// Tab 补全
    ///
    /// 返回所有以 prefix 开头的命令
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = normalize(prefix);
        let mut results: Vec<String> = self
            .main_commands
            .keys()
            .filter(|cmd| cmd.starts_with(&prefix))
            .cloned()
            .collect();

        results.sort();
        results
    }

    /// 获取命令的完整名称
    pub fn get_command_name(&self, command: Command) -> Option<&str> {
        self.command_names.get(&command).map(|s| s.as_str())
    }

    /// 添加用户别名；别名不能覆盖已有命令，目标必须存在
    pub fn add_alias(&mut self, alias: &str, command: &str) -> CommandResult<()> {
        let alias = normalize(alias);
        let command = normalize(command);

        if self.main_commands.contains_key(&alias) || self.short_commands.contains_key(&alias) {
            return Err(CommandError::InvalidInput(format!("alias '{}' shadows a command", alias)));
        }
        if !self.main_commands.contains_key(&command) {
            return Err(CommandError::UnknownCommand(command));
        }
        self.aliases.insert(alias, command);
        Ok(())
    }

    /// 移除别名
    pub fn remove_alias(&mut self, alias: &str) {
        self.aliases.remove(&normalize(alias));
    }

    /// 帮助文本：按注册顺序列出完整命令及其快捷键
    pub fn help(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|name| {
                let command = *self.main_commands.get(name)?;
                let mut shortcuts: Vec<&str> = self
                    .short_commands
                    .iter()
                    .filter(|(_, c)| **c == command)
                    .map(|(s, _)| s.as_str())
                    .collect();
                shortcuts.sort();
                Some(if shortcuts.is_empty() {
                    name.to_lowercase()
                } else {
                    format!("{} ({})", name.to_lowercase(), shortcuts.join(", ").to_lowercase())
                })
            })
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = CommandRegistry::new();

        // 完整命令
        assert_eq!(registry.lookup("LINE"), Some(Command::Start(ActionType::DrawLine)));
        assert_eq!(registry.lookup("line"), Some(Command::Start(ActionType::DrawLine)));

        // 快捷键
        assert_eq!(registry.lookup("L"), Some(Command::Start(ActionType::DrawLine)));
        assert_eq!(registry.lookup("l"), Some(Command::Start(ActionType::DrawLine)));

        // 多词命令忽略多余空白
        assert_eq!(registry.lookup("  zoom   in "), Some(Command::ZoomIn));
        assert_eq!(registry.lookup("Select All"), Some(Command::SelectAll));

        // 不存在的命令
        assert_eq!(registry.lookup("NOTEXIST"), None);
    }

    #[test]
    fn test_full_vocabulary() {
        let registry = CommandRegistry::new();
        for word in [
            "line", "rect", "circle", "mirror", "array", "offset", "measure", "area", "undo", "redo",
            "zoom in", "zoom out", "pan", "select all", "deselect", "delete", "help", "trim", "join",
        ] {
            assert!(registry.parse(word).is_ok(), "{} should be recognized", word);
        }
    }

    #[test]
    fn test_unknown_rejected() {
        let registry = CommandRegistry::new();
        assert_eq!(
            registry.parse(" explode "),
            Err(CommandError::UnknownCommand("explode".to_string()))
        );
    }

    #[test]
    fn test_complete() {
        let registry = CommandRegistry::new();

        let completions = registry.complete("zoom");
        assert_eq!(completions, vec!["ZOOM IN".to_string(), "ZOOM OUT".to_string()]);
    }

    #[test]
    fn test_alias() {
        let mut registry = CommandRegistry::new();

        registry.add_alias("MM", "MIRROR").unwrap();
        assert_eq!(registry.lookup("mm"), Some(Command::Start(ActionType::Mirror)));
        assert!(registry.add_alias("L", "MIRROR").is_err());
        assert!(registry.add_alias("X", "EXPLODE").is_err());

        registry.remove_alias("MM");
        assert_eq!(registry.lookup("MM"), None);
    }

    #[test]
    fn test_help_lists_in_order() {
        let registry = CommandRegistry::new();
        let help = registry.help();
        assert_eq!(help[0], "line (l)");
        assert_eq!(help.last().map(String::as_str), Some("help (?)"));
    }
}
