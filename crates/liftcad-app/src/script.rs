//! 命令脚本回放
//!
//! 每行一条输入，按顺序送入编辑会话：
//!
//! ```text
//! # 注释
//! layer crane            切换（必要时新建）当前图层
//! crane AT-50 0,0 60 0.5 放置起重机块：型号、回转中心、吊臂角度、伸缩比例
//! block person 12,3 90   放置符号块
//! move 10,10             指针移动（更新捕捉）
//! click 10,10            点击
//! enter                  回车
//! esc                    取消
//! mirror                 其余文本按命令行输入处理
//! ```

use anyhow::{anyhow, bail, Context, Result};
use liftcad_core::block_library::{BlockLibrary, Placement};
use liftcad_core::crane::{crane_block, find_model, BoomPose};
use liftcad_core::drawing::{ChangeSet, NewElement};
use liftcad_core::entity::ElementKind;
use liftcad_core::input_parser::InputParser;
use liftcad_core::math::Point2;
use liftcad_tools::state::{EditorSession, SessionEvent};
use tracing::{debug, info, warn};

/// 脚本中的一行
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    Layer(String),
    Crane {
        model: String,
        at: Point2,
        angle: f64,
        extension: f64,
    },
    Block {
        name: String,
        at: Point2,
        rotation: f64,
    },
    Move(Point2),
    Click(Point2),
    Enter,
    Escape,
    Text(String),
}

fn point(arg: Option<&str>, line: &str) -> Result<Point2> {
    let arg = arg.ok_or_else(|| anyhow!("missing point in '{}'", line))?;
    InputParser::parse_point(arg, None).with_context(|| format!("bad point in '{}'", line))
}

fn number(arg: Option<&str>, default: f64, line: &str) -> Result<f64> {
    match arg {
        None => Ok(default),
        Some(s) => s
            .parse::<f64>()
            .with_context(|| format!("bad number '{}' in '{}'", s, line)),
    }
}

impl ScriptLine {
    /// 解析一行；空行和注释返回 `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        let parsed = match head.as_str() {
            "layer" => {
                let name = words.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    bail!("missing layer name in '{}'", line);
                }
                ScriptLine::Layer(name)
            }
            "crane" => ScriptLine::Crane {
                model: words
                    .next()
                    .ok_or_else(|| anyhow!("missing crane model in '{}'", line))?
                    .to_string(),
                at: point(words.next(), line)?,
                angle: number(words.next(), 60.0, line)?,
                extension: number(words.next(), 0.0, line)?,
            },
            "block" => ScriptLine::Block {
                name: words
                    .next()
                    .ok_or_else(|| anyhow!("missing block name in '{}'", line))?
                    .to_string(),
                at: point(words.next(), line)?,
                rotation: number(words.next(), 0.0, line)?,
            },
            "move" => ScriptLine::Move(point(words.next(), line)?),
            "click" | "pick" => ScriptLine::Click(point(words.next(), line)?),
            "enter" => ScriptLine::Enter,
            "esc" | "escape" => ScriptLine::Escape,
            _ => ScriptLine::Text(line.to_string()),
        };
        Ok(Some(parsed))
    }
}

/// 回放统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplaySummary {
    pub lines: usize,
    pub commits: usize,
    pub rejected: usize,
}

/// 回放器
pub struct Replayer<'a> {
    session: &'a mut EditorSession,
    library: BlockLibrary,
    /// 命令级错误是否中止回放
    strict: bool,
    summary: ReplaySummary,
}

impl<'a> Replayer<'a> {
    pub fn new(session: &'a mut EditorSession, strict: bool) -> Self {
        Self {
            session,
            library: BlockLibrary::with_builtins(),
            strict,
            summary: ReplaySummary::default(),
        }
    }

    pub fn run(mut self, script: &str) -> Result<ReplaySummary> {
        for (number, raw) in script.lines().enumerate() {
            let Some(line) = ScriptLine::parse(raw).with_context(|| format!("line {}", number + 1))? else {
                continue;
            };
            self.summary.lines += 1;
            if let Err(e) = self.apply(line) {
                if self.strict {
                    return Err(e.context(format!("line {}: {}", number + 1, raw.trim())));
                }
                warn!(line = number + 1, "{:#}", e);
                self.summary.rejected += 1;
            }
        }
        info!(
            lines = self.summary.lines,
            commits = self.summary.commits,
            rejected = self.summary.rejected,
            "replay finished"
        );
        Ok(self.summary)
    }

    fn apply(&mut self, line: ScriptLine) -> Result<()> {
        let event = match line {
            ScriptLine::Layer(name) => {
                let drawing = self.session.drawing_mut();
                let id = drawing.ensure_layer(&name);
                drawing.set_current_layer(id)?;
                debug!(layer = %name, "current layer");
                return Ok(());
            }
            ScriptLine::Crane {
                model,
                at,
                angle,
                extension,
            } => {
                let spec = find_model(&model).ok_or_else(|| anyhow!("unknown crane model '{}'", model))?;
                let layer = self.session.drawing().layers().current();
                let block = crane_block(&spec, Placement::at(at), BoomPose::new(angle, extension), layer)?;
                self.place(ElementKind::Block(block))?
            }
            ScriptLine::Block { name, at, rotation } => {
                let layer = self.session.drawing().layers().current();
                let block = self.library.instantiate(&name, Placement::at(at).rotated(rotation), layer)?;
                self.place(ElementKind::Block(block))?
            }
            ScriptLine::Move(p) => {
                self.session.pointer_move(p);
                return Ok(());
            }
            ScriptLine::Click(p) => self.session.click(p)?,
            ScriptLine::Enter => self.session.confirm()?,
            ScriptLine::Escape => self.session.cancel(),
            ScriptLine::Text(text) => self.session.execute_text(&text)?,
        };
        self.report(event);
        Ok(())
    }

    fn place(&mut self, kind: ElementKind) -> Result<SessionEvent> {
        let receipt = self
            .session
            .drawing_mut()
            .commit(ChangeSet::new().add(NewElement::new(kind)))?;
        Ok(SessionEvent::Committed(receipt))
    }

    fn report(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Committed(receipt) => {
                self.summary.commits += 1;
                debug!(added = receipt.added.len(), removed = receipt.removed.len(), "committed");
            }
            SessionEvent::Measured(m) => match serde_json::to_string(&m) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("cannot format measurement: {}", e),
            },
            SessionEvent::Help(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            SessionEvent::Prompt(prompt) => debug!(%prompt, "prompt"),
            other => debug!(?other, "event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcad_tools::config::SessionConfig;

    #[test]
    fn test_parse_lines() {
        assert_eq!(ScriptLine::parse("  # note").unwrap(), None);
        assert_eq!(
            ScriptLine::parse("click 1,2").unwrap(),
            Some(ScriptLine::Click(Point2::new(1.0, 2.0)))
        );
        assert_eq!(
            ScriptLine::parse("crane AT-50 0,0").unwrap(),
            Some(ScriptLine::Crane {
                model: "AT-50".to_string(),
                at: Point2::origin(),
                angle: 60.0,
                extension: 0.0,
            })
        );
        assert_eq!(
            ScriptLine::parse("zoom in").unwrap(),
            Some(ScriptLine::Text("zoom in".to_string()))
        );
        assert!(ScriptLine::parse("click nowhere").is_err());
    }

    #[test]
    fn test_replay_draws_and_mirrors() {
        let mut session = EditorSession::new(SessionConfig::default());
        let script = "\
layer site
line
0,0
4,0
enter
mirror
click 2,0
enter
0,0
0,4
";
        let summary = Replayer::new(&mut session, true).run(script).unwrap();
        assert_eq!(summary.commits, 2);
        assert_eq!(session.drawing().element_count(), 2);
        let site = session.drawing().layers().find_by_name("site").unwrap().id;
        assert!(session.drawing().elements().iter().all(|e| e.layer == site));
    }

    #[test]
    fn test_lenient_replay_counts_rejections() {
        let mut session = EditorSession::new(SessionConfig::default());
        let script = "explode\ncrane AT-50 0,0 45 0.5\nblock person 10,0\n";
        let summary = Replayer::new(&mut session, false).run(script).unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.commits, 2);

        let mut session = EditorSession::new(SessionConfig::default());
        assert!(Replayer::new(&mut session, true).run("explode").is_err());
    }
}
