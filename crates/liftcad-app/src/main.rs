//! LiftCAD 命令行入口
//!
//! - `check`: 校核起重机能否在给定半径吊起载荷
//! - `replay`: 在新会话中回放命令脚本并输出导出快照
//! - `cranes`: 列出内置机型

mod script;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use liftcad_core::block_library::BlockLibrary;
use liftcad_core::crane::{self, check_lift, CraneSpec, LiftPlan};
use liftcad_core::input_parser::InputParser;
use liftcad_core::math::Point2;
use liftcad_file::{import_records, DocumentMetadata, DrawingSnapshot, ImportBatch, LiftDocument};
use liftcad_tools::config::SessionConfig;
use liftcad_tools::state::EditorSession;

use crate::script::Replayer;

#[derive(Debug, Parser)]
#[command(name = "liftcad", version, about = "Lift planning drawing core")]
struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check whether a crane can make a lift
    Check {
        /// Catalog model name or path to a crane spec JSON file
        #[arg(long)]
        crane: String,
        /// Load weight in kg
        #[arg(long)]
        weight: f64,
        /// Rigging weight in kg, added to the hook load
        #[arg(long, default_value_t = 0.0)]
        rigging: f64,
        /// Slew centre as x,y
        #[arg(long, value_parser = parse_point)]
        base: Point2,
        /// Load position as x,y
        #[arg(long, value_parser = parse_point)]
        load: Point2,
    },
    /// Replay a command script against a fresh session
    Replay {
        script: PathBuf,
        /// Session configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Logical element batch imported before the script runs
        #[arg(long)]
        import: Option<PathBuf>,
        /// Write the export snapshot here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Save the resulting drawing as a .lift file
        #[arg(long)]
        save: Option<PathBuf>,
        /// Stop at the first rejected line
        #[arg(long)]
        strict: bool,
    },
    /// List the built-in crane models
    Cranes,
}

fn parse_point(s: &str) -> Result<Point2, String> {
    InputParser::parse_point(s, None).map_err(|e| e.to_string())
}

fn load_crane(name_or_path: &str) -> Result<CraneSpec> {
    if let Some(spec) = crane::find_model(name_or_path) {
        return Ok(spec);
    }
    let json = std::fs::read_to_string(name_or_path)
        .with_context(|| format!("'{}' is neither a catalog model nor a readable file", name_or_path))?;
    Ok(CraneSpec::from_json(&json)?)
}

fn check(crane: &str, weight: f64, rigging: f64, base: Point2, load: Point2) -> Result<ExitCode> {
    let spec = load_crane(crane)?;
    let plan = LiftPlan {
        load_weight: weight,
        rigging_weight: rigging,
        crane_base: base,
        load_position: load,
    };
    let result = check_lift(&spec, &plan);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.can_lift {
        info!(model = %spec.model, utilisation = result.utilisation, "lift is within capacity");
        Ok(ExitCode::SUCCESS)
    } else {
        info!(model = %spec.model, shortfall = result.shortfall, "lift exceeds capacity");
        Ok(ExitCode::FAILURE)
    }
}

fn replay(
    script: &Path,
    config: Option<&Path>,
    import: Option<&Path>,
    out: Option<&Path>,
    save: Option<&Path>,
    strict: bool,
) -> Result<ExitCode> {
    let config = match config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let mut session = EditorSession::new(config);

    if let Some(path) = import {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let batch = ImportBatch::from_json(&json)?;
        let report = import_records(session.drawing_mut(), &batch, &BlockLibrary::with_builtins())?;
        report.ensure_complete()?;
        info!(imported = report.imported, skipped = report.skipped_count(), "imported {}", path.display());
    }

    let text = std::fs::read_to_string(script).with_context(|| format!("reading {}", script.display()))?;
    let summary = Replayer::new(&mut session, strict).run(&text)?;

    let snapshot = DrawingSnapshot::capture(&session).to_json()?;
    match out {
        Some(path) => std::fs::write(path, snapshot).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", snapshot),
    }

    if let Some(path) = save {
        let title = script
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let document = LiftDocument::from_session(&session, DocumentMetadata::new(title));
        liftcad_file::save(&document, path)?;
    }

    Ok(if summary.rejected == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cranes() -> Result<ExitCode> {
    for spec in crane::catalog() {
        println!(
            "{:<10} max {:>8.0} kg  radius {:>5.1} m",
            spec.model, spec.max_capacity, spec.max_radius
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 初始化日志，输出到 stderr，stdout 留给结果
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    match cli.command {
        Commands::Check {
            crane,
            weight,
            rigging,
            base,
            load,
        } => check(&crane, weight, rigging, base, load),
        Commands::Replay {
            script,
            config,
            import,
            out,
            save,
            strict,
        } => replay(
            &script,
            config.as_deref(),
            import.as_deref(),
            out.as_deref(),
            save.as_deref(),
            strict,
        ),
        Commands::Cranes => cranes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::try_parse_from([
            "liftcad", "check", "--crane", "AT-50", "--weight", "5000", "--base", "0,0", "--load", "12,5",
        ])
        .unwrap();
        match cli.command {
            Commands::Check { load, rigging, .. } => {
                assert_eq!(load, Point2::new(12.0, 5.0));
                assert_eq!(rigging, 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["liftcad", "check", "--crane", "AT-50", "--weight", "1", "--base", "x", "--load", "1,1"]).is_err());
    }

    #[test]
    fn test_check_exit_code() {
        let code = check("AT-50", 500.0, 0.0, Point2::origin(), Point2::new(5.0, 0.0)).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        let code = check("AT-50", 500_000.0, 0.0, Point2::origin(), Point2::new(5.0, 0.0)).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(check("nope", 1.0, 0.0, Point2::origin(), Point2::origin()).is_err());
    }
}
