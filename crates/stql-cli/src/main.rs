//! `stqlmon` entrypoint: reads a perception frame stream, builds a
//! demonstration STQL formula, drives an [`stql_monitor::OnlineMonitor`]
//! over it, and prints one verdict per frame.

mod formulas;
mod frames_io;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stql_monitor::OnlineMonitor;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stqlmon", version, about = "STQL online monitor")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a formula against a recorded frame stream.
    Run {
        /// Newline-delimited JSON frame file.
        #[arg(long)]
        frames: PathBuf,
        /// Optional TOML config file (default: `stqlmon.toml` if present).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Frame rate override (frames per second).
        #[arg(long)]
        fps: Option<f64>,
        /// Demonstration formula name override.
        #[arg(long)]
        formula: Option<String>,
    },
}

fn configure_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Run {
            frames,
            config,
            fps,
            formula,
        } => run(frames, config, fps, formula),
    }
}

fn run(
    frames_path: PathBuf,
    config_path: Option<PathBuf>,
    fps_override: Option<f64>,
    formula_override: Option<String>,
) -> Result<()> {
    let config = stql_config::load_from(config_path)?;
    let config = stql_config::apply_overrides(config, fps_override, formula_override, None);
    configure_logging(&config.log_level);

    info!(target: "cli", fps = config.fps, formula = %config.formula, "starting stqlmon run");

    let expr = formulas::by_name(&config.formula)
        .with_context(|| format!("building formula '{}'", config.formula))?;
    let requirements = stql_analyze::compute_requirements(&expr, config.fps)?;
    println!(
        "formula: {} (history={}, horizon={})",
        stql_ast::to_display_string(&expr),
        requirements.history,
        requirements.horizon
    );

    let mut monitor = OnlineMonitor::new(expr, config.fps)
        .with_context(|| format!("formula '{}' is not monitorable", config.formula))?;

    let frames = frames_io::read_jsonl(&frames_path)?;
    for frame in frames {
        let frame_num = frame.frame_num;
        let verdict = monitor.evaluate(frame)?;
        println!("frame {frame_num}: {verdict}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_frames(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn run_next_car_over_two_frames() {
        let frames = write_frames(&[
            r#"{"frame_num":0,"timestamp":0.0,"size_x":100,"size_y":100,"objects":{}}"#,
            r#"{"frame_num":1,"timestamp":1.0,"size_x":100,"size_y":100,"objects":{"car":{"object_class":1,"probability":0.9,"bbox":{"xmin":0.0,"xmax":1.0,"ymin":0.0,"ymax":1.0}}}}"#,
        ]);
        let result = run(
            frames.path().to_path_buf(),
            None,
            Some(1.0),
            Some("next_car".to_string()),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn run_rejects_unknown_formula() {
        let frames = write_frames(&[
            r#"{"frame_num":0,"timestamp":0.0,"size_x":100,"size_y":100,"objects":{}}"#,
        ]);
        let result = run(
            frames.path().to_path_buf(),
            None,
            Some(1.0),
            Some("bogus".to_string()),
        );
        assert!(result.is_err());
    }
}
