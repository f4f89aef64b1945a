//! Scorecast CLI Module
//!
//! Command-line interface for training, prediction, and dataset inspection.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::pipeline::{PredictPipeline, TrainingPipeline};
use crate::schema::StudentRecord;
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("  {} {}", ok("✓"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "scorecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve an exam-score regression model")]
#[command(long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run ingestion, transformation and model selection
    Train {
        /// Storage root for all artifacts
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,

        /// Raw dataset (CSV with header)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Fraction of rows held out for testing
        #[arg(long)]
        test_size: Option<f64>,

        /// Seed for the split and the seeded models
        #[arg(long)]
        seed: Option<u64>,

        /// Minimum test R² the selected model must reach
        #[arg(long)]
        min_r2: Option<f64>,
    },

    /// Predict one student's math score from persisted artifacts
    Predict {
        /// Storage root holding preprocessor.json and model.json
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,

        #[arg(long)]
        gender: String,

        #[arg(long)]
        ethnicity: String,

        #[arg(long)]
        parental_level_of_education: String,

        #[arg(long)]
        lunch: String,

        #[arg(long)]
        test_preparation_course: String,

        #[arg(long)]
        reading_score: f64,

        #[arg(long)]
        writing_score: f64,
    },

    /// Show dataset information
    Info {
        /// Input data file (defaults to the configured raw dataset)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

/// Single-record fields accepted by `predict`
pub struct PredictArgs {
    pub gender: String,
    pub ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: f64,
    pub writing_score: f64,
}

fn base_config(artifacts_dir: Option<&Path>) -> PipelineConfig {
    let config = PipelineConfig::from_env();
    match artifacts_dir {
        Some(dir) => config.with_artifacts_dir(dir),
        None => config,
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    artifacts_dir: Option<&Path>,
    data: Option<&Path>,
    test_size: Option<f64>,
    seed: Option<u64>,
    min_r2: Option<f64>,
) -> anyhow::Result<()> {
    let mut config = base_config(artifacts_dir);
    if let Some(path) = data {
        config = config.with_raw_data_path(path);
    }
    if let Some(test_size) = test_size {
        config = config.with_test_size(test_size);
    }
    if let Some(seed) = seed {
        config = config.with_random_state(seed);
    }
    if let Some(min_r2) = min_r2 {
        config = config.with_min_r2(min_r2);
    }

    section("Train");
    println!("  {:<12} {}", muted("Data"), config.raw_data_path.display());
    println!("  {:<12} {}", muted("Artifacts"), config.artifacts.root.display());
    println!();

    step_run(&format!("Evaluating {} candidates", config.candidates.len()));
    let start = Instant::now();
    let mut pipeline = TrainingPipeline::new(config);
    let r2 = pipeline.initiate_train_pipeline()?;
    step_done(&format!("{:.2?}", start.elapsed()));

    if let Some(outcome) = pipeline.outcome() {
        println!();
        println!(
            "  {:<26} {:>8} {:>8} {:>8} {:>8}",
            muted("Model"),
            muted("R²"),
            muted("RMSE"),
            muted("MAE"),
            muted("Fit")
        );
        println!("  {}", dim(&"─".repeat(62)));
        for report in &outcome.reports {
            let line = format!(
                "  {:<26} {:>8.4} {:>8.3} {:>8.3} {:>7.2}s",
                report.model_name, report.r2, report.rmse, report.mae, report.training_time_secs
            );
            if report.model == outcome.best.model {
                println!("{}", line.white().bold());
            } else {
                println!("{line}");
            }
        }
        println!("  {}", dim(&"─".repeat(62)));

        println!();
        line_box_top();
        line_box_empty();
        line_box_center(&format!("{}", "Training complete".white().bold()));
        line_box_empty();
        line_box_sep();
        line_box_empty();
        line_box(&kv("Model  ", &outcome.best.model_name));
        line_box(&kv("R²     ", &format!("{r2:.4}")));
        line_box(&kv("RMSE   ", &format!("{:.3}", outcome.best.rmse)));
        line_box(&kv("Saved  ", &outcome.model_path.display().to_string()));
        line_box_empty();
        line_box_bottom();
    }

    println!();
    Ok(())
}

pub fn cmd_predict(artifacts_dir: Option<&Path>, args: PredictArgs) -> anyhow::Result<()> {
    let config = base_config(artifacts_dir);

    let record = StudentRecord::new(
        args.gender,
        args.ethnicity,
        args.parental_level_of_education,
        args.lunch,
        args.test_preparation_course,
        args.reading_score,
        args.writing_score,
    )?;

    section("Predict");
    let pipeline = PredictPipeline::load(&config.artifacts)?;
    let predictions = pipeline.predict(std::slice::from_ref(&record))?;
    let score = predictions
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("model returned no prediction"))?;

    println!("  {:<16} {}", muted("Model"), pipeline.model_name());
    println!("  {:<16} {:.4}", muted("Test R²"), pipeline.model_r2());
    println!("  {:<16} {}", muted("Math score"), format!("{score:.2}").white().bold());
    println!();
    Ok(())
}

pub fn cmd_info(data: Option<&Path>) -> anyhow::Result<()> {
    let path = match data {
        Some(path) => path.to_path_buf(),
        None => PipelineConfig::from_env().raw_data_path,
    };

    section("Data Info");

    let info = DataLoader::new().get_file_info(&path)?;

    println!("  {:<12} {}", muted("File"), info.path.display());
    println!("  {:<12} {}", muted("Rows"), info.n_rows);
    println!("  {:<12} {}", muted("Columns"), info.columns.len());
    println!("  {:<12} {:.2} KB", muted("Size"), info.file_size as f64 / 1024.0);
    println!();

    println!("  {:<30} {:<10} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(58)));

    for col in &info.columns {
        println!(
            "  {:<30} {:<10} {:>6} {:>8}",
            col.name,
            col.dtype.truecolor(140, 140, 140),
            col.null_count,
            col.n_unique
        );
    }

    println!();
    Ok(())
}
