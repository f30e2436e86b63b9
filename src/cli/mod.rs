//! Kessler CLI
//!
//! Command-line interface for inspecting, filtering, preparing, and
//! evaluating conjunction datasets.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::data::{save_csv, CdmLoader, ConjunctionDataset, DatasetConfig};
use crate::error::KesslerError;
use crate::events::filter_events;
use crate::metrics::{
    evaluate_risk, find_best_threshold, RiskDistribution, DEFAULT_BETA, DEFAULT_RISK_THRESHOLD,
};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_run(msg: &str) {
    print!("  {} {}... ", "›".truecolor(120, 170, 255), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kessler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Conjunction data message preparation and evaluation pipeline")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show dataset information
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Filter CDM records down to supervised-learning-eligible events
    Filter {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Assemble a train/validation split (clean, filter, encode, scale)
    Prepare {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory for train.csv / val.csv
        #[arg(short, long)]
        output: PathBuf,

        /// Apply the event eligibility filter
        #[arg(long)]
        filter: bool,

        /// Fraction of rows held out for validation
        #[arg(long, default_value = "0.2")]
        split_ratio: f64,

        /// Seed for the split shuffle
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Comma-separated feature columns (default: all)
        #[arg(long)]
        columns: Option<String>,
    },

    /// Search the best decision threshold for binary risk predictions
    Threshold {
        /// CSV file with true labels and predicted scores
        #[arg(short, long)]
        data: PathBuf,

        /// Column with binary {0,1} ground truth
        #[arg(long, default_value = "label")]
        true_col: String,

        /// Column with predicted probabilities in [0, 1]
        #[arg(long, default_value = "prediction")]
        pred_col: String,
    },

    /// Evaluate continuous risk predictions (F-beta, high-risk MSE, composite)
    Evaluate {
        /// CSV file with true and predicted risk values
        #[arg(short, long)]
        data: PathBuf,

        /// Column with true log-scale risk
        #[arg(long, default_value = "risk")]
        true_col: String,

        /// Column with predicted log-scale risk
        #[arg(long, default_value = "predicted_risk")]
        pred_col: String,

        /// F-beta weighting
        #[arg(long, default_value_t = DEFAULT_BETA)]
        beta: f64,

        /// Binarization threshold on the raw risk scale
        #[arg(long, default_value_t = DEFAULT_RISK_THRESHOLD, allow_hyphen_values = true)]
        threshold: f64,
    },
}

// ─── Helpers ───────────────────────────────────────────────────────────────────

fn column_values(df: &DataFrame, name: &str) -> crate::Result<Vec<f64>> {
    let series = df
        .column(name)
        .map_err(|_| KesslerError::MissingColumn(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| KesslerError::DataError(e.to_string()))?;
    let ca = series
        .f64()
        .map_err(|e| KesslerError::DataError(e.to_string()))?;

    ca.into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| {
                KesslerError::DataError(format!("null value in column '{name}' at row {i}"))
            })
        })
        .collect()
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Data Info");

    let df = CdmLoader::new().load_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!(
        "  {:<12} {:.2} MB",
        muted("Memory"),
        df.estimated_size() as f64 / 1024.0 / 1024.0
    );
    println!();

    println!(
        "  {:<20} {:<12} {:>6} {:>8}",
        muted("Column"),
        muted("Type"),
        muted("Nulls"),
        muted("Unique")
    );
    println!("  {}", dim(&"─".repeat(50)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}

pub fn cmd_filter(data_path: &PathBuf, output_path: &PathBuf) -> anyhow::Result<()> {
    section("Filter");

    step_run("Loading data");
    let start = Instant::now();
    let df = CdmLoader::new().load_csv(data_path)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        df.height(),
        df.width(),
        start.elapsed()
    ));

    step_run("Filtering events");
    let start = Instant::now();
    let filtered = filter_events(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<16} {}", muted("Raw CDMs"), df.height());
    println!(
        "  {:<16} {}",
        muted("Eligible events"),
        format!("{}", filtered.height()).white().bold()
    );

    step_run(&format!("Saving → {}", output_path.display()));
    save_csv(&mut filtered.clone(), output_path)?;
    step_done(&format!("{} rows", filtered.height()));

    println!();
    Ok(())
}

pub fn cmd_prepare(
    data_path: &PathBuf,
    output_dir: &PathBuf,
    filter: bool,
    split_ratio: f64,
    seed: u64,
    columns: Option<&str>,
) -> anyhow::Result<()> {
    section("Prepare");

    let config = DatasetConfig {
        selected_columns: columns.map(|c| {
            c.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        }),
        apply_filter: filter,
        split_ratio,
        random_state: seed,
    };

    step_run("Assembling dataset");
    let start = Instant::now();
    let dataset = ConjunctionDataset::from_csv(data_path, &config)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!(
        "  {:<16} {}",
        muted("Train rows"),
        dataset.train_features().nrows()
    );
    println!(
        "  {:<16} {}",
        muted("Val rows"),
        dataset.val_features().nrows()
    );
    println!(
        "  {:<16} {}",
        muted("Features"),
        dataset.feature_names().len()
    );

    std::fs::create_dir_all(output_dir)?;
    let train_path = output_dir.join("train.csv");
    let val_path = output_dir.join("val.csv");

    step_run(&format!("Saving → {}", train_path.display()));
    save_csv(&mut dataset.train_frame()?, &train_path)?;
    step_done("");

    step_run(&format!("Saving → {}", val_path.display()));
    save_csv(&mut dataset.val_frame()?, &val_path)?;
    step_done("");

    println!();
    Ok(())
}

pub fn cmd_threshold(data_path: &PathBuf, true_col: &str, pred_col: &str) -> anyhow::Result<()> {
    section("Threshold Search");

    step_run("Loading predictions");
    let df = CdmLoader::new().load_csv(data_path)?;
    let y_true = column_values(&df, true_col)?;
    let predictions = column_values(&df, pred_col)?;
    step_done(&format!("{} rows", y_true.len()));

    let distribution = RiskDistribution::from_risk(&y_true, None);
    println!();
    println!("  {:<16} {}", muted("High risk"), distribution.high_risk);
    println!("  {:<16} {}", muted("Low risk"), distribution.low_risk);
    if let Some(percent) = distribution.percent_high() {
        println!("  {:<16} {:.2}%", muted("Percent high"), percent);
    }

    step_run("Scanning thresholds");
    let start = Instant::now();
    let (threshold, score) = find_best_threshold(&y_true, &predictions);
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!(
        "  {:<16} {}",
        muted("Best threshold"),
        format!("{threshold:.4}").white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("F2 score"),
        format!("{score:.4}").white().bold()
    );
    println!();
    Ok(())
}

pub fn cmd_evaluate(
    data_path: &PathBuf,
    true_col: &str,
    pred_col: &str,
    beta: f64,
    threshold: f64,
) -> anyhow::Result<()> {
    section("Evaluate");

    step_run("Loading predictions");
    let df = CdmLoader::new().load_csv(data_path)?;
    let y_true = column_values(&df, true_col)?;
    let y_pred = column_values(&df, pred_col)?;
    step_done(&format!("{} rows", y_true.len()));

    let distribution = RiskDistribution::from_risk(&y_true, Some(threshold));
    println!();
    println!("  {:<16} {}", muted("High risk"), distribution.high_risk);
    println!("  {:<16} {}", muted("Low risk"), distribution.low_risk);
    if let Some(percent) = distribution.percent_high() {
        println!("  {:<16} {:.2}%", muted("Percent high"), percent);
    }

    let evaluation = evaluate_risk(&y_true, &y_pred, beta, threshold)?;

    println!();
    println!(
        "  {:<16} {}",
        muted(&format!("F{beta:.0} score")),
        format!("{:.4}", evaluation.f_beta).white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("High-risk MSE"),
        format!("{:.4}", evaluation.mse_high_risk).white()
    );
    println!(
        "  {:<16} {}",
        muted("Composite"),
        format!("{:.4}", evaluation.composite).white().bold()
    );
    println!("  {}", dim("composite = high-risk MSE / F-beta, lower is better"));
    println!();
    Ok(())
}
