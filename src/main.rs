//! Kessler - Main Entry Point
//!
//! CLI for preparing and evaluating conjunction event datasets.

use clap::Parser;
use kessler::cli::{cmd_evaluate, cmd_filter, cmd_info, cmd_prepare, cmd_threshold, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kessler=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
        Commands::Filter { data, output } => {
            cmd_filter(&data, &output)?;
        }
        Commands::Prepare {
            data,
            output,
            filter,
            split_ratio,
            seed,
            columns,
        } => {
            cmd_prepare(&data, &output, filter, split_ratio, seed, columns.as_deref())?;
        }
        Commands::Threshold {
            data,
            true_col,
            pred_col,
        } => {
            cmd_threshold(&data, &true_col, &pred_col)?;
        }
        Commands::Evaluate {
            data,
            true_col,
            pred_col,
            beta,
            threshold,
        } => {
            cmd_evaluate(&data, &true_col, &pred_col, beta, threshold)?;
        }
    }

    Ok(())
}
