//! Scorecast - Main Entry Point
//!
//! Trains the exam-score model and serves single predictions from the command line.

use clap::Parser;
use scorecast::cli::{cmd_info, cmd_predict, cmd_train, Cli, Commands, PredictArgs};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "scorecast=debug" } else { "scorecast=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Train { artifacts_dir, data, test_size, seed, min_r2 } => {
            cmd_train(artifacts_dir.as_deref(), data.as_deref(), test_size, seed, min_r2)?;
        }
        Commands::Predict {
            artifacts_dir,
            gender,
            ethnicity,
            parental_level_of_education,
            lunch,
            test_preparation_course,
            reading_score,
            writing_score,
        } => {
            let args = PredictArgs {
                gender,
                ethnicity,
                parental_level_of_education,
                lunch,
                test_preparation_course,
                reading_score,
                writing_score,
            };
            cmd_predict(artifacts_dir.as_deref(), args)?;
        }
        Commands::Info { data } => {
            cmd_info(data.as_deref())?;
        }
    }

    Ok(())
}
