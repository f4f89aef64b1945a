//! Integration tests: data ingestion stage

mod common;

use polars::prelude::*;
use scorecast::config::PipelineConfig;
use scorecast::error::DataIngestionError;
use scorecast::ingestion::{test_row_count, train_test_split, DataIngestion};
use scorecast::utils::DataLoader;
use tempfile::TempDir;

fn ingest(dir: &TempDir, seed: u64) -> (DataFrame, DataFrame) {
    let raw = common::write_csv(dir.path(), "stud.csv", &common::students(1000, 7));
    let config = PipelineConfig::new()
        .with_raw_data_path(raw)
        .with_artifacts_dir(dir.path().join("artifacts"))
        .with_random_state(seed);

    let artifacts = DataIngestion::new(&config).initiate_data_ingestion().unwrap();
    let loader = DataLoader::new();
    (
        loader.load_csv(&artifacts.train_path).unwrap(),
        loader.load_csv(&artifacts.test_path).unwrap(),
    )
}

fn math_scores(df: &DataFrame) -> Vec<i64> {
    let mut scores: Vec<i64> = df
        .column("math_score")
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    scores.sort_unstable();
    scores
}

#[test]
fn test_thousand_rows_split_800_200() {
    let dir = TempDir::new().unwrap();
    let (train, test) = ingest(&dir, 42);

    assert_eq!(train.height(), 800);
    assert_eq!(test.height(), 200);
    assert_eq!(train.get_column_names(), test.get_column_names());

    let artifacts = dir.path().join("artifacts");
    assert!(artifacts.join("data.csv").is_file());
    assert!(artifacts.join("train.csv").is_file());
    assert!(artifacts.join("test.csv").is_file());
}

#[test]
fn test_splits_partition_the_raw_rows() {
    let dir = TempDir::new().unwrap();
    let (train, test) = ingest(&dir, 42);

    let raw = DataLoader::new()
        .load_csv(&dir.path().join("artifacts").join("data.csv"))
        .unwrap();
    let mut combined = math_scores(&train);
    combined.extend(math_scores(&test));
    combined.sort_unstable();

    assert_eq!(combined, math_scores(&raw));
}

#[test]
fn test_same_seed_same_split() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let (train_a, test_a) = ingest(&first, 42);
    let (train_b, test_b) = ingest(&second, 42);

    assert!(train_a.equals(&train_b));
    assert!(test_a.equals(&test_b));
}

#[test]
fn test_different_seed_different_split() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let (_, test_a) = ingest(&first, 42);
    let (_, test_b) = ingest(&second, 43);

    assert!(!test_a.equals(&test_b));
}

#[test]
fn test_split_helpers() {
    assert_eq!(test_row_count(1000, 0.2), 200);
    assert_eq!(test_row_count(2, 0.2), 1);

    let df = common::students(10, 1);
    let (train, test) = train_test_split(&df, 0.3, 5).unwrap();
    assert_eq!((train.height(), test.height()), (7, 3));
}

#[test]
fn test_header_only_source_is_malformed() {
    let dir = TempDir::new().unwrap();
    let raw = common::write_csv(dir.path(), "empty.csv", &common::students(0, 1));
    let config = PipelineConfig::new()
        .with_raw_data_path(raw)
        .with_artifacts_dir(dir.path().join("artifacts"));

    let err = DataIngestion::new(&config).initiate_data_ingestion().unwrap_err();
    assert!(
        matches!(err, DataIngestionError::Malformed(_) | DataIngestionError::SourceUnreadable { .. }),
        "unexpected error: {err}"
    );
    assert!(!dir.path().join("artifacts").join("train.csv").exists());
}
