//! Integration test: Full pipeline (ingest → transform → train → predict)

mod common;

use scorecast::config::PipelineConfig;
use scorecast::error::{
    DataTransformationError, ModelTrainerError, PipelineStage, ScorecastError, StageError,
};
use scorecast::pipeline::{PipelineState, PredictPipeline, TrainingPipeline};
use scorecast::schema::StudentRecord;
use scorecast::training::CandidateModel;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config_for(dir: &Path, raw: &Path) -> PipelineConfig {
    PipelineConfig::new()
        .with_raw_data_path(raw)
        .with_artifacts_dir(dir.join("artifacts"))
}

fn quick_candidates() -> Vec<CandidateModel> {
    vec![
        CandidateModel::LinearRegression,
        CandidateModel::Ridge,
        CandidateModel::DecisionTree,
    ]
}

#[test]
fn test_full_training_pipeline() {
    let dir = TempDir::new().unwrap();
    let raw = common::write_csv(dir.path(), "stud.csv", &common::students(1000, 42));
    let config = config_for(dir.path(), &raw);
    let artifacts = config.artifacts.clone();

    let mut pipeline = TrainingPipeline::new(config);
    assert_eq!(pipeline.state(), PipelineState::Idle);

    let r2 = pipeline.initiate_train_pipeline().unwrap();

    assert_eq!(pipeline.state(), PipelineState::Done);
    assert!((0.0..=1.0).contains(&r2), "R² {r2}");
    assert!(r2 >= 0.6);

    let outcome = pipeline.outcome().unwrap();
    assert_eq!(outcome.reports.len(), CandidateModel::all().len());
    assert_eq!(outcome.r2(), r2);

    for path in [
        &artifacts.raw_data,
        &artifacts.train_data,
        &artifacts.test_data,
        &artifacts.preprocessor,
        &artifacts.model,
    ] {
        assert!(path.is_file(), "{} should exist", path.display());
    }

    // The two persisted artifacts are jointly usable
    let predictor = PredictPipeline::load(&artifacts).unwrap();
    assert_eq!(predictor.preprocessor().n_features_out(), common::FEATURE_WIDTH);

    let strong = StudentRecord::new("male", "group C", "master's degree", "standard", "completed", 95.0, 93.0)
        .unwrap();
    let weak = StudentRecord::new("female", "group A", "some high school", "free/reduced", "none", 35.0, 38.0)
        .unwrap();
    let predictions = predictor.predict(&[strong, weak]).unwrap();
    assert!(predictions[0] > predictions[1]);
}

#[test]
fn test_pipeline_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let raw = common::write_csv(dir.path(), "stud.csv", &common::students(400, 5));
    let config = config_for(dir.path(), &raw).with_candidates(quick_candidates());

    let mut first = TrainingPipeline::new(config.clone());
    let r2_first = first.initiate_train_pipeline().unwrap();
    let train_first = fs::read(&config.artifacts.train_data).unwrap();
    let model_first = fs::read(&config.artifacts.model).unwrap();

    let mut second = TrainingPipeline::new(config.clone());
    let r2_second = second.initiate_train_pipeline().unwrap();

    assert_eq!(r2_first, r2_second);
    assert_eq!(train_first, fs::read(&config.artifacts.train_data).unwrap());
    assert_eq!(model_first, fs::read(&config.artifacts.model).unwrap());
}

#[test]
fn test_missing_target_fails_in_transformation() {
    let dir = TempDir::new().unwrap();
    let df = common::students(100, 3).drop("math_score").unwrap();
    let raw = common::write_csv(dir.path(), "stud.csv", &df);
    let config = config_for(dir.path(), &raw);
    let artifacts = config.artifacts.clone();

    let mut pipeline = TrainingPipeline::new(config);
    let err = pipeline.initiate_train_pipeline().unwrap_err();

    assert_eq!(err.stage, PipelineStage::Transformation);
    assert!(matches!(
        &err.source,
        StageError::Transformation(DataTransformationError::MissingColumn(c)) if c == "math_score"
    ));
    assert!(err.to_string().contains("data transformation"));
    assert!(err.to_string().contains("math_score"));
    assert_eq!(pipeline.state(), PipelineState::Failed);

    // Ingestion already ran and its outputs stay; nothing later was written
    assert!(artifacts.train_data.is_file());
    assert!(!artifacts.preprocessor.exists());
    assert!(!artifacts.model.exists());
}

#[test]
fn test_random_target_keeps_previous_model() {
    let dir = TempDir::new().unwrap();
    let good = common::write_csv(dir.path(), "good.csv", &common::students(400, 6));
    let noise = common::write_csv(
        dir.path(),
        "noise.csv",
        &common::students_with_random_target(400, 6),
    );

    let good_config = config_for(dir.path(), &good).with_candidates(quick_candidates());
    TrainingPipeline::new(good_config.clone())
        .initiate_train_pipeline()
        .unwrap();
    let model_before = fs::read(&good_config.artifacts.model).unwrap();

    let noise_config = config_for(dir.path(), &noise).with_candidates(quick_candidates());
    let mut pipeline = TrainingPipeline::new(noise_config);
    let err = pipeline.initiate_train_pipeline().unwrap_err();

    assert_eq!(err.stage, PipelineStage::Training);
    assert!(matches!(
        err.source,
        StageError::Training(ModelTrainerError::BelowThreshold { .. })
    ));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert!(pipeline.outcome().is_none());
    assert_eq!(model_before, fs::read(&good_config.artifacts.model).unwrap());
}

#[test]
fn test_failed_run_does_not_serve_mixed_artifacts() {
    let dir = TempDir::new().unwrap();
    let good = common::write_csv(dir.path(), "good.csv", &common::students(400, 6));
    let noise = common::write_csv(
        dir.path(),
        "noise.csv",
        &common::students_with_random_target(400, 99),
    );
    let record = StudentRecord::new("female", "group B", "some college", "standard", "none", 72.0, 74.0)
        .unwrap();

    let good_config = config_for(dir.path(), &good).with_candidates(quick_candidates());
    let artifacts = good_config.artifacts.clone();
    TrainingPipeline::new(good_config.clone())
        .initiate_train_pipeline()
        .unwrap();
    let served = PredictPipeline::load(&artifacts)
        .unwrap()
        .predict(std::slice::from_ref(&record))
        .unwrap();
    assert!(served[0].is_finite());

    // Transformation rewrites the preprocessor, then training rejects every candidate
    let noise_config = config_for(dir.path(), &noise).with_candidates(quick_candidates());
    let err = TrainingPipeline::new(noise_config)
        .initiate_train_pipeline()
        .unwrap_err();
    assert_eq!(err.stage, PipelineStage::Training);

    match PredictPipeline::load(&artifacts) {
        Err(ScorecastError::ValidationError(msg)) => {
            assert!(msg.contains("not trained behind the current preprocessor"), "{msg}")
        }
        Ok(_) => panic!("preprocessor and model from different runs were accepted"),
        Err(other) => panic!("unexpected error: {other}"),
    }

    // A successful run restores a consistent pair with the original prediction
    TrainingPipeline::new(good_config)
        .initiate_train_pipeline()
        .unwrap();
    let restored = PredictPipeline::load(&artifacts)
        .unwrap()
        .predict(std::slice::from_ref(&record))
        .unwrap();
    assert_eq!(served, restored);
}

#[test]
fn test_unreadable_source_fails_in_ingestion() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path(), &dir.path().join("absent.csv"));

    let err = TrainingPipeline::new(config).initiate_train_pipeline().unwrap_err();
    assert_eq!(err.stage, PipelineStage::Ingestion);
    assert!(err.to_string().contains("absent.csv"));
}
