//! End-to-end pipelines
//!
//! [`TrainingPipeline`] produces the preprocessor and model artifacts;
//! [`PredictPipeline`] consumes them.

mod predict_pipeline;
mod train_pipeline;

pub use predict_pipeline::PredictPipeline;
pub use train_pipeline::{PipelineState, TrainingPipeline};
