//! Fixed dataset schema and the typed single-record input

use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const GENDER: &str = "gender";
pub const RACE_ETHNICITY: &str = "race_ethnicity";
pub const PARENTAL_EDUCATION: &str = "parental_level_of_education";
pub const LUNCH: &str = "lunch";
pub const TEST_PREPARATION: &str = "test_preparation_course";
pub const READING_SCORE: &str = "reading_score";
pub const WRITING_SCORE: &str = "writing_score";

/// Column predicted by the model
pub const TARGET_COLUMN: &str = "math_score";

/// Categorical feature columns, in encoding order
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    GENDER,
    RACE_ETHNICITY,
    PARENTAL_EDUCATION,
    LUNCH,
    TEST_PREPARATION,
];

/// Numeric feature columns, in encoding order
pub const NUMERIC_COLUMNS: [&str; 2] = [READING_SCORE, WRITING_SCORE];

const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// All feature columns (numeric first, as they appear in transformed output)
pub fn feature_columns() -> Vec<&'static str> {
    NUMERIC_COLUMNS
        .iter()
        .chain(CATEGORICAL_COLUMNS.iter())
        .copied()
        .collect()
}

/// Every column a raw dataset must contain
pub fn dataset_columns() -> Vec<&'static str> {
    let mut cols = feature_columns();
    cols.push(TARGET_COLUMN);
    cols
}

/// One student's attributes, as submitted for a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub gender: String,
    pub ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: f64,
    pub writing_score: f64,
}

impl StudentRecord {
    /// Build a validated record.
    ///
    /// Every categorical field must be non-blank and both scores must be
    /// finite values in `[0, 100]`. All problems are reported at once.
    pub fn new(
        gender: impl Into<String>,
        ethnicity: impl Into<String>,
        parental_level_of_education: impl Into<String>,
        lunch: impl Into<String>,
        test_preparation_course: impl Into<String>,
        reading_score: f64,
        writing_score: f64,
    ) -> Result<Self> {
        let record = Self {
            gender: gender.into().trim().to_string(),
            ethnicity: ethnicity.into().trim().to_string(),
            parental_level_of_education: parental_level_of_education.into().trim().to_string(),
            lunch: lunch.into().trim().to_string(),
            test_preparation_course: test_preparation_course.into().trim().to_string(),
            reading_score,
            writing_score,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the record's fields, collecting every violation.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let categorical = [
            (GENDER, &self.gender),
            (RACE_ETHNICITY, &self.ethnicity),
            (PARENTAL_EDUCATION, &self.parental_level_of_education),
            (LUNCH, &self.lunch),
            (TEST_PREPARATION, &self.test_preparation_course),
        ];
        for (name, value) in categorical {
            if value.trim().is_empty() {
                errors.push(format!("missing required field: {name}"));
            }
        }

        for (name, value) in [(READING_SCORE, self.reading_score), (WRITING_SCORE, self.writing_score)] {
            if !value.is_finite() || !SCORE_RANGE.contains(&value) {
                errors.push(format!("{name} must be between 0 and 100, got {value}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScorecastError::ValidationError(errors.join("; ")))
        }
    }

    /// Build a feature frame (schema column names, no target) from records.
    pub fn to_frame(records: &[StudentRecord]) -> Result<DataFrame> {
        let n = records.len();
        let mut gender = Vec::with_capacity(n);
        let mut ethnicity = Vec::with_capacity(n);
        let mut education = Vec::with_capacity(n);
        let mut lunch = Vec::with_capacity(n);
        let mut preparation = Vec::with_capacity(n);
        let mut reading = Vec::with_capacity(n);
        let mut writing = Vec::with_capacity(n);

        for r in records {
            gender.push(r.gender.as_str());
            ethnicity.push(r.ethnicity.as_str());
            education.push(r.parental_level_of_education.as_str());
            lunch.push(r.lunch.as_str());
            preparation.push(r.test_preparation_course.as_str());
            reading.push(r.reading_score);
            writing.push(r.writing_score);
        }

        let df = DataFrame::new(vec![
            Column::new(GENDER.into(), gender),
            Column::new(RACE_ETHNICITY.into(), ethnicity),
            Column::new(PARENTAL_EDUCATION.into(), education),
            Column::new(LUNCH.into(), lunch),
            Column::new(TEST_PREPARATION.into(), preparation),
            Column::new(READING_SCORE.into(), reading),
            Column::new(WRITING_SCORE.into(), writing),
        ])?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StudentRecord {
        StudentRecord::new(
            "female",
            "group B",
            "bachelor's degree",
            "standard",
            "none",
            72.0,
            74.0,
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_columns() {
        let cols = dataset_columns();
        assert_eq!(cols.len(), 8);
        assert_eq!(cols.last(), Some(&TARGET_COLUMN));
        assert_eq!(feature_columns()[0], READING_SCORE);
    }

    #[test]
    fn test_record_trims_fields() {
        let record = StudentRecord::new(" male ", "group A", "high school", "standard", "none", 50.0, 60.0).unwrap();
        assert_eq!(record.gender, "male");
    }

    #[test]
    fn test_record_collects_all_errors() {
        let err = StudentRecord::new("", "group A", "  ", "standard", "none", 120.0, f64::NAN).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("gender"));
        assert!(msg.contains("parental_level_of_education"));
        assert!(msg.contains("reading_score"));
        assert!(msg.contains("writing_score"));
    }

    #[test]
    fn test_to_frame() {
        let df = StudentRecord::to_frame(&[sample(), sample()]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 7);
        assert!(df.column(TARGET_COLUMN).is_err());
    }
}
