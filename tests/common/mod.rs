//! Shared fixtures for integration tests

#![allow(dead_code)]

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scorecast::utils::DataSaver;
use std::path::{Path, PathBuf};

pub const GENDERS: [&str; 2] = ["female", "male"];
pub const ETHNICITIES: [&str; 5] = ["group A", "group B", "group C", "group D", "group E"];
pub const EDUCATION: [&str; 6] = [
    "associate's degree",
    "bachelor's degree",
    "high school",
    "master's degree",
    "some college",
    "some high school",
];
pub const LUNCH: [&str; 2] = ["free/reduced", "standard"];
pub const PREPARATION: [&str; 2] = ["completed", "none"];

/// One-hot width of the fixture's vocabularies plus the two numeric columns
pub const FEATURE_WIDTH: usize = 2 + 2 + 5 + 6 + 2 + 2;

/// Student dataset whose math score follows the other columns closely
pub fn students(n: usize, seed: u64) -> DataFrame {
    build_students(n, seed, false)
}

/// Same attributes, but the math score is unrelated noise
pub fn students_with_random_target(n: usize, seed: u64) -> DataFrame {
    build_students(n, seed, true)
}

fn build_students(n: usize, seed: u64, random_target: bool) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut gender = Vec::with_capacity(n);
    let mut ethnicity = Vec::with_capacity(n);
    let mut education = Vec::with_capacity(n);
    let mut lunch = Vec::with_capacity(n);
    let mut preparation = Vec::with_capacity(n);
    let mut reading = Vec::with_capacity(n);
    let mut writing = Vec::with_capacity(n);
    let mut math = Vec::with_capacity(n);

    for _ in 0..n {
        let g = *GENDERS.choose(&mut rng).unwrap();
        let l = *LUNCH.choose(&mut rng).unwrap();
        let p = *PREPARATION.choose(&mut rng).unwrap();
        let r: f64 = rng.gen_range(30.0..100.0);
        let w: f64 = (r + rng.gen_range(-6.0..6.0)).clamp(0.0, 100.0);

        let m = if random_target {
            rng.gen_range(0.0..100.0)
        } else {
            let mut m = 0.45 * r + 0.45 * w + rng.gen_range(-4.0..4.0);
            if g == "male" {
                m += 5.0;
            }
            if l == "standard" {
                m += 6.0;
            }
            if p == "completed" {
                m += 3.0;
            }
            m.clamp(0.0, 100.0)
        };

        gender.push(g);
        ethnicity.push(*ETHNICITIES.choose(&mut rng).unwrap());
        education.push(*EDUCATION.choose(&mut rng).unwrap());
        lunch.push(l);
        preparation.push(p);
        reading.push(r.round() as i64);
        writing.push(w.round() as i64);
        math.push(m.round() as i64);
    }

    df!(
        "gender" => gender,
        "race_ethnicity" => ethnicity,
        "parental_level_of_education" => education,
        "lunch" => lunch,
        "test_preparation_course" => preparation,
        "math_score" => math,
        "reading_score" => reading,
        "writing_score" => writing
    )
    .unwrap()
}

/// Write `df` as CSV under `dir` and return its path
pub fn write_csv(dir: &Path, name: &str, df: &DataFrame) -> PathBuf {
    let path = dir.join(name);
    DataSaver::save_csv(&mut df.clone(), &path).unwrap();
    path
}
