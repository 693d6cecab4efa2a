//! Shared on-disk fixtures for facade tests.

#![allow(dead_code, unreachable_pub)]

use std::{fmt::Write as _, fs, fs::File, path::Path};

use chrono::NaiveDate;
use polars::prelude::*;
use qdl::{
    Qdl,
    loader::{LoaderConfig, RawLoader},
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

pub const FACTORS: [&str; 3] = ["at_gr1", "be_me", "ret_12_1"];
pub const MONTHS: usize = 36;
pub const VW_FILE: &str = "[usa]_[all_factors]_[monthly]_[vw].csv";
pub const CHARS_FILE: &str = "jkp_2020-_usa.parquet";

pub fn month_end(i: usize) -> NaiveDate {
    let year = 2015 + i32::try_from(i / 12).unwrap();
    let month = u32::try_from(i % 12).unwrap() + 1;
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1).unwrap().pred_opt().unwrap()
}

/// Reference returns per factor, in `FACTORS` order, one per month.
pub fn reference_returns() -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(42);
    let normal = Normal::new(0.005, 0.04).unwrap();
    FACTORS.iter().map(|_| (0..MONTHS).map(|_| normal.sample(&mut rng)).collect()).collect()
}

/// A data root with a vw factor file and a 2020- characteristics file.
pub fn data_root(root: &Path) -> Qdl<RawLoader> {
    let config = LoaderConfig::with_root(root);
    fs::create_dir_all(&config.factors_dir).unwrap();
    fs::create_dir_all(&config.chars_dir).unwrap();

    let mut csv = String::from("location,date,freq,weighting,name,ret\n");
    for (f, series) in FACTORS.iter().zip(reference_returns()) {
        for (i, r) in series.iter().enumerate() {
            writeln!(csv, "usa,{},monthly,vw,{f},{r}", month_end(i)).unwrap();
        }
    }
    fs::write(config.factors_dir.join(VW_FILE), csv).unwrap();

    let mut chars = df! {
        "id" => &[10001i64, 10002, 10001, 10002],
        "eom" => &["2020-01-31", "2020-01-31", "2020-02-29", "2020-02-29"],
        "date" => &["2020-01-30", "2020-01-30", "2020-02-28", "2020-02-28"],
        "me" => &[Some(1.5), Some(2.5), None, Some(2.7)],
        "be_me" => &[0.4, 0.9, 0.41, 0.88],
    }
    .unwrap();
    let file = File::create(config.chars_dir.join(CHARS_FILE)).unwrap();
    ParquetWriter::new(file).finish(&mut chars).unwrap();

    Qdl::new(config)
}
