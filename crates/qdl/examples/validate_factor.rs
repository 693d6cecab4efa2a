//! Example: Validating a Replicated Factor Against the Reference Panel
//!
//! This example walks through the validation workflow:
//! 1. Write a small factor-return file in the on-disk layout
//! 2. Load it back as a date x factor panel
//! 3. Build a "replicated" panel with estimation noise and one biased factor
//! 4. Validate it and print the per-factor report
//!
//! Run with `QDL_DATA_ROOT` unset; the data lives in a temporary directory.

use std::{fmt::Write as _, fs};

use chrono::NaiveDate;
use qdl::{
    FactorInput, FactorRequest, Qdl, ValidateFactorRequest,
    loader::{LoaderConfig, factors_file_name},
    primitives::{Country, DatasetKind, WidePanel, Weighting},
    validator::Thresholds,
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

const FACTORS: &[&str] = &["be_me", "ret_12_1", "at_gr1", "niq_at"];
const MONTHS: u32 = 48;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Factor Validation ===\n");

    // =========================================================================
    // WRITE REFERENCE DATA
    // =========================================================================

    let dir = tempfile::tempdir()?;
    let config = LoaderConfig::with_root(dir.path());
    fs::create_dir_all(&config.factors_dir)?;

    let request = FactorRequest::new(Country::Usa, DatasetKind::Factor, Weighting::Vw);
    let mut rng = StdRng::seed_from_u64(2024);
    let returns = Normal::new(0.004, 0.035)?;

    let mut csv = String::from("location,date,freq,weighting,name,ret\n");
    for name in FACTORS {
        for m in 0..MONTHS {
            let date = NaiveDate::from_ymd_opt(2018 + (m / 12) as i32, m % 12 + 1, 28)
                .ok_or("invalid date")?;
            writeln!(csv, "usa,{date},monthly,vw,{name},{}", returns.sample(&mut rng))?;
        }
    }
    let path = config.factors_dir.join(factors_file_name(&request.query));
    fs::write(&path, csv)?;
    println!("Reference file: {}", path.display());

    // =========================================================================
    // LOAD AND REPLICATE
    // =========================================================================

    let qdl = Qdl::new(config);
    let reference = qdl.load_factors(&request, None)?;
    let (n_dates, n_factors) = reference.shape();
    println!("Loaded {n_dates} months x {n_factors} factors\n");

    let noise = Normal::new(0.0, 0.002)?;
    let mut replicated = reference.values().mapv(|v| v + noise.sample(&mut rng));
    if let Some(j) = reference.column_position("niq_at") {
        // a systematic 10bp bias in one factor
        replicated.column_mut(j).mapv_inplace(|v| v + 0.001);
    }
    let user = WidePanel::new(reference.index().to_vec(), reference.columns().to_vec(), replicated)?;

    // =========================================================================
    // VALIDATE
    // =========================================================================

    let thresholds = Thresholds::from_pairs(["corr_min=0.95", "mae_max=0.25"])?;
    let validate = ValidateFactorRequest::new(Country::Usa, DatasetKind::Factor, Weighting::Vw)
        .thresholds(thresholds);
    let report = qdl.validate_factor(FactorInput::Panel(user), &validate)?;

    print!("{}", report.summary());
    println!(
        "\nRows: {} joined, {} after dropping missing values",
        report.diagnostics.rows_after_join, report.diagnostics.rows_after_dropna
    );

    Ok(())
}
