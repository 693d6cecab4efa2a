//! qdl CLI binary.
//!
//! Loads factor and characteristic panels and validates user factors
//! against the reference factor panel.
//!
//! Usage: `qdl [--data-root DIR] <factors|chars|validate> ...`
//! Example: `qdl validate --user my_factors.csv --country usa --dataset factor --weighting vw`

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use polars::prelude::*;
use qdl::{
    CharRequest, FactorInput, FactorRequest, Qdl, ValidateFactorRequest,
    loader::LoaderConfig,
    primitives::{Country, DatasetKind, PlotOptions, TimeKey, Vintage, WidePanel, Weighting},
    transform::{FACTOR_TIME_COL, frame_to_panel, panel_to_frame},
    validator::{SvgRenderer, Thresholds, Validator},
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qdl")]
#[command(about = "Load factor panels and validate user factors", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding `factors/` and `chars/` (else $QDL_DATA_ROOT, else ./data)
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the head of a wide factor panel
    Factors {
        /// Country (usa, kor)
        #[arg(long)]
        country: Country,

        /// Dataset kind (factor, theme, mkt)
        #[arg(long)]
        dataset: DatasetKind,

        /// Weighting (ew, vw, vw_cap)
        #[arg(long)]
        weighting: Weighting,

        /// Comma-separated factor subset
        #[arg(long, value_delimiter = ',')]
        factors: Option<Vec<String>>,

        /// Skip absent factors instead of failing
        #[arg(long)]
        non_strict: bool,

        /// Rows to print
        #[arg(long, default_value = "10")]
        rows: usize,
    },

    /// Print the head of a wide characteristic panel
    Chars {
        /// Country (usa, kor)
        #[arg(long)]
        country: Country,

        /// Vintage (1972-, 2000-, 2020-)
        #[arg(long)]
        vintage: Vintage,

        /// Characteristic column
        #[arg(long = "char")]
        characteristic: String,

        /// Time key (eom, date)
        #[arg(long, default_value = "eom")]
        time_key: TimeKey,

        /// Rows to print
        #[arg(long, default_value = "10")]
        rows: usize,
    },

    /// Validate a wide CSV of user factors (first column: date)
    Validate {
        /// User CSV file
        #[arg(long)]
        user: PathBuf,

        /// Country (usa, kor)
        #[arg(long)]
        country: Country,

        /// Dataset kind (factor, theme, mkt)
        #[arg(long)]
        dataset: DatasetKind,

        /// Weighting (ew, vw, vw_cap)
        #[arg(long)]
        weighting: Weighting,

        /// Comma-separated factor subset of the user file
        #[arg(long, value_delimiter = ',')]
        factors: Option<Vec<String>>,

        /// Bound as name=value (mse_max, rmse_max, mae_max, corr_min, ic_min)
        #[arg(long = "threshold")]
        thresholds: Vec<String>,

        /// Write an SVG chart to this path
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.data_root.map_or_else(LoaderConfig::from_env, LoaderConfig::with_root);
    let qdl = Qdl::new(config);

    match cli.command {
        Commands::Factors { country, dataset, weighting, factors, non_strict, rows } => {
            let request = FactorRequest::new(country, dataset, weighting).strict(!non_strict);
            let names: Option<Vec<&str>> =
                factors.as_ref().map(|f| f.iter().map(String::as_str).collect());
            let panel = qdl.load_factors(&request, names.as_deref())?;
            print_head(&panel, FACTOR_TIME_COL, rows)?;
        }
        Commands::Chars { country, vintage, characteristic, time_key, rows } => {
            let request = CharRequest::new(country, vintage).time_key(time_key);
            let panel = qdl.load_char(&request, &characteristic)?;
            print_head(&panel, &time_key.to_string(), rows)?;
        }
        Commands::Validate {
            user,
            country,
            dataset,
            weighting,
            factors,
            thresholds,
            plot,
            json,
        } => {
            let panel = read_user_panel(&user)?;
            let mut request = ValidateFactorRequest::new(country, dataset, weighting);
            if let Some(factors) = factors {
                request = request.factors(factors);
            }
            if !thresholds.is_empty() {
                request = request.thresholds(Thresholds::from_pairs(&thresholds)?);
            }
            let qdl = if plot.is_some() {
                let title = format!("{} vs reference", user.display());
                request = request.plot(PlotOptions::titled(title));
                qdl.with_validator(Validator::with_renderer(Box::new(SvgRenderer::new())))
            } else {
                qdl
            };

            let report = qdl.validate_factor(FactorInput::Panel(panel), &request)?;
            if let (Some(path), Some(figure)) = (&plot, &report.figure) {
                fs::write(path, &figure.svg)?;
                eprintln!("Chart written to {}", path.display());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.summary());
            }
            if report.pass_thresholds == Some(false) {
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn read_user_panel(path: &Path) -> Result<WidePanel, Box<dyn std::error::Error>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    let time_col = df
        .get_column_names()
        .first()
        .map(|c| c.to_string())
        .ok_or("user file has no columns")?;
    Ok(frame_to_panel(&df, &time_col)?)
}

fn print_head(
    panel: &WidePanel,
    time_col: &str,
    rows: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (n_rows, n_cols) = panel.shape();
    println!("{n_rows} dates x {n_cols} columns, {} missing", panel.n_missing());
    let df = panel_to_frame(&panel.slice_rows(0, rows), time_col)?;
    println!("{df}");
    Ok(())
}
