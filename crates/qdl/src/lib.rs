//! # qdl
//!
//! Data access and factor validation for factor-return and characteristic panels.
//!
//! The [`Qdl`] facade resolves dataset requests to files, reshapes long frames
//! into date x entity panels, and compares user-computed factors with the
//! reference panels. The component crates are re-exported as modules.
//!
//! ## Features
//!
//! - `plot` (default): SVG diagnostic charts (`validator::SvgRenderer`)
//! - `cli`: the `qdl` command-line binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use qdl::{FactorRequest, Qdl, primitives::{Country, DatasetKind, Weighting}};
//!
//! let qdl = Qdl::from_env();
//! let request = FactorRequest::new(Country::Usa, DatasetKind::Factor, Weighting::Vw);
//! let panel = qdl.load_factors(&request, Some(&["ret_12_1", "be_me"]))?;
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/qdl/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[doc(inline)]
pub use qdl_loader as loader;
#[doc(inline)]
pub use qdl_primitives as primitives;
#[doc(inline)]
pub use qdl_stats as stats;
#[doc(inline)]
pub use qdl_traits as traits;
#[doc(inline)]
pub use qdl_transform as transform;
#[doc(inline)]
pub use qdl_validator as validator;

mod request;
pub use request::{CharRequest, FactorInput, FactorRequest, ValidateFactorRequest};

mod facade;
pub use facade::Qdl;

mod error;
pub use error::FacadeError;
