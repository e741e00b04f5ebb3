//! Calibration of the LUMPS energy balance model
//!
//! The free parameters of the model are fitted to observed sensible and latent
//! heat fluxes with nested grid searches:
//!
//! - [`materials::optimize_materials`] searches OHM coefficients `a1`, `a2`, `a3`
//!   for a single "learned" surface material with `alpha` and `beta` held at
//!   their current values, scoring modelled against observed fluxes.
//! - [`penman_monteith::optimize_penman_monteith`] searches `alpha` and `beta`
//!   with the materials fixed, scoring modelled against observed fluxes.
//! - [`calibration::get_best_model_output`] alternates the two for a number of
//!   rounds, keeping the best parameters seen so far.
//!
//! Each grid cell runs the whole model pipeline. Cells are evaluated in parallel
//! with rayon.

use lumps_core::errors::LumpsError;
use thiserror::Error;

pub mod calibration;
pub mod grid;
pub mod materials;
pub mod model_runner;
pub mod objective;
pub mod output;
pub mod penman_monteith;

pub use calibration::{get_best_model_output, run_experiment, CalibrationResult};
pub use grid::{parameter_space, GridResults, GridRow};
pub use model_runner::ModelRunner;
pub use objective::{
    calculate_normalized_squared_error, normalized_squared_error, score_model_output, MeanPolicy,
    Statistics,
};
pub use output::OutputDirectory;

/// Error type for calibration operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] LumpsError),

    /// No grid cell produced a finite error
    #[error("Numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    #[error("Calibration error: {0}")]
    CalibrationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for calibration operations
pub type Result<T> = std::result::Result<T, Error>;
