//! Files written by a calibration run
//!
//! ```text
//! <root>/
//!     <round>/materials/errors.csv
//!     <round>/pm_autotune/errors.csv
//!     <round>/pm_autotune/final_params.csv
//!     best/final_params.csv
//!     best/model_output.csv
//!     best/description.txt
//!     best/calibration_result.json
//! ```
//!
//! Directories are created when they are first written to.

use crate::calibration::CalibrationResult;
use crate::grid::GridResults;
use crate::Result;
use log::info;
use lumps_core::timeseries::EnergyBalanceSeries;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const ERRORS_FILE: &str = "errors.csv";
const FINAL_PARAMS_FILE: &str = "final_params.csv";
const MODEL_OUTPUT_FILE: &str = "model_output.csv";
const DESCRIPTION_FILE: &str = "description.txt";
const RESULT_FILE: &str = "calibration_result.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirectory {
    root: PathBuf,
}

impl OutputDirectory {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn round_dir(&self, round: usize) -> PathBuf {
        self.root.join(round.to_string())
    }

    pub fn materials_dir(&self, round: usize) -> PathBuf {
        self.round_dir(round).join("materials")
    }

    pub fn penman_monteith_dir(&self, round: usize) -> PathBuf {
        self.round_dir(round).join("pm_autotune")
    }

    pub fn best_dir(&self) -> PathBuf {
        self.root.join("best")
    }

    pub fn write_materials_round(&self, round: usize, results: &GridResults) -> Result<()> {
        let dir = create(self.materials_dir(round))?;
        results.save_csv(dir.join(ERRORS_FILE))
    }

    /// Write the grid and its best cell.
    pub fn write_penman_monteith_round(&self, round: usize, results: &GridResults) -> Result<()> {
        let dir = create(self.penman_monteith_dir(round))?;
        results.save_csv(dir.join(ERRORS_FILE))?;

        let best = GridResults::new(results.param_names().to_vec(), vec![results.best()?.clone()]);
        best.save_csv(dir.join(FINAL_PARAMS_FILE))
    }

    pub fn write_best(
        &self,
        result: &CalibrationResult,
        model_output: &EnergyBalanceSeries,
    ) -> Result<()> {
        let dir = create(self.best_dir())?;
        info!("Writing best model output to {}", dir.display());

        model_output.save_csv(dir.join(MODEL_OUTPUT_FILE))?;
        fs::write(dir.join(DESCRIPTION_FILE), result.description())?;

        let mut params = BufWriter::new(File::create(dir.join(FINAL_PARAMS_FILE))?);
        writeln!(params, "alpha,beta,a1,a2,a3,error")?;
        writeln!(
            params,
            "{},{},{},{},{},{}",
            result.penman_monteith.alpha,
            result.penman_monteith.beta,
            result.materials.a1,
            result.materials.a2,
            result.materials.a3,
            result.error
        )?;
        params.flush()?;

        let json = serde_json::to_string_pretty(result).map_err(|e| {
            crate::Error::CalibrationError(format!("Failed to serialize calibration result: {}", e))
        })?;
        fs::write(dir.join(RESULT_FILE), json)?;
        Ok(())
    }

    /// Model output of an untuned run, written at the root.
    pub fn write_model_output(&self, model_output: &EnergyBalanceSeries) -> Result<PathBuf> {
        let path = create(self.root.clone())?.join(MODEL_OUTPUT_FILE);
        model_output.save_csv(&path)?;
        Ok(path)
    }
}

fn create(dir: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
