//! Experiment configuration.
//!
//! Configuration is read from TOML and resolved once into closed types: the
//! Penman-Monteith parameters are either [`PenmanMonteithSpec::Fixed`] or
//! [`PenmanMonteithSpec::Tuning`], and the longwave model is a [`LongwaveModel`].
//! Nothing downstream inspects option names again.
//!
//! ```toml
//! active_experiment = "tuned"
//! output_dir = "output"
//!
//! [experiments.tuned]
//! longwave_model = "burridge_gadd"
//! tuning_iterations = 3
//!
//! [experiments.tuned.penman_monteith_params.tuning_params]
//! alpha = [0.0, 1.5]
//! beta = [0.0, 30.0]
//! number = 40
//!
//! [experiments.tuned.surface_materials_tuning_params]
//! a1 = { range = [0.0, 1.0], number = 5 }
//! a2 = { range = [0.0, 0.5], number = 5 }
//! a3 = { range = [-40.0, 0.0], number = 5 }
//!
//! [experiments.tuned.surface_materials_mapping]
//! Lawn = "grass"
//!
//! [surface_materials.grass]
//! a1 = 0.32
//! a2 = 0.54
//! a3 = -27.4
//! ```

use crate::errors::{LumpsError, LumpsResult};
use crate::surface::{MaterialCoefficients, SurfaceComposition};
use crate::timeseries::FloatValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Penman-Monteith partition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenmanMonteithParams {
    /// Fraction of available energy partitioned to latent heat, scaled by
    /// $\Delta / (\Delta + \gamma)$ (dimensionless). Not clamped.
    pub alpha: FloatValue,
    /// Offset moved from sensible to latent heat (W / m^2)
    pub beta: FloatValue,
}

impl PenmanMonteithParams {
    pub fn new(alpha: FloatValue, beta: FloatValue) -> Self {
        Self { alpha, beta }
    }
}

/// Grid over which alpha and beta are searched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningSpec {
    pub alpha: (FloatValue, FloatValue),
    pub beta: (FloatValue, FloatValue),
    /// Samples per parameter
    pub number: usize,
}

/// Evenly spaced samples between two endpoints (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub range: (FloatValue, FloatValue),
    pub number: usize,
}

impl ParameterRange {
    pub fn new(start: FloatValue, end: FloatValue, number: usize) -> Self {
        Self {
            range: (start, end),
            number,
        }
    }
}

/// Grid over which the OHM coefficients of the learned material are searched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialsTuningSpec {
    pub a1: ParameterRange,
    pub a2: ParameterRange,
    pub a3: ParameterRange,
}

/// How the Penman-Monteith parameters are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PenmanMonteithSpec {
    Fixed(PenmanMonteithParams),
    Tuning(TuningSpec),
}

/// Longwave radiation model added to the observed net shortwave radiation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongwaveModel {
    /// Net radiation is used as observed
    #[default]
    None,
    /// Constant cloud-dependent parameterisation of Burridge and Gadd
    BurridgeGadd,
}

impl LongwaveModel {
    /// Resolve the optional `longwave_model` setting.
    pub fn parse(value: Option<&str>) -> LumpsResult<Self> {
        match value {
            None => Ok(LongwaveModel::None),
            Some("burridge_gadd") => Ok(LongwaveModel::BurridgeGadd),
            Some(other) => Err(LumpsError::UnrecognizedConfiguration {
                key: "longwave radiation model".to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, LongwaveModel::None)
    }
}

/// The active experiment, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub name: String,
    pub penman_monteith: PenmanMonteithSpec,
    pub longwave_model: LongwaveModel,
    /// Maximum number of rounds of the alternating calibration loop
    pub tuning_iterations: usize,
    pub surface_materials_tuning: Option<MaterialsTuningSpec>,
    /// Surface type to material name
    pub surface_materials_mapping: IndexMap<String, String>,
}

/// Resolved configuration for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub experiment: Experiment,
    /// Material name to OHM coefficients
    pub surface_materials: IndexMap<String, MaterialCoefficients>,
    pub output_dir: PathBuf,
}

#[derive(Deserialize)]
struct RawConfig {
    active_experiment: String,
    experiments: IndexMap<String, RawExperiment>,
    #[serde(default)]
    surface_materials: IndexMap<String, MaterialCoefficients>,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

#[derive(Deserialize)]
struct RawExperiment {
    penman_monteith_params: RawPenmanMonteith,
    #[serde(default)]
    longwave_model: Option<String>,
    #[serde(default)]
    tuning_iterations: Option<usize>,
    #[serde(default)]
    surface_materials_tuning_params: Option<MaterialsTuningSpec>,
    #[serde(default)]
    surface_materials_mapping: IndexMap<String, String>,
}

#[derive(Deserialize)]
struct RawPenmanMonteith {
    alpha: Option<FloatValue>,
    beta: Option<FloatValue>,
    tuning_params: Option<TuningSpec>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl RawPenmanMonteith {
    fn resolve(self) -> LumpsResult<PenmanMonteithSpec> {
        match (self.tuning_params, self.alpha, self.beta) {
            (Some(tuning), _, _) => Ok(PenmanMonteithSpec::Tuning(tuning)),
            (None, Some(alpha), Some(beta)) => Ok(PenmanMonteithSpec::Fixed(
                PenmanMonteithParams::new(alpha, beta),
            )),
            _ => Err(LumpsError::ConfigParse(
                "penman_monteith_params must set either alpha and beta or tuning_params"
                    .to_string(),
            )),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(text: &str) -> LumpsResult<Self> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| LumpsError::ConfigParse(e.to_string()))?;
        Self::resolve(raw)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> LumpsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn resolve(mut raw: RawConfig) -> LumpsResult<Self> {
        let name = raw.active_experiment;
        let experiment = raw.experiments.shift_remove(&name).ok_or_else(|| {
            LumpsError::UnrecognizedConfiguration {
                key: "active experiment".to_string(),
                value: name.clone(),
            }
        })?;

        let tuning_iterations = experiment.tuning_iterations.unwrap_or(1);
        if tuning_iterations == 0 {
            return Err(LumpsError::ConfigParse(
                "tuning_iterations must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            experiment: Experiment {
                name,
                penman_monteith: experiment.penman_monteith_params.resolve()?,
                longwave_model: LongwaveModel::parse(experiment.longwave_model.as_deref())?,
                tuning_iterations,
                surface_materials_tuning: experiment.surface_materials_tuning_params,
                surface_materials_mapping: experiment.surface_materials_mapping,
            },
            surface_materials: raw.surface_materials,
            output_dir: raw.output_dir,
        })
    }

    /// Build the surface composition for the given surface fractions using the
    /// active experiment's mapping.
    pub fn surface_composition(&self, fractions: &[(String, FloatValue)]) -> SurfaceComposition {
        SurfaceComposition::from_mapping(
            fractions,
            &self.experiment.surface_materials_mapping,
            &self.surface_materials,
        )
    }
}
