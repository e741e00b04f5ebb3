//! Alternating calibration of surface materials and Penman-Monteith parameters
//!
//! Each round fits the OHM coefficients of a single learned material with the
//! current `alpha` and `beta` held fixed, then fits `alpha` and `beta` with
//! those materials. The round error is the error of the best Penman-Monteith
//! cell. Rounds continue while the error strictly improves, up to the
//! configured number of rounds.
//!
//! The reported parameters are those of the last improving round. A round that
//! fails to improve stops the loop and its parameters are discarded. After the
//! first round, a round whose grids are all degenerate counts as not improving.

use crate::materials::{best_materials, optimize_materials};
use crate::output::OutputDirectory;
use crate::penman_monteith::{best_penman_monteith, optimize_penman_monteith};
use crate::{Error, Result};
use log::{info, warn};
use lumps_components::model::{ModelConfiguration, StorageSource};
use lumps_components::parameters::LongwaveParameters;
use lumps_core::config::{ExperimentConfig, PenmanMonteithParams, PenmanMonteithSpec};
use lumps_core::surface::MaterialCoefficients;
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};
use serde::{Deserialize, Serialize};

/// Parameters chosen by a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub penman_monteith: PenmanMonteithParams,
    pub materials: MaterialCoefficients,
    /// Error of the chosen parameters
    pub error: FloatValue,
    /// Error of each accepted round, strictly decreasing
    pub errors: Vec<FloatValue>,
}

impl CalibrationResult {
    /// Human readable summary of the run.
    pub fn description(&self) -> String {
        format!(
            "Best materials coefficients:\n\
             a1={} a2={} a3={}\n\
             Best penman monteith params:\n\
             alpha={} beta={}\n\
             Average normalized squared error: {}\n\
             Error series: {:?}\n",
            self.materials.a1,
            self.materials.a2,
            self.materials.a3,
            self.penman_monteith.alpha,
            self.penman_monteith.beta,
            self.error,
            self.errors
        )
    }
}

/// Model configuration for the active experiment before any tuning.
///
/// Tuned Penman-Monteith parameters start at the low end of their ranges.
pub fn initial_configuration(
    config: &ExperimentConfig,
    surface_fractions: &[(String, FloatValue)],
) -> ModelConfiguration {
    let penman_monteith = match config.experiment.penman_monteith {
        PenmanMonteithSpec::Fixed(params) => params,
        PenmanMonteithSpec::Tuning(tuning) => {
            PenmanMonteithParams::new(tuning.alpha.0, tuning.beta.0)
        }
    };
    ModelConfiguration::new(config.surface_composition(surface_fractions), penman_monteith)
        .with_longwave(
            config.experiment.longwave_model,
            LongwaveParameters::default(),
        )
}

/// Outcome of one calibration round.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Round {
    pub model: ModelConfiguration,
    pub materials: MaterialCoefficients,
    pub error: FloatValue,
}

/// Run up to `iterations` rounds, keeping the last strictly improving one.
///
/// Returns the kept round and the errors of every accepted round. A
/// [`Error::NumericalDegeneracy`] in the first round is returned as is.
pub(crate) fn calibrate_rounds<F>(
    iterations: usize,
    initial: ModelConfiguration,
    mut run_round: F,
) -> Result<(Round, Vec<FloatValue>)>
where
    F: FnMut(usize, &ModelConfiguration) -> Result<Round>,
{
    let mut current = initial;
    let mut best: Option<Round> = None;
    let mut errors: Vec<FloatValue> = Vec::new();

    for round in 0..iterations {
        info!("Starting calibration round {}", round);
        let candidate = match run_round(round, &current) {
            Ok(candidate) => candidate,
            Err(Error::NumericalDegeneracy(message)) if best.is_some() => {
                warn!(
                    "Round {} is degenerate ({}), keeping round {}",
                    round,
                    message,
                    round - 1
                );
                break;
            }
            Err(err) => return Err(err),
        };
        info!("Round {} error: {}", round, candidate.error);

        if let Some(previous) = errors.last() {
            // NaN never compares less, so it also stops the loop
            if !(candidate.error < *previous) {
                info!(
                    "Round {} did not improve on {}, keeping round {}",
                    round,
                    previous,
                    round - 1
                );
                break;
            }
        }
        errors.push(candidate.error);
        current = candidate.model.clone();
        best = Some(candidate);
    }

    let best = best.ok_or_else(|| {
        Error::CalibrationError(format!(
            "No calibration round completed in {} iterations",
            iterations
        ))
    })?;
    Ok((best, errors))
}

/// Calibrate the active experiment and run the model with the best parameters.
///
/// `model` is the starting configuration, usually from [`initial_configuration`].
/// The observations are checked against the inputs of the full model before
/// anything is written. Grid tables are written to a directory per round and
/// the final run to `best`.
pub fn get_best_model_output(
    config: &ExperimentConfig,
    model: ModelConfiguration,
    observations: &EnergyBalanceSeries,
    output: &OutputDirectory,
) -> Result<(EnergyBalanceSeries, CalibrationResult)> {
    let experiment = &config.experiment;
    let tuning = match experiment.penman_monteith {
        PenmanMonteithSpec::Tuning(tuning) => tuning,
        PenmanMonteithSpec::Fixed(_) => {
            return Err(Error::CalibrationError(format!(
                "Experiment {} has fixed Penman-Monteith parameters",
                experiment.name
            )))
        }
    };
    let materials_tuning = experiment.surface_materials_tuning.ok_or_else(|| {
        Error::CalibrationError(format!(
            "Experiment {} has no surface materials tuning parameters",
            experiment.name
        ))
    })?;

    model
        .clone()
        .with_storage_source(StorageSource::ModelStorage)
        .build()
        .check_inputs(observations)?;

    let (best, errors) = calibrate_rounds(experiment.tuning_iterations, model, |round, current| {
        let materials_grid = optimize_materials(
            &current
                .clone()
                .with_storage_source(StorageSource::ModelStorage),
            observations,
            &materials_tuning,
        )?;
        output.write_materials_round(round, &materials_grid)?;
        let (materials, _) = best_materials(&materials_grid)?;

        let with_materials = current.clone().with_learned_materials(materials);
        let penman_monteith_grid =
            optimize_penman_monteith(&with_materials, observations, &tuning)?;
        output.write_penman_monteith_round(round, &penman_monteith_grid)?;
        let (penman_monteith, error) = best_penman_monteith(&penman_monteith_grid)?;

        Ok(Round {
            model: with_materials.with_penman_monteith(penman_monteith),
            materials,
            error,
        })
    })?;

    let result = CalibrationResult {
        penman_monteith: best.model.penman_monteith,
        materials: best.materials,
        error: best.error,
        errors,
    };
    info!(
        "Calibrated alpha={} beta={} error={}",
        result.penman_monteith.alpha, result.penman_monteith.beta, result.error
    );

    let model_output = best
        .model
        .with_storage_source(StorageSource::ModelStorage)
        .build()
        .run(observations)?;
    output.write_best(&result, &model_output)?;
    Ok((model_output, result))
}

/// Run the active experiment, writing to its output directory.
///
/// Experiments with fixed Penman-Monteith parameters run the model once; tuned
/// experiments are calibrated first.
pub fn run_experiment(
    config: &ExperimentConfig,
    surface_fractions: &[(String, FloatValue)],
    observations: &EnergyBalanceSeries,
) -> Result<EnergyBalanceSeries> {
    let model = initial_configuration(config, surface_fractions);
    let output = OutputDirectory::new(&config.output_dir);
    info!(
        "Running experiment {} into {}",
        config.experiment.name,
        output.root().display()
    );

    match config.experiment.penman_monteith {
        PenmanMonteithSpec::Fixed(_) => {
            let model_output = model.build().run(observations)?;
            output.write_model_output(&model_output)?;
            Ok(model_output)
        }
        PenmanMonteithSpec::Tuning(_) => {
            let (model_output, _) = get_best_model_output(config, model, observations, &output)?;
            Ok(model_output)
        }
    }
}
