//! Running the model for a vector of candidate parameters

use crate::grid::{GridResults, GridRow};
use crate::objective::{score_model_output, MeanPolicy};
use crate::Result;
use log::debug;
use lumps_components::model::ModelConfiguration;
use lumps_core::config::PenmanMonteithParams;
use lumps_core::surface::MaterialCoefficients;
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};
use rayon::prelude::*;

/// Maps a parameter vector to a model run and its error.
///
/// Implementations must be safe to call from several threads at once; each call
/// only reads shared state.
pub trait ModelRunner {
    /// Names of the parameters, in the order `run` expects them
    fn param_names(&self) -> &[String];

    /// Run the model with `params`.
    fn run(&self, params: &[FloatValue]) -> Result<EnergyBalanceSeries>;

    /// Error of a model run against the observations
    fn score(&self, output: &EnergyBalanceSeries) -> Result<FloatValue>;

    fn evaluate(&self, params: &[FloatValue]) -> Result<FloatValue> {
        let error = self.score(&self.run(params)?)?;
        debug!("{:?}={:?} error: {}", self.param_names(), params, error);
        Ok(error)
    }

    /// Evaluate every parameter set in parallel.
    ///
    /// The rows keep the order of `param_sets`.
    fn evaluate_grid(&self, param_sets: Vec<Vec<FloatValue>>) -> Result<GridResults>
    where
        Self: Sync,
    {
        let errors = param_sets
            .par_iter()
            .map(|params| self.evaluate(params))
            .collect::<Result<Vec<_>>>()?;

        let rows = param_sets
            .into_iter()
            .zip(errors)
            .map(|(params, error)| GridRow { params, error })
            .collect();
        Ok(GridResults::new(self.param_names().to_vec(), rows))
    }
}

/// Runs the full pipeline with `alpha` and `beta` replaced.
pub struct PenmanMonteithRunner<'a> {
    param_names: Vec<String>,
    base: ModelConfiguration,
    observations: &'a EnergyBalanceSeries,
    policy: MeanPolicy,
}

impl<'a> PenmanMonteithRunner<'a> {
    pub fn new(
        base: ModelConfiguration,
        observations: &'a EnergyBalanceSeries,
        policy: MeanPolicy,
    ) -> Self {
        Self {
            param_names: vec!["alpha".to_string(), "beta".to_string()],
            base,
            observations,
            policy,
        }
    }
}

impl ModelRunner for PenmanMonteithRunner<'_> {
    fn param_names(&self) -> &[String] {
        &self.param_names
    }

    fn run(&self, params: &[FloatValue]) -> Result<EnergyBalanceSeries> {
        let config = self
            .base
            .clone()
            .with_penman_monteith(PenmanMonteithParams::new(params[0], params[1]));
        Ok(config.build().run(self.observations)?)
    }

    fn score(&self, output: &EnergyBalanceSeries) -> Result<FloatValue> {
        score_model_output(output, self.base.storage_source, self.policy)
    }
}

/// Runs the full pipeline with a single learned material `a1`, `a2`, `a3`.
pub struct MaterialsRunner<'a> {
    param_names: Vec<String>,
    base: ModelConfiguration,
    observations: &'a EnergyBalanceSeries,
    policy: MeanPolicy,
}

impl<'a> MaterialsRunner<'a> {
    pub fn new(
        base: ModelConfiguration,
        observations: &'a EnergyBalanceSeries,
        policy: MeanPolicy,
    ) -> Self {
        Self {
            param_names: vec!["a1".to_string(), "a2".to_string(), "a3".to_string()],
            base,
            observations,
            policy,
        }
    }
}

impl ModelRunner for MaterialsRunner<'_> {
    fn param_names(&self) -> &[String] {
        &self.param_names
    }

    fn run(&self, params: &[FloatValue]) -> Result<EnergyBalanceSeries> {
        let config = self.base.clone().with_learned_materials(MaterialCoefficients::new(
            params[0], params[1], params[2],
        ));
        Ok(config.build().run(self.observations)?)
    }

    fn score(&self, output: &EnergyBalanceSeries) -> Result<FloatValue> {
        score_model_output(output, self.base.storage_source, self.policy)
    }
}
