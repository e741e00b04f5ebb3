//! Grid search over the OHM coefficients of a single learned material
//!
//! Each candidate runs the full pipeline with the Penman-Monteith parameters of
//! the configuration held fixed. With `StorageSource::ModelStorage` the
//! modelled sensible and latent heat are scored, so the result depends on the
//! current `alpha` and `beta`. `StorageSource::ResidualStorage` instead scores
//! the storage heat flux against the observed residual $Q^* - Q_H - Q_E$.

use crate::grid::{parameter_space, scan_order, GridResults};
use crate::model_runner::{MaterialsRunner, ModelRunner};
use crate::objective::MeanPolicy;
use crate::Result;
use log::{debug, info};
use lumps_components::model::ModelConfiguration;
use lumps_core::config::MaterialsTuningSpec;
use lumps_core::surface::MaterialCoefficients;
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};

/// Evaluate every `(a1, a2, a3)` cell of `tuning`, a1 varying slowest and a3
/// fastest.
///
/// Candidates are scored according to the storage source of `model`.
pub fn optimize_materials(
    model: &ModelConfiguration,
    observations: &EnergyBalanceSeries,
    tuning: &MaterialsTuningSpec,
) -> Result<GridResults> {
    let axes = [tuning.a1, tuning.a2, tuning.a3]
        .iter()
        .map(|p| parameter_space(p.range, p.number))
        .collect::<Vec<_>>();
    info!(
        "Searching {} surface material cells",
        axes.iter().map(Vec::len).product::<usize>()
    );

    debug!(
        "Materials search with alpha={} beta={} scoring {:?}",
        model.penman_monteith.alpha, model.penman_monteith.beta, model.storage_source
    );

    let runner = MaterialsRunner::new(model.clone(), observations, MeanPolicy::All);
    runner.evaluate_grid(scan_order(&axes))
}

/// Coefficients of the best cell of a materials grid, with its error.
pub fn best_materials(results: &GridResults) -> Result<(MaterialCoefficients, FloatValue)> {
    let best = results.best()?;
    info!(
        "Best materials a1={} a2={} a3={} error={}",
        best.params[0], best.params[1], best.params[2], best.error
    );
    Ok((
        MaterialCoefficients::new(best.params[0], best.params[1], best.params[2]),
        best.error,
    ))
}
