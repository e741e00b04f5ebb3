//! Grid search over the Penman-Monteith parameters

use crate::grid::{parameter_space, scan_order, GridResults};
use crate::model_runner::{ModelRunner, PenmanMonteithRunner};
use crate::objective::MeanPolicy;
use crate::Result;
use log::info;
use lumps_components::model::{ModelConfiguration, StorageSource};
use lumps_core::config::{PenmanMonteithParams, TuningSpec};
use lumps_core::timeseries::EnergyBalanceSeries;

/// Evaluate every `(alpha, beta)` cell of `tuning`, alpha varying slowest.
///
/// The storage heat flux always comes from the model, whatever the storage
/// source of `model`.
pub fn optimize_penman_monteith(
    model: &ModelConfiguration,
    observations: &EnergyBalanceSeries,
    tuning: &TuningSpec,
) -> Result<GridResults> {
    let alphas = parameter_space(tuning.alpha, tuning.number);
    let betas = parameter_space(tuning.beta, tuning.number);
    info!(
        "Searching {} Penman-Monteith cells",
        alphas.len() * betas.len()
    );

    let runner = PenmanMonteithRunner::new(
        model
            .clone()
            .with_storage_source(StorageSource::ModelStorage),
        observations,
        MeanPolicy::All,
    );
    runner.evaluate_grid(scan_order(&[alphas, betas]))
}

/// Parameters of the best cell of a Penman-Monteith grid, with its error.
pub fn best_penman_monteith(results: &GridResults) -> Result<(PenmanMonteithParams, f64)> {
    let best = results.best()?;
    info!(
        "Best Penman-Monteith alpha={} beta={} error={}",
        best.params[0], best.params[1], best.error
    );
    Ok((
        PenmanMonteithParams::new(best.params[0], best.params[1]),
        best.error,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};
    use lumps_core::surface::{MaterialCoefficients, SurfaceComposition};
    use ndarray::Array1;

    /// Observations generated by the model itself with `truth`.
    fn synthetic_observations(truth: PenmanMonteithParams) -> EnergyBalanceSeries {
        let t0 = Utc.with_ymd_and_hms(2005, 8, 20, 14, 0, 0).unwrap();
        let n = 16;
        let time = (0..n).map(|i| t0 + Duration::minutes(30 * i)).collect();
        let net: Array1<f64> = (0..n)
            .map(|i| 600.0 * (std::f64::consts::PI * i as f64 / n as f64).sin())
            .collect();
        let base = EnergyBalanceSeries::new(time)
            .with_column("net_radiation", net)
            .unwrap()
            .with_column("sensible_heat", Array1::zeros(n as usize))
            .unwrap()
            .with_column("latent_heat", Array1::zeros(n as usize))
            .unwrap()
            .with_column("temperature", Array1::linspace(16.0, 24.0, n as usize))
            .unwrap()
            .with_column("pressure", Array1::from_elem(n as usize, 1010.0))
            .unwrap();

        let modelled = configuration()
            .with_penman_monteith(truth)
            .build()
            .run(&base)
            .unwrap();
        let mut observations = base;
        observations
            .insert_column("sensible_heat", modelled.column("model_sensible").unwrap().clone())
            .unwrap();
        observations
            .insert_column("latent_heat", modelled.column("model_latent").unwrap().clone())
            .unwrap();
        observations
    }

    fn configuration() -> ModelConfiguration {
        ModelConfiguration::new(
            SurfaceComposition::learned(MaterialCoefficients::new(0.4, 0.3, -20.0)),
            PenmanMonteithParams::new(0.0, 0.0),
        )
    }

    #[test]
    fn test_recovers_grid_point() {
        let truth = PenmanMonteithParams::new(0.75, 10.0);
        let observations = synthetic_observations(truth);
        let tuning = TuningSpec {
            alpha: (0.0, 1.5),
            beta: (0.0, 30.0),
            number: 7,
        };

        let results = optimize_penman_monteith(&configuration(), &observations, &tuning).unwrap();
        assert_eq!(results.rows().len(), 49);
        assert_eq!(results.rows()[1].params, vec![0.0, 5.0]);

        let (best, error) = best_penman_monteith(&results).unwrap();
        assert_relative_eq!(best.alpha, 0.75, epsilon = 1e-12);
        assert_relative_eq!(best.beta, 10.0, epsilon = 1e-12);
        assert!(error < 1e-20);
    }
}
