//! Normalised squared error between modelled and observed fluxes
//!
//! Both series are standardised with the statistics of the observations,
//!
//! $$z(x) = \frac{x - \bar{o}}{s_o}$$
//!
//! and the error of a row is $(z(m) - z(o))^2$. With two flux columns the row
//! error is the mean of the sensible and latent terms. The score is the mean
//! row error over the series.
//!
//! A constant observation column has zero standard deviation and gives a NaN
//! error. That is not an error here; grid searches skip non-finite cells.

use crate::{Error, Result};
use lumps_components::model::StorageSource;
use lumps_core::errors::LumpsError;
use lumps_core::standard_variables::{
    VAR_LATENT_HEAT, VAR_MODEL_LATENT, VAR_MODEL_SENSIBLE, VAR_RESIDUAL, VAR_SENSIBLE_HEAT,
    VAR_STORAGE,
};
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Which observations contribute to the mean used for standardisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeanPolicy {
    /// Mean of every observation
    #[default]
    All,
    /// Mean of the nonzero observations only
    NonZero,
}

/// Standardisation statistics of an observed column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: FloatValue,
    /// Sample standard deviation (n - 1 degrees of freedom)
    pub standard_deviation: FloatValue,
}

impl Statistics {
    pub fn from_observations(observed: ArrayView1<FloatValue>, policy: MeanPolicy) -> Self {
        let mean = match policy {
            MeanPolicy::All => mean(observed.iter().copied()),
            MeanPolicy::NonZero => mean(observed.iter().copied().filter(|v| *v != 0.0)),
        };
        let standard_deviation = if observed.len() < 2 {
            FloatValue::NAN
        } else {
            observed.std(1.0)
        };
        Self {
            mean,
            standard_deviation,
        }
    }

    pub fn normalize(&self, value: FloatValue) -> FloatValue {
        (value - self.mean) / self.standard_deviation
    }
}

fn mean(values: impl Iterator<Item = FloatValue>) -> FloatValue {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    sum / count as FloatValue
}

fn squared_errors(
    observed: ArrayView1<FloatValue>,
    modelled: ArrayView1<FloatValue>,
    policy: MeanPolicy,
) -> Result<Array1<FloatValue>> {
    if observed.len() != modelled.len() {
        return Err(LumpsError::InvalidArgument(format!(
            "Expected {} modelled values, got {}",
            observed.len(),
            modelled.len()
        ))
        .into());
    }
    let stats = Statistics::from_observations(observed, policy);
    Ok(ndarray::Zip::from(&observed)
        .and(&modelled)
        .map_collect(|&o, &m| {
            let difference = stats.normalize(m) - stats.normalize(o);
            difference * difference
        }))
}

fn mean_of(errors: &Array1<FloatValue>) -> FloatValue {
    errors.mean().unwrap_or(FloatValue::NAN)
}

/// Mean normalised squared error of a single modelled column.
pub fn normalized_squared_error(
    observed: ArrayView1<FloatValue>,
    modelled: ArrayView1<FloatValue>,
    policy: MeanPolicy,
) -> Result<FloatValue> {
    Ok(mean_of(&squared_errors(observed, modelled, policy)?))
}

/// Mean normalised squared error of modelled latent and sensible heat.
pub fn calculate_normalized_squared_error(
    observed_latent: ArrayView1<FloatValue>,
    observed_sensible: ArrayView1<FloatValue>,
    modelled_latent: ArrayView1<FloatValue>,
    modelled_sensible: ArrayView1<FloatValue>,
    policy: MeanPolicy,
) -> Result<FloatValue> {
    let sensible = squared_errors(observed_sensible, modelled_sensible, policy)?;
    let latent = squared_errors(observed_latent, modelled_latent, policy)?;
    if sensible.len() != latent.len() {
        return Err(Error::CalibrationError(format!(
            "Sensible and latent heat have different lengths ({} and {})",
            sensible.len(),
            latent.len()
        )));
    }
    Ok(mean_of(&((sensible + latent) / 2.0)))
}

/// Score a model run against the observations carried in the same series.
///
/// With [`StorageSource::ModelStorage`] the modelled sensible and latent heat
/// are scored. With [`StorageSource::ResidualStorage`] the OHM storage is scored
/// against the observed residual.
pub fn score_model_output(
    series: &EnergyBalanceSeries,
    storage_source: StorageSource,
    policy: MeanPolicy,
) -> Result<FloatValue> {
    match storage_source {
        StorageSource::ModelStorage => calculate_normalized_squared_error(
            series.require_column(VAR_LATENT_HEAT.name)?.view(),
            series.require_column(VAR_SENSIBLE_HEAT.name)?.view(),
            series.require_column(VAR_MODEL_LATENT.name)?.view(),
            series.require_column(VAR_MODEL_SENSIBLE.name)?.view(),
            policy,
        ),
        StorageSource::ResidualStorage => normalized_squared_error(
            series.require_column(VAR_RESIDUAL.name)?.view(),
            series.require_column(VAR_STORAGE.name)?.view(),
            policy,
        ),
    }
}
