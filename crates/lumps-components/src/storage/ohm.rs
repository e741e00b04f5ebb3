//! Objective Hysteresis Model (OHM)
//!
//! Estimates the storage heat flux as a partition of net radiation with a
//! hysteresis term, weighted over the surface materials of the site:
//!
//! $$\Delta Q_S = \sum_i \frac{f_i}{\sum_j f_j} \left(a_{1,i} Q^* + a_{2,i} \frac{\partial Q^*}{\partial t} + a_{3,i}\right)$$
//!
//! # Rate of change
//!
//! $\partial Q^* / \partial t$ is either supplied by the caller or derived from
//! the time axis with a centred difference. The series is padded by repeating
//! its first and last values, so the end points use a one-sided difference.
//! This edge padding is kept as-is; it biases the end point estimates.

use chrono::{DateTime, Utc};
use lumps_core::component::{Component, OutputColumns, RequirementDefinition};
use lumps_core::errors::{LumpsError, LumpsResult};
use lumps_core::standard_variables::{
    VAR_LATENT_HEAT, VAR_NET_RADIATION, VAR_RESIDUAL, VAR_SENSIBLE_HEAT, VAR_STORAGE,
};
use lumps_core::surface::SurfaceComposition;
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Source of $\partial Q^* / \partial t$ for each net radiation value.
#[derive(Debug, Clone, Copy)]
pub enum RateOfChange<'a> {
    /// Instants of each net radiation value; the rate is derived from them
    TimeAxis(&'a [DateTime<Utc>]),
    /// Rate of change (W / m^2 / s) co-indexed with net radiation
    Derivatives(&'a [FloatValue]),
}

/// Storage heat flux for each net radiation value (W / m^2).
///
/// The output has the same length and order as `net_radiation`.
pub fn calculate_storage(
    surface: &SurfaceComposition,
    net_radiation: &[FloatValue],
    rate_of_change: RateOfChange,
) -> LumpsResult<Array1<FloatValue>> {
    let normalization_factor = surface.normalization_factor()?;

    let derivatives = match rate_of_change {
        RateOfChange::TimeAxis(time) => get_rate_of_change(net_radiation, time)?,
        RateOfChange::Derivatives(derivatives) => {
            if derivatives.len() != net_radiation.len() {
                return Err(LumpsError::InvalidArgument(format!(
                    "Expected {} rate of change values, got {}",
                    net_radiation.len(),
                    derivatives.len()
                )));
            }
            Array1::from(derivatives.to_vec())
        }
    };

    Ok(net_radiation
        .iter()
        .zip(derivatives.iter())
        .map(|(&q, &dq_dt)| estimate_storage(surface, normalization_factor, q, dq_dt))
        .collect())
}

/// Storage heat flux where exactly one of `derivatives` and `time` is supplied.
///
/// Supplying neither or both is an [`LumpsError::InvalidArgument`].
pub fn calculate_storage_heat_flux(
    surface: &SurfaceComposition,
    net_radiation: &[FloatValue],
    derivatives: Option<&[FloatValue]>,
    time: Option<&[DateTime<Utc>]>,
) -> LumpsResult<Array1<FloatValue>> {
    let rate_of_change = match (derivatives, time) {
        (Some(derivatives), None) => RateOfChange::Derivatives(derivatives),
        (None, Some(time)) => RateOfChange::TimeAxis(time),
        (None, None) => {
            return Err(LumpsError::InvalidArgument(
                "Must provide either time or the net radiation rate of change".to_string(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(LumpsError::InvalidArgument(
                "Provide only one of time and the net radiation rate of change".to_string(),
            ))
        }
    };
    calculate_storage(surface, net_radiation, rate_of_change)
}

/// OHM for a single point.
pub fn estimate_storage(
    surface: &SurfaceComposition,
    normalization_factor: FloatValue,
    net_radiation: FloatValue,
    d_net_radiation_dt: FloatValue,
) -> FloatValue {
    surface
        .rows()
        .iter()
        .map(|row| {
            let c = &row.coefficients;
            row.fraction / normalization_factor
                * (c.a1 * net_radiation + c.a2 * d_net_radiation_dt + c.a3)
        })
        .sum()
}

/// Centred rate of change of `values` (per second) over `time`.
///
/// A zero elapsed time (a single point, or repeated instants) gives a zero rate.
pub fn get_rate_of_change(
    values: &[FloatValue],
    time: &[DateTime<Utc>],
) -> LumpsResult<Array1<FloatValue>> {
    if values.len() != time.len() {
        return Err(LumpsError::InvalidArgument(format!(
            "Expected {} instants, got {}",
            values.len(),
            time.len()
        )));
    }
    let seconds: Vec<FloatValue> = time
        .iter()
        .map(|t| t.timestamp_millis() as FloatValue / 1000.0)
        .collect();

    Ok(get_delta(values)
        .into_iter()
        .zip(get_delta(&seconds))
        .map(|(dq, dt)| if dt == 0.0 { 0.0 } else { dq / dt })
        .collect())
}

/// `padded[i + 2] - padded[i]` where `padded` repeats the first and last values.
fn get_delta(values: &[FloatValue]) -> Vec<FloatValue> {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return Vec::new();
    };
    let mut padded = Vec::with_capacity(values.len() + 2);
    padded.push(*first);
    padded.extend_from_slice(values);
    padded.push(*last);

    padded.windows(3).map(|w| w[2] - w[0]).collect()
}

/// Storage heat flux from the Objective Hysteresis Model.
///
/// Also outputs the residual storage $Q^* - Q_H - Q_E$ from the observed
/// turbulent fluxes, so the two estimates can be compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageHeatFlux {
    surface: SurfaceComposition,
}

impl StorageHeatFlux {
    pub fn from_parameters(surface: SurfaceComposition) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &SurfaceComposition {
        &self.surface
    }
}

#[typetag::serde]
impl Component for StorageHeatFlux {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_NET_RADIATION),
            RequirementDefinition::input(&VAR_SENSIBLE_HEAT),
            RequirementDefinition::input(&VAR_LATENT_HEAT),
            RequirementDefinition::output(&VAR_STORAGE),
            RequirementDefinition::output(&VAR_RESIDUAL),
        ]
    }

    fn solve(&self, series: &EnergyBalanceSeries) -> LumpsResult<OutputColumns> {
        let net_radiation = series.require_column(VAR_NET_RADIATION.name)?;
        let sensible = series.require_column(VAR_SENSIBLE_HEAT.name)?;
        let latent = series.require_column(VAR_LATENT_HEAT.name)?;

        let storage = calculate_storage(
            &self.surface,
            &net_radiation.to_vec(),
            RateOfChange::TimeAxis(series.time()),
        )?;
        let residual = net_radiation - sensible - latent;

        Ok(OutputColumns::from([
            (VAR_STORAGE.name.to_string(), storage),
            (VAR_RESIDUAL.name.to_string(), residual),
        ]))
    }
}
