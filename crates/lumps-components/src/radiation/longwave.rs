//! Longwave Radiation component
//!
//! Adds a constant net longwave flux to the observed net shortwave radiation.
//! The Burridge and Gadd parameterisation depends only on cloud cover, so the
//! longwave term is the same at every time step of a run. It is not a transient
//! model.

use crate::parameters::LongwaveParameters;
use lumps_core::component::{Component, OutputColumns, RequirementDefinition};
use lumps_core::errors::LumpsResult;
use lumps_core::location::CloudCoverage;
use lumps_core::standard_variables::{VAR_LONGWAVE, VAR_NET_ALL_WAVE, VAR_NET_RADIATION};
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Net longwave flux (W / m^2) for the given cloud cover.
///
/// $$L^* = K (1 - 0.1 \sigma_H - 0.3 \sigma_M - 0.6 \sigma_L)$$
pub fn burridge_gadd_parameterization(
    clear_sky_flux: FloatValue,
    clouds: &CloudCoverage,
) -> FloatValue {
    clear_sky_flux * (1.0 - 0.1 * clouds.high - 0.3 * clouds.medium - 0.6 * clouds.low)
}

/// Converts net shortwave to net all-wave radiation.
///
/// Outputs the constant `longwave` column and `net_all_wave`, and replaces
/// `net_radiation` with the all-wave value so every later stage uses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongwaveRadiation {
    parameters: LongwaveParameters,
}

impl LongwaveRadiation {
    pub fn from_parameters(parameters: LongwaveParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_longwave(&self) -> FloatValue {
        burridge_gadd_parameterization(self.parameters.clear_sky_flux, &self.parameters.clouds)
    }
}

#[typetag::serde]
impl Component for LongwaveRadiation {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_NET_RADIATION),
            RequirementDefinition::output(&VAR_LONGWAVE),
            RequirementDefinition::output(&VAR_NET_ALL_WAVE),
            RequirementDefinition::output(&VAR_NET_RADIATION),
        ]
    }

    fn solve(&self, series: &EnergyBalanceSeries) -> LumpsResult<OutputColumns> {
        let net_radiation = series.require_column(VAR_NET_RADIATION.name)?;
        let longwave = Array1::from_elem(series.len(), self.calculate_longwave());
        let net_all_wave = net_radiation + &longwave;

        Ok(OutputColumns::from([
            (VAR_LONGWAVE.name.to_string(), longwave),
            (VAR_NET_ALL_WAVE.name.to_string(), net_all_wave.clone()),
            (VAR_NET_RADIATION.name.to_string(), net_all_wave),
        ]))
    }
}
