use super::moisture::{psychrometric_constant, slope_of_saturation_curve};
use lumps_core::component::{Component, OutputColumns, RequirementDefinition};
use lumps_core::config::PenmanMonteithParams;
use lumps_core::errors::LumpsResult;
use lumps_core::standard_variables::{
    VAR_MODEL_LATENT, VAR_MODEL_SENSIBLE, VAR_NET_RADIATION, VAR_PRESSURE, VAR_STORAGE,
    VAR_TEMPERATURE,
};
use lumps_core::timeseries::{EnergyBalanceSeries, FloatValue};
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

/// Sensible and latent heat flux (W / m^2) for one time step.
///
/// $$Q_H = \frac{1 - \alpha + \gamma / \Delta}{1 + \gamma / \Delta} (Q^* - \Delta Q_S) - \beta$$
/// $$Q_E = \frac{\alpha}{1 + \gamma / \Delta} (Q^* - \Delta Q_S) + \beta$$
///
/// The two fluxes always sum to the available energy $Q^* - \Delta Q_S$.
pub fn sensible_and_latent_heat(
    params: &PenmanMonteithParams,
    net_radiation: FloatValue,
    storage: FloatValue,
    temperature: FloatValue,
    pressure: FloatValue,
) -> (FloatValue, FloatValue) {
    let ratio = psychrometric_constant(pressure) / slope_of_saturation_curve(temperature);
    let available = net_radiation - storage;

    let sensible = (1.0 - params.alpha + ratio) / (1.0 + ratio) * available - params.beta;
    let latent = params.alpha / (1.0 + ratio) * available + params.beta;
    (sensible, latent)
}

/// Partitions the energy left after storage into modelled sensible and latent
/// heat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensibleLatentPartition {
    parameters: PenmanMonteithParams,
}

impl SensibleLatentPartition {
    pub fn from_parameters(parameters: PenmanMonteithParams) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for SensibleLatentPartition {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_NET_RADIATION),
            RequirementDefinition::input(&VAR_STORAGE),
            RequirementDefinition::input(&VAR_TEMPERATURE),
            RequirementDefinition::input(&VAR_PRESSURE),
            RequirementDefinition::output(&VAR_MODEL_SENSIBLE),
            RequirementDefinition::output(&VAR_MODEL_LATENT),
        ]
    }

    fn solve(&self, series: &EnergyBalanceSeries) -> LumpsResult<OutputColumns> {
        let mut sensible: Array1<FloatValue> = Array1::zeros(series.len());
        let mut latent: Array1<FloatValue> = Array1::zeros(series.len());

        Zip::from(&mut sensible)
            .and(&mut latent)
            .and(series.require_column(VAR_NET_RADIATION.name)?)
            .and(series.require_column(VAR_STORAGE.name)?)
            .and(series.require_column(VAR_TEMPERATURE.name)?)
            .and(series.require_column(VAR_PRESSURE.name)?)
            .for_each(|qh, qe, &net, &storage, &temperature, &pressure| {
                (*qh, *qe) =
                    sensible_and_latent_heat(&self.parameters, net, storage, temperature, pressure);
            });

        Ok(OutputColumns::from([
            (VAR_MODEL_SENSIBLE.name.to_string(), sensible),
            (VAR_MODEL_LATENT.name.to_string(), latent),
        ]))
    }
}
