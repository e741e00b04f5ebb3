//! Moisture relations of near-surface air
//!
//! Pressures are in hPa and temperatures in degrees Celsius unless noted.

use lumps_core::timeseries::FloatValue;

/// Specific heat of dry air at constant pressure (J / K / kg)
pub const SPECIFIC_HEAT_AIR: FloatValue = 1004.0;
/// Latent heat of vaporisation (J / kg)
pub const LATENT_HEAT_VAPORIZATION: FloatValue = 2.5e6;
/// Ratio of the gas constants of dry air and water vapour (kg / kg)
pub const EPSILON: FloatValue = 0.622;
/// Saturation vapour pressure at the reference temperature (hPa)
pub const REFERENCE_VAPOR_PRESSURE: FloatValue = 6.113;
/// Gas constant of water vapour (J / K / kg)
pub const WATER_VAPOR_GAS_CONSTANT: FloatValue = 461.0;
/// Reference temperature (K)
pub const REFERENCE_TEMPERATURE: FloatValue = 273.15;

pub fn as_kelvin(temperature: FloatValue) -> FloatValue {
    temperature + 273.15
}

/// Psychrometric constant $\gamma$ (hPa / K) at the given pressure.
///
/// $$\gamma = \frac{c_p}{L_v} \frac{p}{\epsilon}$$
pub fn psychrometric_constant(pressure: FloatValue) -> FloatValue {
    SPECIFIC_HEAT_AIR / LATENT_HEAT_VAPORIZATION * pressure / EPSILON
}

/// Saturation vapour pressure from the Clausius-Clapeyron relation (hPa).
///
/// $$e_s = e_0 \exp\left(\frac{L_v}{R_v}\left(\frac{1}{T_0} - \frac{1}{T}\right)\right)$$
pub fn saturation_vapor_pressure(temperature: FloatValue) -> FloatValue {
    let kelvin = as_kelvin(temperature);
    REFERENCE_VAPOR_PRESSURE
        * ((LATENT_HEAT_VAPORIZATION / WATER_VAPOR_GAS_CONSTANT)
            * (1.0 / REFERENCE_TEMPERATURE - 1.0 / kelvin))
            .exp()
}

/// Slope $\Delta$ of the saturation vapour pressure curve (hPa / K).
///
/// $$\Delta = \frac{L_v}{R_v} \frac{e_s(T)}{T^2}$$
pub fn slope_of_saturation_curve(temperature: FloatValue) -> FloatValue {
    let kelvin = as_kelvin(temperature);
    LATENT_HEAT_VAPORIZATION / WATER_VAPOR_GAS_CONSTANT / (kelvin * kelvin)
        * saturation_vapor_pressure(temperature)
}

/// Forward differences of `series` sampled every `step`.
///
/// Has one fewer element than `series`.
pub fn finite_difference(series: &[FloatValue], step: FloatValue) -> Vec<FloatValue> {
    series.windows(2).map(|w| (w[1] - w[0]) / step).collect()
}
