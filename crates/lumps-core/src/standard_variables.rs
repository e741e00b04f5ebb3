//! Standard column definitions for the energy balance series.
//!
//! Every column that a component reads or writes is declared here with its
//! unit, so components and the calibration engine refer to columns by a shared
//! constant rather than a string literal.
//!
//! # Usage
//!
//! ```rust
//! use lumps_core::standard_variables::VAR_NET_RADIATION;
//!
//! assert_eq!(VAR_NET_RADIATION.name, "net_radiation");
//! assert_eq!(VAR_NET_RADIATION.unit, "W / m^2");
//! ```
//!
//! # Available Variables
//!
//! ## Meteorology
//! - `VAR_PRESSURE` - Surface pressure in hPa
//! - `VAR_TEMPERATURE` - Air temperature in degC
//!
//! ## Radiation
//! - `VAR_NET_RADIATION` - Net radiation Q* in W / m^2
//! - `VAR_LONGWAVE` - Net longwave radiation in W / m^2
//! - `VAR_NET_ALL_WAVE` - Net all-wave radiation in W / m^2
//!
//! ## Storage
//! - `VAR_STORAGE` - Storage heat flux from the Objective Hysteresis Model in W / m^2
//! - `VAR_RESIDUAL` - Storage heat flux from the observed residual in W / m^2
//!
//! ## Turbulent fluxes
//! - `VAR_SENSIBLE_HEAT` / `VAR_LATENT_HEAT` - Observed fluxes in W / m^2
//! - `VAR_MODEL_SENSIBLE` / `VAR_MODEL_LATENT` - Modelled fluxes in W / m^2

use serde::Serialize;

/// A named column with a fixed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StandardVariable {
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
}

macro_rules! define_standard_variable {
    ($ident:ident, name = $name:expr, unit = $unit:expr, description = $description:expr $(,)?) => {
        pub const $ident: StandardVariable = StandardVariable {
            name: $name,
            unit: $unit,
            description: $description,
        };
    };
}

// ============================================================================
// Meteorology
// ============================================================================

define_standard_variable!(
    VAR_PRESSURE,
    name = "pressure",
    unit = "hPa",
    description = "Surface air pressure",
);

define_standard_variable!(
    VAR_TEMPERATURE,
    name = "temperature",
    unit = "degC",
    description = "Near-surface air temperature",
);

// ============================================================================
// Radiation
// ============================================================================

define_standard_variable!(
    VAR_NET_RADIATION,
    name = "net_radiation",
    unit = "W / m^2",
    description = "Net radiation Q* used by the storage and partition stages",
);

define_standard_variable!(
    VAR_LONGWAVE,
    name = "longwave",
    unit = "W / m^2",
    description = "Net longwave radiation (negative is a net loss)",
);

define_standard_variable!(
    VAR_NET_ALL_WAVE,
    name = "net_all_wave",
    unit = "W / m^2",
    description = "Net shortwave plus net longwave radiation",
);

// ============================================================================
// Storage
// ============================================================================

define_standard_variable!(
    VAR_STORAGE,
    name = "storage",
    unit = "W / m^2",
    description = "Storage heat flux estimated by the Objective Hysteresis Model",
);

define_standard_variable!(
    VAR_RESIDUAL,
    name = "residual",
    unit = "W / m^2",
    description = "Storage heat flux estimated as Q* - Q_H - Q_E from observations",
);

// ============================================================================
// Turbulent fluxes
// ============================================================================

define_standard_variable!(
    VAR_SENSIBLE_HEAT,
    name = "sensible_heat",
    unit = "W / m^2",
    description = "Observed sensible heat flux Q_H",
);

define_standard_variable!(
    VAR_LATENT_HEAT,
    name = "latent_heat",
    unit = "W / m^2",
    description = "Observed latent heat flux Q_E",
);

define_standard_variable!(
    VAR_MODEL_SENSIBLE,
    name = "model_sensible",
    unit = "W / m^2",
    description = "Sensible heat flux from the Penman-Monteith partition",
);

define_standard_variable!(
    VAR_MODEL_LATENT,
    name = "model_latent",
    unit = "W / m^2",
    description = "Latent heat flux from the Penman-Monteith partition",
);
