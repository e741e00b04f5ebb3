//! Radiation components
//!
//! - `solar`: Astronomical solar geometry and clear-sky shortwave flux
//! - `longwave`: Constant cloud-dependent net longwave flux

pub mod longwave;
pub mod solar;

pub use longwave::{burridge_gadd_parameterization, LongwaveRadiation};
pub use solar::{calc_radiation_flux, get_radiation_variables, RadiationVariables};
