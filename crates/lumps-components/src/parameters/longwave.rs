//! Longwave Radiation Parameters

use lumps_core::location::CloudCoverage;
use lumps_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the Burridge and Gadd longwave parameterisation.
///
/// # Default Values
///
/// The clear-sky net longwave flux is the value used for the reference site.
/// It is an empirical, site and season specific constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongwaveParameters {
    /// Clear-sky net longwave flux (W / m^2). Negative is a net loss.
    /// Default: -100.0
    pub clear_sky_flux: FloatValue,

    /// Cloud cover for the run. The parameterisation is constant in time.
    /// Default: no cloud
    pub clouds: CloudCoverage,
}

impl Default for LongwaveParameters {
    fn default() -> Self {
        Self {
            clear_sky_flux: -100.0,
            clouds: CloudCoverage::clear(),
        }
    }
}
