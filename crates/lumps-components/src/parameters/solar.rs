//! Solar Geometry Parameters

use lumps_core::location::CloudCoverage;
use lumps_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Surface orientation and attenuation used by the solar geometry calculation.
///
/// # Default Values
///
/// A horizontal, perfectly absorbing surface under a clear sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarParameters {
    /// Slope of the receiving surface from horizontal (degrees).
    /// Default: 0.0
    pub slope_angle: FloatValue,

    /// Azimuth the slope faces, clockwise from north (degrees).
    /// Default: 0.0
    pub slope_azimuth: FloatValue,

    /// Cloud cover attenuating the direct beam.
    /// Default: no cloud
    pub clouds: CloudCoverage,

    /// Surface albedo (dimensionless).
    /// Default: 0.0
    pub albedo: FloatValue,
}

impl Default for SolarParameters {
    fn default() -> Self {
        Self {
            slope_angle: 0.0,
            slope_azimuth: 0.0,
            clouds: CloudCoverage::clear(),
            albedo: 0.0,
        }
    }
}

impl SolarParameters {
    /// Horizontal surface with the given albedo.
    pub fn with_albedo(albedo: FloatValue) -> Self {
        Self {
            albedo,
            ..Self::default()
        }
    }
}
