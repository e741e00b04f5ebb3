//! Site description shared by the radiation components.

use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Geographic location of the measurement site.
///
/// Longitude is positive **west** of Greenwich, so Vancouver is
/// `Location::new(49.25, 123.1, "US/Pacific")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude (degrees north)
    pub latitude: FloatValue,
    /// Longitude (degrees west)
    pub longitude: FloatValue,
    /// IANA time zone identifier of the site, e.g. "US/Mountain"
    pub timezone: String,
}

impl Location {
    pub fn new(latitude: FloatValue, longitude: FloatValue, timezone: &str) -> Self {
        Self {
            latitude,
            longitude,
            timezone: timezone.to_string(),
        }
    }
}

/// Fractional cloud cover in three independent layers.
///
/// Each fraction is expected to lie in $[0, 1]$.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudCoverage {
    pub high: FloatValue,
    pub medium: FloatValue,
    pub low: FloatValue,
}

impl CloudCoverage {
    pub fn new(high: FloatValue, medium: FloatValue, low: FloatValue) -> Self {
        Self { high, medium, low }
    }

    /// A sky without cloud.
    pub fn clear() -> Self {
        Self::default()
    }
}
