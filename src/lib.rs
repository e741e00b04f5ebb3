//! LUMPS: a local-scale surface energy balance model
//!
//! Re-exports the member crates:
//!
//! - [`core`]: energy balance series, configuration, errors and the component trait
//! - [`components`]: radiation, OHM storage and the Penman-Monteith partition
//! - [`calibrate`]: grid-search calibration against observed fluxes

pub use lumps_calibrate as calibrate;
pub use lumps_components as components;
pub use lumps_core as core;
