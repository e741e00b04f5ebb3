//! Physics components for the LUMPS surface energy balance model
//!
//! # Module Organisation
//!
//! Components are organised by the energy balance term they produce:
//! - `radiation`: Solar geometry (clear-sky shortwave) and the longwave parameterisation
//! - `storage`: Storage heat flux from the Objective Hysteresis Model (OHM)
//! - `penman_monteith`: Moisture relations and the sensible/latent heat partition
//! - `model`: The ordered pipeline that runs the components over an observation series
//!
//! # Parameters
//!
//! Components with tunable constants have an associated parameters struct in the
//! `parameters` module with defaults matching the reference site configuration.

pub mod model;
pub mod parameters;
pub mod penman_monteith;
pub mod radiation;
pub mod storage;
