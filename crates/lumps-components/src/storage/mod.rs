//! Storage heat flux components
//!
//! - `ohm`: Objective Hysteresis Model estimate of the storage heat flux

pub mod ohm;

pub use ohm::{calculate_storage, calculate_storage_heat_flux, RateOfChange, StorageHeatFlux};
