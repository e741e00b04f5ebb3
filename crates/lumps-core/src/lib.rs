//! Core types for the LUMPS surface energy balance model.
//!
//! This crate holds the pieces shared by the physics components and the
//! calibration engine:
//!
//! - [`timeseries`]: the time-indexed [`EnergyBalanceSeries`](timeseries::EnergyBalanceSeries) table
//! - [`location`]: site location and cloud cover
//! - [`surface`]: surface material composition used by the storage model
//! - [`component`]: the [`Component`](component::Component) trait implemented by model stages
//! - [`config`]: experiment configuration resolved into closed sum types
//! - [`standard_variables`]: names and units of the standard columns

pub mod component;
pub mod config;
pub mod errors;
pub mod location;
pub mod standard_variables;
pub mod surface;
pub mod timeseries;
