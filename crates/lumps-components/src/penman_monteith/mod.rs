//! Penman-Monteith partition of available energy
//!
//! The energy left after storage, $A = Q^* - \Delta Q_S$, is split into sensible
//! and latent heat using the de Bruin and Holtslag form of the Penman-Monteith
//! equation with the two empirical parameters $\alpha$ and $\beta$.

pub mod moisture;
mod partition;

pub use partition::{sensible_and_latent_heat, SensibleLatentPartition};
