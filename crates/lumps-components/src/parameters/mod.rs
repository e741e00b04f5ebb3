//! Component parameters
//!
//! Each parameter struct provides defaults and supports partial
//! deserialisation through `#[serde(default)]`.

mod longwave;
mod solar;

pub use longwave::LongwaveParameters;
pub use solar::SolarParameters;
