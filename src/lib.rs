//! Concurrent host reachability and latency probing.
//!
//! A [`Prober`] runs a fixed number of sequential, time-bounded reachability
//! checks against one address and reduces them into [`HostStats`]. A [`Fleet`]
//! runs one prober task per address and returns the results in input order.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fleet;
pub mod probe;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CatalogError, CheckError, ConfigError, FleetError, SettingsError};
pub use fleet::{Fleet, ProbeObserver};
pub use probe::prelude::*;
