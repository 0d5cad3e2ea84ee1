pub mod check;
pub mod probe;
pub mod result;
pub mod target;

pub mod prelude {
    pub use super::check::{Reachability, ReachabilityCheck, TcpCheck};
    pub use super::probe::{ProbeSettings, Prober};
    pub use super::result::{HostStats, ProbeOutcome};
    pub use super::target::Target;
}
