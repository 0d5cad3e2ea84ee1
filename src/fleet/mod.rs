pub mod runner;

pub use runner::Fleet;

use crate::probe::result::HostStats;

/// Progress hook invoked as each host of a fleet finishes.
///
/// Calls arrive in completion order; `index` is the host's position in the input.
pub trait ProbeObserver: Send + Sync + 'static {
    fn on_host_complete(&self, index: usize, stats: &HostStats);
}

impl<F> ProbeObserver for F
where
    F: Fn(usize, &HostStats) + Send + Sync + 'static,
{
    fn on_host_complete(&self, index: usize, stats: &HostStats) {
        self(index, stats)
    }
}
