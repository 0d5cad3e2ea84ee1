use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, timeout};

use super::prelude::*;
use crate::error::SettingsError;

/// Default number of attempts per host.
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Default bound on a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Attempt count and per-attempt timeout for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    attempts: u32,
    timeout: Duration,
}

impl ProbeSettings {
    pub fn new(attempts: u32, timeout: Duration) -> Result<Self, SettingsError> {
        if timeout.is_zero() {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(Self { attempts, timeout })
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Runs sequential reachability checks against one address and reduces them
/// into [`HostStats`].
///
/// A `Prober` owns no mutable state, so clones can probe different hosts in
/// parallel.
#[derive(Clone)]
pub struct Prober {
    check: Arc<dyn ReachabilityCheck>,
    settings: ProbeSettings,
}

impl Prober {
    pub fn new(check: Arc<dyn ReachabilityCheck>, settings: ProbeSettings) -> Self {
        Self { check, settings }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Probe `address` with the configured number of attempts.
    pub async fn probe(&self, address: &str) -> HostStats {
        self.probe_with(address, self.settings.attempts).await
    }

    /// Probe `address` with an explicit number of attempts.
    ///
    /// Attempts run strictly one after another. The loop stops at the first
    /// negative answer or resolution/connection error; the slots it never
    /// issued still count as failures against `attempts`. Timeouts do not
    /// stop it.
    pub async fn probe_with(&self, address: &str, attempts: u32) -> HostStats {
        let mut outcomes = Vec::with_capacity(attempts.min(64) as usize);

        for attempt in 1..=attempts {
            let outcome = self.attempt(address).await;
            match outcome {
                ProbeOutcome::Success(elapsed) => {
                    tracing::debug!(
                        address,
                        attempt,
                        latency_ms = elapsed.as_secs_f64() * 1000.0,
                        "probe successful"
                    );
                }
                ProbeOutcome::Unreachable => {
                    tracing::debug!(address, attempt, "probe unreachable");
                }
                ProbeOutcome::Timeout => {
                    tracing::debug!(
                        address,
                        attempt,
                        timeout_ms = self.settings.timeout.as_millis() as u64,
                        "probe timed out"
                    );
                }
                ProbeOutcome::Error => {}
            }
            outcomes.push(outcome);
            if outcome.aborts() {
                tracing::warn!(
                    address,
                    attempt,
                    remaining = attempts - attempt,
                    "stopping probe early"
                );
                break;
            }
        }

        HostStats::from_outcomes(address, attempts, &outcomes)
    }

    async fn attempt(&self, address: &str) -> ProbeOutcome {
        let start = Instant::now();
        let result = timeout(self.settings.timeout, self.check.check(address)).await;
        let elapsed = start.elapsed();

        match result {
            Ok(Ok(Reachability::Reachable)) => ProbeOutcome::Success(elapsed),
            Ok(Ok(Reachability::Unreachable)) => ProbeOutcome::Unreachable,
            Ok(Err(e)) => {
                tracing::warn!(address, error = %e, "probe error");
                ProbeOutcome::Error
            }
            Err(_) => ProbeOutcome::Timeout,
        }
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
