use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome of one attempt against an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The address answered within the timeout.
    Success(Duration),
    /// The address answered negatively. Ends the loop for this host.
    Unreachable,
    /// No answer within the per-attempt timeout.
    Timeout,
    /// Resolution or connection error. Ends the loop for this host.
    Error,
}

impl ProbeOutcome {
    pub fn latency(&self) -> Option<Duration> {
        match self {
            Self::Success(elapsed) => Some(*elapsed),
            _ => None,
        }
    }

    pub fn aborts(&self) -> bool {
        matches!(self, Self::Unreachable | Self::Error)
    }
}

/// Aggregate of all attempts against one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostStats {
    /// The probed address, as given by the caller.
    pub address: String,

    /// Configured number of attempts. Always `success_count + failure_count`.
    pub total_attempts: u32,

    pub success_count: u32,

    pub failure_count: u32,

    /// Attempts actually issued. Lower than `total_attempts` when the loop
    /// stopped early on a negative answer or an error.
    pub completed_attempts: u32,

    /// Mean elapsed time over successful attempts, `None` without any.
    #[serde(default, with = "humantime_serde")]
    pub average_latency: Option<Duration>,
}

impl HostStats {
    /// Reduce the outcomes of the attempts that ran into the aggregate for
    /// `total_attempts` configured attempts. Unissued slots count as failures.
    ///
    /// Only the first `total_attempts` outcomes are considered, and nothing
    /// after the first outcome that ends the loop.
    pub fn from_outcomes(
        address: impl Into<String>,
        total_attempts: u32,
        outcomes: &[ProbeOutcome],
    ) -> Self {
        let outcomes = &outcomes[..outcomes.len().min(total_attempts as usize)];
        let outcomes = match outcomes.iter().position(ProbeOutcome::aborts) {
            Some(last) => &outcomes[..=last],
            None => outcomes,
        };

        let samples: Vec<Duration> = outcomes.iter().filter_map(ProbeOutcome::latency).collect();
        let completed_attempts = outcomes.len() as u32;
        let success_count = samples.len() as u32;

        let average_latency = match samples.len() {
            0 => None,
            n => Some(samples.iter().sum::<Duration>() / n as u32),
        };

        Self {
            address: address.into(),
            total_attempts,
            success_count,
            failure_count: total_attempts - success_count,
            completed_attempts,
            average_latency,
        }
    }

    /// Stats for a host whose probe never produced any outcome.
    pub fn all_failed(address: impl Into<String>, total_attempts: u32) -> Self {
        Self::from_outcomes(address, total_attempts, &[])
    }

    pub fn average_latency_ms(&self) -> Option<f64> {
        self.average_latency.map(|d| d.as_secs_f64() * 1000.0)
    }

    pub fn is_reachable(&self) -> bool {
        self.success_count > 0
    }

    /// Share of configured attempts that failed, `0.0` when nothing was configured.
    pub fn loss_ratio(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        self.failure_count as f64 / self.total_attempts as f64
    }
}
