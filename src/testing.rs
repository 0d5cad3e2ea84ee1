//! Scripted reachability check for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CheckError;
use crate::probe::prelude::*;

#[derive(Debug, Clone)]
pub enum Script {
    Reachable(Duration),
    Unreachable,
    ResolutionError,
    Panic,
    /// One entry per call, the last entry repeats.
    Sequence(Vec<Script>),
}

impl Script {
    pub fn reachable_after(delay: Duration) -> Self {
        Self::Reachable(delay)
    }

    fn for_call(&self, call: usize) -> &Script {
        match self {
            Self::Sequence(steps) => match steps.get(call).or_else(|| steps.last()) {
                Some(step) => step.for_call(call),
                None => &Script::Unreachable,
            },
            other => other,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    calls: usize,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedCheck {
    scripts: Arc<HashMap<String, Script>>,
    counters: Arc<Mutex<HashMap<String, Counters>>>,
}

impl ScriptedCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, address: &str, script: Script) -> Self {
        Arc::make_mut(&mut self.scripts).insert(address.to_string(), script);
        self
    }

    pub fn calls(&self, address: &str) -> usize {
        self.counters.lock().unwrap().get(address).map_or(0, |c| c.calls)
    }

    pub fn in_flight(&self, address: &str) -> usize {
        self.counters.lock().unwrap().get(address).map_or(0, |c| c.in_flight)
    }

    pub fn max_in_flight(&self, address: &str) -> usize {
        self.counters.lock().unwrap().get(address).map_or(0, |c| c.max_in_flight)
    }

    fn enter(&self, address: &str) -> usize {
        let mut counters = self.counters.lock().unwrap();
        let c = counters.entry(address.to_string()).or_default();
        let call = c.calls;
        c.calls += 1;
        c.in_flight += 1;
        c.max_in_flight = c.max_in_flight.max(c.in_flight);
        call
    }
}

/// Decrements the in-flight counter even when the check future is dropped by a timeout.
struct InFlight<'a> {
    check: &'a ScriptedCheck,
    address: &'a str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(c) = self.check.counters.lock().unwrap().get_mut(self.address) {
            c.in_flight -= 1;
        }
    }
}

#[async_trait]
impl ReachabilityCheck for ScriptedCheck {
    async fn check(&self, address: &str) -> Result<Reachability, CheckError> {
        let call = self.enter(address);
        let _guard = InFlight { check: self, address };
        let script = self
            .scripts
            .get(address)
            .map(|s| s.for_call(call).clone())
            .unwrap_or(Script::ResolutionError);

        match script {
            Script::Reachable(delay) => {
                tokio::time::sleep(delay).await;
                Ok(Reachability::Reachable)
            }
            Script::Unreachable => Ok(Reachability::Unreachable),
            Script::ResolutionError => Err(CheckError::resolution(address, "unknown host")),
            Script::Panic => panic!("scripted panic for {address}"),
            Script::Sequence(_) => Ok(Reachability::Unreachable),
        }
    }
}
