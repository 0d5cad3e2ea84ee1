use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::ProbeObserver;
use crate::error::FleetError;
use crate::probe::prelude::*;

/// Probes a set of addresses concurrently, one task per address.
///
/// Results come back in input order. A host that errors, times out or even
/// panics only affects its own entry.
#[derive(Clone)]
pub struct Fleet {
    prober: Prober,
    observer: Option<Arc<dyn ProbeObserver>>,
}

impl Fleet {
    pub fn new(prober: Prober) -> Self {
        Self {
            prober,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProbeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    /// Probe every address with the prober's configured attempt count.
    pub async fn probe_all<S: AsRef<str>>(&self, addresses: &[S]) -> Vec<HostStats> {
        self.probe_all_with(addresses, self.prober.settings().attempts())
            .await
    }

    /// Probe every address with `attempts` attempts each.
    ///
    /// Dropping the returned future aborts all outstanding host tasks.
    pub async fn probe_all_with<S: AsRef<str>>(
        &self,
        addresses: &[S],
        attempts: u32,
    ) -> Vec<HostStats> {
        match self.run(addresses, attempts, None).await {
            Ok(results) => results,
            Err(FleetError::Cancelled) => unreachable!("fleet without a cancellation token"),
        }
    }

    /// Probe every address until done or until `cancel` fires.
    ///
    /// On cancellation every host task is aborted and joined before returning
    /// [`FleetError::Cancelled`]; no partial results are returned.
    pub async fn probe_all_cancellable<S: AsRef<str>>(
        &self,
        addresses: &[S],
        cancel: &CancellationToken,
    ) -> Result<Vec<HostStats>, FleetError> {
        self.run(addresses, self.prober.settings().attempts(), Some(cancel))
            .await
    }

    async fn run<S: AsRef<str>>(
        &self,
        addresses: &[S],
        attempts: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<HostStats>, FleetError> {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(FleetError::Cancelled);
        }

        let start = Instant::now();
        let mut tasks = JoinSet::new();
        for (index, address) in addresses.iter().enumerate() {
            let prober = self.prober.clone();
            let address = address.as_ref().to_string();
            tasks.spawn(async move {
                let stats = prober.probe_with(&address, attempts).await;
                (index, stats)
            });
        }

        let mut slots: Vec<Option<HostStats>> = vec![None; addresses.len()];
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancelled(cancel) => {
                    tasks.shutdown().await;
                    tracing::info!(hosts = addresses.len(), "fleet probe cancelled");
                    return Err(FleetError::Cancelled);
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                Some(Ok((index, stats))) => {
                    if let Some(observer) = &self.observer {
                        observer.on_host_complete(index, &stats);
                    }
                    slots[index] = Some(stats);
                }
                Some(Err(e)) => {
                    // the slot stays empty and is filled as all-failed below
                    tracing::error!(error = %e, "host probe task failed");
                }
                None => break,
            }
        }

        let results: Vec<HostStats> = slots
            .into_iter()
            .zip(addresses)
            .map(|(slot, address)| {
                slot.unwrap_or_else(|| HostStats::all_failed(address.as_ref(), attempts))
            })
            .collect();

        tracing::info!(
            hosts = results.len(),
            reachable = results.iter().filter(|s| s.is_reachable()).count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fleet probe complete"
        );

        Ok(results)
    }
}

async fn cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

impl std::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fleet")
            .field("prober", &self.prober)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::testing::{Script, ScriptedCheck};

    fn fleet(check: ScriptedCheck, attempts: u32) -> Fleet {
        let settings = ProbeSettings::default().with_attempts(attempts);
        Fleet::new(Prober::new(Arc::new(check), settings))
    }

    fn mixed_check() -> ScriptedCheck {
        ScriptedCheck::new()
            .host("127.0.0.1", Script::reachable_after(Duration::from_millis(10)))
            .host("10.255.255.1", Script::Unreachable)
            .host("bad-host", Script::ResolutionError)
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_fleet_matches_single_host_results() {
        let results = fleet(mixed_check(), 3)
            .probe_all(&["127.0.0.1", "10.255.255.1", "bad-host"])
            .await;

        assert_eq!(results.len(), 3);

        assert_eq!(results[0].address, "127.0.0.1");
        assert_eq!(results[0].total_attempts, 3);
        assert_eq!(results[0].success_count, 3);
        assert_eq!(results[0].failure_count, 0);
        assert_eq!(results[0].average_latency, Some(Duration::from_millis(10)));

        assert_eq!(results[1].address, "10.255.255.1");
        assert_eq!(results[1].success_count, 0);
        assert_eq!(results[1].failure_count, 3);
        assert_eq!(results[1].average_latency, None);

        assert_eq!(results[2].address, "bad-host");
        assert_eq!(results[2].total_attempts, 3);
        assert_eq!(results[2].success_count, 0);
        assert_eq!(results[2].failure_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_fleet() {
        let results = fleet(ScriptedCheck::new(), 5).probe_all::<&str>(&[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_input_order_not_completion_order() {
        let check = ScriptedCheck::new()
            .host("a", Script::reachable_after(Duration::from_millis(5)))
            .host("b", Script::reachable_after(Duration::from_millis(500)))
            .host("c", Script::reachable_after(Duration::from_millis(1)));

        let completed = Arc::new(Mutex::new(Vec::new()));
        let log = completed.clone();
        let observer = move |index: usize, _: &HostStats| {
            log.lock().unwrap().push(index);
        };
        let fleet = fleet(check, 2).with_observer(Arc::new(observer));

        let results = fleet.probe_all(&["a", "b", "c"]).await;
        let addresses: Vec<&str> = results.iter().map(|s| s.address.as_str()).collect();

        assert_eq!(addresses, ["a", "b", "c"]);
        assert_eq!(*completed.lock().unwrap(), vec![2, 0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hosts_run_in_parallel() {
        let check = ScriptedCheck::new()
            .host("a", Script::reachable_after(Duration::from_millis(100)))
            .host("b", Script::reachable_after(Duration::from_millis(100)))
            .host("c", Script::reachable_after(Duration::from_millis(100)));

        let start = Instant::now();
        let results = fleet(check, 3).probe_all(&["a", "b", "c"]).await;

        assert!(results.iter().all(|s| s.success_count == 3));
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_host_does_not_affect_others() {
        let check = ScriptedCheck::new()
            .host("x", Script::ResolutionError)
            .host("y", Script::reachable_after(Duration::from_millis(3)))
            .host("z", Script::reachable_after(Duration::from_millis(7)));

        let results = fleet(check, 4).probe_all(&["y", "x", "z"]).await;

        assert_eq!(results[0].success_count, results[0].total_attempts);
        assert_eq!(results[1].success_count, 0);
        assert_eq!(results[1].failure_count, 4);
        assert_eq!(results[2].success_count, results[2].total_attempts);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicates_are_probed_independently() {
        let check =
            ScriptedCheck::new().host("dup", Script::reachable_after(Duration::from_millis(2)));

        let results = fleet(check.clone(), 2).probe_all(&["dup", "dup"]).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|s| s.address == "dup" && s.success_count == 2));
        assert_eq!(check.calls("dup"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_host_is_contained() {
        let check = ScriptedCheck::new()
            .host("boom", Script::Panic)
            .host("ok", Script::reachable_after(Duration::from_millis(1)));

        let results = fleet(check, 3).probe_all(&["boom", "ok"]).await;

        assert_eq!(results[0].address, "boom");
        assert_eq!(results[0].success_count, 0);
        assert_eq!(results[0].failure_count, 3);
        assert_eq!(results[1].success_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_attempts_override() {
        let results = fleet(mixed_check(), 5)
            .probe_all_with(&["127.0.0.1"], 2)
            .await;

        assert_eq!(results[0].total_attempts, 2);
        assert_eq!(results[0].success_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_returns_no_partial_results() {
        let check = ScriptedCheck::new()
            .host("fast", Script::reachable_after(Duration::from_millis(1)))
            .host("slow", Script::reachable_after(Duration::from_millis(900)));
        let fleet = fleet(check.clone(), 5);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = fleet.probe_all_cancellable(&["fast", "slow"], &cancel).await;
        assert_eq!(result, Err(FleetError::Cancelled));

        // the aborted host task issues no further attempts
        assert_eq!(check.in_flight("slow"), 0);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(check.calls("slow"), 1);
        assert_eq!(check.in_flight("slow"), 0);
        assert_eq!(check.calls("fast"), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_spawns_nothing() {
        let check = ScriptedCheck::new().host("a", Script::Unreachable);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fleet(check.clone(), 3).probe_all_cancellable(&["a"], &cancel).await;

        assert_eq!(result, Err(FleetError::Cancelled));
        assert_eq!(check.calls("a"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncancelled_token_returns_everything() {
        let cancel = CancellationToken::new();
        let result = fleet(mixed_check(), 3)
            .probe_all_cancellable(&["127.0.0.1", "bad-host"], &cancel)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].success_count, 3);
        assert_eq!(result[1].failure_count, 3);
    }
}
