use std::future::Future;
use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use unicode_truncate::{Alignment, UnicodeTruncateStr};

use hostprobe::catalog::{CatalogClient, HostItem, merge_stats};
use hostprobe::config::{ProbeConfig, load_config, setup_resolver};
use hostprobe::error::report;
use hostprobe::{Fleet, FleetError, Prober, TcpCheck};

/// Display width in terminal columns.
fn display_width(input: &str) -> usize {
    input.unicode_truncate(usize::MAX).1
}

fn to_fixed_width(input: &str, width: usize) -> String {
    input.unicode_pad(width, Alignment::Left, true).into_owned()
}

fn print_report(items: &[HostItem]) {
    let name_width = items
        .iter()
        .map(|i| display_width(&i.name))
        .max()
        .unwrap_or(10);

    for item in items {
        let name = to_fixed_width(&item.name, name_width);
        match &item.stats {
            Some(stats) if stats.is_reachable() => println!(
                "[{name}] ✅ {}: {}/{} ok, avg {}",
                item.url,
                stats.success_count,
                stats.total_attempts,
                stats
                    .average_latency_ms()
                    .map(|ms| format!("{ms:.2}ms"))
                    .unwrap_or_else(|| "N/A".to_string())
            ),
            Some(stats) => println!(
                "[{name}] ❌ {}: 0/{} ok ({} failed)",
                item.url, stats.total_attempts, stats.failure_count
            ),
            None => println!("[{name}] ❔ {}: not probed", item.url),
        }
    }
}

async fn collect_hosts(config: &ProbeConfig, catalog: Option<&CatalogClient>) -> Vec<HostItem> {
    let mut items = Vec::new();
    if let Some(catalog) = catalog {
        match catalog.fetch_hosts().await {
            Ok(hosts) => items.extend(hosts),
            Err(e) => tracing::error!(
                url = %catalog.hosts_url(),
                "failed to fetch host catalog: {}",
                report(&e)
            ),
        }
    }
    items.extend(config.targets.iter().cloned());
    items
}

/// Cancel `shutdown` once `signal` fires. A signal handler that fails to
/// install leaves the token alone.
async fn cancel_on_signal<F>(signal: F, shutdown: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            tracing::info!("received ctrl-c, stopping");
            shutdown.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "failed to listen for ctrl-c"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hostprobe=debug".into()),
        )
        .init();

    let app_config = load_config()?;
    let config = app_config.config;

    let resolver = setup_resolver(&config.dns_hosts)?;
    let check = TcpCheck::new(resolver)
        .with_default_port(config.default_port)
        .with_refused_is_reachable(config.refused_is_reachable);
    let fleet = Fleet::new(Prober::new(Arc::new(check), config.settings()?));

    let catalog = config
        .catalog_url
        .as_deref()
        .map(CatalogClient::new)
        .transpose()?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), shutdown));

    loop {
        let mut items = collect_hosts(&config, catalog.as_ref()).await;
        let addresses: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();

        match fleet.probe_all_cancellable(&addresses, &cancel).await {
            Ok(stats) => {
                merge_stats(&mut items, stats);
                print_report(&items);
            }
            Err(FleetError::Cancelled) => break,
        }

        let Some(interval) = config.interval else {
            break;
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(interval) => {}
        }
    }

    Ok(())
}
