use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::model::HostItem;
use crate::error::CatalogError;

/// Path of the host list below the catalog base url.
const HOSTS_PATH: &str = "sk_hosts";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches the list of hosts to probe from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    hosts_url: Url,
}

impl CatalogClient {
    /// Build a client for the catalog rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("hostprobe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, CatalogError> {
        let hosts_url = hosts_url(base_url)?;
        Ok(Self { client, hosts_url })
    }

    pub fn hosts_url(&self) -> &Url {
        &self.hosts_url
    }

    /// GET the host list and decode it.
    pub async fn fetch_hosts(&self) -> Result<Vec<HostItem>, CatalogError> {
        let response = self
            .client
            .get(self.hosts_url.clone())
            .send()
            .await?
            .error_for_status()?;

        let items: Vec<HostItem> = response.json().await?;
        tracing::info!(url = %self.hosts_url, hosts = items.len(), "fetched host catalog");
        Ok(items)
    }
}

fn hosts_url(base_url: &str) -> Result<Url, CatalogError> {
    let invalid = |source| CatalogError::InvalidUrl {
        url: base_url.to_string(),
        source,
    };

    let mut base = Url::parse(base_url).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(HOSTS_PATH).map_err(invalid)
}
