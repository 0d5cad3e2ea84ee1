use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::probe::result::HostStats;

/// A named host from the catalog, optionally carrying its last probe result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostItem {
    pub name: String,

    /// Address to probe: hostname, authority or URL.
    pub url: String,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<HostStats>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probed_at: Option<DateTime<Utc>>,
}

impl HostItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon: None,
            stats: None,
            probed_at: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Attach fleet results to their items by position.
///
/// `stats[i]` belongs to `items[i]`, so duplicate urls keep their own result.
/// Extra entries on either side are left untouched.
pub fn merge_stats(items: &mut [HostItem], stats: Vec<HostStats>) {
    let now = Utc::now();
    for (item, stats) in items.iter_mut().zip(stats) {
        debug_assert_eq!(item.url, stats.address);
        item.stats = Some(stats);
        item.probed_at = Some(now);
    }
}

/// Replace the result of a single item after re-probing it.
pub fn update_item(item: &mut HostItem, stats: HostStats) {
    item.stats = Some(stats);
    item.probed_at = Some(Utc::now());
}

/// Order items by name, case-insensitively.
pub fn sort_by_name(items: &mut [HostItem]) {
    items.sort_by_key(|item| item.name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(address: &str, success: u32) -> HostStats {
        HostStats {
            address: address.to_string(),
            total_attempts: 5,
            success_count: success,
            failure_count: 5 - success,
            completed_attempts: 5,
            average_latency: None,
        }
    }

    #[test]
    fn test_deserialize_catalog_json() {
        let json = r#"[
            {"name": "Google", "url": "google.com", "icon": "https://google.com/favicon.ico"},
            {"name": "Local", "url": "127.0.0.1"}
        ]"#;

        let items: Vec<HostItem> = serde_json::from_str(json).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Google");
        assert_eq!(items[0].icon.as_deref(), Some("https://google.com/favicon.ico"));
        assert_eq!(items[1].url, "127.0.0.1");
        assert_eq!(items[1].icon, None);
        assert!(items[1].stats.is_none());
    }

    #[test]
    fn test_merge_by_position_keeps_duplicates_independent() {
        let mut items = vec![
            HostItem::new("first", "dup"),
            HostItem::new("second", "dup"),
        ];

        merge_stats(&mut items, vec![stats("dup", 5), stats("dup", 1)]);

        assert_eq!(items[0].stats.as_ref().unwrap().success_count, 5);
        assert_eq!(items[1].stats.as_ref().unwrap().success_count, 1);
        assert!(items.iter().all(|i| i.probed_at.is_some()));
    }

    #[test]
    fn test_update_single_item() {
        let mut item = HostItem::new("one", "one.example");
        update_item(&mut item, stats("one.example", 3));
        assert_eq!(item.stats.unwrap().failure_count, 2);
    }

    #[test]
    fn test_sort_by_name() {
        let mut items = vec![
            HostItem::new("zeta", "z"),
            HostItem::new("Alpha", "a"),
            HostItem::new("beta", "b"),
        ];
        sort_by_name(&mut items);
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "beta", "zeta"]);
    }
}
