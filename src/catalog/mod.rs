pub mod client;
pub mod model;

pub use client::CatalogClient;
pub use model::{HostItem, merge_stats, sort_by_name, update_item};
