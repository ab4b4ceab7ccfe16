//! Non-interactive `--dump` mode: resolve one location and print it as JSON.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use placedash_core::{filter_records, paginate, DataService, Record, ResourceKind, Route};

/// One page of a list route
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListDump<'a> {
    kind: ResourceKind,
    page: usize,
    total_pages: usize,
    total_items: usize,
    items: Vec<&'a Record>,
}

/// Resolve `location` and render the result as pretty JSON
pub async fn dump_location(service: &DataService, location: &str) -> Result<String> {
    let route = Route::parse(location)?;
    info!(location = %route.to_location(), "Dumping location");

    match route {
        Route::List { kind, view } => {
            let records = service
                .collection(kind)
                .await
                .with_context(|| format!("Failed to load {}", kind))?;
            let filtered = filter_records(&records, &view.filters);
            let page = paginate(&filtered, view.page);
            let dump = ListDump {
                kind,
                page: page.page,
                total_pages: page.total_pages,
                total_items: page.total_items,
                items: page.items.to_vec(),
            };
            Ok(serde_json::to_string_pretty(&dump)?)
        }
        Route::Detail { segment, id } => {
            let record = service
                .resolve(&segment, &id)
                .await
                .with_context(|| format!("Item not found: /{}/{}", segment, id))?;
            Ok(serde_json::to_string_pretty(&record)?)
        }
    }
}
