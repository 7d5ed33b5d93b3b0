//! DFC Virtual Table - Demo Entry Point
//!
//! Browses a synthetic device dataset through a throttled in-memory provider:
//! background load with progress, a cache hit, a server-side fallback search,
//! and the resulting column layout.
//!
//! Usage: `dfc-vtable [config.toml|config.json]`

use std::borrow::Cow;
use std::time::Duration;

use anyhow::Context;
use dfc_vtable::domain::{ColumnKind, ColumnSpec, WidthBoundTable};
use dfc_vtable::services::{ThrottleConfig, ThrottledProvider, VecProvider};
use dfc_vtable::utils::config_store::load_config;
use dfc_vtable::{
    CellText, ChangeKind, EngineConfig, Record, RowWindowResolver, SearchOutcome, VirtualTable,
};

#[derive(Debug, Clone)]
struct Device {
    serial: u32,
    name: String,
    online: bool,
    firmware: String,
}

impl Record for Device {
    type Id = u32;

    fn id(&self) -> u32 {
        self.serial
    }
}

impl CellText for Device {
    fn cell_text(&self, column: &str) -> Option<Cow<'_, str>> {
        match column {
            "serial" => Some(Cow::Owned(format!("WT-{:06}", self.serial))),
            "name" => Some(Cow::Borrowed(&self.name)),
            "online" => Some(Cow::Borrowed(if self.online { "true" } else { "false" })),
            "firmware" => Some(Cow::Borrowed(&self.firmware)),
            _ => None,
        }
    }
}

fn devices(n: u32) -> Vec<Device> {
    (0..n)
        .map(|serial| Device {
            serial,
            name: format!("Turbine {} / Park {}", serial, serial % 37),
            online: serial % 5 != 0,
            firmware: format!("v{}.{}.{}", 2 + serial % 3, serial % 10, serial % 7),
        })
        .collect()
}

fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("serial", ColumnKind::ShortId).label("Serial"),
        ColumnSpec::new("name", ColumnKind::LongName).label("Name"),
        ColumnSpec::new("online", ColumnKind::Boolean).label("Online"),
        ColumnSpec::new("firmware", ColumnKind::FreeText).label("Firmware"),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut config: EngineConfig = match std::env::args().nth(1) {
        Some(path) => load_config(&path).with_context(|| format!("loading {path}"))?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    if config.columns.is_empty() {
        config.columns = default_columns();
    }

    tracing::info!("Starting DFC virtual table demo...");

    let provider = ThrottledProvider::new(
        VecProvider::new(devices(25_000))
            .with_latency(Duration::from_millis(2))
            .with_filter(|query, device: &Device| {
                device.name.to_lowercase().contains(&query.normalized())
            }),
        ThrottleConfig {
            min_interval: Duration::from_millis(5),
            timeout: Some(Duration::from_secs(5)),
        },
    );

    let table = VirtualTable::new(provider, config.table)?;
    table.set_columns(config.columns.clone());
    table.set_width_bounds(WidthBoundTable::default().with_overrides(&config.width_bounds));

    let (_subscription, changes) = table.subscribe_channel();
    table.start();

    loop {
        let change = changes.recv_timeout(Duration::from_secs(10))?;
        match change.kind {
            ChangeKind::PageAppended { .. } => {
                tracing::info!("Progress: {}", change.state.progress_text());
            }
            ChangeKind::LoadFinished | ChangeKind::LoadFailed => break,
            _ => {}
        }
    }
    let state = table.get_state();
    tracing::info!(
        "Cache settled: {} (complete: {}, error: {:?})",
        state.progress_text(),
        state.is_cache_complete,
        state.last_error
    );

    let hits = table.search("Park 12", |d: &Device| d.name.ends_with("Park 12"));
    tracing::info!("Local search for 'Park 12': {} rows", hits.items().len());

    // Beyond the cache ceiling: answered by the provider.
    let outcome = table.search("Turbine 24999", |d: &Device| d.name.contains("Turbine 24999"));
    if let SearchOutcome::Pending(pending) = outcome {
        tracing::info!("'{}' not cached, searching server...", pending.term());
        let resolution = pending.resolve().await;
        tracing::info!("Server search finished: {:?}", resolution);
    }
    table.clear_search();

    let widths = table.column_widths();
    for column in widths.iter() {
        tracing::info!("Column {:<10} {:>6.1}px", column.key, column.width);
    }

    let resolver = RowWindowResolver::new(config.viewport);
    let window = resolver.resolve(&table, 5_000.0 * config.viewport.row_height, 600.0);
    for row in window.rows.iter().filter_map(|r| r.as_loaded()).take(3) {
        let name = widths.clip("name", &row.name);
        tracing::info!("Row {}: {}", row.serial, name.display);
    }

    table.shutdown();
    Ok(())
}
