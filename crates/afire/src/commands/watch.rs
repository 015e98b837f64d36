//! Stream refresh results until interrupted.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use afire_core::config::DEFAULT_REFRESH_INTERVAL;
use afire_core::{Controller, ControllerConfig, RefreshEvent, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::devices::DeviceSummary;

#[derive(Debug, Serialize)]
struct Tick {
    refreshed_at: Option<DateTime<Utc>>,
    devices: Vec<DeviceSummary>,
}

fn render(snapshot: &Snapshot, global: &GlobalOpts) -> Result<String, CliError> {
    let tick = Tick {
        refreshed_at: snapshot.refreshed_at(),
        devices: snapshot.views().map(DeviceSummary::from).collect(),
    };

    match global.output {
        OutputFormat::Json => output::render_json_compact(&tick),
        OutputFormat::Plain => Ok(tick
            .devices
            .iter()
            .map(|d| format!("{} {}", d.id, if d.powered { "on" } else { "off" }))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table => {
            let color = output::should_color(global.color);
            let stamp = tick
                .refreshed_at
                .map_or_else(|| "-".into(), |t| t.format("%H:%M:%S").to_string());
            Ok(tick
                .devices
                .iter()
                .map(|d| {
                    format!(
                        "{stamp}  {:<20} power={} flame={} speed={}",
                        d.name,
                        output::on_off(d.powered, color),
                        d.flame.map_or_else(|| "-".into(), |v| v.to_string()),
                        d.speed.map_or_else(|| "-".into(), |v| v.to_string()),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

pub async fn handle(
    args: WatchArgs,
    mut config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        config.refresh_interval = Duration::from_secs(secs);
    }
    if config.refresh_interval.is_zero() {
        config.refresh_interval = DEFAULT_REFRESH_INTERVAL;
    }

    let controller = Controller::new(config)?;
    // Subscribe first so the initial load is reported too.
    let mut events = controller.subscribe();
    controller.connect().await?;

    let mut seen = 0_usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(RefreshEvent::Updated(snapshot)) => {
                    output::print_output(&render(&snapshot, global)?, global.quiet);
                }
                Ok(RefreshEvent::Failed(err)) => {
                    eprintln!("refresh failed: {err}");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "watch fell behind, skipping refreshes");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        }

        seen += 1;
        if args.count.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    controller.disconnect().await;
    Ok(())
}
