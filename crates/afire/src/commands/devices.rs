//! Device listing, detail, and credential validation.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use afire_core::{Controller, ControllerConfig, DeviceDescriptor, DeviceModel, DeviceView};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::resolve_device;

// ── Serializable summary ────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    pub model: DeviceModel,
    pub mac: String,
    pub powered: bool,
    pub flame: Option<i64>,
    pub speed: Option<i64>,
    pub attributes: BTreeMap<String, i64>,
}

impl From<DeviceView<'_>> for DeviceSummary {
    fn from(view: DeviceView<'_>) -> Self {
        let device = view.descriptor();
        Self {
            id: device.id.clone(),
            name: view.display_name(),
            model: device.model,
            mac: device.mac_address.clone(),
            powered: view.is_powered(),
            flame: view.level("FLAME"),
            speed: view.level("SPEED"),
            attributes: device.attributes.clone(),
        }
    }
}

impl From<&DeviceDescriptor> for DeviceSummary {
    fn from(device: &DeviceDescriptor) -> Self {
        DeviceView::new(device).into()
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Flame")]
    flame: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

fn row(d: &DeviceSummary, color: bool) -> DeviceRow {
    DeviceRow {
        id: d.id.clone(),
        name: d.name.clone(),
        model: d.model.to_string(),
        power: output::on_off(d.powered, color),
        flame: d.flame.map_or_else(|| "-".into(), |v| v.to_string()),
        speed: d.speed.map_or_else(|| "-".into(), |v| v.to_string()),
        mac: d.mac.clone(),
    }
}

fn detail(d: &DeviceSummary, color: bool) -> String {
    let level = |v: Option<i64>| v.map_or_else(|| "-".into(), |v| v.to_string());
    let mut lines = vec![
        format!("ID:       {}", d.id),
        format!("Name:     {}", d.name),
        format!("Model:    {}", d.model),
        format!("MAC:      {}", d.mac),
        format!("Power:    {}", output::on_off(d.powered, color)),
        format!("Flame:    {}", level(d.flame)),
        format!("Speed:    {}", level(d.speed)),
    ];
    if !d.attributes.is_empty() {
        lines.push("Attributes:".into());
        lines.extend(d.attributes.iter().map(|(k, v)| format!("  {k:<12} {v}")));
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = Controller::oneshot(config, |c| async move { Ok(c.snapshot()) }).await?;
    let devices: Vec<DeviceSummary> = snapshot.views().map(DeviceSummary::from).collect();

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &devices,
        |d| row(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn show(
    identifier: &str,
    config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let device = Controller::oneshot(config, |c| async move {
        let snapshot = c.snapshot();
        let id = resolve_device(&snapshot, identifier)?;
        Ok(snapshot.view(&id).map(DeviceSummary::from))
    })
    .await?
    .ok_or_else(|| CliError::NotFound {
        identifier: identifier.into(),
    })?;

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &device,
        |d| detail(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// One login plus one discovery; fails when the account has no fireplaces.
pub async fn login(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let username = config.credentials.username.clone();
    let devices = Controller::validate(&config).await?;
    let summaries: Vec<DeviceSummary> = devices.iter().map(DeviceSummary::from).collect();

    if !global.quiet {
        eprintln!(
            "✓ Logged in as {username}; {} fireplace(s) found",
            summaries.len()
        );
    }

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &summaries,
        |d| row(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
