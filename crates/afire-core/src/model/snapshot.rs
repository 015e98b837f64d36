// ── Snapshot ──
//
// Immutable view of every device at the end of one successful refresh.
// The coordinator swaps whole snapshots; readers hold an `Arc` to the
// one they loaded and never observe a half-applied refresh.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::device::DeviceDescriptor;
use super::view::DeviceView;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    devices: BTreeMap<String, DeviceDescriptor>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Index devices by id. A later duplicate id replaces an earlier one.
    pub fn new(devices: Vec<DeviceDescriptor>, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            devices: devices.into_iter().map(|d| (d.id.clone(), d)).collect(),
            refreshed_at: Some(refreshed_at),
        }
    }

    pub fn get(&self, id: &str) -> Option<&DeviceDescriptor> {
        self.devices.get(id)
    }

    pub fn view(&self, id: &str) -> Option<DeviceView<'_>> {
        self.get(id).map(DeviceView::new)
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.values()
    }

    pub fn views(&self) -> impl Iterator<Item = DeviceView<'_>> {
        self.devices.values().map(DeviceView::new)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.devices.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// When the refresh that produced this snapshot completed.
    /// `None` for the empty snapshot that exists before the first refresh.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}
