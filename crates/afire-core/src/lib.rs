// afire-core: Device-state synchronization between the AFIRE cloud and consumers.

pub mod catalog;
pub mod command;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod model;
pub mod palette;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{AttributeKind, LevelRange, attribute_kind, classify_model};
pub use command::{Command, CommandPlan, CommandResult, GuardedCommand, RequestedValue};
pub use config::{ControllerConfig, StalePolicy};
pub use controller::{ConnectionState, Controller};
pub use coordinator::{LastResult, RefreshCoordinator, RefreshEvent};
pub use discovery::discover_devices;
pub use error::CoreError;
pub use model::{DeviceDescriptor, DeviceInfo, DeviceModel, DeviceView, Snapshot};
pub use palette::{ColorPreset, Effect, PALETTE, Rgb, match_color};

pub use afire_api as api;
pub use afire_api::{Attributes, CloudClient, Credentials};
