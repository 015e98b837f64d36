// ── Domain model ──
//
// Canonical representation of a fireplace and of the polled state of
// every fireplace on the account. Consumers (CLI, automation adapters)
// depend on these types, never on the wire models in `afire-api`.

pub mod device;
pub mod snapshot;
pub mod view;

pub use device::{DeviceDescriptor, DeviceModel};
pub use snapshot::Snapshot;
pub use view::{DeviceInfo, DeviceView};
