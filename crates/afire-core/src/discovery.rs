// ── Device discovery ──
//
// One bindings fetch, then one attribute fetch per bound device. The
// attribute fetches run concurrently (one in flight per device) and the
// whole call fails if any of them fails: consumers never see a device
// whose state is unknown.

use futures_util::future::try_join_all;
use tracing::debug;

use afire_api::CloudClient;

use crate::error::CoreError;
use crate::model::DeviceDescriptor;

pub async fn discover_devices(client: &CloudClient) -> Result<Vec<DeviceDescriptor>, CoreError> {
    let bindings = client.fetch_device_bindings().await?;
    debug!(count = bindings.len(), "fetched device bindings");

    let fetches = bindings.into_iter().map(|binding| async move {
        let attributes = client.fetch_device_attributes(&binding.did).await?;
        Ok::<_, CoreError>(DeviceDescriptor::from_binding(binding, attributes))
    });

    let devices = try_join_all(fetches).await?;
    debug!(count = devices.len(), "discovered devices");
    Ok(devices)
}
