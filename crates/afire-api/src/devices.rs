// Device endpoints: bindings (discovery), latest attribute data, control.

use serde_json::Value;
use tracing::debug;

use crate::client::CloudClient;
use crate::error::Error;
use crate::models::{
    Attributes, BindingsResponse, ControlRequest, DeviceBinding, LatestResponse, attribute_value,
};

impl CloudClient {
    /// List every device bound to the account.
    ///
    /// `GET /bindings`
    pub async fn fetch_device_bindings(&self) -> Result<Vec<DeviceBinding>, Error> {
        let url = self.api_url("bindings")?;
        let resp: BindingsResponse = self.get("bindings", url).await?;
        debug!(count = resp.devices.len(), "fetched device bindings");
        Ok(resp.devices)
    }

    /// Latest reported attributes of one device.
    ///
    /// `GET /devdata/{did}/latest`. A missing or `null` `attr` object is
    /// an empty mapping. Values that are neither integers nor booleans
    /// are skipped.
    pub async fn fetch_device_attributes(&self, did: &str) -> Result<Attributes, Error> {
        let url = self.api_url(&format!("devdata/{did}/latest"))?;
        let resp: LatestResponse = self.get("devdata", url).await?;

        let Some(raw) = resp.attr else {
            return Ok(Attributes::new());
        };

        let mut attrs = Attributes::new();
        for (key, value) in raw {
            match attribute_value(&value) {
                Some(v) => {
                    attrs.insert(key, v);
                }
                None => debug!(did, key, %value, "skipping non-integer attribute"),
            }
        }
        Ok(attrs)
    }

    /// Write attributes to one device.
    ///
    /// `POST /control/{did}` with `{"attrs": {...}}`. Returns the raw
    /// acknowledgement payload.
    pub async fn set_device_attributes(&self, did: &str, attrs: &Attributes) -> Result<Value, Error> {
        let url = self.api_url(&format!("control/{did}"))?;
        debug!(did, ?attrs, "setting device attributes");
        self.post("control", url, &ControlRequest { attrs }).await
    }
}
