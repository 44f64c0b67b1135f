// `iwinfo` object (rpcd-mod-iwinfo)
//
// Radio state and scans. Every method except `devices` takes the wireless
// interface name, e.g. `wlan0` or `phy0-ap0`.

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::client::Client;
use crate::envelope::{Args, to_args};
use crate::error::Error;
use crate::models::{
    AssocEntry, CountryEntry, FreqEntry, Results, ScanResult, TxPowerEntry, WirelessDevices,
    WirelessInfo,
};

const OBJECT: &str = "iwinfo";
const PACKAGE: &str = "rpcd-mod-iwinfo";

impl Client {
    /// Wireless interfaces known to iwinfo.
    pub async fn wireless_devices(&mut self) -> Result<Vec<String>, Error> {
        let devices: WirelessDevices = self
            .invoke(OBJECT, "devices", &Args::new())
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))?;
        Ok(devices.devices)
    }

    pub async fn wireless_info(&mut self, device: &str) -> Result<WirelessInfo, Error> {
        let args = to_args(&json!({ "device": device }))?;
        self.invoke(OBJECT, "info", &args)
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))
    }

    /// Trigger a scan and wait for the results. Takes several seconds on
    /// most radios, so callers usually need a longer transport timeout.
    pub async fn wireless_scan(&mut self, device: &str) -> Result<Vec<ScanResult>, Error> {
        debug!(device, "scanning");
        self.device_results("scan", device, None).await
    }

    /// Stations associated with `device`, optionally narrowed to one MAC.
    pub async fn wireless_assoclist(
        &mut self,
        device: &str,
        mac: Option<&str>,
    ) -> Result<Vec<AssocEntry>, Error> {
        self.device_results("assoclist", device, mac).await
    }

    pub async fn wireless_freqlist(&mut self, device: &str) -> Result<Vec<FreqEntry>, Error> {
        self.device_results("freqlist", device, None).await
    }

    pub async fn wireless_txpowerlist(&mut self, device: &str) -> Result<Vec<TxPowerEntry>, Error> {
        self.device_results("txpowerlist", device, None).await
    }

    pub async fn wireless_countrylist(&mut self, device: &str) -> Result<Vec<CountryEntry>, Error> {
        self.device_results("countrylist", device, None).await
    }

    async fn device_results<T: DeserializeOwned>(
        &mut self,
        method: &str,
        device: &str,
        mac: Option<&str>,
    ) -> Result<Vec<T>, Error> {
        let mut args = to_args(&json!({ "device": device }))?;
        if let Some(mac) = mac {
            args.insert("mac".into(), mac.into());
        }
        let results: Results<T> = self
            .invoke(OBJECT, method, &args)
            .await
            .map_err(|e| e.with_module_hint(PACKAGE))?;
        Ok(results.results)
    }
}
