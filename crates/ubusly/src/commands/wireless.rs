//! Wireless command handlers (rpcd-mod-iwinfo).

use tabled::Tabled;
use ubusly_api::{
    AssocEntry, Client, CountryEntry, FreqEntry, ScanResult, TxPowerEntry, WirelessInfo,
};

use crate::cli::{GlobalOpts, WirelessArgs, WirelessCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util::or_dash;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device")]
    name: String,
}

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Ch")]
    channel: u32,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Encryption")]
    encryption: String,
}

impl From<&ScanResult> for ScanRow {
    fn from(s: &ScanResult) -> Self {
        Self {
            ssid: s.ssid.clone().unwrap_or_else(|| "(hidden)".into()),
            bssid: s.bssid.clone(),
            channel: s.channel,
            signal: format!("{} dBm", s.signal),
            quality: format!("{}/{}", s.quality, s.quality_max),
            encryption: s.encryption.label(),
        }
    }
}

#[derive(Tabled)]
struct StationRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Inactive")]
    inactive: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
}

fn mbit(kbit: u32) -> String {
    format!("{}.{} Mbit/s", kbit / 1000, (kbit % 1000) / 100)
}

impl From<&AssocEntry> for StationRow {
    fn from(a: &AssocEntry) -> Self {
        Self {
            mac: a.mac.clone(),
            signal: format!("{} dBm", a.signal),
            inactive: format!("{} ms", a.inactive),
            rx: mbit(a.rx.rate),
            tx: mbit(a.tx.rate),
        }
    }
}

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "Channel")]
    channel: u32,
    #[tabled(rename = "MHz")]
    mhz: u32,
    #[tabled(rename = "Restricted")]
    restricted: bool,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&FreqEntry> for ChannelRow {
    fn from(f: &FreqEntry) -> Self {
        Self {
            channel: f.channel,
            mhz: f.mhz,
            restricted: f.restricted,
            active: active_marker(f.active),
        }
    }
}

#[derive(Tabled)]
struct TxPowerRow {
    #[tabled(rename = "dBm")]
    dbm: i32,
    #[tabled(rename = "mW")]
    mw: u32,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&TxPowerEntry> for TxPowerRow {
    fn from(t: &TxPowerEntry) -> Self {
        Self {
            dbm: t.dbm,
            mw: t.mw,
            active: active_marker(t.active),
        }
    }
}

#[derive(Tabled)]
struct CountryRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&CountryEntry> for CountryRow {
    fn from(c: &CountryEntry) -> Self {
        Self {
            code: c.code.clone(),
            name: c.country.clone(),
            active: active_marker(c.active),
        }
    }
}

fn active_marker(active: bool) -> String {
    if active { "*".into() } else { String::new() }
}

fn info_detail(painter: Painter, device: &str, i: &WirelessInfo) -> String {
    let quality = match (i.quality, i.quality_max) {
        (Some(q), Some(max)) => format!("{q}/{max}"),
        (Some(q), None) => q.to_string(),
        _ => "-".into(),
    };
    let mut fields = vec![
        ("Device", painter.accent(device)),
        ("SSID", or_dash(i.ssid.as_deref())),
        ("BSSID", or_dash(i.bssid.as_deref())),
        ("Mode", i.mode.clone()),
        ("Channel", or_dash(i.channel)),
        ("Frequency", or_dash(i.frequency.map(|f| format!("{f} MHz")))),
        ("Tx power", or_dash(i.txpower.map(|p| format!("{p} dBm")))),
        ("Signal", or_dash(i.signal.map(|s| format!("{s} dBm")))),
        ("Noise", or_dash(i.noise.map(|n| format!("{n} dBm")))),
        ("Quality", quality),
        ("Bit rate", or_dash(i.bitrate.map(mbit))),
        ("Encryption", i.encryption.label()),
        ("Country", or_dash(i.country.as_deref())),
        ("PHY", i.phy.clone()),
    ];
    if !i.hwmodes.is_empty() {
        fields.push(("HW modes", i.hwmodes.join("/")));
    }
    if !i.hardware.name.is_empty() {
        fields.push(("Hardware", i.hardware.name.clone()));
    }
    output::detail_lines(painter, &fields)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &mut Client,
    args: WirelessArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let painter = Painter::new(&global.color);

    let out = match args.command {
        WirelessCommand::Devices => {
            let devices = client.wireless_devices().await?;
            output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow { name: d.clone() },
                Clone::clone,
            )?
        }

        WirelessCommand::Info { device } => {
            let info = client.wireless_info(&device).await?;
            output::render_single(
                &global.output,
                &info,
                |i| info_detail(painter, &device, i),
                |i| i.ssid.clone().unwrap_or_default(),
            )?
        }

        WirelessCommand::Scan { device } => {
            let results = client.wireless_scan(&device).await?;
            output::render_list(
                &global.output,
                &results,
                |s| ScanRow::from(s),
                |s| s.bssid.clone(),
            )?
        }

        WirelessCommand::Stations { device, mac } => {
            let stations = client.wireless_assoclist(&device, mac.as_deref()).await?;
            output::render_list(
                &global.output,
                &stations,
                |a| StationRow::from(a),
                |a| a.mac.clone(),
            )?
        }

        WirelessCommand::Channels { device } => {
            let channels = client.wireless_freqlist(&device).await?;
            output::render_list(
                &global.output,
                &channels,
                |f| ChannelRow::from(f),
                |f| f.channel.to_string(),
            )?
        }

        WirelessCommand::Txpower { device } => {
            let levels = client.wireless_txpowerlist(&device).await?;
            output::render_list(
                &global.output,
                &levels,
                |t| TxPowerRow::from(t),
                |t| t.dbm.to_string(),
            )?
        }

        WirelessCommand::Countries { device } => {
            let countries = client.wireless_countrylist(&device).await?;
            output::render_list(
                &global.output,
                &countries,
                |c| CountryRow::from(c),
                |c| c.code.clone(),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
