// Payload types for the rpcd object plugins
//
// Shapes of what `file`, `log`, `uci` and `iwinfo` return inside the
// `[status, payload]` result. Fields use `#[serde(default)]` liberally
// because plugin versions differ in which keys they emit, and each struct
// keeps unknown keys in `extra` where firmware is known to add them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── file ─────────────────────────────────────────────────────────────

/// Payload of `file.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEntries {
    #[serde(default)]
    pub entries: Vec<FileEntry>,
}

/// One directory entry from `file.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    /// `file`, `directory`, `symlink`, `char`, `block`, `fifo`, `socket`.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mode: u32,
    #[serde(default)]
    pub mtime: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `file.stat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mode: u32,
    #[serde(default)]
    pub atime: i64,
    #[serde(default)]
    pub mtime: i64,
    #[serde(default)]
    pub ctime: i64,
    #[serde(default)]
    pub inode: u64,
    #[serde(default)]
    pub uid: u32,
    #[serde(default)]
    pub gid: u32,
}

/// Payload of `file.read`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    #[serde(default)]
    pub data: String,
}

/// Payload of `file.exec`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecResult {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

/// Arguments for `file.write`. Unset options are left to rpcd's defaults
/// (truncate, mode 0666 masked by umask, literal data).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileWrite {
    pub path: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    /// `data` is base64 and rpcd should decode it before writing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<bool>,
}

impl FileWrite {
    pub fn new(path: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn append(mut self, append: bool) -> Self {
        self.append = Some(append);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn base64(mut self, base64: bool) -> Self {
        self.base64 = Some(base64);
        self
    }
}

// ── log ──────────────────────────────────────────────────────────────

/// Payload of `log.read`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntries {
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

/// One logd ring buffer entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub id: u64,
    /// syslog priority: facility << 3 | severity.
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub source: u32,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub time: i64,
}

impl LogEntry {
    /// syslog severity name derived from `priority`.
    pub fn severity(&self) -> &'static str {
        match self.priority & 0x7 {
            0 => "emerg",
            1 => "alert",
            2 => "crit",
            3 => "err",
            4 => "warning",
            5 => "notice",
            6 => "info",
            _ => "debug",
        }
    }
}

/// Arguments for `log.read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogRead {
    pub lines: u32,
    pub stream: bool,
    pub oneshot: bool,
}

impl Default for LogRead {
    fn default() -> Self {
        Self {
            lines: 100,
            stream: false,
            oneshot: true,
        }
    }
}

// ── uci ──────────────────────────────────────────────────────────────

/// Selector and values for `uci.get` / `uci.set`.
///
/// Only `config` is mandatory; everything else narrows the selection
/// and is omitted from the wire when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UciRequest {
    pub config: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub matches: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, Value>>,
}

impl UciRequest {
    pub fn config(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn matching(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.matches
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Payload of `uci.configs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UciConfigs {
    #[serde(default)]
    pub configs: Vec<String>,
}

/// Payload of `uci.get`.
///
/// rpcd answers with `value` (a string or list) when an option was selected,
/// otherwise with `values`: one section object, or a map of sections when
/// only the config was named.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UciValues {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub values: Option<Value>,
}

/// One staged change: `[operation, section, option?, value?]`.
pub type UciChange = Vec<String>;

/// Payload of `uci.changes`: every config's staged changes, or just one
/// config's when a config was named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UciChanges {
    All(BTreeMap<String, Vec<UciChange>>),
    Config(Vec<UciChange>),
}

impl Default for UciChanges {
    fn default() -> Self {
        Self::All(BTreeMap::new())
    }
}

impl UciChanges {
    /// Flatten into `(config, change)` pairs; `config` is `None` for the
    /// single-config shape.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (Option<&str>, &UciChange)> + '_> {
        match self {
            Self::All(map) => Box::new(map.iter().flat_map(|(config, changes)| {
                changes.iter().map(move |c| (Some(config.as_str()), c))
            })),
            Self::Config(changes) => Box::new(changes.iter().map(|c| (None, c))),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::All(map) => map.values().all(Vec::is_empty),
            Self::Config(changes) => changes.is_empty(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UciChangesPayload {
    #[serde(default)]
    pub changes: UciChanges,
}

// ── iwinfo ───────────────────────────────────────────────────────────

/// The `{"results": [...]}` wrapper iwinfo uses for list methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Payload of `iwinfo.devices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WirelessDevices {
    #[serde(default)]
    pub devices: Vec<String>,
}

/// Payload of `iwinfo.info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WirelessInfo {
    #[serde(default)]
    pub phy: String,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub channel: Option<u32>,
    /// MHz.
    #[serde(default)]
    pub frequency: Option<u32>,
    /// dBm.
    #[serde(default)]
    pub txpower: Option<i32>,
    #[serde(default)]
    pub quality: Option<u32>,
    #[serde(default)]
    pub quality_max: Option<u32>,
    #[serde(default)]
    pub signal: Option<i32>,
    #[serde(default)]
    pub noise: Option<i32>,
    /// kbit/s.
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub encryption: Encryption,
    #[serde(default)]
    pub hwmodes: Vec<String>,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encryption {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub wpa: Vec<u8>,
    #[serde(default)]
    pub authentication: Vec<String>,
    #[serde(default)]
    pub ciphers: Vec<String>,
}

impl Encryption {
    /// Short human label such as `WPA2 PSK (CCMP)` or `none`.
    pub fn label(&self) -> String {
        if !self.enabled {
            return "none".into();
        }
        let mut parts = Vec::new();
        if let Some(max) = self.wpa.iter().max() {
            parts.push(if *max == 1 {
                "WPA".to_owned()
            } else {
                format!("WPA{max}")
            });
        }
        if !self.authentication.is_empty() {
            parts.push(self.authentication.join("/").to_uppercase());
        }
        let mut label = if parts.is_empty() {
            "enabled".to_owned()
        } else {
            parts.join(" ")
        };
        if !self.ciphers.is_empty() {
            label.push_str(&format!(" ({})", self.ciphers.join(", ").to_uppercase()));
        }
        label
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Vec<u32>,
}

/// One BSS from `iwinfo.scan`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub bssid: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub channel: u32,
    #[serde(default)]
    pub signal: i32,
    #[serde(default)]
    pub quality: u32,
    #[serde(default)]
    pub quality_max: u32,
    #[serde(default)]
    pub encryption: Encryption,
}

/// One associated station from `iwinfo.assoclist`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssocEntry {
    pub mac: String,
    #[serde(default)]
    pub signal: i32,
    #[serde(default)]
    pub noise: i32,
    /// Milliseconds since the last frame.
    #[serde(default)]
    pub inactive: u64,
    #[serde(default)]
    pub rx: Rate,
    #[serde(default)]
    pub tx: Rate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// kbit/s.
    #[serde(default)]
    pub rate: u32,
    #[serde(default)]
    pub mcs: u32,
    #[serde(default, rename = "40mhz")]
    pub is_40mhz: bool,
    #[serde(default)]
    pub short_gi: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreqEntry {
    pub channel: u32,
    pub mhz: u32,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxPowerEntry {
    pub dbm: i32,
    #[serde(default)]
    pub mw: u32,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub iso3166: String,
    #[serde(default)]
    pub active: bool,
}
