// ubusly-api: Async Rust client for the OpenWrt ubus JSON-RPC interface
//
// One `Client` per router session, over HTTP(S) to uhttpd or directly on the
// rpcd unix socket. Object modules (file, log, uci, iwinfo) are inherent
// methods on the client; anything else goes through `Client::call`.

pub mod client;
pub mod envelope;
pub mod error;
mod file;
mod log;
pub mod models;
pub mod session;
pub mod status;
pub mod transport;
mod uci;
mod wireless;

pub use client::Client;
pub use envelope::{Args, RpcMethod, to_args};
pub use error::Error;
pub use models::{
    AssocEntry, CountryEntry, Encryption, ExecResult, FileContent, FileEntries, FileEntry,
    FileStat, FileWrite, FreqEntry, Hardware, LogEntries, LogEntry, LogRead, Rate, Results,
    ScanResult, TxPowerEntry, UciChange, UciChanges, UciConfigs, UciRequest, UciValues,
    WirelessDevices, WirelessInfo,
};
pub use session::{Acls, EMPTY_SESSION, Session};
pub use status::UbusStatus;
pub use transport::{
    DEFAULT_SOCKET_PATH, DEFAULT_TIMEOUT, Endpoint, TlsMode, Transport, TransportConfig,
};
