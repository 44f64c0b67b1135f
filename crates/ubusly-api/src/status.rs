// ubus status codes
//
// Mirrors `enum ubus_msg_status` from ubusmsg.h. The first element of every
// `result` array is one of these; zero means success and everything else is
// classified into a named kind.

use std::fmt;

/// Status code reported by a successful ubus invocation.
pub const STATUS_OK: i64 = 0;

/// A non-success ubus status, classified from the raw integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UbusStatus {
    InvalidCommand,
    InvalidArgument,
    MethodNotFound,
    NotFound,
    NoData,
    PermissionDenied,
    Timeout,
    NotSupported,
    Unknown,
    ConnectionFailed,
    /// Code 11, `UBUS_STATUS_LAST` in the status enum this table tracks.
    Reserved,
    /// A code outside the known table, kept verbatim for diagnostics.
    Unmapped(i64),
}

impl UbusStatus {
    /// Classify a raw status code. Returns `None` for success (code 0).
    pub fn classify(code: i64) -> Option<Self> {
        let status = match code {
            STATUS_OK => return None,
            1 => Self::InvalidCommand,
            2 => Self::InvalidArgument,
            3 => Self::MethodNotFound,
            4 => Self::NotFound,
            5 => Self::NoData,
            6 => Self::PermissionDenied,
            7 => Self::Timeout,
            8 => Self::NotSupported,
            9 => Self::Unknown,
            10 => Self::ConnectionFailed,
            11 => Self::Reserved,
            other => Self::Unmapped(other),
        };
        Some(status)
    }

    /// The raw integer code this status was classified from.
    pub fn code(self) -> i64 {
        match self {
            Self::InvalidCommand => 1,
            Self::InvalidArgument => 2,
            Self::MethodNotFound => 3,
            Self::NotFound => 4,
            Self::NoData => 5,
            Self::PermissionDenied => 6,
            Self::Timeout => 7,
            Self::NotSupported => 8,
            Self::Unknown => 9,
            Self::ConnectionFailed => 10,
            Self::Reserved => 11,
            Self::Unmapped(code) => code,
        }
    }

    /// Human-readable description, matching the wording rpcd uses.
    pub fn description(self) -> &'static str {
        match self {
            Self::InvalidCommand => "Invalid command",
            Self::InvalidArgument => "Invalid argument",
            Self::MethodNotFound => "Method not found",
            Self::NotFound => "Not found",
            Self::NoData => "No response",
            Self::PermissionDenied => "Permission denied",
            Self::Timeout => "Request timed out",
            Self::NotSupported => "Operation not supported",
            Self::Unknown => "Unknown error",
            Self::ConnectionFailed => "Connection failed",
            Self::Reserved => "Reserved status",
            Self::Unmapped(_) => "Unrecognized status",
        }
    }
}

impl fmt::Display for UbusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ubus status {})", self.description(), self.code())
    }
}
