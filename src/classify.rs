//! Proxy classification
//!
//! The databases carry no explicit "is proxy" column; the verdict is
//! derived from the country and proxy-type strings of the matched row.

use serde::Serialize;
use std::fmt;

/// Value the databases use for "no data" in any string column
pub const NO_DATA: &str = "-";

/// Proxy types classified as data center / search-engine robot
pub const DATA_CENTER_TYPES: [&str; 2] = ["DCH", "SES"];

/// Tri-state proxy verdict, plus the error state of sentinel records
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i8")]
pub enum ProxyStatus {
    /// Invalid input, unsupported lookup, or not classified by this query
    Error = -1,
    /// Not a proxy
    NotProxy = 0,
    /// A proxy (VPN, TOR, public, web, residential, ...)
    Proxy = 1,
    /// Data center range or search-engine robot
    DataCenter = 2,
}

impl ProxyStatus {
    /// Integer code: -1, 0, 1 or 2
    pub fn code(self) -> i8 {
        self as i8
    }

    /// True for [`ProxyStatus::Proxy`] and [`ProxyStatus::DataCenter`]
    pub fn is_proxy(self) -> bool {
        matches!(self, ProxyStatus::Proxy | ProxyStatus::DataCenter)
    }
}

impl From<ProxyStatus> for i8 {
    fn from(status: ProxyStatus) -> i8 {
        status.code()
    }
}

impl fmt::Display for ProxyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Classify a row from its country short code and proxy type
///
/// A `"-"` in either column means the row is not a proxy. Otherwise `DCH`
/// and `SES` are data center / robot, and anything else (including a proxy
/// type absent from the schema) is a proxy.
pub fn classify(country_short: &str, proxy_type: &str) -> ProxyStatus {
    if country_short == NO_DATA || proxy_type == NO_DATA {
        ProxyStatus::NotProxy
    } else if DATA_CENTER_TYPES.contains(&proxy_type) {
        ProxyStatus::DataCenter
    } else {
        ProxyStatus::Proxy
    }
}
