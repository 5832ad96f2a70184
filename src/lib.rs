//! proxydb - Proxy Detection Lookups over IP2Proxy BIN Databases
//!
//! proxydb answers "is this address a proxy, and what kind?" from a local
//! IP2Proxy-style BIN file. Lookups are a binary search over sorted,
//! non-overlapping address ranges, optionally narrowed by a 16-bit prefix
//! index, followed by decoding only the columns the caller asked for.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use proxydb::{Database, Fields, ProxyStatus};
//!
//! let db = Database::open("IP2PROXY-LITE-PX11.BIN")?;
//!
//! // Everything the database type stores
//! let record = db.get_all("1.2.3.4")?;
//! println!("{} via {} ({})", record.country_short, record.proxy_type, record.provider);
//!
//! // Just the classification
//! match db.is_proxy("199.83.103.79")? {
//!     ProxyStatus::NotProxy => println!("clean"),
//!     ProxyStatus::Proxy => println!("proxy"),
//!     ProxyStatus::DataCenter => println!("data center or robot"),
//!     ProxyStatus::Error => println!("lookup not possible"),
//! }
//!
//! // A chosen subset of columns
//! let record = db.query("2001:db8::1", Fields::COUNTRY_SHORT | Fields::THREAT)?;
//! println!("{} {}", record.country_short, record.threat);
//! # Ok::<(), proxydb::ProxyError>(())
//! ```
//!
//! # Key Features
//!
//! - **Zero-Copy Loading**: files are memory-mapped by default
//! - **Selective Decoding**: only requested columns are read
//! - **IPv6 Remapping**: v4-mapped, 6to4 and Teredo addresses hit the IPv4 table
//! - **Thread Safe**: a handle is `Sync`; queries never mutate it
//! - **All Schemas**: database types PX1 through PX12
//!
//! # File Format
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  64-byte header                      │
//! ├──────────────────────────────────────┤
//! │  IPv4 range table (ipFrom + ptrs)    │
//! │  IPv6 range table (ipFrom + ptrs)    │
//! │  IPv4 / IPv6 prefix index (optional) │
//! │  String pool (length-prefixed)       │
//! └──────────────────────────────────────┘
//! ```
//!
//! Malformed input is never a panic: a bad header fails the open with
//! [`ProxyError::Format`], a truncated table or pool fails the query with
//! [`ProxyError::Io`], and an unparseable address yields a sentinel record.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
/// IP address normalization
pub mod address;
/// BIN format reader (header, layout, range search)
pub mod bin_format;
/// Proxy classification
pub mod classify;
/// Database handle and query API
pub mod database;
pub mod endian;
/// Error types
pub mod error;
/// Record decoding and field selection
pub mod record;

// Re-exports for Rust consumers

/// Database handle and open options
pub use crate::database::{Database, OpenOptions, StorageMode};

pub use crate::address::{AddressKey, IpFamily};
pub use crate::bin_format::{ColumnLayout, DatabaseMeta, Field};
pub use crate::classify::ProxyStatus;
pub use crate::error::{ProxyError, Result};
pub use crate::record::{
    Fields, ProxyRecord, INVALID_IP_ADDRESS, IPV6_UNSUPPORTED, MISSING_FILE, NOT_SUPPORTED,
};

// Version information
/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
