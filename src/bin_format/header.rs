//! BIN header parsing
//!
//! The first 64 bytes of every database file:
//!
//! ```text
//! offset  size  field
//!      0     1  database type (selects the column layout)
//!      1     1  column count (including the ipFrom column)
//!      2     3  compile date: year - 2000, month, day
//!      5     4  IPv4 row count
//!      9     4  IPv4 range table address (1-based)
//!     13     4  IPv6 row count
//!     17     4  IPv6 range table address (1-based)
//!     21     4  IPv4 index table address (1-based, 0 = none)
//!     25     4  IPv6 index table address (1-based, 0 = none)
//!     29     1  product code (2 for proxy databases)
//!     30     1  product type
//!     31     4  file size
//!     35    29  reserved
//! ```
//!
//! All integers are little-endian and unaligned, so the header is read
//! through zerocopy's byte-order types rather than native integers.

use super::layout::ColumnLayout;
use super::types::{HEADER_SIZE, PRODUCT_CODE_PROXY, PRODUCT_CODE_SINCE_YEAR, ZIP_SIGNATURE};
use crate::address::IpFamily;
use crate::error::{ProxyError, Result};
use serde::Serialize;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// On-disk header, byte for byte
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RawHeader {
    /// Database type
    pub database_type: u8,
    /// Column count
    pub database_column: u8,
    /// Years since 2000
    pub year: u8,
    /// Month
    pub month: u8,
    /// Day
    pub day: u8,
    /// IPv4 row count
    pub ipv4_count: U32,
    /// IPv4 table base (1-based)
    pub ipv4_addr: U32,
    /// IPv6 row count
    pub ipv6_count: U32,
    /// IPv6 table base (1-based)
    pub ipv6_addr: U32,
    /// IPv4 index base (1-based, 0 = absent)
    pub ipv4_index_addr: U32,
    /// IPv6 index base (1-based, 0 = absent)
    pub ipv6_index_addr: U32,
    /// Product code
    pub product_code: u8,
    /// Product type
    pub product_type: u8,
    /// File size as recorded by the producer
    pub file_size: U32,
    /// Unused
    pub reserved: [u8; 29],
}

const _: () = assert!(std::mem::size_of::<RawHeader>() == HEADER_SIZE);

/// Location of one family's range table and its optional index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FamilyTable {
    /// Number of rows searched
    pub row_count: u32,
    /// 1-based file position of row 0
    pub base_addr: u32,
    /// 1-based file position of the index table, if present
    pub index_addr: Option<u32>,
    /// Bytes per row, ipFrom column included
    pub row_size: u32,
}

/// Parsed, validated database header
///
/// Immutable once the database is opened.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseMeta {
    /// Schema tag selecting the column layout
    pub database_type: u8,
    /// Declared columns per row, ipFrom included
    pub database_column: u8,
    /// Compile year, as an offset from 2000
    pub year: u8,
    /// Compile month
    pub month: u8,
    /// Compile day
    pub day: u8,
    /// IPv4 range table
    pub ipv4: FamilyTable,
    /// IPv6 range table
    pub ipv6: FamilyTable,
    /// Product code (format integrity marker)
    pub product_code: u8,
    /// Product type
    pub product_type: u8,
    /// File size recorded in the header
    pub file_size: u32,
}

impl DatabaseMeta {
    /// Parse the header at the start of `data`
    ///
    /// Fails with [`ProxyError::Format`] when the buffer is shorter than the
    /// header, when it looks like a zip archive, when the product code is
    /// wrong for a file compiled in 2021 or later, or when the declared
    /// column count cannot hold the type's layout.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (raw, _) = RawHeader::read_from_prefix(data).map_err(|_| {
            ProxyError::Format(format!(
                "file too small: {} bytes (need at least {})",
                data.len(),
                HEADER_SIZE
            ))
        })?;
        Self::from_raw(&raw)
    }

    /// Validate a raw header and derive row sizes and index presence
    pub fn from_raw(raw: &RawHeader) -> Result<Self> {
        if [raw.database_type, raw.database_column] == ZIP_SIGNATURE {
            return Err(ProxyError::Format(
                "file is a zip archive; extract the BIN file first".to_string(),
            ));
        }
        if raw.product_code != PRODUCT_CODE_PROXY && raw.year >= PRODUCT_CODE_SINCE_YEAR {
            return Err(ProxyError::Format(format!(
                "incorrect BIN file format: product code {} (expected {})",
                raw.product_code, PRODUCT_CODE_PROXY
            )));
        }
        if raw.database_column == 0 {
            return Err("incorrect BIN file format: zero columns".into());
        }

        // Resolving the layout validates the type against the column count
        ColumnLayout::resolve(raw.database_type, raw.database_column)?;

        let columns = raw.database_column as u32;
        let ipv4_count = raw.ipv4_count.get();
        let ipv6_count = raw.ipv6_count.get();
        let ipv4_index = raw.ipv4_index_addr.get();
        let ipv6_index = raw.ipv6_index_addr.get();

        Ok(DatabaseMeta {
            database_type: raw.database_type,
            database_column: raw.database_column,
            year: raw.year,
            month: raw.month,
            day: raw.day,
            ipv4: FamilyTable {
                row_count: ipv4_count,
                base_addr: raw.ipv4_addr.get(),
                index_addr: (ipv4_index > 0).then_some(ipv4_index),
                row_size: columns * 4,
            },
            ipv6: FamilyTable {
                row_count: ipv6_count,
                base_addr: raw.ipv6_addr.get(),
                index_addr: (ipv6_count > 0 && ipv6_index > 0).then_some(ipv6_index),
                row_size: 16 + (columns - 1) * 4,
            },
            product_code: raw.product_code,
            product_type: raw.product_type,
            file_size: raw.file_size.get(),
        })
    }

    /// Range table for a family
    pub fn table(&self, family: IpFamily) -> &FamilyTable {
        match family {
            IpFamily::V4 => &self.ipv4,
            IpFamily::V6 => &self.ipv6,
        }
    }

    /// Whether the file carries any IPv6 rows
    pub fn has_ipv6(&self) -> bool {
        self.ipv6.row_count > 0
    }
}
