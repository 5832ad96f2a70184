//! IP2Proxy-style BIN format reader
//!
//! A BIN file is a 64-byte header followed by two sorted range tables
//! (IPv4, IPv6), optional per-family index tables, and a pool of
//! length-prefixed strings referenced from the rows.
//!
//! ## Architecture
//!
//! - **types**: format constants
//! - **header**: header parsing and structural checks
//! - **layout**: per-type column offsets
//! - **search**: index narrowing and binary search over a range table
//!
//! Nothing here holds file state; every function works on the byte slice
//! of an open database, so concurrent lookups need no coordination.

pub mod header;
pub mod layout;
pub mod search;
pub mod types;

pub use header::{DatabaseMeta, FamilyTable, RawHeader};
pub use layout::{ColumnLayout, Field};
pub use search::{RangeRow, RangeTable};
pub use types::HEADER_SIZE;

use crate::error::{ProxyError, Result};

/// Positioned read at a 0-based file offset
pub(crate) fn slice_at(data: &[u8], offset: u64, len: usize) -> Result<&[u8]> {
    usize::try_from(offset)
        .ok()
        .and_then(|start| data.get(start..start.checked_add(len)?))
        .ok_or_else(|| ProxyError::out_of_bounds(offset, len, data.len()))
}

/// Positioned read at a 1-based file position, as stored in the header
/// and index tables
pub(crate) fn slice_at_position(data: &[u8], position: u64, len: usize) -> Result<&[u8]> {
    let offset = position.checked_sub(1).ok_or_else(|| {
        ProxyError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "file position 0 in a 1-based address field",
        ))
    })?;
    slice_at(data, offset, len)
}
