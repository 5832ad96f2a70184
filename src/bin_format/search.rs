//! Range table search
//!
//! Rows of a family's table are sorted by `ipFrom` and contiguous: the end
//! of row `i` (exclusive) is the `ipFrom` of row `i + 1`, so reading a row
//! always reads the next row's first column too.
//!
//! When the family has an index table, the top 16 bits of the address pick
//! an 8-byte slot holding the first and last row that can contain any
//! address with that prefix. The binary search then runs over that window
//! instead of the whole table.

use super::header::{DatabaseMeta, FamilyTable};
use super::types::INDEX_SLOT_SIZE;
use super::slice_at_position;
use crate::address::{AddressKey, IpFamily};
use crate::endian::{read_u128_le, read_u32_le};
use crate::error::{ProxyError, Result};

/// One row of a range table, borrowed from the database buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRow<'a> {
    /// Row number within the family table
    pub index: u32,
    /// First address of the range
    pub ip_from: u128,
    /// First address past the range
    pub ip_to: u128,
    /// Column bytes after `ipFrom`
    pub data: &'a [u8],
}

impl RangeRow<'_> {
    /// Whether `value` falls in `[ip_from, ip_to)`
    pub fn contains(&self, value: u128) -> bool {
        value >= self.ip_from && value < self.ip_to
    }
}

/// Read-only view of one family's range table
#[derive(Debug, Clone, Copy)]
pub struct RangeTable<'a> {
    data: &'a [u8],
    family: IpFamily,
    table: FamilyTable,
}

impl<'a> RangeTable<'a> {
    /// View the table for `family` inside the database buffer `data`
    pub fn new(data: &'a [u8], meta: &DatabaseMeta, family: IpFamily) -> Self {
        RangeTable {
            data,
            family,
            table: *meta.table(family),
        }
    }

    /// Family this table serves
    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// Number of rows declared in the header
    pub fn row_count(&self) -> u32 {
        self.table.row_count
    }

    /// Inclusive `[low, high]` row window to search for `key`
    ///
    /// Without an index the window is the whole table.
    pub fn search_window(&self, key: &AddressKey) -> Result<(u32, u32)> {
        let Some(index_addr) = self.table.index_addr else {
            return Ok((0, self.table.row_count));
        };
        let position = index_addr as u64 + key.prefix16() as u64 * INDEX_SLOT_SIZE;
        let slot = slice_at_position(self.data, position, INDEX_SLOT_SIZE as usize)?;
        match (read_u32_le(slot, 0), read_u32_le(slot, 4)) {
            (Some(low), Some(high)) => Ok((low, high)),
            _ => Err(ProxyError::out_of_bounds(
                position,
                INDEX_SLOT_SIZE as usize,
                self.data.len(),
            )),
        }
    }

    /// Read row `index` together with the next row's `ipFrom`
    pub fn row(&self, index: u32) -> Result<RangeRow<'a>> {
        let width = self.family.address_width();
        let row_size = self.table.row_size as usize;
        let position = self.table.base_addr as u64 + index as u64 * row_size as u64;
        let bytes = slice_at_position(self.data, position, row_size + width)?;

        let (ip_from, ip_to) = match self.family {
            IpFamily::V4 => (
                read_u32_le(bytes, 0).map(u128::from),
                read_u32_le(bytes, row_size).map(u128::from),
            ),
            IpFamily::V6 => (read_u128_le(bytes, 0), read_u128_le(bytes, row_size)),
        };
        // Both reads are inside the slice fetched above
        let (Some(ip_from), Some(ip_to)) = (ip_from, ip_to) else {
            return Err(ProxyError::out_of_bounds(position, row_size + width, self.data.len()));
        };

        Ok(RangeRow {
            index,
            ip_from,
            ip_to,
            data: &bytes[width..row_size],
        })
    }

    /// Find the row whose range contains `key`
    ///
    /// Returns `Ok(None)` when no row matches, which only happens for a
    /// table that does not cover the whole address space. The search never
    /// validates ordering; an unsorted table gives an arbitrary answer.
    pub fn lookup(&self, key: &AddressKey) -> Result<Option<RangeRow<'a>>> {
        debug_assert_eq!(key.family, self.family);

        let (mut low, mut high) = self.search_window(key)?;

        // The top address is the exclusive end of the last row
        let max = self.family.max_value();
        let value = if key.value >= max { max - 1 } else { key.value };

        while low <= high {
            let mid = ((low as u64 + high as u64) >> 1) as u32;
            let row = self.row(mid)?;
            log::trace!(
                "{} probe row {} [{:#x}, {:#x}) for {:#x}",
                self.family,
                mid,
                row.ip_from,
                row.ip_to,
                value
            );

            if row.contains(value) {
                return Ok(Some(row));
            }

            if value < row.ip_from {
                match mid.checked_sub(1) {
                    Some(h) => high = h,
                    None => break,
                }
            } else {
                match mid.checked_add(1) {
                    Some(l) => low = l,
                    None => break,
                }
            }
        }

        log::trace!("{} no row contains {:#x}", self.family, value);
        Ok(None)
    }
}
