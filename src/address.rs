//! Address normalization
//!
//! Turns a textual IP address into the numeric key used to search the
//! range tables. IPv6 forms that embed an IPv4 address are rewritten to the
//! IPv4 key before lookup, so they hit the IPv4 table:
//!
//! | Form        | Range                 | Rewrite                         |
//! |-------------|-----------------------|---------------------------------|
//! | v4-mapped   | `::ffff:0:0/96`       | value - `::ffff:0:0`            |
//! | 6to4        | `2002::/16`           | (value >> 80) & 0xffff_ffff     |
//! | Teredo      | `2001:0000::/32`      | !value & 0xffff_ffff            |
//!
//! The three ranges are disjoint, so the first matching rewrite is the only
//! one that can apply.

use serde::Serialize;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

const FROM_V4_MAPPED: u128 = 0x0000_0000_0000_0000_0000_ffff_0000_0000;
const TO_V4_MAPPED: u128 = 0x0000_0000_0000_0000_0000_ffff_ffff_ffff;
const FROM_6TO4: u128 = 0x2002_0000_0000_0000_0000_0000_0000_0000;
const TO_6TO4: u128 = 0x2002_ffff_ffff_ffff_ffff_ffff_ffff_ffff;
const FROM_TEREDO: u128 = 0x2001_0000_0000_0000_0000_0000_0000_0000;
const TO_TEREDO: u128 = 0x2001_0000_ffff_ffff_ffff_ffff_ffff_ffff;

const LAST_32_BITS: u128 = 0xffff_ffff;

/// Address family of a normalized key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IpFamily {
    /// IPv4, including IPv6 forms remapped to IPv4
    V4,
    /// IPv6
    V6,
}

impl IpFamily {
    /// Numeric family tag (4 or 6)
    pub fn as_u8(self) -> u8 {
        match self {
            IpFamily::V4 => 4,
            IpFamily::V6 => 6,
        }
    }

    /// Width in bytes of the `ipFrom` column for this family
    pub fn address_width(self) -> usize {
        match self {
            IpFamily::V4 => 4,
            IpFamily::V6 => 16,
        }
    }

    /// Highest address value of the family; exclusive bound of the last row
    pub fn max_value(self) -> u128 {
        match self {
            IpFamily::V4 => u32::MAX as u128,
            IpFamily::V6 => u128::MAX,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.as_u8())
    }
}

/// Canonical numeric form of an address
///
/// IPv4 values occupy the low 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressKey {
    /// Family whose range table the key is searched in
    pub family: IpFamily,
    /// Address as an unsigned integer
    pub value: u128,
}

impl AddressKey {
    /// Key for a plain IPv4 address
    pub fn v4(addr: Ipv4Addr) -> Self {
        AddressKey {
            family: IpFamily::V4,
            value: u32::from(addr) as u128,
        }
    }

    /// Key for an IPv6 address, with embedded-IPv4 forms remapped
    pub fn v6(addr: Ipv6Addr) -> Self {
        AddressKey {
            family: IpFamily::V6,
            value: u128::from(addr),
        }
        .remap_embedded_v4()
    }

    /// Top 16 bits of the address within its family
    ///
    /// Selects the slot in the per-family index table.
    pub fn prefix16(&self) -> u16 {
        match self.family {
            IpFamily::V4 => (self.value >> 16) as u16,
            IpFamily::V6 => (self.value >> 112) as u16,
        }
    }

    fn remap_embedded_v4(self) -> Self {
        if self.family != IpFamily::V6 {
            return self;
        }
        let value = self.value;
        let remapped = if (FROM_V4_MAPPED..=TO_V4_MAPPED).contains(&value) {
            value - FROM_V4_MAPPED
        } else if (FROM_6TO4..=TO_6TO4).contains(&value) {
            (value >> 80) & LAST_32_BITS
        } else if (FROM_TEREDO..=TO_TEREDO).contains(&value) {
            !value & LAST_32_BITS
        } else {
            return self;
        };
        AddressKey {
            family: IpFamily::V4,
            value: remapped,
        }
    }
}

/// Parse and normalize a textual address
///
/// IPv4 parsing is tried first, then IPv6. Returns `None` for anything that
/// is neither.
pub fn normalize(text: &str) -> Option<AddressKey> {
    if let Ok(addr) = text.parse::<Ipv4Addr>() {
        return Some(AddressKey::v4(addr));
    }
    text.parse::<Ipv6Addr>().ok().map(AddressKey::v6)
}
