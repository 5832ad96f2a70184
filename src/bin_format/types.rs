//! BIN format constants

/// Size of the fixed header at the start of every file
pub const HEADER_SIZE: usize = 64;

/// Product code carried by proxy databases
pub const PRODUCT_CODE_PROXY: u8 = 2;

/// Files compiled in or after 2021 (year byte 21) must carry the product code
pub const PRODUCT_CODE_SINCE_YEAR: u8 = 21;

/// First two bytes of a zip archive, seen where type and column count belong
pub const ZIP_SIGNATURE: [u8; 2] = *b"PK";

/// Bytes per index slot: (low row, high row) as two u32
pub const INDEX_SLOT_SIZE: u64 = 8;

/// Bytes per column other than an IPv6 ipFrom
pub const COLUMN_SIZE: u32 = 4;

/// Bytes between a country short-code string and its long-name string
///
/// One length byte plus the two-letter code.
pub const COUNTRY_LONG_DELTA: u32 = 3;
