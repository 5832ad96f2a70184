//! Synthetic BIN database writer for integration tests
//!
//! Produces byte-exact files in the layout the reader expects: header,
//! IPv4 table, IPv6 table, optional prefix indexes, then the string pool.
//! Each table ends with the `ipFrom` of an implicit terminal row so the
//! last real row has an upper bound.

#![allow(dead_code)]

use proxydb::bin_format::RawHeader;
use proxydb::{ColumnLayout, Field};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromZeros, IntoBytes};

/// Column values of one row
#[derive(Debug, Clone)]
pub struct Entry {
    country_short: String,
    country_long: String,
    values: HashMap<Field, String>,
}

impl Entry {
    /// Row with a country; every other column reads "-"
    pub fn new(country_short: &str, country_long: &str) -> Self {
        assert!(country_short.len() <= 2, "short codes are at most 2 bytes");
        Entry {
            country_short: country_short.to_string(),
            country_long: country_long.to_string(),
            values: HashMap::new(),
        }
    }

    /// Set a non-country column
    pub fn with(mut self, field: Field, value: &str) -> Self {
        assert_ne!(field, Field::Country);
        self.values.insert(field, value.to_string());
        self
    }

    fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("-")
    }
}

/// Builder for an in-memory BIN image
pub struct BinWriter {
    database_type: u8,
    columns: u8,
    year: u8,
    product_code: u8,
    v4: Vec<(u32, Entry)>,
    v6: Vec<(u128, Entry)>,
    v4_index: bool,
    v6_index: bool,
}

impl BinWriter {
    /// Writer for a database type with exactly the columns it needs
    pub fn new(database_type: u8) -> Self {
        let layout = ColumnLayout::resolve(database_type, u8::MAX).expect("known type");
        BinWriter {
            database_type,
            columns: layout.last_column(),
            year: 24,
            product_code: 2,
            v4: Vec::new(),
            v6: Vec::new(),
            v4_index: false,
            v6_index: false,
        }
    }

    /// Override the header's compile year (offset from 2000)
    pub fn year(mut self, year: u8) -> Self {
        self.year = year;
        self
    }

    /// Override the header's product code
    pub fn product_code(mut self, code: u8) -> Self {
        self.product_code = code;
        self
    }

    /// Override the declared column count
    pub fn columns(mut self, columns: u8) -> Self {
        self.columns = columns;
        self
    }

    /// Add an IPv4 row starting at `from`; rows must be added in order
    pub fn v4(mut self, from: u32, entry: Entry) -> Self {
        self.v4.push((from, entry));
        self
    }

    /// Add an IPv6 row starting at `from`; rows must be added in order
    pub fn v6(mut self, from: u128, entry: Entry) -> Self {
        self.v6.push((from, entry));
        self
    }

    /// Emit prefix indexes for both families
    pub fn indexed(mut self) -> Self {
        self.v4_index = true;
        self.v6_index = true;
        self
    }

    /// Serialize to bytes
    pub fn build(&self) -> Vec<u8> {
        // Declared columns may be overridden below what the type needs
        let layout = ColumnLayout::resolve(self.database_type, u8::MAX).expect("known type");
        let columns = self.columns as usize;
        let v4_row = columns * 4;
        let v6_row = 16 + (columns - 1) * 4;

        let v4_bytes = self.v4.len() * v4_row + 4;
        let v6_bytes = if self.v6.is_empty() {
            0
        } else {
            self.v6.len() * v6_row + 16
        };
        let index_bytes = 65536 * 8;

        // 0-based offsets
        let v4_start = 64;
        let v6_start = v4_start + v4_bytes;
        let mut cursor = v6_start + v6_bytes;
        let v4_index_start = self.v4_index.then(|| {
            let start = cursor;
            cursor += index_bytes;
            start
        });
        let v6_index_start = (self.v6_index && !self.v6.is_empty()).then(|| {
            let start = cursor;
            cursor += index_bytes;
            start
        });
        let pool_start = cursor as u32;

        let mut pool = StringPool::new(pool_start);

        let mut raw = RawHeader::new_zeroed();
        raw.database_type = self.database_type;
        raw.database_column = self.columns;
        raw.year = self.year;
        raw.month = 6;
        raw.day = 1;
        raw.ipv4_count = U32::new(self.v4.len() as u32);
        raw.ipv4_addr = U32::new(v4_start as u32 + 1);
        raw.ipv6_count = U32::new(self.v6.len() as u32);
        raw.ipv6_addr = U32::new(if self.v6.is_empty() {
            0
        } else {
            v6_start as u32 + 1
        });
        raw.ipv4_index_addr = U32::new(v4_index_start.map_or(0, |s| s as u32 + 1));
        raw.ipv6_index_addr = U32::new(v6_index_start.map_or(0, |s| s as u32 + 1));
        raw.product_code = self.product_code;
        raw.product_type = 1;

        let mut out = raw.as_bytes().to_vec();

        for (from, entry) in &self.v4 {
            out.extend_from_slice(&from.to_le_bytes());
            out.extend_from_slice(&row_pointers(entry, &layout, columns, &mut pool));
        }
        out.extend_from_slice(&u32::MAX.to_le_bytes());

        if !self.v6.is_empty() {
            for (from, entry) in &self.v6 {
                out.extend_from_slice(&from.to_le_bytes());
                out.extend_from_slice(&row_pointers(entry, &layout, columns, &mut pool));
            }
            out.extend_from_slice(&u128::MAX.to_le_bytes());
        }

        if v4_index_start.is_some() {
            let froms: Vec<u128> = self.v4.iter().map(|(f, _)| *f as u128).collect();
            write_index(&mut out, &froms, 16);
        }
        if v6_index_start.is_some() {
            let froms: Vec<u128> = self.v6.iter().map(|(f, _)| *f).collect();
            write_index(&mut out, &froms, 112);
        }

        assert_eq!(out.len(), pool_start as usize);
        out.extend_from_slice(&pool.bytes);

        let total = out.len() as u32;
        out[31..35].copy_from_slice(&total.to_le_bytes());
        out
    }

    /// Serialize into a temporary file
    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(&self.build()).expect("write temp file");
        file.flush().expect("flush temp file");
        file
    }
}

fn row_pointers(
    entry: &Entry,
    layout: &ColumnLayout,
    columns: usize,
    pool: &mut StringPool,
) -> Vec<u8> {
    let mut data = vec![0u8; (columns - 1) * 4];
    for field in Field::ALL {
        let Some(offset) = layout.offset(field).filter(|o| o + 4 <= data.len()) else {
            continue;
        };
        let pointer = if field == Field::Country {
            pool.country(&entry.country_short, &entry.country_long)
        } else {
            pool.string(entry.value(field))
        };
        data[offset..offset + 4].copy_from_slice(&pointer.to_le_bytes());
    }
    data
}

/// Index slot per 16-bit prefix: first and last row overlapping the prefix
fn write_index(out: &mut Vec<u8>, froms: &[u128], shift: u32) {
    let row_for = |value: u128| -> u32 {
        froms.partition_point(|&from| from <= value).saturating_sub(1) as u32
    };
    let span = (1u128 << shift) - 1;
    for prefix in 0u128..65536 {
        let start = prefix << shift;
        out.extend_from_slice(&row_for(start).to_le_bytes());
        out.extend_from_slice(&row_for(start | span).to_le_bytes());
    }
}

struct StringPool {
    base: u32,
    bytes: Vec<u8>,
    strings: HashMap<String, u32>,
    countries: HashMap<(String, String), u32>,
}

impl StringPool {
    fn new(base: u32) -> Self {
        StringPool {
            base,
            bytes: Vec::new(),
            strings: HashMap::new(),
            countries: HashMap::new(),
        }
    }

    fn push(&mut self, s: &str) -> u32 {
        assert!(s.len() < 256);
        let offset = self.base + self.bytes.len() as u32;
        self.bytes.push(s.len() as u8);
        self.bytes.extend_from_slice(s.as_bytes());
        offset
    }

    fn string(&mut self, s: &str) -> u32 {
        if let Some(&offset) = self.strings.get(s) {
            return offset;
        }
        let offset = self.push(s);
        self.strings.insert(s.to_string(), offset);
        offset
    }

    /// Short code padded to 3 bytes, long name right after
    fn country(&mut self, short: &str, long: &str) -> u32 {
        let key = (short.to_string(), long.to_string());
        if let Some(&offset) = self.countries.get(&key) {
            return offset;
        }
        let offset = self.push(short);
        self.bytes.resize(self.bytes.len() + 2 - short.len(), 0);
        self.push(long);
        self.countries.insert(key, offset);
        offset
    }
}

/// Two IPv4 rows: [0, 10.0.0.0) US/VPN and [10.0.0.0, max) with no data
pub fn two_row_px2() -> BinWriter {
    BinWriter::new(2)
        .v4(0, Entry::new("US", "United States of America").with(Field::ProxyType, "VPN"))
        .v4(0x0A00_0000, Entry::new("-", "-"))
}

/// Dual-stack PX11 sample covering every classification
pub fn px11_sample() -> BinWriter {
    let full = |short: &str, long: &str, proxy: &str, provider: &str| {
        Entry::new(short, long)
            .with(Field::ProxyType, proxy)
            .with(Field::Region, "Region")
            .with(Field::City, "City")
            .with(Field::Isp, "Example ISP")
            .with(Field::Domain, "example.net")
            .with(Field::UsageType, "DCH")
            .with(Field::Asn, "64500")
            .with(Field::AsName, "EXAMPLE-AS")
            .with(Field::LastSeen, "7")
            .with(Field::Threat, "SPAM")
            .with(Field::Provider, provider)
    };
    BinWriter::new(11)
        .v4(0, Entry::new("-", "-"))
        .v4(0x0102_0300, full("AU", "Australia", "VPN", "ExampleVPN"))
        .v4(0x0102_0400, Entry::new("-", "-"))
        .v4(0x4A7D_0000, full("US", "United States of America", "SES", "-"))
        .v4(0x4A7E_0000, Entry::new("-", "-"))
        .v4(0xC753_6700, full("US", "United States of America", "DCH", "Example Cloud"))
        .v4(0xC753_6800, Entry::new("-", "-"))
        .v6(0, Entry::new("-", "-"))
        .v6(
            0x2400_cb00_0000_0000_0000_0000_0000_0000,
            full("JP", "Japan", "TOR", "-"),
        )
        .v6(0x2400_cc00_0000_0000_0000_0000_0000_0000, Entry::new("-", "-"))
}

/// Logger that stays quiet unless RUST_LOG is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
