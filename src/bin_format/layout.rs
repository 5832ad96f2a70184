//! Column layout per database type
//!
//! Each database type stores a different set of optional columns. A row is
//! `ipFrom` followed by 4-byte string pointers; the table below gives, per
//! type, the 1-based column of every field (0 = not present). Offsets are
//! taken relative to the first column after `ipFrom`, so a field in column
//! `c` lives at `(c - 2) * 4` within the row data.

use super::types::COLUMN_SIZE;
use crate::error::{ProxyError, Result};
use crate::record::Fields;

/// A logical column of a data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Pointer to the country short code; the long name follows it
    Country,
    /// Region or state
    Region,
    /// City
    City,
    /// Internet service provider
    Isp,
    /// Proxy type code (VPN, TOR, DCH, ...)
    ProxyType,
    /// Domain
    Domain,
    /// Usage type
    UsageType,
    /// Autonomous system number
    Asn,
    /// Autonomous system name
    AsName,
    /// Days since last seen
    LastSeen,
    /// Threat type
    Threat,
    /// Proxy provider
    Provider,
    /// Fraud score
    FraudScore,
}

const FIELD_COUNT: usize = 13;

impl Field {
    /// All fields in table order
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Country,
        Field::Region,
        Field::City,
        Field::Isp,
        Field::ProxyType,
        Field::Domain,
        Field::UsageType,
        Field::Asn,
        Field::AsName,
        Field::LastSeen,
        Field::Threat,
        Field::Provider,
        Field::FraudScore,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Request bits answered by this column
    pub fn request_bits(self) -> Fields {
        match self {
            Field::Country => Fields::COUNTRY_SHORT | Fields::COUNTRY_LONG,
            Field::Region => Fields::REGION,
            Field::City => Fields::CITY,
            Field::Isp => Fields::ISP,
            Field::ProxyType => Fields::PROXY_TYPE,
            Field::Domain => Fields::DOMAIN,
            Field::UsageType => Fields::USAGE_TYPE,
            Field::Asn => Fields::ASN,
            Field::AsName => Fields::AS_NAME,
            Field::LastSeen => Fields::LAST_SEEN,
            Field::Threat => Fields::THREAT,
            Field::Provider => Fields::PROVIDER,
            Field::FraudScore => Fields::FRAUD_SCORE,
        }
    }
}

/// Column of each field, one row per database type
///
/// Field order: country, region, city, isp, proxy type, domain, usage type,
/// asn, as name, last seen, threat, provider, fraud score.
#[rustfmt::skip]
const SCHEMA_COLUMNS: [[u8; FIELD_COUNT]; 13] = [
    [0, 0, 0, 0, 0, 0, 0, 0,  0,  0,  0,  0,  0], // unused
    [2, 0, 0, 0, 0, 0, 0, 0,  0,  0,  0,  0,  0], // PX1
    [3, 0, 0, 0, 2, 0, 0, 0,  0,  0,  0,  0,  0], // PX2
    [3, 4, 5, 0, 2, 0, 0, 0,  0,  0,  0,  0,  0], // PX3
    [3, 4, 5, 6, 2, 0, 0, 0,  0,  0,  0,  0,  0], // PX4
    [3, 4, 5, 6, 2, 7, 0, 0,  0,  0,  0,  0,  0], // PX5
    [3, 4, 5, 6, 2, 7, 8, 0,  0,  0,  0,  0,  0], // PX6
    [3, 4, 5, 6, 2, 7, 8, 9, 10,  0,  0,  0,  0], // PX7
    [3, 4, 5, 6, 2, 7, 8, 9, 10, 11,  0,  0,  0], // PX8
    [3, 4, 5, 6, 2, 7, 8, 9, 10, 11, 12,  0,  0], // PX9
    [3, 4, 5, 6, 2, 7, 8, 9, 10, 11, 12,  0,  0], // PX10
    [3, 4, 5, 6, 2, 7, 8, 9, 10, 11, 12, 13,  0], // PX11
    [3, 4, 5, 6, 2, 7, 8, 9, 10, 11, 12, 13, 14], // PX12
];

/// Byte offsets of the fields present in one database type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    database_type: u8,
    offsets: [Option<u32>; FIELD_COUNT],
    last_column: u8,
}

impl ColumnLayout {
    /// Look up the layout for a database type
    ///
    /// Fails when the type is not in the table, or when `column_count` is
    /// too small to hold the type's last column.
    pub fn resolve(database_type: u8, column_count: u8) -> Result<Self> {
        let columns = SCHEMA_COLUMNS
            .get(database_type as usize)
            .filter(|_| database_type != 0)
            .ok_or_else(|| {
                ProxyError::Format(format!("unsupported database type {}", database_type))
            })?;

        let mut offsets = [None; FIELD_COUNT];
        for (slot, &column) in offsets.iter_mut().zip(columns.iter()) {
            if column >= 2 {
                *slot = Some((column as u32 - 2) * COLUMN_SIZE);
            }
        }

        let last_column = columns.iter().copied().max().unwrap_or(0);
        if column_count < last_column {
            return Err(ProxyError::Format(format!(
                "database type {} needs {} columns, header declares {}",
                database_type, last_column, column_count
            )));
        }

        Ok(ColumnLayout {
            database_type,
            offsets,
            last_column,
        })
    }

    /// Database type this layout was resolved for
    pub fn database_type(&self) -> u8 {
        self.database_type
    }

    /// Offset of a field within the row data, if the type has it
    pub fn offset(&self, field: Field) -> Option<usize> {
        self.offsets[field.index()].map(|o| o as usize)
    }

    /// Whether the type stores this field
    pub fn has(&self, field: Field) -> bool {
        self.offsets[field.index()].is_some()
    }

    /// Request bits this type can answer with real data
    ///
    /// `IS_PROXY` is included whenever country or proxy type is present.
    pub fn supported(&self) -> Fields {
        let mut fields = Field::ALL
            .iter()
            .filter(|f| self.has(**f))
            .fold(Fields::empty(), |acc, f| acc | f.request_bits());
        if self.has(Field::Country) || self.has(Field::ProxyType) {
            fields |= Fields::IS_PROXY;
        }
        fields
    }

    /// Highest column used by the type
    pub fn last_column(&self) -> u8 {
        self.last_column
    }
}
