//! Record decoding
//!
//! A matched row holds one 4-byte pointer per column. Each pointer is the
//! 0-based file offset of a length-prefixed string in the string pool:
//!
//! ```text
//! +-----+-------+-------+-----+
//! | len | buf 0 | buf 1 | ... |
//! +-----+-------+-------+-----+
//! ```
//!
//! The country column points at the short code; the long name always
//! starts 3 bytes later. Only the requested columns are decoded. Columns the
//! schema lacks, and columns not requested, keep the "NOT SUPPORTED" text.

use crate::bin_format::types::COUNTRY_LONG_DELTA;
use crate::bin_format::{slice_at, ColumnLayout, Field, RangeRow};
use crate::classify::{classify, ProxyStatus};
use crate::endian::read_u32_le;
use crate::error::{ProxyError, Result};
use bitflags::bitflags;
use serde::Serialize;

/// Field text for columns absent from the schema or not requested
pub const NOT_SUPPORTED: &str = "NOT SUPPORTED";

/// Field text when the query string is not an IP address
pub const INVALID_IP_ADDRESS: &str = "INVALID IP ADDRESS";

/// Field text when the handle is not open
pub const MISSING_FILE: &str = "MISSING FILE";

/// Field text for an IPv6 query against a file without IPv6 rows
pub const IPV6_UNSUPPORTED: &str = "IPV6 ADDRESS MISSING IN IPV4 BIN";

bitflags! {
    /// Set of requested record fields
    ///
    /// # Example
    ///
    /// ```
    /// use proxydb::Fields;
    ///
    /// let wanted = Fields::COUNTRY_SHORT | Fields::PROXY_TYPE;
    /// assert!(wanted.contains(Fields::PROXY_TYPE));
    /// assert!(Fields::ALL.contains(wanted));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Fields: u32 {
        /// ISO 3166 country code
        const COUNTRY_SHORT = 0x00001;
        /// Country name
        const COUNTRY_LONG  = 0x00002;
        /// Region or state
        const REGION        = 0x00004;
        /// City
        const CITY          = 0x00008;
        /// Internet service provider
        const ISP           = 0x00010;
        /// Proxy type
        const PROXY_TYPE    = 0x00020;
        /// Classification only
        const IS_PROXY      = 0x00040;
        /// Domain
        const DOMAIN        = 0x00080;
        /// Usage type
        const USAGE_TYPE    = 0x00100;
        /// Autonomous system number
        const ASN           = 0x00200;
        /// Autonomous system name
        const AS_NAME       = 0x00400;
        /// Days since last seen
        const LAST_SEEN     = 0x00800;
        /// Threat type
        const THREAT        = 0x01000;
        /// Proxy provider
        const PROVIDER      = 0x02000;
        /// Fraud score
        const FRAUD_SCORE   = 0x04000;

        /// Every field
        const ALL = Self::COUNTRY_SHORT.bits()
            | Self::COUNTRY_LONG.bits()
            | Self::REGION.bits()
            | Self::CITY.bits()
            | Self::ISP.bits()
            | Self::PROXY_TYPE.bits()
            | Self::IS_PROXY.bits()
            | Self::DOMAIN.bits()
            | Self::USAGE_TYPE.bits()
            | Self::ASN.bits()
            | Self::AS_NAME.bits()
            | Self::LAST_SEEN.bits()
            | Self::THREAT.bits()
            | Self::PROVIDER.bits()
            | Self::FRAUD_SCORE.bits();
    }
}

/// Request bits that need the country column
const COUNTRY_BITS: Fields = Fields::COUNTRY_SHORT
    .union(Fields::COUNTRY_LONG)
    .union(Fields::IS_PROXY);

/// Request bits that need the proxy type column
const PROXY_TYPE_BITS: Fields = Fields::PROXY_TYPE.union(Fields::IS_PROXY);

/// Proxy information for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRecord {
    /// ISO 3166 country code
    pub country_short: String,
    /// Country name
    pub country_long: String,
    /// Region or state
    pub region: String,
    /// City
    pub city: String,
    /// Internet service provider
    pub isp: String,
    /// Proxy type code
    pub proxy_type: String,
    /// Domain
    pub domain: String,
    /// Usage type
    pub usage_type: String,
    /// Autonomous system number
    pub asn: String,
    /// Autonomous system name
    #[serde(rename = "as")]
    pub as_name: String,
    /// Days since last seen
    pub last_seen: String,
    /// Threat type
    pub threat: String,
    /// Proxy provider
    pub provider: String,
    /// Fraud score
    pub fraud_score: String,
    /// Classification
    pub is_proxy: ProxyStatus,
}

impl ProxyRecord {
    /// Record with every text field set to `message` and status `Error`
    pub fn sentinel(message: &str) -> Self {
        ProxyRecord {
            country_short: message.to_string(),
            country_long: message.to_string(),
            region: message.to_string(),
            city: message.to_string(),
            isp: message.to_string(),
            proxy_type: message.to_string(),
            domain: message.to_string(),
            usage_type: message.to_string(),
            asn: message.to_string(),
            as_name: message.to_string(),
            last_seen: message.to_string(),
            threat: message.to_string(),
            provider: message.to_string(),
            fraud_score: message.to_string(),
            is_proxy: ProxyStatus::Error,
        }
    }

    /// Text of a single field; `None` for `IS_PROXY` or a multi-bit set
    pub fn get(&self, field: Fields) -> Option<&str> {
        [
            (Fields::COUNTRY_SHORT, &self.country_short),
            (Fields::COUNTRY_LONG, &self.country_long),
            (Fields::REGION, &self.region),
            (Fields::CITY, &self.city),
            (Fields::ISP, &self.isp),
            (Fields::PROXY_TYPE, &self.proxy_type),
            (Fields::DOMAIN, &self.domain),
            (Fields::USAGE_TYPE, &self.usage_type),
            (Fields::ASN, &self.asn),
            (Fields::AS_NAME, &self.as_name),
            (Fields::LAST_SEEN, &self.last_seen),
            (Fields::THREAT, &self.threat),
            (Fields::PROVIDER, &self.provider),
            (Fields::FRAUD_SCORE, &self.fraud_score),
        ]
        .into_iter()
        .find(|(bit, _)| *bit == field)
        .map(|(_, text)| text.as_str())
    }
}

/// Decodes requested columns of matched rows
pub struct RecordDecoder<'a> {
    data: &'a [u8],
    layout: &'a ColumnLayout,
}

impl<'a> RecordDecoder<'a> {
    /// Decoder over the database buffer `data`
    pub fn new(data: &'a [u8], layout: &'a ColumnLayout) -> Self {
        Self { data, layout }
    }

    /// Decode the `fields` of `row` into a fresh record
    ///
    /// Any read failure aborts the whole decode.
    pub fn decode(&self, row: &RangeRow<'_>, fields: Fields) -> Result<ProxyRecord> {
        let mut record = ProxyRecord::sentinel(NOT_SUPPORTED);

        if fields.intersects(PROXY_TYPE_BITS) {
            if let Some(ptr) = self.pointer(row, Field::ProxyType)? {
                record.proxy_type = self.read_string(ptr)?;
            }
        }

        if fields.intersects(COUNTRY_BITS) {
            if let Some(ptr) = self.pointer(row, Field::Country)? {
                record.country_short = self.read_string(ptr)?;
                record.country_long = self.read_string(ptr + COUNTRY_LONG_DELTA as u64)?;
            }
        }

        let columns = [
            (Field::Region, &mut record.region),
            (Field::City, &mut record.city),
            (Field::Isp, &mut record.isp),
            (Field::Domain, &mut record.domain),
            (Field::UsageType, &mut record.usage_type),
            (Field::Asn, &mut record.asn),
            (Field::AsName, &mut record.as_name),
            (Field::LastSeen, &mut record.last_seen),
            (Field::Threat, &mut record.threat),
            (Field::Provider, &mut record.provider),
            (Field::FraudScore, &mut record.fraud_score),
        ];
        for (field, slot) in columns {
            if !fields.intersects(field.request_bits()) {
                continue;
            }
            if let Some(ptr) = self.pointer(row, field)? {
                *slot = self.read_string(ptr)?;
            }
        }

        if fields.intersects(COUNTRY_BITS | PROXY_TYPE_BITS) {
            record.is_proxy = classify(&record.country_short, &record.proxy_type);
        }

        Ok(record)
    }

    /// String pointer stored in `row` for `field`, if the schema has it
    fn pointer(&self, row: &RangeRow<'_>, field: Field) -> Result<Option<u64>> {
        let Some(offset) = self.layout.offset(field) else {
            return Ok(None);
        };
        read_u32_le(row.data, offset)
            .map(|ptr| Some(ptr as u64))
            .ok_or_else(|| {
                ProxyError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "{:?} column at offset {} outside {}-byte row {}",
                        field,
                        offset,
                        row.data.len(),
                        row.index
                    ),
                ))
            })
    }

    /// Length-prefixed string at a 0-based file offset
    pub fn read_string(&self, offset: u64) -> Result<String> {
        let len = slice_at(self.data, offset, 1)?[0] as usize;
        let bytes = slice_at(self.data, offset + 1, len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
