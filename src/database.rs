//! Database handle and query API
//!
//! A [`Database`] owns the bytes of one BIN file, either memory-mapped or
//! read into memory, together with the header and column layout parsed at
//! open time. Queries borrow the handle immutably and keep no state between
//! calls, so a single handle can serve any number of threads.
//!
//! Conditions that are part of normal operation (a malformed address, an
//! IPv6 query against an IPv4-only file, a closed handle) come back as
//! sentinel records rather than errors. Only read failures and format
//! problems surface as [`ProxyError`].

use crate::address::{self, IpFamily};
use crate::bin_format::{ColumnLayout, DatabaseMeta, RangeTable};
use crate::classify::ProxyStatus;
use crate::error::{ProxyError, Result};
use crate::record::{
    Fields, ProxyRecord, RecordDecoder, INVALID_IP_ADDRESS, IPV6_UNSUPPORTED, MISSING_FILE,
    NOT_SUPPORTED,
};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Backing bytes of an open database
enum Storage {
    Owned(Vec<u8>),
    Mmap(Mmap),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(v) => v.as_slice(),
            Storage::Mmap(m) => &m[..],
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Storage::Owned(_) => "memory",
            Storage::Mmap(_) => "mmap",
        }
    }
}

/// Everything derived from a successfully opened file
struct OpenDatabase {
    storage: Storage,
    meta: DatabaseMeta,
    layout: ColumnLayout,
}

impl OpenDatabase {
    fn new(storage: Storage) -> Result<Self> {
        let data = storage.as_slice();
        let meta = DatabaseMeta::parse(data)?;
        let layout = ColumnLayout::resolve(meta.database_type, meta.database_column)?;
        Ok(OpenDatabase {
            storage,
            meta,
            layout,
        })
    }

    fn query(&self, ip: &str, fields: Fields) -> Result<ProxyRecord> {
        let Some(key) = address::normalize(ip) else {
            return Ok(ProxyRecord::sentinel(INVALID_IP_ADDRESS));
        };
        if key.family == IpFamily::V6 && !self.meta.has_ipv6() {
            return Ok(ProxyRecord::sentinel(IPV6_UNSUPPORTED));
        }

        let data = self.storage.as_slice();
        let table = RangeTable::new(data, &self.meta, key.family);
        match table.lookup(&key)? {
            Some(row) => RecordDecoder::new(data, &self.layout).decode(&row, fields),
            None => Ok(ProxyRecord::sentinel(NOT_SUPPORTED)),
        }
    }
}

enum State {
    Unopened,
    Open(OpenDatabase),
    Closed,
}

/// How an opened file is held in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Memory-map the file; pages are loaded on demand and shared between
    /// processes
    #[default]
    Mmap,
    /// Read the whole file into an owned buffer
    Memory,
}

/// Options for opening a database file
///
/// # Example
///
/// ```no_run
/// use proxydb::{Database, StorageMode};
///
/// let db = Database::options()
///     .storage(StorageMode::Memory)
///     .open("IP2PROXY-LITE-PX11.BIN")?;
/// # Ok::<(), proxydb::ProxyError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    storage: StorageMode,
}

impl OpenOptions {
    /// Default options: memory-mapped storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the storage backend
    pub fn storage(mut self, mode: StorageMode) -> Self {
        self.storage = mode;
        self
    }

    /// Open and validate the file at `path`
    ///
    /// The file is released again if validation fails.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Database> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        let storage = match self.storage {
            // SAFETY: the map is read-only; the file must not be truncated
            // while the handle is open.
            StorageMode::Mmap => Storage::Mmap(unsafe { Mmap::map(&file)? }),
            StorageMode::Memory => {
                let mut data = Vec::new();
                file.read_to_end(&mut data)?;
                Storage::Owned(data)
            }
        };

        Database::from_storage(storage).inspect_err(|e| {
            log::warn!("rejected {}: {}", path.display(), e);
        })
    }
}

/// Handle to an IP2Proxy-style BIN database
///
/// # Examples
///
/// ```no_run
/// use proxydb::{Database, Fields, ProxyStatus};
///
/// let db = Database::open("IP2PROXY-LITE-PX11.BIN")?;
///
/// let record = db.get_all("1.2.3.4")?;
/// println!("{} {} {}", record.country_short, record.proxy_type, record.is_proxy);
///
/// if db.is_proxy("199.83.103.79")? == ProxyStatus::DataCenter {
///     println!("hosting range");
/// }
///
/// let partial = db.query("2001:db8::1", Fields::COUNTRY_SHORT | Fields::ISP)?;
/// println!("{} {}", partial.country_short, partial.isp);
/// # Ok::<(), proxydb::ProxyError>(())
/// ```
pub struct Database {
    state: State,
}

impl Default for Database {
    /// An unopened handle; every query returns the "MISSING FILE" record
    fn default() -> Self {
        Database {
            state: State::Unopened,
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            State::Unopened => f.write_str("Database(unopened)"),
            State::Closed => f.write_str("Database(closed)"),
            State::Open(db) => f
                .debug_struct("Database")
                .field("storage", &db.storage.kind())
                .field("meta", &db.meta)
                .finish(),
        }
    }
}

impl Database {
    /// Builder for opening with non-default options
    pub fn options() -> OpenOptions {
        OpenOptions::new()
    }

    /// Memory-map and validate the file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        OpenOptions::new().open(path)
    }

    /// Validate an in-memory database image
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_storage(Storage::Owned(data)).inspect_err(|e| {
            log::warn!("rejected in-memory database: {}", e);
        })
    }

    /// Read a whole database from `reader` and validate it
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    fn from_storage(storage: Storage) -> Result<Self> {
        let db = OpenDatabase::new(storage)?;
        let meta = &db.meta;
        log::debug!(
            "opened PX{} database ({}) dated 20{:02}-{:02}-{:02}: {} IPv4 rows (index: {}), {} IPv6 rows (index: {})",
            meta.database_type,
            db.storage.kind(),
            meta.year,
            meta.month,
            meta.day,
            meta.ipv4.row_count,
            meta.ipv4.index_addr.is_some(),
            meta.ipv6.row_count,
            meta.ipv6.index_addr.is_some(),
        );
        Ok(Database {
            state: State::Open(db),
        })
    }

    /// Release the file
    ///
    /// Fails with [`ProxyError::NotOpen`] on a handle that was never opened
    /// and [`ProxyError::AlreadyClosed`] on a second close. Queries after a
    /// close return the "MISSING FILE" record.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(db) => {
                log::debug!("closed PX{} database", db.meta.database_type);
                Ok(())
            }
            State::Unopened => {
                self.state = State::Unopened;
                Err(ProxyError::NotOpen)
            }
            State::Closed => Err(ProxyError::AlreadyClosed),
        }
    }

    /// Whether the handle holds an open file
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Header of the open file
    pub fn meta(&self) -> Option<&DatabaseMeta> {
        self.opened().map(|db| &db.meta)
    }

    /// Column layout of the open file
    pub fn layout(&self) -> Option<&ColumnLayout> {
        self.opened().map(|db| &db.layout)
    }

    fn opened(&self) -> Option<&OpenDatabase> {
        match &self.state {
            State::Open(db) => Some(db),
            _ => None,
        }
    }

    /// Look up `ip` and decode the requested `fields`
    ///
    /// Fields not requested, or not stored by this database type, read
    /// "NOT SUPPORTED". The classification is filled in whenever the request
    /// touches country, proxy type or `IS_PROXY`.
    pub fn query(&self, ip: &str, fields: Fields) -> Result<ProxyRecord> {
        match self.opened() {
            Some(db) => db.query(ip, fields),
            None => Ok(ProxyRecord::sentinel(MISSING_FILE)),
        }
    }

    /// Look up `ip` and decode every field
    pub fn get_all(&self, ip: &str) -> Result<ProxyRecord> {
        self.query(ip, Fields::ALL)
    }

    /// Classification of `ip`
    pub fn is_proxy(&self, ip: &str) -> Result<ProxyStatus> {
        Ok(self.query(ip, Fields::IS_PROXY)?.is_proxy)
    }

    fn single(&self, ip: &str, field: Fields) -> Result<String> {
        let record = self.query(ip, field)?;
        Ok(record.get(field).unwrap_or(NOT_SUPPORTED).to_string())
    }

    /// ISO 3166 country code
    pub fn country_short(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::COUNTRY_SHORT)
    }

    /// Country name
    pub fn country_long(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::COUNTRY_LONG)
    }

    /// Region or state
    pub fn region(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::REGION)
    }

    /// City
    pub fn city(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::CITY)
    }

    /// Internet service provider
    pub fn isp(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::ISP)
    }

    /// Proxy type code
    pub fn proxy_type(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::PROXY_TYPE)
    }

    /// Domain
    pub fn domain(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::DOMAIN)
    }

    /// Usage type
    pub fn usage_type(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::USAGE_TYPE)
    }

    /// Autonomous system number
    pub fn asn(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::ASN)
    }

    /// Autonomous system name
    pub fn as_name(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::AS_NAME)
    }

    /// Days since the address was last seen as a proxy
    pub fn last_seen(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::LAST_SEEN)
    }

    /// Threat type
    pub fn threat(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::THREAT)
    }

    /// Proxy provider
    pub fn provider(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::PROVIDER)
    }

    /// Fraud score
    pub fn fraud_score(&self, ip: &str) -> Result<String> {
        self.single(ip, Fields::FRAUD_SCORE)
    }
}
