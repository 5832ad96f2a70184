//! Look up addresses in a BIN database and print the records as JSON
//!
//! ```text
//! RUST_LOG=debug cargo run --example proxy_query -- IP2PROXY-LITE-PX11.BIN 1.2.3.4 2001:db8::1
//! ```

use anyhow::{bail, Context, Result};
use proxydb::{Database, StorageMode};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: proxy_query <database.bin> <ip>...");
    };
    let addresses: Vec<String> = args.collect();
    if addresses.is_empty() {
        bail!("no addresses given");
    }

    let db = Database::options()
        .storage(StorageMode::Mmap)
        .open(&path)
        .with_context(|| format!("failed to open {}", path))?;

    if let Some(meta) = db.meta() {
        eprintln!(
            "PX{} database, 20{:02}-{:02}-{:02}, {} IPv4 / {} IPv6 ranges",
            meta.database_type,
            meta.year,
            meta.month,
            meta.day,
            meta.ipv4.row_count,
            meta.ipv6.row_count
        );
    }

    for ip in &addresses {
        let record = db
            .get_all(ip)
            .with_context(|| format!("lookup of {} failed", ip))?;
        println!("{}", serde_json::to_string(&record)?);
    }

    Ok(())
}
