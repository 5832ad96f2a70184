#![no_main]
use libfuzzer_sys::fuzz_target;
use proxydb::{Database, Fields};

fuzz_target!(|data: &[u8]| {
    // First 36 bytes patch a valid header-shaped prefix, the rest is an address
    if data.len() < 36 {
        return;
    }
    let (head, tail) = data.split_at(36);
    let mut image = vec![0u8; 256];
    image[..36].copy_from_slice(head);
    image[0] = 1 + head[0] % 12;
    image[1] = 14;
    image[29] = 2;

    if let (Ok(db), Ok(ip)) = (Database::from_bytes(image), std::str::from_utf8(tail)) {
        let _ = db.query(ip, Fields::ALL);
        let _ = db.is_proxy(ip);
    }
});
