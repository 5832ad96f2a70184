#![no_main]
use libfuzzer_sys::fuzz_target;
use proxydb::Database;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a database image: open must either reject it or
    // produce a handle whose queries fail cleanly
    if let Ok(db) = Database::from_bytes(data.to_vec()) {
        for ip in ["0.0.0.0", "1.2.3.4", "255.255.255.255", "::", "2001:db8::1", "::ffff:10.0.0.1"] {
            let _ = db.get_all(ip);
        }
    }
});
