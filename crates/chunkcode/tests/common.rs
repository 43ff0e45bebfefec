#![allow(missing_docs, dead_code)]

use std::sync::Once;

/// `id,name` CSV with Japanese names, in Shift_JIS.
pub const SJIS_CSV: &[u8] = b"id,name\n1,\x93\xfa\x96\x7b\n2,\x8c\xea\n";

/// [`SJIS_CSV`] decoded.
pub const UTF8_CSV: &str = "id,name\n1,\u{65e5}\u{672c}\n2,\u{8a9e}\n";

/// The same CSV cut so that every Japanese character straddles a chunk
/// boundary.
pub const STRADDLING_CHUNKS: [&[u8]; 4] = [
    b"id,name\n1,\x93",
    b"\xfa\x96",
    b"\x7b\n2,\x8c",
    b"\xea\n",
];

static INIT_LOGGING: Once = Once::new();

pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
