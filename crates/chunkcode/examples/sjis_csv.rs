//! Converts a Shift_JIS CSV export to UTF-8 while it streams in, the way an
//! import job reads a file uploaded from a legacy spreadsheet tool.
//!
//! The payload arrives in irregular network-sized chunks that routinely split
//! double-byte characters. The transcoder holds the dangling lead byte back
//! and every chunk it emits is valid UTF-8 on its own, so each row can be
//! parsed as soon as its newline shows up.
//!
//! Run with
//!
//! ```bash
//! RUST_LOG=chunkcode=trace cargo run -p chunkcode --example sjis_csv
//! ```

#![allow(clippy::doc_markdown)]

use chunkcode::{Error, FilterLocator, Transcoder, TranscoderOptions, filter_url};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // "id,name\n1,日本\n2,語\n3,ｱｲｳ\n" in Shift_JIS, cut mid-character.
    let simulated_stream: [&[u8]; 5] = [
        b"id,name\n1,\x93",
        b"\xfa\x96",
        b"\x7b\n2,\x8c",
        b"\xea\n3,\xb1",
        b"\xb2\xb3\n",
    ];

    let url = filter_url("uploads/customers.csv", "SJIS-win", Some("UTF-8"));
    let locator = FilterLocator::parse(&url).expect("filter_url builds a valid locator");
    println!("reading {} through {}", locator.resource(), locator.filter());

    let mut transcoder =
        Transcoder::from_filter_name(locator.filter(), TranscoderOptions::default())?;
    let mut line = String::new();
    for (index, chunk) in simulated_stream.into_iter().enumerate() {
        let is_final = index + 1 == simulated_stream.len();
        let output = transcoder.process_chunk(chunk, is_final)?;
        for piece in output.chunks {
            // Every emitted chunk is complete UTF-8.
            let text = String::from_utf8(piece).expect("chunk ends on a character boundary");
            for ch in text.chars() {
                if ch == '\n' {
                    println!("row: {line:?}");
                    line.clear();
                } else {
                    line.push(ch);
                }
            }
        }
        println!("  status after chunk {index}: {:?}", output.status);
    }
    Ok(())
}
