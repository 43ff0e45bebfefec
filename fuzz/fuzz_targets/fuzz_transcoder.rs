#![no_main]

use arbitrary::Arbitrary;
use chunkcode::{TranscodeError, Transcoder, TranscoderOptions};
use libfuzzer_sys::fuzz_target;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const PAIRS: &[&str] = &[
    "UTF-8",
    "UTF-8:SJIS",
    "UTF-8:UTF-16BE",
    "SJIS-win",
    "SJIS-win:EUC-JP",
    "eucJP-win:UTF-16LE",
    "GB18030",
    "Big5:UTF-8",
    "UTF-16LE:UTF-8",
    "windows-1252:UTF-8",
];

#[derive(Debug, Arbitrary)]
struct Input {
    pair: u8,
    split_seed: u64,
    limit: u8,
    payload: Vec<u8>,
}

fn open(pair: &str, limit: usize) -> Transcoder<chunkcode::EncodingRsProvider> {
    let name = format!("convert.chunkcode.encoding.{pair}");
    let options = TranscoderOptions {
        buffer_size_limit: limit,
    };
    Transcoder::from_filter_name(&name, options)
        .expect("fuzzed pair list only holds supported charsets")
}

/// Split `payload` into random non-empty chunks, ignoring every boundary.
fn split(payload: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut rng = SmallRng::seed_from_u64(split_seed);
    let mut chunks = Vec::new();
    let mut rest = payload;
    while !rest.is_empty() {
        let (head, tail) = rest.split_at(rng.random_range(1..=rest.len().min(16)));
        chunks.push(head);
        rest = tail;
    }
    chunks
}

/// Run every chunk and the final call, stopping at the first error.
fn run(
    mut transcoder: Transcoder<chunkcode::EncodingRsProvider>,
    chunks: &[&[u8]],
) -> Result<Vec<u8>, TranscodeError> {
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(transcoder.feed(chunk)?.concat());
    }
    out.extend(transcoder.finish()?.concat());
    Ok(out)
}

fn transcoder(input: &Input) {
    let pair = PAIRS[usize::from(input.pair) % PAIRS.len()];
    let limit = usize::from(input.limit);

    let chunked = run(open(pair, limit), &split(&input.payload, input.split_seed));
    // Without a limit the only possible failure is a truncated tail.
    let whole = run(open(pair, usize::MAX), &[&input.payload]);

    match (chunked, whole) {
        (Ok(chunked), Ok(whole)) => assert_eq!(chunked, whole),
        (Err(TranscodeError::CapacityExceeded { pending, limit: l, .. }), _) => {
            assert!(pending > l);
        }
        (
            Err(TranscodeError::TruncatedStream { .. }),
            Err(TranscodeError::TruncatedStream { .. }),
        ) => {}
        (chunked, whole) => panic!("chunked {chunked:?} disagrees with whole {whole:?}"),
    }
}

fuzz_target!(|input: Input| transcoder(&input));
