use alloc::{string::String, vec::Vec};

use encoding_rs::{SHIFT_JIS, UTF_8};
use quickcheck::{QuickCheck, TestResult};

use super::{Triplets, init_logging, quickcheck_tests, triplet_text, triplets};
use crate::{
    CharsetPair, EncodingBackend, EncodingProvider, EncodingRs, Transcoder, TranscoderOptions,
    produce_chunks_at,
};

/// Feed `chunks` in order and finish, returning every emitted chunk.
fn run<P: EncodingProvider>(
    mut transcoder: Transcoder<P>,
    chunks: &[&[u8]],
) -> Option<Vec<Vec<u8>>> {
    let mut emitted = Vec::new();
    for chunk in chunks {
        emitted.extend(transcoder.feed(chunk).ok()?.chunks);
    }
    emitted.extend(transcoder.finish().ok()?.chunks);
    Some(emitted)
}

fn encoding_rs(spec: &str) -> Transcoder<crate::EncodingRsProvider> {
    let pair: CharsetPair = spec.parse().unwrap();
    Transcoder::open(&EncodingRs::new(), &pair, TranscoderOptions::default()).unwrap()
}

/// Property: any partition of valid input yields the single-shot encoding.
#[test]
fn partition_roundtrip_triplets() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(seeds: Vec<u16>, splits: Vec<usize>) -> bool {
        let text = triplet_text(&seeds);
        let chunks = produce_chunks_at(&text, &splits);
        let transcoder = Transcoder::new(Triplets, TranscoderOptions::default());
        run(transcoder, &chunks).is_some_and(|emitted| emitted.concat() == triplets(&text))
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<u16>, Vec<usize>) -> bool);
}

/// Property: Shift_JIS input decodes to the same UTF-8 however it is split,
/// and every emitted chunk is valid UTF-8 on its own.
#[test]
fn partition_roundtrip_shift_jis_to_utf8() {
    init_logging();

    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String, splits: Vec<usize>) -> TestResult {
        let (sjis, _, _) = SHIFT_JIS.encode(&text);
        let transcoder = encoding_rs("SJIS-win:UTF-8");
        let mut whole = Vec::new();
        transcoder.provider().encode(&sjis, &mut whole);

        let chunks = produce_chunks_at(&sjis, &splits);
        let Some(emitted) = run(transcoder, &chunks) else {
            return TestResult::failed();
        };
        let independent = emitted.iter().all(|chunk| core::str::from_utf8(chunk).is_ok());
        TestResult::from_bool(independent && emitted.concat() == whole)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(String, Vec<usize>) -> TestResult);
}

/// Property: UTF-8 input re-encoded as Shift_JIS matches the single-shot
/// conversion, substitutes included, with every chunk valid Shift_JIS.
#[test]
fn partition_roundtrip_utf8_to_shift_jis() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String, splits: Vec<usize>) -> bool {
        let transcoder = encoding_rs("UTF-8:SJIS");
        let mut whole = Vec::new();
        transcoder.provider().encode(text.as_bytes(), &mut whole);

        let chunks = produce_chunks_at(text.as_bytes(), &splits);
        run(transcoder, &chunks).is_some_and(|emitted| {
            emitted.iter().all(|chunk| {
                SHIFT_JIS
                    .decode_without_bom_handling_and_without_replacement(chunk)
                    .is_some()
            }) && emitted.concat() == whole
        })
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(String, Vec<usize>) -> bool);
}

/// Property: two different partitions of the same stream agree byte for byte.
#[test]
fn partitions_agree_utf8_to_utf16() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String, left: Vec<usize>, right: Vec<usize>) -> bool {
        let bytes = text.as_bytes();
        let a = run(encoding_rs("UTF-8:UTF-16LE"), &produce_chunks_at(bytes, &left));
        let b = run(encoding_rs("UTF-8:UTF-16LE"), &produce_chunks_at(bytes, &right));
        match (a, b) {
            (Some(a), Some(b)) => {
                a.iter().all(|chunk| chunk.len() % 2 == 0) && a.concat() == b.concat()
            }
            _ => false,
        }
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(String, Vec<usize>, Vec<usize>) -> bool);
}

/// Property: an empty non-final chunk never emits and never moves bytes.
#[quickcheck_macros::quickcheck]
fn empty_chunk_is_idempotent(prefix: Vec<u8>) -> TestResult {
    let mut transcoder = Transcoder::new(Triplets, TranscoderOptions::default());
    if transcoder.feed(&prefix).is_err() {
        return TestResult::discard();
    }
    let before = transcoder.pending().to_vec();
    let Ok(out) = transcoder.feed(&[]) else {
        return TestResult::failed();
    };
    TestResult::from_bool(
        out.chunks.is_empty() && out.consumed == 0 && transcoder.pending() == before,
    )
}

/// Property: `pending ++ chunk == emitted prefix ++ new pending` for a
/// backend whose encoding is the identity.
#[quickcheck_macros::quickcheck]
fn bytes_are_never_reordered_or_dropped(input: Vec<u8>, splits: Vec<usize>) -> bool {
    let pair = CharsetPair::new("UTF-8").with_target("UTF-8");
    let provider = EncodingRs::new().resolve(&pair).unwrap();
    let mut transcoder = Transcoder::new(
        provider,
        TranscoderOptions {
            buffer_size_limit: usize::MAX,
        },
    );
    let mut seen = Vec::new();
    let mut emitted = Vec::new();
    for chunk in produce_chunks_at(&input, &splits) {
        seen.extend_from_slice(chunk);
        let Ok(out) = transcoder.feed(chunk) else {
            return false;
        };
        emitted.extend(out.concat());
        let mut reassembled = emitted.clone();
        reassembled.extend_from_slice(transcoder.pending());
        let decodes = UTF_8
            .decode_without_bom_handling_and_without_replacement(&emitted)
            .is_some();
        if reassembled != seen || !decodes {
            return false;
        }
    }
    true
}
