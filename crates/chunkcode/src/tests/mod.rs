use alloc::vec::Vec;
use std::sync::Once;

use crate::EncodingProvider;

#[cfg(feature = "encoding_rs")]
mod property_partition;

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub(crate) fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .with_ansi(false)
            .try_init();
    });
}

pub(crate) fn quickcheck_tests() -> u64 {
    if cfg!(any(miri, feature = "test-fast")) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Toy charset: ASCII bytes stand alone, `0xE0..=0xEF` open a three-byte
/// character completed by two bytes in `0x80..=0xBF`.
///
/// Encoding writes ASCII unchanged and a three-byte character `[a, b, c]` as
/// the five bytes `[b'<', c, b, a, b'>']`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Triplets;

fn char_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xe0..=0xef => Some(3),
        _ => None,
    }
}

fn is_continuation(byte: u8) -> bool {
    (0x80..=0xbf).contains(&byte)
}

impl EncodingProvider for Triplets {
    fn is_valid(&self, bytes: &[u8]) -> bool {
        let mut rest = bytes;
        while let Some(&lead) = rest.first() {
            let Some(len) = char_len(lead) else {
                return false;
            };
            if rest.len() < len || !rest[1..len].iter().copied().all(is_continuation) {
                return false;
            }
            rest = &rest[len..];
        }
        true
    }

    fn encode(&self, bytes: &[u8], out: &mut Vec<u8>) {
        let mut rest = bytes;
        while let Some(&lead) = rest.first() {
            if lead.is_ascii() {
                out.push(lead);
                rest = &rest[1..];
            } else {
                out.extend_from_slice(&[b'<', rest[2], rest[1], lead, b'>']);
                rest = &rest[3..];
            }
        }
    }
}

/// Single-shot [`Triplets`] encoding of `bytes`.
pub(crate) fn triplets(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    Triplets.encode(bytes, &mut out);
    out
}

/// Build valid [`Triplets`] text from arbitrary integers.
pub(crate) fn triplet_text(seeds: &[u16]) -> Vec<u8> {
    let mut text = Vec::with_capacity(seeds.len() * 3);
    for &seed in seeds {
        let [hi, lo] = seed.to_be_bytes();
        if seed % 3 == 0 {
            text.extend_from_slice(&[0xe0 | (hi & 0x0f), 0x80 | (lo & 0x3f), 0x80 | (hi >> 2)]);
        } else {
            text.push(lo & 0x7f);
        }
    }
    text
}

#[test]
fn triplet_text_is_valid() {
    let text = triplet_text(&[0, 1, 2, 3, 0xffff, 0x1234]);
    assert!(Triplets.is_valid(&text));
    assert!(!Triplets.is_valid(&text[..1]));
    assert_eq!(triplets(b"a\xe1\x82\x83"), b"a<\x83\x82\xe1>");
}
