use alloc::vec::Vec;

/// Split `payload` into `parts` approximately equal-sized chunks.
///
/// Splits fall on byte offsets with no regard for character boundaries, which
/// is exactly what a host pipeline delivering fixed-size buckets does.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at the offsets in `splits`.
///
/// Each entry is reduced modulo the remaining length, so any sequence of
/// integers (e.g. from a property test) yields a valid partition. Every chunk
/// is non-empty and the remainder becomes the last chunk.
#[must_use]
pub fn produce_chunks_at<'a>(payload: &'a [u8], splits: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(splits.len() + 1);
    let mut rest = payload;
    for &split in splits {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(1 + split % rest.len());
        chunks.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
