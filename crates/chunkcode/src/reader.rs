use alloc::{boxed::Box, vec, vec::Vec};
use std::io::{self, Read};

use crate::{EncodingProvider, Transcoder};

/// Size of the buckets pulled from the inner reader.
const DEFAULT_CHUNK_SIZE: usize = 8192;

/// [`Read`] adapter running everything read from `inner` through a
/// [`Transcoder`].
///
/// Each read of the inner reader becomes one transcoder call, so character
/// boundaries in the inner stream may fall anywhere. Transcoder errors surface
/// as [`io::ErrorKind::InvalidData`] wrapping the
/// [`TranscodeError`](crate::TranscodeError). Once a read has failed, every
/// later read fails too.
///
/// ```rust
/// # #[cfg(feature = "encoding_rs")] {
/// use std::io::Read;
///
/// use chunkcode::{TranscoderOptions, TranscodingReader, Transcoder};
///
/// let transcoder = Transcoder::from_filter_name(
///     "convert.chunkcode.encoding.SJIS-win",
///     TranscoderOptions::default(),
/// )?;
/// let input = &b"\x93\xfa\x96\x7b,1\n"[..];
/// let mut reader = TranscodingReader::with_chunk_size(input, transcoder, 3);
/// let mut text = String::new();
/// reader.read_to_string(&mut text)?;
/// assert_eq!(text, "日本,1\n");
/// # }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TranscodingReader<R, P> {
    inner: R,
    transcoder: Transcoder<P>,
    input: Box<[u8]>,
    output: Vec<u8>,
    position: usize,
    done: bool,
}

impl<R: Read, P: EncodingProvider> TranscodingReader<R, P> {
    /// Wrap `inner`, reading it in buckets of 8 KiB.
    pub fn new(inner: R, transcoder: Transcoder<P>) -> Self {
        Self::with_chunk_size(inner, transcoder, DEFAULT_CHUNK_SIZE)
    }

    /// Like [`TranscodingReader::new`], pulling at most `chunk_size` bytes
    /// from `inner` per call.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn with_chunk_size(inner: R, transcoder: Transcoder<P>, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            inner,
            transcoder,
            input: vec![0; chunk_size].into_boxed_slice(),
            output: Vec::new(),
            position: 0,
            done: false,
        }
    }

    /// The session transcoding the inner stream.
    pub fn transcoder(&self) -> &Transcoder<P> {
        &self.transcoder
    }

    /// The wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap the inner reader, dropping any output not read yet.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Refill `output` until it holds unread bytes or the stream has ended.
    fn fill(&mut self) -> io::Result<()> {
        while self.position == self.output.len() && !self.done {
            self.output.clear();
            self.position = 0;

            let read = match self.inner.read(&mut self.input) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            let result = if read == 0 {
                self.transcoder.process_chunk(&[], true)
            } else {
                self.transcoder.process_chunk(&self.input[..read], false)
            };
            // `done` only after the final call succeeded.
            let output = result.map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            self.done = read == 0;
            for chunk in output.chunks {
                self.output.extend_from_slice(&chunk);
            }
        }
        Ok(())
    }
}

impl<R: Read, P: EncodingProvider> Read for TranscodingReader<R, P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill()?;
        let available = &self.output[self.position..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.position += n;
        Ok(n)
    }
}
