use alloc::{string::String, vec::Vec};
use core::mem;

use bstr::ByteSlice;
use tracing::{debug, trace, warn};

use crate::{
    CharsetPair, ConfigurationError, EncodingBackend, EncodingProvider, TranscodeError,
    TranscoderOptions, filter,
};

/// Whether the host should pass output on or feed more input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    /// At least one output chunk is ready to be drained.
    PassOn,
    /// Nothing was emitted; the transcoder needs more input.
    FeedMe,
}

/// Output of one transcoder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    /// Ready-to-emit chunks in the target charset, in stream order. Each one
    /// decodes on its own.
    pub chunks: Vec<Vec<u8>>,
    /// Input bytes consumed by the call. Always the full length of the input,
    /// including bytes that were deferred to a later call.
    pub consumed: usize,
    /// [`FilterStatus::PassOn`] when `chunks` is non-empty.
    pub status: FilterStatus,
}

impl ChunkOutput {
    fn new(chunks: Vec<Vec<u8>>, consumed: usize) -> Self {
        let status = if chunks.is_empty() {
            FilterStatus::FeedMe
        } else {
            FilterStatus::PassOn
        };
        Self {
            chunks,
            consumed,
            status,
        }
    }

    /// All emitted chunks joined together.
    #[must_use]
    pub fn concat(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Open,
    Closed,
    Failed,
}

/// Streaming transcoder for one input stream.
///
/// Feed chunks of source-charset bytes in order with
/// [`Transcoder::process_chunk`] (or [`Transcoder::feed`] and
/// [`Transcoder::finish`]). Any trailing bytes that do not yet form a complete
/// character are held in a pending buffer and prefixed to the next chunk.
///
/// After any error the session is failed: further calls return
/// [`TranscodeError::Failed`] until [`Transcoder::reset`] is called.
#[derive(Debug)]
pub struct Transcoder<P> {
    provider: P,
    options: TranscoderOptions,
    stream: String,
    pending: Vec<u8>,
    state: SessionState,
}

#[cfg(feature = "encoding_rs")]
impl Transcoder<crate::EncodingRsProvider> {
    /// Open a session for the transcode filter named `name`, e.g.
    /// `convert.chunkcode.encoding.SJIS-win:UTF-8`, using `encoding_rs`.
    ///
    /// # Errors
    ///
    /// Fails if `name` is outside the filter namespace, its charset
    /// specification is malformed, or a charset cannot be resolved.
    pub fn from_filter_name(
        name: &str,
        options: TranscoderOptions,
    ) -> Result<Self, ConfigurationError> {
        let pair = filter::parse_filter_name(name)?;
        Ok(Self::open(&crate::EncodingRs::new(), &pair, options)?.named(name))
    }
}

impl<P: EncodingProvider> Transcoder<P> {
    /// Session over an already resolved provider.
    #[must_use]
    pub fn new(provider: P, options: TranscoderOptions) -> Self {
        Self {
            provider,
            options,
            stream: String::from(filter::FILTER_NAMESPACE.trim_end_matches('.')),
            pending: Vec::new(),
            state: SessionState::Open,
        }
    }

    /// Resolve `pair` with `backend` and start a session.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`ConfigurationError`] if the pair cannot be
    /// resolved.
    pub fn open<B>(
        backend: &B,
        pair: &CharsetPair,
        options: TranscoderOptions,
    ) -> Result<Self, ConfigurationError>
    where
        B: EncodingBackend<Provider = P>,
    {
        let provider = backend.resolve(pair)?;
        let transcoder = Self::new(provider, options).named(filter::filter_name_for(pair));
        debug!(
            stream = %transcoder.stream,
            limit = options.buffer_size_limit,
            "opened transcoding session"
        );
        Ok(transcoder)
    }

    /// Name the stream for errors and log records.
    #[must_use]
    pub fn named(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    /// Name used for this stream in errors and logs.
    #[must_use]
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Options the session was opened with.
    #[must_use]
    pub fn options(&self) -> &TranscoderOptions {
        &self.options
    }

    /// Provider resolved for the session.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Bytes held back because they do not yet form a complete character.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Whether a final call has completed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Discard pending bytes and any failure, ready for a fresh stream.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.state = SessionState::Open;
    }

    /// Process the next chunk of the stream.
    ///
    /// `is_final` marks the end of the stream; the pending buffer must then be
    /// empty.
    ///
    /// # Errors
    ///
    /// - [`TranscodeError::TruncatedStream`] if the stream ends inside a
    ///   character.
    /// - [`TranscodeError::CapacityExceeded`] if more than
    ///   [`TranscoderOptions::buffer_size_limit`] bytes would stay pending.
    /// - [`TranscodeError::StreamClosed`] or [`TranscodeError::Failed`] if the
    ///   session no longer accepts input.
    pub fn process_chunk(
        &mut self,
        chunk: &[u8],
        is_final: bool,
    ) -> Result<ChunkOutput, TranscodeError> {
        self.process_brigade([chunk], is_final)
    }

    /// Process a brigade of chunks delivered together, in order.
    ///
    /// Each chunk that completes at least one character yields one output
    /// chunk. The pending-size limit is enforced after every chunk. On error
    /// nothing from the brigade is returned.
    ///
    /// # Errors
    ///
    /// As for [`Transcoder::process_chunk`].
    pub fn process_brigade<'a, I>(
        &mut self,
        chunks: I,
        is_final: bool,
    ) -> Result<ChunkOutput, TranscodeError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        self.ensure_open()?;
        let mut out = Vec::new();
        let mut consumed = 0;
        let mut chunks = chunks.into_iter().peekable();
        while let Some(chunk) = chunks.next() {
            consumed += chunk.len();
            // The end-of-stream check below subsumes the limit for the last
            // chunk of a final call.
            let enforce_limit = !is_final || chunks.peek().is_some();
            if let Err(err) = self.step(chunk, enforce_limit, &mut out) {
                return Err(self.fail(err));
            }
        }
        if is_final {
            if !self.pending.is_empty() {
                warn!(
                    stream = %self.stream,
                    trailing = ?self.pending.as_bstr(),
                    "stream ended inside a character"
                );
                let err = TranscodeError::truncated(&self.stream, self.pending.clone());
                return Err(self.fail(err));
            }
            self.state = SessionState::Closed;
        }
        Ok(ChunkOutput::new(out, consumed))
    }

    /// Feed a non-final chunk.
    ///
    /// # Errors
    ///
    /// As for [`Transcoder::process_chunk`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<ChunkOutput, TranscodeError> {
        self.process_chunk(chunk, false)
    }

    /// Signal end of stream.
    ///
    /// # Errors
    ///
    /// [`TranscodeError::TruncatedStream`] if an incomplete character is still
    /// pending.
    pub fn finish(mut self) -> Result<ChunkOutput, TranscodeError> {
        self.process_chunk(&[], true)
    }

    fn ensure_open(&self) -> Result<(), TranscodeError> {
        let stream = || self.stream.clone();
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Closed => Err(TranscodeError::StreamClosed { stream: stream() }),
            SessionState::Failed => Err(TranscodeError::Failed { stream: stream() }),
        }
    }

    fn fail(&mut self, err: TranscodeError) -> TranscodeError {
        self.state = SessionState::Failed;
        err
    }

    fn step(
        &mut self,
        chunk: &[u8],
        enforce_limit: bool,
        out: &mut Vec<Vec<u8>>,
    ) -> Result<(), TranscodeError> {
        if chunk.is_empty() {
            return Ok(());
        }

        let mut data = mem::take(&mut self.pending);
        data.extend_from_slice(chunk);
        let limit = enforce_limit.then_some(self.options.buffer_size_limit);
        let valid = self.valid_prefix_len(&data, limit);
        let deferred = data.split_off(valid);
        if enforce_limit && deferred.len() > self.options.buffer_size_limit {
            warn!(
                stream = %self.stream,
                pending = deferred.len(),
                limit = self.options.buffer_size_limit,
                "pending buffer over limit"
            );
            let pending = deferred.len();
            self.pending = deferred;
            return Err(TranscodeError::CapacityExceeded {
                stream: self.stream.clone(),
                pending,
                limit: self.options.buffer_size_limit,
            });
        }

        let emitted = if data.is_empty() {
            0
        } else {
            let mut encoded = Vec::with_capacity(data.len());
            self.provider.encode(&data, &mut encoded);
            let len = encoded.len();
            out.push(encoded);
            len
        };
        trace!(
            stream = %self.stream,
            consumed = chunk.len(),
            emitted,
            deferred = deferred.len(),
            "processed chunk"
        );
        self.pending = deferred;
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            !enforce_limit || self.pending.len() <= self.options.buffer_size_limit,
            "pending buffer outgrew its limit"
        );
        Ok(())
    }

    /// Length of the longest prefix of `data` the provider accepts, trimming
    /// one byte at a time from the end.
    ///
    /// With a `limit`, trimming stops once more than `limit` bytes would be
    /// deferred, so the result is then only an upper bound.
    fn valid_prefix_len(&self, data: &[u8], limit: Option<usize>) -> usize {
        let floor = limit.map_or(0, |limit| data.len().saturating_sub(limit.saturating_add(1)));
        let mut end = data.len();
        while end > floor && !self.provider.is_valid(&data[..end]) {
            end -= 1;
        }
        end
    }
}
