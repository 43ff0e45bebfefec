/// Configuration options for a [`Transcoder`](crate::Transcoder) session.
///
/// # Examples
///
/// ```rust
/// use chunkcode::TranscoderOptions;
///
/// let options = TranscoderOptions {
///     buffer_size_limit: 64,
/// };
/// assert_eq!(TranscoderOptions::default().buffer_size_limit, 1024);
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TranscoderOptions {
    /// Upper bound on the bytes held back between calls.
    ///
    /// Only an incomplete trailing character should ever be pending, so a
    /// handful of bytes is the norm. Input that never reaches a valid boundary
    /// grows the pending buffer until this limit is crossed, at which point the
    /// call fails with
    /// [`TranscodeError::CapacityExceeded`](crate::TranscodeError::CapacityExceeded).
    ///
    /// # Default
    ///
    /// `1024`
    pub buffer_size_limit: usize,
}

impl TranscoderOptions {
    /// Default value of [`TranscoderOptions::buffer_size_limit`].
    pub const DEFAULT_BUFFER_SIZE_LIMIT: usize = 1024;
}

impl Default for TranscoderOptions {
    fn default() -> Self {
        Self {
            buffer_size_limit: Self::DEFAULT_BUFFER_SIZE_LIMIT,
        }
    }
}
