use alloc::{string::String, vec::Vec};

use bstr::BString;
use thiserror::Error;

/// A charset specification, filter name or charset label could not be turned
/// into a working session. Fatal to the session being built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The `FROM[:TO]` specification is malformed.
    #[error("invalid charset specification {0:?}: expected FROM or FROM:TO")]
    InvalidSpec(String),
    /// The filter name does not start with the filter namespace.
    #[error("filter {0:?} is not in the {ns} namespace", ns = crate::FILTER_NAMESPACE)]
    ForeignFilter(String),
    /// The backend has no charset under this label.
    #[error("unknown charset {0:?}")]
    UnknownCharset(String),
    /// The source charset cannot be validated one chunk at a time.
    #[error("charset {0:?} keeps decoder state across characters and cannot be a source")]
    StatefulSource(String),
    /// The backend cannot encode into this charset.
    #[error("charset {0:?} cannot be used as an encoding target")]
    UnsupportedTarget(String),
}

/// The host pipeline refused to install the filter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The host returned an error from its registration call.
    #[error("failed to register stream filter {pattern}: {reason}")]
    Rejected {
        /// Pattern the filter was offered under.
        pattern: String,
        /// The host's error, rendered.
        reason: String,
    },
}

/// Errors returned by [`Transcoder`](crate::Transcoder) calls.
///
/// No output is produced by a call that returns one of these. Except for
/// [`TranscodeError::StreamClosed`], the session is failed afterwards and
/// further calls return [`TranscodeError::Failed`] until it is reset. The
/// bytes a capacity or truncation error reports stay visible through
/// [`Transcoder::pending`](crate::Transcoder::pending).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// More bytes are pending than the configured buffer size limit.
    #[error(
        "stream {stream}: buffer size must be at most {limit} bytes, but {pending} bytes are pending"
    )]
    CapacityExceeded {
        /// Stream the call was made on.
        stream: String,
        /// Bytes held back when the limit was crossed, always `limit + 1`.
        pending: usize,
        /// The configured buffer size limit.
        limit: usize,
    },
    /// The final call left an incomplete character pending.
    #[error("stream {stream}: input ended inside a character, trailing bytes {trailing:?}")]
    TruncatedStream {
        /// Stream the call was made on.
        stream: String,
        /// The incomplete character.
        trailing: BString,
    },
    /// The stream already received its final call.
    #[error("stream {stream}: already closed")]
    StreamClosed {
        /// Stream the call was made on.
        stream: String,
    },
    /// A previous call on this session returned an error.
    #[error("stream {stream}: an earlier call failed")]
    Failed {
        /// Stream the call was made on.
        stream: String,
    },
}

impl TranscodeError {
    /// Name of the stream the error was raised for.
    #[must_use]
    pub fn stream(&self) -> &str {
        match self {
            Self::CapacityExceeded { stream, .. }
            | Self::TruncatedStream { stream, .. }
            | Self::StreamClosed { stream }
            | Self::Failed { stream } => stream,
        }
    }

    pub(crate) fn truncated(stream: &str, trailing: Vec<u8>) -> Self {
        Self::TruncatedStream {
            stream: stream.into(),
            trailing: trailing.into(),
        }
    }
}

/// Any error this crate can return.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// See [`ConfigurationError`].
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// See [`RegistrationError`].
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),
    /// See [`TranscodeError`].
    #[error("transcode error: {0}")]
    Transcode(#[from] TranscodeError),
}
