//! A streaming, chunk-boundary-safe character encoding transcoder.
//!
//! A [`Transcoder`] sits inside a host I/O pipeline and is handed successive
//! byte chunks of text in a source charset. It emits the same text re-encoded
//! in a target charset, holding back any trailing partial character until the
//! chunk that completes it arrives. Every emitted chunk decodes on its own.
//!
//! ```rust
//! # #[cfg(feature = "encoding_rs")] {
//! use chunkcode::{CharsetPair, EncodingRs, Transcoder, TranscoderOptions};
//!
//! let pair: CharsetPair = "SJIS-win:UTF-8".parse()?;
//! let mut transcoder = Transcoder::open(&EncodingRs::new(), &pair, TranscoderOptions::default())?;
//!
//! // "日本" in Shift_JIS, split in the middle of the second character.
//! let first = transcoder.feed(b"\x93\xfa\x96")?;
//! let second = transcoder.feed(b"\x7b")?;
//! assert_eq!(first.chunks, vec!["日".as_bytes().to_vec()]);
//! assert_eq!(second.chunks, vec!["本".as_bytes().to_vec()]);
//! transcoder.finish()?;
//! # }
//! # Ok::<(), chunkcode::Error>(())
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod charset;
mod chunk_utils;
mod error;
mod filter;
mod options;
pub mod provider;
mod transcoder;

#[cfg(feature = "std")]
mod reader;
#[cfg(all(feature = "std", feature = "encoding_rs"))]
mod registry;

#[cfg(test)]
mod tests;

pub use charset::{AUTO, CharsetPair};
pub use chunk_utils::{produce_chunks, produce_chunks_at};
pub use error::{ConfigurationError, Error, RegistrationError, TranscodeError};
pub use filter::{FILTER_NAMESPACE, FilterLocator, filter_name, filter_url, parse_filter_name};
pub use options::TranscoderOptions;
#[cfg(feature = "encoding_rs")]
pub use provider::encoding_rs::{EncodingRs, EncodingRsProvider};
pub use provider::{EncodingBackend, EncodingProvider, FnProvider, from_fns};
#[cfg(feature = "std")]
pub use reader::TranscodingReader;
#[cfg(all(feature = "std", feature = "encoding_rs"))]
pub use registry::{
    FilterFactory, FilterRegistry, FilterTable, Registration, create_filter, ensure_registered,
};
pub use transcoder::{ChunkOutput, FilterStatus, Transcoder};
