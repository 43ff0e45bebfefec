//! Encoding backends the transcoder delegates charset knowledge to.
//!
//! The transcoder never inspects bytes itself. It asks an [`EncodingProvider`]
//! whether a byte sequence is complete and well formed in the source charset,
//! and asks it to re-encode sequences that are. Providers are resolved once per
//! session from a [`CharsetPair`] by an [`EncodingBackend`].

#[cfg(feature = "encoding_rs")]
pub mod encoding_rs;

use alloc::vec::Vec;
use core::fmt;

use crate::{CharsetPair, ConfigurationError};

/// Validity predicate and encode function for one fixed source → target pair.
pub trait EncodingProvider {
    /// `true` iff `bytes` is a complete, well-formed sequence in the source
    /// charset with no trailing partial character.
    fn is_valid(&self, bytes: &[u8]) -> bool;

    /// Append the target-charset encoding of `bytes` to `out`.
    ///
    /// Only called with input for which [`EncodingProvider::is_valid`] holds.
    fn encode(&self, bytes: &[u8], out: &mut Vec<u8>);
}

impl<P: EncodingProvider + ?Sized> EncodingProvider for &P {
    fn is_valid(&self, bytes: &[u8]) -> bool {
        (**self).is_valid(bytes)
    }

    fn encode(&self, bytes: &[u8], out: &mut Vec<u8>) {
        (**self).encode(bytes, out);
    }
}

impl<P: EncodingProvider + ?Sized> EncodingProvider for alloc::boxed::Box<P> {
    fn is_valid(&self, bytes: &[u8]) -> bool {
        (**self).is_valid(bytes)
    }

    fn encode(&self, bytes: &[u8], out: &mut Vec<u8>) {
        (**self).encode(bytes, out);
    }
}

/// Resolves charset pairs into providers.
pub trait EncodingBackend {
    /// Provider built for each resolved pair.
    type Provider: EncodingProvider;

    /// Charset used when a [`CharsetPair`] leaves the target unspecified.
    fn default_target_charset(&self) -> &str;

    /// Build the provider for `pair`, failing on labels the backend cannot
    /// serve.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when either charset is unknown or
    /// unusable in its role.
    fn resolve(&self, pair: &CharsetPair) -> Result<Self::Provider, ConfigurationError>;
}

/// Provider assembled from a validity closure and an encode closure.
///
/// ```rust
/// use chunkcode::{Transcoder, TranscoderOptions, from_fns};
///
/// // Pass ASCII through unchanged and reject anything else.
/// let provider = from_fns(
///     |bytes: &[u8]| bytes.is_ascii(),
///     |bytes: &[u8], out: &mut Vec<u8>| out.extend_from_slice(bytes),
/// );
/// let mut transcoder = Transcoder::new(provider, TranscoderOptions::default());
/// assert_eq!(transcoder.feed(b"abc").unwrap().chunks, vec![b"abc".to_vec()]);
/// ```
#[derive(Clone, Copy)]
pub struct FnProvider<V, E> {
    is_valid: V,
    encode: E,
}

/// Build a [`FnProvider`] from an `is_valid` predicate and an `encode`
/// function.
pub fn from_fns<V, E>(is_valid: V, encode: E) -> FnProvider<V, E>
where
    V: Fn(&[u8]) -> bool,
    E: Fn(&[u8], &mut Vec<u8>),
{
    FnProvider { is_valid, encode }
}

impl<V, E> EncodingProvider for FnProvider<V, E>
where
    V: Fn(&[u8]) -> bool,
    E: Fn(&[u8], &mut Vec<u8>),
{
    fn is_valid(&self, bytes: &[u8]) -> bool {
        (self.is_valid)(bytes)
    }

    fn encode(&self, bytes: &[u8], out: &mut Vec<u8>) {
        (self.encode)(bytes, out);
    }
}

impl<V, E> fmt::Debug for FnProvider<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}
