//! [`EncodingBackend`] over the WHATWG encodings implemented by `encoding_rs`.

use alloc::{string::ToString, vec::Vec};

use ::encoding_rs::{
    EUC_JP, Encoder, EncoderResult, Encoding, ISO_2022_JP, REPLACEMENT, SHIFT_JIS, UTF_8,
    UTF_16BE, UTF_16LE,
};
use tracing::debug;

use super::{EncodingBackend, EncodingProvider};
use crate::{CharsetPair, ConfigurationError};

/// mbstring-style names the WHATWG label table does not carry.
const SHIFT_JIS_ALIASES: &[&str] = &["SJIS-win", "SJIS-ms", "CP932"];
const EUC_JP_ALIASES: &[&str] = &["eucJP-win", "eucJP-ms", "CP51932"];

/// Look up a charset by WHATWG label or mbstring alias, ignoring ASCII case.
#[must_use]
pub fn lookup(label: &str) -> Option<&'static Encoding> {
    let is_alias = |aliases: &[&str]| aliases.iter().any(|a| a.eq_ignore_ascii_case(label));
    Encoding::for_label(label.as_bytes()).or_else(|| {
        if is_alias(SHIFT_JIS_ALIASES) {
            Some(SHIFT_JIS)
        } else if is_alias(EUC_JP_ALIASES) {
            Some(EUC_JP)
        } else {
            None
        }
    })
}

/// Backend resolving charset pairs with `encoding_rs`.
///
/// `auto` resolves to UTF-8, which also covers plain ASCII input. Characters
/// the target cannot represent are replaced by the substitute string, `"?"`
/// by default.
#[derive(Debug, Clone, Copy)]
pub struct EncodingRs {
    substitute: &'static str,
}

impl EncodingRs {
    /// Backend substituting `?` for unmappable characters.
    #[must_use]
    pub const fn new() -> Self {
        Self { substitute: "?" }
    }

    /// Use `substitute` in place of characters the target cannot encode.
    #[must_use]
    pub const fn with_substitute(substitute: &'static str) -> Self {
        Self { substitute }
    }
}

impl Default for EncodingRs {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodingBackend for EncodingRs {
    type Provider = EncodingRsProvider;

    fn default_target_charset(&self) -> &str {
        UTF_8.name()
    }

    fn resolve(&self, pair: &CharsetPair) -> Result<Self::Provider, ConfigurationError> {
        let source = if pair.is_auto() {
            UTF_8
        } else {
            lookup(pair.source())
                .filter(|encoding| *encoding != REPLACEMENT)
                .ok_or_else(|| ConfigurationError::UnknownCharset(pair.source().to_string()))?
        };
        // Each chunk is validated on its own, which an escape-sequence
        // decoder cannot support.
        if source == ISO_2022_JP {
            return Err(ConfigurationError::StatefulSource(pair.source().to_string()));
        }

        let target_label = pair.target_or(self.default_target_charset());
        let target = lookup(target_label)
            .ok_or_else(|| ConfigurationError::UnknownCharset(target_label.to_string()))?;
        if target == REPLACEMENT {
            return Err(ConfigurationError::UnsupportedTarget(target_label.to_string()));
        }

        debug!(
            source = source.name(),
            target = target.name(),
            "resolved charset pair"
        );
        Ok(EncodingRsProvider {
            source,
            target,
            substitute: self.substitute,
        })
    }
}

/// Provider for one resolved `encoding_rs` pair.
#[derive(Debug, Clone, Copy)]
pub struct EncodingRsProvider {
    source: &'static Encoding,
    target: &'static Encoding,
    substitute: &'static str,
}

impl EncodingRsProvider {
    /// Charset the input is validated and decoded in.
    #[must_use]
    pub fn source(&self) -> &'static Encoding {
        self.source
    }

    /// Charset the output is encoded in.
    #[must_use]
    pub fn target(&self) -> &'static Encoding {
        self.target
    }
}

impl EncodingProvider for EncodingRsProvider {
    fn is_valid(&self, bytes: &[u8]) -> bool {
        self.source
            .decode_without_bom_handling_and_without_replacement(bytes)
            .is_some()
    }

    fn encode(&self, bytes: &[u8], out: &mut Vec<u8>) {
        if self.source == self.target {
            out.extend_from_slice(bytes);
            return;
        }

        let (text, _) = self.source.decode_without_bom_handling(bytes);
        if self.target == UTF_8 {
            out.extend_from_slice(text.as_bytes());
        } else if self.target == UTF_16LE {
            out.reserve(text.len() * 2);
            text.encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_le_bytes()));
        } else if self.target == UTF_16BE {
            out.reserve(text.len() * 2);
            text.encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_be_bytes()));
        } else {
            encode_with_substitute(&mut self.target.new_encoder(), &text, self.substitute, out);
        }
    }
}

fn encode_with_substitute(encoder: &mut Encoder, text: &str, substitute: &str, out: &mut Vec<u8>) {
    let mut rest = text;
    loop {
        reserve_for(encoder, rest, out);
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, out, true);
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => return,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => {
                reserve_for(encoder, substitute, out);
                // A substitute the target cannot encode is dropped.
                let _ = encoder.encode_from_utf8_to_vec_without_replacement(substitute, out, false);
            }
        }
    }
}

fn reserve_for(encoder: &Encoder, text: &str, out: &mut Vec<u8>) {
    let needed = encoder
        .max_buffer_length_from_utf8_without_replacement(text.len())
        .unwrap_or(text.len());
    out.reserve(needed);
}
