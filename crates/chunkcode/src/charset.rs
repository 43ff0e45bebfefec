use alloc::string::{String, ToString};
use core::{fmt, str::FromStr};

use crate::ConfigurationError;

/// Source charset sentinel asking the backend to detect the encoding.
pub const AUTO: &str = "auto";

/// The `(source, target)` charset pair a session transcodes between.
///
/// Parsed from `FROM` or `FROM:TO`, where each name consists of ASCII
/// letters, digits, `_` and `-`. An omitted target is resolved against the
/// backend default when the session is opened.
///
/// ```rust
/// use chunkcode::CharsetPair;
///
/// let pair: CharsetPair = "SJIS-win:UTF-8".parse().unwrap();
/// assert_eq!(pair.source(), "SJIS-win");
/// assert_eq!(pair.target(), Some("UTF-8"));
///
/// let pair: CharsetPair = "eucJP-win".parse().unwrap();
/// assert_eq!(pair.target(), None);
/// assert_eq!(pair.target_or("UTF-8"), "UTF-8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CharsetPair {
    source: String,
    target: Option<String>,
}

impl Default for CharsetPair {
    fn default() -> Self {
        Self {
            source: AUTO.to_string(),
            target: None,
        }
    }
}

impl CharsetPair {
    /// Pair with the given source and the backend default target.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: None,
        }
    }

    /// Replace the target charset.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Source charset label as given.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Target charset label, if one was given.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// The target charset, or `default` when none was given.
    #[must_use]
    pub fn target_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.target.as_deref().unwrap_or(default)
    }

    /// Whether the source asks for detection rather than naming a charset.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.source.eq_ignore_ascii_case(AUTO)
    }
}

fn is_charset_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl FromStr for CharsetPair {
    type Err = ConfigurationError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (source, target) = match spec.split_once(':') {
            Some((source, target)) => (source, Some(target)),
            None => (spec, None),
        };
        if !is_charset_name(source) || !target.is_none_or(is_charset_name) {
            return Err(ConfigurationError::InvalidSpec(spec.to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            target: target.map(ToString::to_string),
        })
    }
}

impl fmt::Display for CharsetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)?;
        if let Some(target) = &self.target {
            write!(f, ":{target}")?;
        }
        Ok(())
    }
}
