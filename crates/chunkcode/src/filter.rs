//! Filter names and locators understood by the host pipeline.
//!
//! A session is named `convert.chunkcode.encoding.FROM[:TO]` and a resource
//! read through it is addressed by a locator of the form
//! `filter://convert.chunkcode.encoding.FROM[:TO]/resource=PATH`.

use alloc::{
    format,
    string::{String, ToString},
};
use core::fmt;

use crate::{CharsetPair, ConfigurationError};

/// Namespace shared by every filter name this crate answers to.
pub const FILTER_NAMESPACE: &str = "convert.chunkcode.encoding.";

const SCHEME: &str = "filter://";
const RESOURCE: &str = "/resource=";

/// Wildcard pattern the filter is registered under.
#[must_use]
pub fn filter_name() -> String {
    format!("{FILTER_NAMESPACE}*")
}

pub(crate) fn filter_name_for(pair: &CharsetPair) -> String {
    format!("{FILTER_NAMESPACE}{pair}")
}

/// Parse the charset pair out of a concrete filter name.
///
/// # Errors
///
/// [`ConfigurationError::ForeignFilter`] if `name` is outside
/// [`FILTER_NAMESPACE`], [`ConfigurationError::InvalidSpec`] if the rest of the
/// name is not `FROM` or `FROM:TO`.
pub fn parse_filter_name(name: &str) -> Result<CharsetPair, ConfigurationError> {
    name.strip_prefix(FILTER_NAMESPACE)
        .ok_or_else(|| ConfigurationError::ForeignFilter(name.to_string()))?
        .parse()
}

/// Build the locator that reads `resource` through the transcode filter.
///
/// ```rust
/// use chunkcode::filter_url;
///
/// assert_eq!(
///     filter_url("data.csv", "SJIS-win", None),
///     "filter://convert.chunkcode.encoding.SJIS-win/resource=data.csv"
/// );
/// assert_eq!(
///     filter_url("data.csv", "SJIS-win", Some("UTF-8")),
///     "filter://convert.chunkcode.encoding.SJIS-win:UTF-8/resource=data.csv"
/// );
/// ```
#[must_use]
pub fn filter_url(resource: &str, source: &str, target: Option<&str>) -> String {
    match target {
        None => format!("{SCHEME}{FILTER_NAMESPACE}{source}{RESOURCE}{resource}"),
        Some(target) => format!("{SCHEME}{FILTER_NAMESPACE}{source}:{target}{RESOURCE}{resource}"),
    }
}

/// A locator split into its filter name and resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLocator {
    filter: String,
    resource: String,
}

impl FilterLocator {
    /// Split a locator produced by [`filter_url`].
    ///
    /// Returns `None` if `url` does not have the
    /// `filter://NAME/resource=PATH` shape. The filter name itself is only
    /// checked by [`FilterLocator::pair`].
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let (filter, resource) = url.strip_prefix(SCHEME)?.split_once(RESOURCE)?;
        if filter.is_empty() || filter.contains('/') {
            return None;
        }
        Some(Self {
            filter: filter.to_string(),
            resource: resource.to_string(),
        })
    }

    /// Concrete filter name, e.g. `convert.chunkcode.encoding.SJIS-win`.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Path of the resource read through the filter.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Charset pair named by the filter part.
    ///
    /// # Errors
    ///
    /// As for [`parse_filter_name`].
    pub fn pair(&self) -> Result<CharsetPair, ConfigurationError> {
        parse_filter_name(&self.filter)
    }
}

impl fmt::Display for FilterLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}{RESOURCE}{}", self.filter, self.resource)
    }
}
