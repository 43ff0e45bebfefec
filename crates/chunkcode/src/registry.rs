//! Installing the transcode filter into a host pipeline.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::{
    ConfigurationError, EncodingRsProvider, RegistrationError, Transcoder, TranscoderOptions,
    filter_name,
};

/// Constructor the host calls with a concrete filter name when a stream is
/// opened through a registered pattern.
pub type FilterFactory = fn(
    &str,
    TranscoderOptions,
) -> Result<Transcoder<EncodingRsProvider>, ConfigurationError>;

/// The factory installed by [`ensure_registered`].
///
/// # Errors
///
/// As for [`Transcoder::from_filter_name`].
pub fn create_filter(
    name: &str,
    options: TranscoderOptions,
) -> Result<Transcoder<EncodingRsProvider>, ConfigurationError> {
    Transcoder::from_filter_name(name, options)
}

/// A host pipeline's table of stream filters.
pub trait FilterRegistry {
    /// Reason reported when the host refuses a filter.
    type Error: fmt::Display;

    /// Install `factory` under `pattern`; a trailing `*` matches any suffix.
    ///
    /// # Errors
    ///
    /// Whatever the host reports when it refuses the filter.
    fn register(&self, pattern: &str, factory: FilterFactory) -> Result<(), Self::Error>;
}

/// Init-once guard around filter registration.
///
/// The first successful [`Registration::ensure`] installs the filter; every
/// later call returns `Ok` without touching the registry. A failed attempt
/// leaves the guard unset so the next caller tries again.
#[derive(Debug)]
pub struct Registration {
    done: OnceLock<()>,
    lock: Mutex<()>,
}

impl Registration {
    /// An unset guard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            done: OnceLock::new(),
            lock: Mutex::new(()),
        }
    }

    /// Whether a registration through this guard has succeeded.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.done.get().is_some()
    }

    /// Register the filter with `registry` unless this guard already did.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::Rejected`] if the registry refuses the filter.
    pub fn ensure<R: FilterRegistry + ?Sized>(
        &self,
        registry: &R,
    ) -> Result<(), RegistrationError> {
        if self.is_registered() {
            return Ok(());
        }
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_registered() {
            return Ok(());
        }

        let pattern = filter_name();
        if let Err(err) = registry.register(&pattern, create_filter) {
            return Err(RegistrationError::Rejected {
                pattern,
                reason: err.to_string(),
            });
        }
        // Only this thread sets the value while holding the lock.
        let _ = self.done.set(());
        debug!(%pattern, "registered stream filter");
        Ok(())
    }
}

impl Default for Registration {
    fn default() -> Self {
        Self::new()
    }
}

static PROCESS_REGISTRATION: Registration = Registration::new();

/// Register the filter for the lifetime of the process.
///
/// Idempotent: once a call has succeeded, later calls are no-ops, whichever
/// registry they pass.
///
/// # Errors
///
/// [`RegistrationError::Rejected`] if the registry refuses the filter.
pub fn ensure_registered<R: FilterRegistry + ?Sized>(
    registry: &R,
) -> Result<(), RegistrationError> {
    PROCESS_REGISTRATION.ensure(registry)
}

/// In-process [`FilterRegistry`] resolving filter names to sessions.
#[derive(Default)]
pub struct FilterTable {
    filters: RwLock<Vec<(String, FilterFactory)>>,
}

impl FilterTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a filter is installed under exactly `pattern`.
    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(registered, _)| registered == pattern)
    }

    /// Number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Open a session for the concrete filter `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::ForeignFilter`] if no registered pattern matches
    /// `name`, otherwise whatever the matching factory returns.
    pub fn open(
        &self,
        name: &str,
        options: TranscoderOptions,
    ) -> Result<Transcoder<EncodingRsProvider>, ConfigurationError> {
        let factory = self
            .filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(pattern, _)| matches_pattern(pattern, name))
            .map(|(_, factory)| *factory)
            .ok_or_else(|| ConfigurationError::ForeignFilter(name.to_string()))?;
        factory(name, options)
    }
}

impl fmt::Debug for FilterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters = self.filters.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_set()
            .entries(filters.iter().map(|(pattern, _)| pattern))
            .finish()
    }
}

impl FilterRegistry for FilterTable {
    type Error = String;

    fn register(&self, pattern: &str, factory: FilterFactory) -> Result<(), Self::Error> {
        let mut filters = self.filters.write().unwrap_or_else(PoisonError::into_inner);
        if filters.iter().any(|(registered, _)| registered == pattern) {
            return Err(format!("a filter is already registered under {pattern}"));
        }
        filters.push((pattern.to_string(), factory));
        Ok(())
    }
}

fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        refuse: bool,
    }

    impl FilterRegistry for Counting {
        type Error = &'static str;

        fn register(&self, _pattern: &str, _factory: FilterFactory) -> Result<(), Self::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.refuse { Err("table is full") } else { Ok(()) }
        }
    }

    #[test]
    fn second_registration_is_a_no_op() {
        let registration = Registration::new();
        let table = FilterTable::new();
        registration.ensure(&table).unwrap();
        registration.ensure(&table).unwrap();
        assert!(registration.is_registered());
        assert_eq!(table.len(), 1);
        assert!(table.contains("convert.chunkcode.encoding.*"));
    }

    #[test]
    fn refused_registration_can_be_retried() {
        let registration = Registration::new();
        let refusing = Counting {
            refuse: true,
            ..Counting::default()
        };
        assert_eq!(
            registration.ensure(&refusing),
            Err(RegistrationError::Rejected {
                pattern: "convert.chunkcode.encoding.*".into(),
                reason: "table is full".into(),
            })
        );
        assert!(!registration.is_registered());

        let accepting = Counting::default();
        registration.ensure(&accepting).unwrap();
        registration.ensure(&accepting).unwrap();
        assert_eq!(accepting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_callers_register_once() {
        let registration = Registration::new();
        let registry = Counting::default();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| registration.ensure(&registry).unwrap());
            }
        });
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn table_rejects_duplicate_patterns() {
        let table = FilterTable::new();
        table.register("convert.chunkcode.encoding.*", create_filter).unwrap();
        assert!(table
            .register("convert.chunkcode.encoding.*", create_filter)
            .is_err());
    }

    #[test]
    fn table_opens_sessions_through_matching_pattern() {
        let table = FilterTable::new();
        ensure_registered(&table).unwrap();
        ensure_registered(&table).unwrap();

        let mut transcoder = table
            .open(
                "convert.chunkcode.encoding.SJIS-win:UTF-8",
                TranscoderOptions::default(),
            )
            .unwrap();
        assert_eq!(transcoder.stream(), "convert.chunkcode.encoding.SJIS-win:UTF-8");
        assert_eq!(transcoder.feed(b"\x93\xfa").unwrap().concat(), "日".as_bytes());

        assert_eq!(
            table
                .open("convert.iconv.SJIS", TranscoderOptions::default())
                .unwrap_err(),
            ConfigurationError::ForeignFilter("convert.iconv.SJIS".into())
        );
    }
}
