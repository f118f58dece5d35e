/// Default extension appended by slug generation.
pub const DEFAULT_SLUG_EXTENSION: &str = ".html";

/// Default maximum length, in bytes, of a string parameter.
pub const DEFAULT_MAX_STRING_LEN: usize = 4096;

/// Per-accessor settings.
///
/// Built once per request context with builder-style `with_*` methods.
///
/// # Examples
///
/// ```
/// use cgi_params::AccessorConfig;
///
/// let config = AccessorConfig::new("https://shop.example/app")
///     .with_slug_extension(".htm")
///     .with_max_string_len(256);
///
/// assert_eq!(config.leader(), "https://shop.example/app");
/// assert_eq!(config.slug_extension(), ".htm");
/// assert_eq!(config.max_string_len(), 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorConfig {
    leader: String,
    slug_extension: String,
    max_string_len: usize,
}

impl AccessorConfig {
    /// Creates a config with the given URL leader and default limits.
    pub fn new(leader: impl Into<String>) -> Self {
        Self {
            leader: leader.into(),
            ..Self::default()
        }
    }

    /// Sets the extension appended by [`put_slug_name`](crate::ParamAccessor::put_slug_name).
    pub fn with_slug_extension(mut self, extension: impl Into<String>) -> Self {
        self.slug_extension = extension.into();
        self
    }

    /// Sets the maximum accepted length of string parameters.
    ///
    /// # Panics
    ///
    /// Panics if `max_len` is 0.
    pub fn with_max_string_len(mut self, max_len: usize) -> Self {
        assert!(max_len > 0, "max_len must be greater than 0");
        self.max_string_len = max_len;
        self
    }

    /// The base URL prefixed to generated URLs.
    pub fn leader(&self) -> &str {
        &self.leader
    }

    /// The default slug extension.
    pub fn slug_extension(&self) -> &str {
        &self.slug_extension
    }

    /// The maximum accepted length of string parameters, in bytes.
    pub fn max_string_len(&self) -> usize {
        self.max_string_len
    }
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            leader: String::new(),
            slug_extension: DEFAULT_SLUG_EXTENSION.to_string(),
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AccessorConfig::default();

        assert_eq!(config.leader(), "");
        assert_eq!(config.slug_extension(), ".html");
        assert_eq!(config.max_string_len(), DEFAULT_MAX_STRING_LEN);
    }

    #[test]
    fn new_keeps_default_limits() {
        let config = AccessorConfig::new("/base");

        assert_eq!(config.leader(), "/base");
        assert_eq!(config.slug_extension(), DEFAULT_SLUG_EXTENSION);
    }

    #[test]
    #[should_panic(expected = "max_len must be greater than 0")]
    fn zero_max_len_panics() {
        let _ = AccessorConfig::default().with_max_string_len(0);
    }
}
