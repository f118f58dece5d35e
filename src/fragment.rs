//! Pre-encoded query-string output.

use std::fmt;

use url::form_urlencoded;

/// A `name=value` pair already encoded for a query string, or nothing.
///
/// Fragments are only produced by the `put_*` operations of
/// [`ParamAccessor`](crate::ParamAccessor), which percent-encode both sides.
/// That makes a fragment safe to concatenate into a URL as is.
///
/// An empty fragment means "leave the parameter out".
///
/// ```compile_fail
/// use cgi_params::QueryFragment;
///
/// // No public constructor: fragments cannot carry unescaped text.
/// let fragment = QueryFragment::new_unchecked("a=<b>".to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryFragment {
    encoded: String,
}

impl QueryFragment {
    /// Encodes `name=value`.
    pub(crate) fn pair(name: &str, value: &str) -> Self {
        let mut encoded = String::with_capacity(name.len() + value.len() + 1);
        encoded.extend(form_urlencoded::byte_serialize(name.as_bytes()));
        encoded.push('=');
        encoded.extend(form_urlencoded::byte_serialize(value.as_bytes()));
        Self { encoded }
    }

    /// The fragment for an omitted parameter.
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// The encoded text.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Returns `true` if the parameter is omitted.
    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// Consumes the fragment and returns the encoded text.
    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl fmt::Display for QueryFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl AsRef<str> for QueryFragment {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl From<QueryFragment> for String {
    fn from(fragment: QueryFragment) -> Self {
        fragment.encoded
    }
}

/// An ordered collection of fragments joined with `&`.
///
/// Empty fragments are skipped, so optional parameters can be pushed
/// unconditionally.
///
/// # Examples
///
/// ```
/// use cgi_params::{
///     AccessorConfig, IdCodecRegistry, ParamAccessor, QueryString, RequestAccessor, RequestParams,
/// };
///
/// let accessor = RequestAccessor::new(
///     RequestParams::new("req-1"),
///     IdCodecRegistry::new(),
///     AccessorConfig::new("https://shop.example"),
/// );
///
/// let query = QueryString::new()
///     .with(accessor.put_string("q", "red shoes"))
///     .with(accessor.put_int("page", None::<i64>))
///     .with(accessor.put_bool("sale", true, false));
///
/// assert_eq!(query.to_string(), "q=red+shoes&sale=1");
/// assert_eq!(
///     query.to_url(accessor.put_leader(), "/search"),
///     "https://shop.example/search?q=red+shoes&sale=1"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    fragments: Vec<QueryFragment>,
}

impl QueryString {
    /// Creates an empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment unless it is empty.
    pub fn push(&mut self, fragment: QueryFragment) {
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, fragment: QueryFragment) -> Self {
        self.push(fragment);
        self
    }

    /// Returns `true` if no non-empty fragment was added.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Builds `leader + path`, followed by `?query` when there is one.
    pub fn to_url(&self, leader: &str, path: &str) -> String {
        let mut url = String::with_capacity(leader.len() + path.len() + 64);
        url.push_str(leader);
        url.push_str(path);
        if !self.is_empty() {
            url.push('?');
            url.push_str(&self.to_string());
        }
        url
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            f.write_str(fragment.as_str())?;
        }
        Ok(())
    }
}

impl FromIterator<QueryFragment> for QueryString {
    fn from_iter<I: IntoIterator<Item = QueryFragment>>(iter: I) -> Self {
        let mut query = Self::new();
        for fragment in iter {
            query.push(fragment);
        }
        query
    }
}
