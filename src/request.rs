//! Request parameter sources.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use url::form_urlencoded;

use crate::Tainted;

/// A read-only mapping from parameter name to raw request value.
///
/// This is the boundary to the hosting request layer. Implementations hand
/// out values wrapped in [`Tainted`]; the accessor converts and validates
/// them. A source is fully populated before the first lookup and never
/// changes afterwards.
///
/// # Examples
///
/// ```
/// use cgi_params::{ParamSource, Tainted};
///
/// struct SingleParam;
///
/// impl ParamSource for SingleParam {
///     fn param(&self, name: &str) -> Option<Tainted<&str>> {
///         (name == "page").then(|| Tainted::new("2"))
///     }
/// }
///
/// assert!(SingleParam.contains("page"));
/// assert!(!SingleParam.contains("sort"));
/// ```
pub trait ParamSource {
    /// Looks up the raw value of a parameter.
    fn param(&self, name: &str) -> Option<Tainted<&str>>;

    /// Returns `true` if the parameter was submitted, even with an empty value.
    fn contains(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// Identifier of the request this source belongs to, used for log correlation.
    fn request_id(&self) -> Option<&str> {
        None
    }
}

impl ParamSource for HashMap<String, String> {
    fn param(&self, name: &str) -> Option<Tainted<&str>> {
        self.get(name).map(|v| Tainted::new(v.as_str()))
    }
}

/// In-memory parameters of a single request.
///
/// Built once from the decoded query string and/or url-encoded form body,
/// then handed to an accessor. Names are unique: when a name is submitted
/// more than once the first occurrence wins.
///
/// # Examples
///
/// ```
/// use cgi_params::{ParamSource, RequestParams};
///
/// let params = RequestParams::from_query_string("req-1", "?q=rust+lang&page=2&page=3");
///
/// assert_eq!(params.len(), 2);
/// assert!(params.contains("q"));
/// assert_eq!(params.request_id(), Some("req-1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    request_id: String,
    params: HashMap<String, String>,
}

impl RequestParams {
    /// Creates an empty parameter set for the given request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            params: HashMap::new(),
        }
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    ///
    /// A leading `?` is ignored, `+` decodes to a space and pairs with an
    /// empty name are skipped.
    pub fn from_query_string(request_id: impl Into<String>, query: &str) -> Self {
        let mut params = Self::new(request_id);
        params.extend_from_query_string(query);
        params
    }

    /// Adds every pair of a url-encoded string, e.g. a POST body after the
    /// query string. Names already present keep their first value.
    pub fn extend_from_query_string(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            self.add_param(key.into_owned(), value.into_owned());
        }
    }

    /// Adds a parameter unless one with the same name already exists.
    ///
    /// Returns `false` if the name was already taken.
    pub fn add_param(&mut self, key: String, value: String) -> bool {
        match self.params.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Number of distinct parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameters were submitted.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over the submitted parameter names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}

impl ParamSource for RequestParams {
    fn param(&self, name: &str) -> Option<Tainted<&str>> {
        self.params.get(name).map(|v| Tainted::new(v.as_str()))
    }

    fn request_id(&self) -> Option<&str> {
        Some(&self.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(params: &impl ParamSource, name: &str) -> Option<String> {
        params.param(name).map(|t| t.into_inner().to_string())
    }

    #[test]
    fn request_params_new_is_empty() {
        let params = RequestParams::new("req-test");

        assert!(params.is_empty());
        assert_eq!(params.request_id(), Some("req-test"));
    }

    #[test]
    fn parses_query_string() {
        let params = RequestParams::from_query_string("req-1", "a=1&b=two");

        assert_eq!(raw(&params, "a").as_deref(), Some("1"));
        assert_eq!(raw(&params, "b").as_deref(), Some("two"));
        assert_eq!(raw(&params, "c"), None);
    }

    #[test]
    fn ignores_leading_question_mark() {
        let params = RequestParams::from_query_string("req-1", "?a=1");

        assert_eq!(raw(&params, "a").as_deref(), Some("1"));
    }

    #[test]
    fn decodes_percent_and_plus() {
        let params = RequestParams::from_query_string("req-1", "q=hello+world&u=%2Flocal%2Fpath");

        assert_eq!(raw(&params, "q").as_deref(), Some("hello world"));
        assert_eq!(raw(&params, "u").as_deref(), Some("/local/path"));
    }

    #[test]
    fn bare_key_is_present_with_empty_value() {
        let params = RequestParams::from_query_string("req-1", "flag&x=1");

        assert!(params.contains("flag"));
        assert_eq!(raw(&params, "flag").as_deref(), Some(""));
    }

    #[test]
    fn first_occurrence_wins() {
        let params = RequestParams::from_query_string("req-1", "page=2&page=3");

        assert_eq!(params.len(), 1);
        assert_eq!(raw(&params, "page").as_deref(), Some("2"));
    }

    #[test]
    fn body_does_not_override_query() {
        let mut params = RequestParams::from_query_string("req-1", "mode=view");
        params.extend_from_query_string("mode=edit&title=Draft");

        assert_eq!(raw(&params, "mode").as_deref(), Some("view"));
        assert_eq!(raw(&params, "title").as_deref(), Some("Draft"));
    }

    #[test]
    fn skips_empty_names() {
        let params = RequestParams::from_query_string("req-1", "=orphan&&a=1");

        assert_eq!(params.len(), 1);
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn add_param_reports_duplicates() {
        let mut params = RequestParams::new("req-1");

        assert!(params.add_param("k".to_string(), "v1".to_string()));
        assert!(!params.add_param("k".to_string(), "v2".to_string()));
        assert_eq!(raw(&params, "k").as_deref(), Some("v1"));
    }

    #[test]
    fn hashmap_is_a_source() {
        let mut map = HashMap::new();
        map.insert("id".to_string(), "7".to_string());

        assert!(map.contains("id"));
        assert_eq!(raw(&map, "id").as_deref(), Some("7"));
        assert_eq!(map.request_id(), None);
    }
}
