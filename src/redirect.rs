//! Open-redirect protection for URL-valued parameters.

use url::{ParseError, Url};

use crate::error::{SecurityError, SecurityErrorKind};

/// Which URLs a URL getter accepts.
///
/// Getters default to [`UrlPolicy::RelativeOnly`] so that a `?next=` style
/// parameter cannot send the user to another site. Callers opt out
/// explicitly with [`UrlPolicy::AllowAbsolute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlPolicy {
    /// Reject absolute (`https://...`, `javascript:...`) and scheme-relative
    /// (`//host/...`) URLs.
    #[default]
    RelativeOnly,
    /// Accept any URL without control characters.
    AllowAbsolute,
}

/// Checks a URL parameter value against `policy`.
///
/// Control characters are rejected under every policy, since a CR/LF in a
/// redirect target splits the response header. Under `RelativeOnly`, leading
/// whitespace is ignored and backslashes count as slashes, matching how
/// browsers resolve `Location` headers.
///
/// # Errors
///
/// Returns `SecurityError` naming `name` if the value is not acceptable.
///
/// # Examples
///
/// ```
/// use cgi_params::{check_url, SecurityErrorKind, UrlPolicy};
///
/// assert!(check_url("next", "/account", UrlPolicy::RelativeOnly).is_ok());
///
/// let err = check_url("next", "https://evil.example/", UrlPolicy::RelativeOnly).unwrap_err();
/// assert_eq!(err.kind(), SecurityErrorKind::AbsoluteUrl);
///
/// assert!(check_url("next", "https://evil.example/", UrlPolicy::AllowAbsolute).is_ok());
/// ```
pub fn check_url(name: &str, value: &str, policy: UrlPolicy) -> Result<(), SecurityError> {
    if value.chars().any(char::is_control) {
        return Err(SecurityError::new(SecurityErrorKind::ControlCharacters, name));
    }

    if policy == UrlPolicy::AllowAbsolute {
        return Ok(());
    }

    let trimmed = value.trim_start();

    let mut head = trimmed.chars().take(2);
    let is_slash = |c: Option<char>| matches!(c, Some('/') | Some('\\'));
    if is_slash(head.next()) && is_slash(head.next()) {
        return Err(SecurityError::new(SecurityErrorKind::ProtocolRelativeUrl, name));
    }

    // Any outcome other than "no scheme" means the value carries a scheme,
    // valid or not.
    match Url::parse(trimmed) {
        Err(ParseError::RelativeUrlWithoutBase) => Ok(()),
        _ => Err(SecurityError::new(SecurityErrorKind::AbsoluteUrl, name)),
    }
}
