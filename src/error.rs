use std::fmt;

/// Errors surfaced by parameter accessors.
///
/// Every failure is either a [`ValidationError`] (missing or malformed input)
/// or a [`SecurityError`] (input that would be unsafe to act on). Neither is
/// recovered locally; callers decide how to answer the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A parameter was missing or failed conversion
    Validation(ValidationError),
    /// A parameter violated a security constraint
    Security(SecurityError),
}

impl Error {
    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            Error::Security(_) => None,
        }
    }

    /// Returns the security error, if this is one.
    pub fn as_security(&self) -> Option<&SecurityError> {
        match self {
            Error::Security(e) => Some(e),
            Error::Validation(_) => None,
        }
    }

    /// Returns `true` for validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Returns `true` for security failures.
    pub fn is_security(&self) -> bool {
        matches!(self, Error::Security(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Security(e) => write!(f, "Security error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Validation(e) => Some(e),
            Error::Security(e) => Some(e),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<SecurityError> for Error {
    fn from(e: SecurityError) -> Self {
        Error::Security(e)
    }
}

/// A parameter that was missing, malformed, or not decodable.
///
/// The message names the parameter but never echoes the raw request value.
///
/// # Examples
///
/// ```
/// use cgi_params::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::Missing, "page", "parameter is required");
/// assert_eq!(err.kind(), ValidationErrorKind::Missing);
/// assert_eq!(err.param(), "page");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    param: String,
    message: String,
}

impl ValidationError {
    /// Creates a new validation error for the named parameter.
    pub fn new(
        kind: ValidationErrorKind,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            param: param.into(),
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// Returns the name of the offending parameter.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn missing(param: &str) -> Self {
        Self::new(ValidationErrorKind::Missing, param, "parameter is required")
    }

    pub(crate) fn unknown_label(param: &str, label: &str) -> Self {
        Self::new(
            ValidationErrorKind::UnknownLabel,
            param,
            format!("no id codec registered for label '{}'", label),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for '{}': {}", self.kind, self.param, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Kind of validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A mandatory parameter was absent and no default was given.
    Missing,
    /// The value could not be converted to the requested type.
    InvalidValue,
    /// The value contains control characters.
    ContainsControlChars,
    /// The value exceeds the configured maximum length.
    TooLong,
    /// The token did not decode under the requested label.
    InvalidId,
    /// No codec is registered for the requested label.
    UnknownLabel,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing parameter"),
            Self::InvalidValue => write!(f, "invalid value"),
            Self::ContainsControlChars => write!(f, "contains control characters"),
            Self::TooLong => write!(f, "value too long"),
            Self::InvalidId => write!(f, "invalid id"),
            Self::UnknownLabel => write!(f, "unknown id label"),
        }
    }
}

/// A parameter value that would be unsafe to act on.
///
/// # Examples
///
/// ```
/// use cgi_params::{SecurityError, SecurityErrorKind};
///
/// let err = SecurityError::new(SecurityErrorKind::AbsoluteUrl, "next");
/// assert_eq!(err.kind(), SecurityErrorKind::AbsoluteUrl);
/// assert!(err.to_string().contains("next"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityError {
    kind: SecurityErrorKind,
    param: String,
}

impl SecurityError {
    /// Creates a new security error for the named parameter.
    pub fn new(kind: SecurityErrorKind, param: impl Into<String>) -> Self {
        Self {
            kind,
            param: param.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SecurityErrorKind {
        self.kind
    }

    /// Returns the name of the offending parameter.
    pub fn param(&self) -> &str {
        &self.param
    }
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in '{}'", self.kind, self.param)
    }
}

impl std::error::Error for SecurityError {}

/// Kind of security violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityErrorKind {
    /// A URL with a scheme where only relative URLs are allowed.
    AbsoluteUrl,
    /// A scheme-relative URL (`//host/...`) where only relative URLs are allowed.
    ProtocolRelativeUrl,
    /// A URL containing control characters.
    ControlCharacters,
}

impl fmt::Display for SecurityErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsoluteUrl => write!(f, "absolute url not allowed"),
            Self::ProtocolRelativeUrl => write!(f, "protocol-relative url not allowed"),
            Self::ControlCharacters => write!(f, "control characters in url"),
        }
    }
}
