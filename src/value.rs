//! Conversion between raw parameter text and typed values.

use crate::config::AccessorConfig;
use crate::error::{ValidationError, ValidationErrorKind};

/// A type that can be read from, and written to, a request parameter.
///
/// Implementations define the accepted text forms of the type. Error
/// messages describe the constraint that failed and never contain the
/// rejected input.
///
/// # Examples
///
/// ```
/// use cgi_params::{AccessorConfig, ParamValue};
///
/// let config = AccessorConfig::default();
/// assert_eq!(i64::parse_param("page", "-3", &config).unwrap(), -3);
/// assert!(bool::parse_param("flag", "maybe", &config).is_err());
/// assert_eq!(true.render_param(), "1");
/// ```
pub trait ParamValue: Sized {
    /// Name of the type as used in error messages.
    const TYPE_NAME: &'static str;

    /// Whether a submitted but empty value counts as not submitted.
    const EMPTY_IS_ABSENT: bool;

    /// Converts a raw value.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `name` if `raw` is not a valid
    /// text form of the type.
    fn parse_param(name: &str, raw: &str, config: &AccessorConfig) -> Result<Self, ValidationError>;

    /// Renders the value in the form `parse_param` accepts.
    ///
    /// Only called for values where [`is_renderable`](Self::is_renderable)
    /// holds.
    fn render_param(&self) -> String;

    /// Whether the value has a text form at all.
    ///
    /// Renderers omit the parameter for values without one, such as NaN.
    fn is_renderable(&self) -> bool {
        true
    }
}

fn invalid<T: ParamValue>(name: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::InvalidValue,
        name,
        format!("expected {}", T::TYPE_NAME),
    )
}

impl ParamValue for bool {
    const TYPE_NAME: &'static str = "boolean";
    const EMPTY_IS_ABSENT: bool = false;

    fn parse_param(
        name: &str,
        raw: &str,
        _config: &AccessorConfig,
    ) -> Result<Self, ValidationError> {
        // A bare key (`?flag`) is a checkbox that was ticked.
        if raw.is_empty() {
            return Ok(true);
        }
        const TRUE: [&str; 4] = ["1", "true", "on", "yes"];
        const FALSE: [&str; 4] = ["0", "false", "off", "no"];
        if TRUE.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
            Ok(true)
        } else if FALSE.iter().any(|f| raw.eq_ignore_ascii_case(f)) {
            Ok(false)
        } else {
            Err(invalid::<Self>(name))
        }
    }

    fn render_param(&self) -> String {
        let token = if *self { "1" } else { "0" };
        token.to_string()
    }
}

impl ParamValue for i64 {
    const TYPE_NAME: &'static str = "integer";
    const EMPTY_IS_ABSENT: bool = true;

    fn parse_param(
        name: &str,
        raw: &str,
        _config: &AccessorConfig,
    ) -> Result<Self, ValidationError> {
        raw.parse::<i64>().map_err(|_| invalid::<Self>(name))
    }

    fn render_param(&self) -> String {
        self.to_string()
    }
}

impl ParamValue for f64 {
    const TYPE_NAME: &'static str = "number";
    const EMPTY_IS_ABSENT: bool = true;

    fn parse_param(
        name: &str,
        raw: &str,
        _config: &AccessorConfig,
    ) -> Result<Self, ValidationError> {
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(invalid::<Self>(name)),
        }
    }

    fn render_param(&self) -> String {
        self.to_string()
    }

    fn is_renderable(&self) -> bool {
        self.is_finite()
    }
}

/// Control characters other than tab, CR and LF, which multi-line form
/// fields legitimately contain.
fn is_forbidden_char(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

impl ParamValue for String {
    const TYPE_NAME: &'static str = "string";
    const EMPTY_IS_ABSENT: bool = false;

    fn parse_param(
        name: &str,
        raw: &str,
        config: &AccessorConfig,
    ) -> Result<Self, ValidationError> {
        if raw.len() > config.max_string_len() {
            return Err(ValidationError::new(
                ValidationErrorKind::TooLong,
                name,
                format!("exceeds maximum length of {}", config.max_string_len()),
            ));
        }

        if raw.chars().any(is_forbidden_char) {
            return Err(ValidationError::new(
                ValidationErrorKind::ContainsControlChars,
                name,
                "contains control or non-printable characters",
            ));
        }

        Ok(raw.to_string())
    }

    fn render_param(&self) -> String {
        self.clone()
    }
}
