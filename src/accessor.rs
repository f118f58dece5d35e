//! Typed reading and writing of request parameters.
//!
//! [`ParamAccessor`] is the capability set: typed getters that validate raw
//! request values, and `put_*` renderers that turn typed values back into
//! query-string fragments. Everything is provided on top of two required
//! methods, so any [`ParamSource`] paired with an [`IdCodecRegistry`] and an
//! [`AccessorConfig`] gets the full set. [`RequestAccessor`] is the standard
//! implementation.
//!
//! # Mandatory and optional getters
//!
//! | Parameter | `get_mandatory_*` | `get_optional_*` |
//! |-----------|-------------------|------------------|
//! | absent, no default | `ValidationError` (missing) | `Ok(None)` |
//! | absent, default `d` | `Ok(d)` | `Ok(Some(d))` |
//! | present, valid | `Ok(v)` | `Ok(Some(v))` |
//! | present, invalid | `ValidationError` | `ValidationError` |
//!
//! For integers, floats, IDs and URLs an empty value counts as absent, since
//! an untouched form field submits `name=`.

use std::sync::Arc;

use crate::codec::{IdCodec, IdCodecRegistry};
use crate::config::AccessorConfig;
use crate::error::{Error, ValidationError, ValidationErrorKind};
use crate::fragment::QueryFragment;
use crate::logging::RequestLog;
use crate::redirect::{check_url, UrlPolicy};
use crate::request::{ParamSource, RequestParams};
use crate::slug::slug_name;
use crate::value::ParamValue;
use crate::Tainted;

fn log_for<A: ParamAccessor + ?Sized>(accessor: &A) -> RequestLog<'_> {
    RequestLog::new(accessor.request_id())
}

/// Raw value of `name`, with empty values dropped when `empty_is_absent`.
fn lookup<'a, A: ParamAccessor + ?Sized>(
    accessor: &'a A,
    name: &str,
    empty_is_absent: bool,
) -> Option<&'a str> {
    accessor
        .param(name)
        .map(Tainted::into_inner)
        .filter(|raw| !(empty_is_absent && raw.is_empty()))
}

fn id_codec<'a, A: ParamAccessor + ?Sized>(
    accessor: &'a A,
    name: &str,
    label: &str,
) -> Result<&'a dyn IdCodec, ValidationError> {
    accessor
        .id_codecs()
        .codec(label)
        .ok_or_else(|| ValidationError::unknown_label(name, label))
}

fn missing<A: ParamAccessor + ?Sized>(accessor: &A, name: &str) -> Error {
    let err = ValidationError::missing(name);
    log_for(accessor).rejected(&err);
    err.into()
}

fn render<T: ParamValue>(name: &str, value: Option<T>) -> QueryFragment {
    match value {
        Some(v) if v.is_renderable() => QueryFragment::pair(name, &v.render_param()),
        _ => QueryFragment::empty(),
    }
}

/// Typed, validated access to the parameters of one request.
///
/// # Examples
///
/// ```
/// use cgi_params::{
///     AccessorConfig, IdCodecRegistry, ParamAccessor, RequestAccessor, RequestParams, Secret,
/// };
///
/// let master = Secret::new(b"an id master key of decent length".to_vec());
/// let codecs = IdCodecRegistry::from_secret(&master, ["user"]).unwrap();
/// let token = codecs.codec("user").unwrap().encode(42);
///
/// let params = RequestParams::from_query_string(
///     "req-1",
///     &format!("page=3&q=rust&user={token}&next=/account"),
/// );
/// let accessor = RequestAccessor::new(params, codecs, AccessorConfig::default());
///
/// assert_eq!(accessor.get_mandatory_int("page", None).unwrap(), 3);
/// assert_eq!(accessor.get_optional_int("limit", None).unwrap(), None);
/// assert_eq!(accessor.get_mandatory_string("q", None).unwrap(), "rust");
/// assert_eq!(accessor.get_mandatory_id("user", "user", None).unwrap(), 42);
/// assert_eq!(accessor.get_mandatory_url("next", None).unwrap(), "/account");
/// ```
pub trait ParamAccessor: ParamSource {
    /// The label-to-codec mapping used for ID parameters.
    fn id_codecs(&self) -> &IdCodecRegistry;

    /// Settings for this accessor.
    fn config(&self) -> &AccessorConfig;

    /// Reads a parameter that must be present.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the parameter is absent and `default` is
    /// `None`, or if the value does not convert to `T`.
    fn get_mandatory<T: ParamValue>(&self, name: &str, default: Option<T>) -> Result<T, Error> {
        match self.get_optional(name, default)? {
            Some(value) => Ok(value),
            None => Err(missing(self, name)),
        }
    }

    /// Reads a parameter that may be absent.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is present but does not convert to `T`.
    fn get_optional<T: ParamValue>(
        &self,
        name: &str,
        default: Option<T>,
    ) -> Result<Option<T>, Error> {
        let log = log_for(self);
        match lookup(self, name, T::EMPTY_IS_ABSENT) {
            Some(raw) => T::parse_param(name, raw, self.config())
                .map(Some)
                .map_err(|err| {
                    log.rejected(&err);
                    err.into()
                }),
            None => {
                if default.is_some() {
                    log.defaulted(name);
                }
                Ok(default)
            }
        }
    }

    /// Reads a mandatory boolean.
    fn get_mandatory_bool(&self, name: &str, default: Option<bool>) -> Result<bool, Error> {
        self.get_mandatory(name, default)
    }

    /// Reads a mandatory float.
    fn get_mandatory_float(&self, name: &str, default: Option<f64>) -> Result<f64, Error> {
        self.get_mandatory(name, default)
    }

    /// Reads a mandatory integer.
    fn get_mandatory_int(&self, name: &str, default: Option<i64>) -> Result<i64, Error> {
        self.get_mandatory(name, default)
    }

    /// Reads a mandatory string.
    fn get_mandatory_string(&self, name: &str, default: Option<&str>) -> Result<String, Error> {
        self.get_mandatory(name, default.map(str::to_string))
    }

    /// Reads an optional boolean.
    fn get_optional_bool(&self, name: &str, default: Option<bool>) -> Result<Option<bool>, Error> {
        self.get_optional(name, default)
    }

    /// Reads an optional float.
    fn get_optional_float(&self, name: &str, default: Option<f64>) -> Result<Option<f64>, Error> {
        self.get_optional(name, default)
    }

    /// Reads an optional integer.
    fn get_optional_int(&self, name: &str, default: Option<i64>) -> Result<Option<i64>, Error> {
        self.get_optional(name, default)
    }

    /// Reads an optional string.
    fn get_optional_string(
        &self,
        name: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, Error> {
        self.get_optional(name, default.map(str::to_string))
    }

    /// Reads and decodes a mandatory obfuscated ID.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `label` is not registered, if the
    /// parameter is absent without a default, or if the token does not
    /// decode under `label`.
    fn get_mandatory_id(
        &self,
        name: &str,
        label: &str,
        default: Option<u64>,
    ) -> Result<u64, Error> {
        match self.get_optional_id(name, label, default)? {
            Some(id) => Ok(id),
            None => Err(missing(self, name)),
        }
    }

    /// Reads and decodes an optional obfuscated ID.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `label` is not registered or if a
    /// present token does not decode under `label`.
    fn get_optional_id(
        &self,
        name: &str,
        label: &str,
        default: Option<u64>,
    ) -> Result<Option<u64>, Error> {
        let log = log_for(self);
        let codec = id_codec(self, name, label).map_err(|err| {
            log.rejected(&err);
            err
        })?;

        let Some(token) = lookup(self, name, true) else {
            if default.is_some() {
                log.defaulted(name);
            }
            return Ok(default);
        };

        match codec.decode(token) {
            Some(id) => Ok(Some(id)),
            None => {
                let err = ValidationError::new(
                    ValidationErrorKind::InvalidId,
                    name,
                    format!("token is not a valid '{}' id", label),
                );
                log.rejected(&err);
                Err(err.into())
            }
        }
    }

    /// Reads a mandatory URL, accepting relative URLs only.
    ///
    /// # Errors
    ///
    /// Returns `SecurityError` for absolute or scheme-relative URLs and
    /// `ValidationError` if the parameter is absent without a default.
    fn get_mandatory_url(&self, name: &str, default: Option<&str>) -> Result<String, Error> {
        self.get_mandatory_url_with_policy(name, default, UrlPolicy::RelativeOnly)
    }

    /// Reads a mandatory URL under an explicit policy.
    fn get_mandatory_url_with_policy(
        &self,
        name: &str,
        default: Option<&str>,
        policy: UrlPolicy,
    ) -> Result<String, Error> {
        match self.get_optional_url_with_policy(name, default, policy)? {
            Some(url) => Ok(url),
            None => Err(missing(self, name)),
        }
    }

    /// Reads an optional URL, accepting relative URLs only.
    ///
    /// # Errors
    ///
    /// Returns `SecurityError` for absolute or scheme-relative URLs.
    fn get_optional_url(&self, name: &str, default: Option<&str>) -> Result<Option<String>, Error> {
        self.get_optional_url_with_policy(name, default, UrlPolicy::RelativeOnly)
    }

    /// Reads an optional URL under an explicit policy.
    ///
    /// The policy applies to the resolved value, so a default must satisfy
    /// it too.
    fn get_optional_url_with_policy(
        &self,
        name: &str,
        default: Option<&str>,
        policy: UrlPolicy,
    ) -> Result<Option<String>, Error> {
        let log = log_for(self);
        let value = match lookup(self, name, true) {
            Some(raw) => raw,
            None => match default {
                Some(d) => {
                    log.defaulted(name);
                    d
                }
                None => return Ok(None),
            },
        };

        check_url(name, value, policy).map_err(|err| {
            log.blocked(&err);
            err
        })?;

        String::parse_param(name, value, self.config())
            .map(Some)
            .map_err(|err| {
                log.rejected(&err);
                err.into()
            })
    }

    /// Renders a boolean.
    ///
    /// `true` renders as `name=1`. `false` renders as `name=0` when
    /// `mandatory` is set and as an empty fragment otherwise, so a form can
    /// tell "explicitly unchecked" from "never submitted".
    fn put_bool(&self, name: &str, value: bool, mandatory: bool) -> QueryFragment {
        if value || mandatory {
            render(name, Some(value))
        } else {
            QueryFragment::empty()
        }
    }

    /// Renders a float, or nothing for `None`.
    ///
    /// NaN and the infinities are omitted as well, since the float getters
    /// reject them.
    fn put_float(&self, name: &str, value: impl Into<Option<f64>>) -> QueryFragment {
        render(name, value.into())
    }

    /// Renders an integer, or nothing for `None`.
    fn put_int(&self, name: &str, value: impl Into<Option<i64>>) -> QueryFragment {
        render(name, value.into())
    }

    /// Renders a string, or nothing for `None`.
    ///
    /// Any string renders, but the string getters only read back values
    /// within [`AccessorConfig::max_string_len`] that have no control
    /// characters besides tab, CR and LF.
    fn put_string<'a>(&self, name: &str, value: impl Into<Option<&'a str>>) -> QueryFragment {
        render(name, value.into().map(str::to_string))
    }

    /// Renders an ID as its obfuscated token, or nothing for `None`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `label` is not registered, even when
    /// `value` is `None`.
    fn put_id(
        &self,
        name: &str,
        value: impl Into<Option<u64>>,
        label: &str,
    ) -> Result<QueryFragment, Error> {
        let codec = id_codec(self, name, label).map_err(|err| {
            log_for(self).render_failed(&err);
            err
        })?;

        Ok(match value.into() {
            Some(id) => QueryFragment::pair(name, &codec.encode(id)),
            None => QueryFragment::empty(),
        })
    }

    /// Renders a URL, or nothing for `None`.
    ///
    /// The value is encoded as is. The URL getters apply their policy and
    /// the string limits when it is read back.
    fn put_url<'a>(&self, name: &str, value: impl Into<Option<&'a str>>) -> QueryFragment {
        self.put_string(name, value)
    }

    /// The base URL for links generated in this request.
    fn put_leader(&self) -> &str {
        self.config().leader()
    }

    /// Derives a slug with the configured default extension (`.html`).
    fn put_slug_name(&self, input: &str) -> String {
        slug_name(input, self.config().slug_extension())
    }

    /// Derives a slug with an explicit extension.
    fn put_slug_name_with_extension(&self, input: &str, extension: &str) -> String {
        slug_name(input, extension)
    }
}

/// The standard [`ParamAccessor`]: a parameter source, a shared codec
/// registry and a config.
///
/// The registry is held in an `Arc` so that one registry, built at startup,
/// serves every request.
#[derive(Debug, Clone)]
pub struct RequestAccessor<S = RequestParams> {
    params: S,
    codecs: Arc<IdCodecRegistry>,
    config: AccessorConfig,
}

impl<S: ParamSource> RequestAccessor<S> {
    /// Creates an accessor over a fully populated parameter source.
    pub fn new(params: S, codecs: impl Into<Arc<IdCodecRegistry>>, config: AccessorConfig) -> Self {
        Self {
            params,
            codecs: codecs.into(),
            config,
        }
    }

    /// The underlying parameter source.
    pub fn params(&self) -> &S {
        &self.params
    }
}

impl<S: ParamSource> ParamSource for RequestAccessor<S> {
    fn param(&self, name: &str) -> Option<Tainted<&str>> {
        self.params.param(name)
    }

    fn request_id(&self) -> Option<&str> {
        self.params.request_id()
    }
}

impl<S: ParamSource> ParamAccessor for RequestAccessor<S> {
    fn id_codecs(&self) -> &IdCodecRegistry {
        &self.codecs
    }

    fn config(&self) -> &AccessorConfig {
        &self.config
    }
}
