//! Typed, validated access to web request parameters.
//!
//! This crate reads CGI parameters (query-string and form fields) as typed
//! values and writes typed values back as query-string fragments:
//! - **Typed getters**: mandatory and optional reads of booleans, numbers,
//!   strings, obfuscated IDs and URLs, failing with a [`ValidationError`] on
//!   bad input
//! - **Open-redirect protection**: URL getters reject absolute and
//!   scheme-relative URLs with a [`SecurityError`] unless the caller opts out
//! - **ID obfuscation**: database IDs travel as opaque, label-scoped tokens
//! - **Safe rendering**: `put_*` operations return [`QueryFragment`]s that are
//!   already percent-encoded
//!
//! # Core Types
//!
//! - [`ParamAccessor`]: the capability set, provided on top of a [`ParamSource`]
//! - [`RequestAccessor`]: the standard accessor over [`RequestParams`]
//! - [`IdCodecRegistry`]: label-to-codec mapping shared across requests
//! - [`Tainted<T>`]: raw request values that have not been validated
//! - [`Secret<T>`]: redacting wrapper for codec keys
//!
//! # Examples
//!
//! ```
//! use cgi_params::{
//!     AccessorConfig, IdCodecRegistry, ParamAccessor, QueryString, RequestAccessor,
//!     RequestParams, Secret,
//! };
//!
//! // At startup: one registry for all requests
//! let master = Secret::new(b"load-me-from-your-secret-store".to_vec());
//! let codecs = IdCodecRegistry::from_secret(&master, ["user", "order"]).unwrap();
//!
//! // Per request
//! let params = RequestParams::from_query_string("req-123", "page=2&next=%2Fcart");
//! let config = AccessorConfig::new("https://shop.example");
//! let accessor = RequestAccessor::new(params, codecs, config);
//!
//! let page = accessor.get_mandatory_int("page", Some(1)).unwrap();
//! let next = accessor.get_optional_url("next", None).unwrap();
//! assert_eq!(page, 2);
//! assert_eq!(next.as_deref(), Some("/cart"));
//!
//! // Build a link with an obfuscated order id
//! let link = QueryString::new()
//!     .with(accessor.put_id("order", 1001u64, "order").unwrap())
//!     .with(accessor.put_int("page", page + 1))
//!     .to_url(accessor.put_leader(), "/orders");
//! assert!(link.starts_with("https://shop.example/orders?order="));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod accessor;
mod codec;
mod config;
mod error;
mod fragment;
mod logging;
mod redirect;
mod request;
mod secret;
mod slug;
mod tainted;
mod value;

pub use accessor::{ParamAccessor, RequestAccessor};
pub use codec::{CodecKeyError, FeistelIdCodec, IdCodec, IdCodecRegistry, MIN_KEY_LEN, TOKEN_LEN};
pub use config::{AccessorConfig, DEFAULT_MAX_STRING_LEN, DEFAULT_SLUG_EXTENSION};
pub use error::{Error, SecurityError, SecurityErrorKind, ValidationError, ValidationErrorKind};
pub use fragment::{QueryFragment, QueryString};
pub use redirect::{check_url, UrlPolicy};
pub use request::{ParamSource, RequestParams};
pub use secret::Secret;
pub use slug::{slug_name, slugify, FALLBACK_SLUG};
pub use tainted::Tainted;
pub use value::ParamValue;
