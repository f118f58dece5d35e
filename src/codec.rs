//! Label-scoped obfuscation of database IDs.
//!
//! Sequential database IDs leak row counts and invite enumeration when they
//! appear in URLs. An [`IdCodec`] maps an ID to an opaque token and back, and
//! an [`IdCodecRegistry`] keys codecs by *label*, the logical ID space the
//! token belongs to (`"user"`, `"order"`, ...). A token minted under one label
//! does not decode under another, up to the tag bound below.
//!
//! # Token format
//!
//! [`FeistelIdCodec`] tokens are 16 characters of unpadded URL-safe base64:
//!
//! ```text
//! permuted id (8 bytes) || tag (4 bytes)
//! ```
//!
//! The permutation is a four-round Feistel network over the two 32-bit halves
//! of the ID, with HMAC-SHA256 as the round function. The tag is a truncated
//! HMAC-SHA256 over the permuted bytes. Both are bound to the codec's label.
//!
//! The tag is 32 bits, so a random or forged token, or a token minted under
//! another label, is accepted with probability 2^-32.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::Secret;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted key length in bytes.
pub const MIN_KEY_LEN: usize = 16;

/// Length of an encoded token in characters.
pub const TOKEN_LEN: usize = 16;

const ROUNDS: u8 = 4;
const TAG_LEN: usize = 4;

/// Bidirectional mapping between integer IDs and opaque tokens for one label.
///
/// Implementations must be pure: the same ID always encodes to the same
/// token, and `decode(encode(id)) == Some(id)`. Tokens must be safe to place
/// in a URL without further escaping.
pub trait IdCodec: Send + Sync {
    /// Encodes an ID into an opaque token.
    fn encode(&self, id: u64) -> String;

    /// Decodes a token, returning `None` if it was not produced by this codec.
    fn decode(&self, token: &str) -> Option<u64>;

    /// The label the codec is bound to, if it binds one into its tokens.
    fn label(&self) -> Option<&str> {
        None
    }
}

/// Error returned when a codec key is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecKeyError {
    min_len: usize,
    actual_len: usize,
}

impl CodecKeyError {
    /// Length of the rejected key in bytes.
    pub fn actual_len(&self) -> usize {
        self.actual_len
    }
}

impl fmt::Display for CodecKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "codec key too short: {} bytes, need at least {}",
            self.actual_len, self.min_len
        )
    }
}

impl std::error::Error for CodecKeyError {}

fn keyed_mac(key: &[u8]) -> Result<HmacSha256, CodecKeyError> {
    let too_short = CodecKeyError {
        min_len: MIN_KEY_LEN,
        actual_len: key.len(),
    };
    if key.len() < MIN_KEY_LEN {
        return Err(too_short);
    }
    HmacSha256::new_from_slice(key).map_err(|_| too_short)
}

/// Keyed Feistel permutation with an integrity tag.
///
/// # Examples
///
/// ```
/// use cgi_params::{FeistelIdCodec, IdCodec};
///
/// let codec = FeistelIdCodec::new("user", b"0123456789abcdef0123456789abcdef").unwrap();
/// let token = codec.encode(42);
///
/// assert_eq!(token.len(), 16);
/// assert_eq!(codec.decode(&token), Some(42));
/// assert_eq!(codec.decode("AAAAAAAAAAAAAAAA"), None);
/// ```
pub struct FeistelIdCodec {
    label: String,
    mac: Secret<HmacSha256>,
}

impl FeistelIdCodec {
    /// Creates a codec for `label` keyed with `key`.
    ///
    /// # Errors
    ///
    /// Returns `CodecKeyError` if the key is shorter than [`MIN_KEY_LEN`].
    pub fn new(label: impl Into<String>, key: &[u8]) -> Result<Self, CodecKeyError> {
        Ok(Self {
            label: label.into(),
            mac: Secret::new(keyed_mac(key)?),
        })
    }

    /// The label this codec is bound to.
    pub fn label(&self) -> &str {
        &self.label
    }

    fn mac_over(&self, domain: &[u8], data: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.expose_secret().clone();
        mac.update(domain);
        mac.update(self.label.as_bytes());
        mac.update(&[0]);
        mac.update(data);
        mac
    }

    fn round(&self, round: u8, half: u32) -> u32 {
        let mut input = [0u8; 5];
        input[0] = round;
        input[1..].copy_from_slice(&half.to_be_bytes());
        let digest = self.mac_over(b"round", &input).finalize().into_bytes();
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }

    fn permute(&self, id: u64) -> u64 {
        let (mut left, mut right) = ((id >> 32) as u32, id as u32);
        for r in 0..ROUNDS {
            let next = left ^ self.round(r, right);
            left = right;
            right = next;
        }
        (u64::from(left) << 32) | u64::from(right)
    }

    fn unpermute(&self, value: u64) -> u64 {
        let (mut left, mut right) = ((value >> 32) as u32, value as u32);
        for r in (0..ROUNDS).rev() {
            let prev = right ^ self.round(r, left);
            right = left;
            left = prev;
        }
        (u64::from(left) << 32) | u64::from(right)
    }
}

impl IdCodec for FeistelIdCodec {
    fn encode(&self, id: u64) -> String {
        let permuted = self.permute(id).to_be_bytes();
        let tag = self.mac_over(b"tag", &permuted).finalize().into_bytes();

        let mut raw = [0u8; 8 + TAG_LEN];
        raw[..8].copy_from_slice(&permuted);
        raw[8..].copy_from_slice(&tag[..TAG_LEN]);
        URL_SAFE_NO_PAD.encode(raw)
    }

    fn decode(&self, token: &str) -> Option<u64> {
        if token.len() != TOKEN_LEN {
            return None;
        }
        let raw = URL_SAFE_NO_PAD.decode(token).ok()?;
        if raw.len() != 8 + TAG_LEN {
            return None;
        }
        let (permuted, tag) = raw.split_at(8);

        // Constant-time comparison of the truncated tag
        self.mac_over(b"tag", permuted)
            .verify_truncated_left(tag)
            .ok()?;

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(permuted);
        Some(self.unpermute(u64::from_be_bytes(bytes)))
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }
}

impl fmt::Debug for FeistelIdCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeistelIdCodec")
            .field("label", &self.label)
            .field("key", &self.mac)
            .finish()
    }
}

/// Label-to-codec mapping.
///
/// Built at startup and shared read-only across requests (wrap it in an
/// `Arc`). Lookups for unregistered labels return `None`.
///
/// # Examples
///
/// ```
/// use cgi_params::{IdCodec, IdCodecRegistry, Secret};
///
/// let master = Secret::new(b"master-key-for-all-id-labels".to_vec());
/// let registry = IdCodecRegistry::from_secret(&master, ["user", "order"]).unwrap();
///
/// let token = registry.codec("user").unwrap().encode(7);
/// assert_eq!(registry.codec("user").unwrap().decode(&token), Some(7));
/// assert_eq!(registry.codec("order").unwrap().decode(&token), None);
/// assert!(registry.codec("invoice").is_none());
/// ```
#[derive(Default)]
pub struct IdCodecRegistry {
    codecs: HashMap<String, Box<dyn IdCodec>>,
}

impl IdCodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives one [`FeistelIdCodec`] per label from a master secret.
    ///
    /// Each label gets its own key, `HMAC-SHA256(master, "id-key:" || label)`,
    /// so a single configured secret serves every ID space.
    ///
    /// # Errors
    ///
    /// Returns `CodecKeyError` if the master secret is shorter than [`MIN_KEY_LEN`].
    pub fn from_secret<K, L>(
        master: &Secret<K>,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Self, CodecKeyError>
    where
        K: AsRef<[u8]>,
        L: Into<String>,
    {
        let root = keyed_mac(master.expose_secret().as_ref())?;
        let mut registry = Self::new();
        for label in labels {
            let label = label.into();
            let mut mac = root.clone();
            mac.update(b"id-key:");
            mac.update(label.as_bytes());
            let derived = mac.finalize().into_bytes();
            let codec = FeistelIdCodec::new(label.clone(), &derived)?;
            registry.codecs.insert(label, Box::new(codec));
        }
        Ok(registry)
    }

    /// Registers a [`FeistelIdCodec`] bound to `label`, replacing any
    /// previous codec for it.
    ///
    /// The label is bound into every token, so several labels may share one
    /// key without their tokens cross-decoding.
    ///
    /// # Errors
    ///
    /// Returns `CodecKeyError` if the key is shorter than [`MIN_KEY_LEN`].
    pub fn with_feistel(self, label: impl Into<String>, key: &[u8]) -> Result<Self, CodecKeyError> {
        let label = label.into();
        let codec = FeistelIdCodec::new(label.clone(), key)?;
        Ok(self.with_codec(label, codec))
    }

    /// Registers a codec under `label`, replacing any previous one.
    ///
    /// Codecs that do not bind a label into their tokens must use distinct
    /// key material per label, or tokens will decode under every label that
    /// shares the key.
    ///
    /// # Panics
    ///
    /// Panics if the codec is bound to a different label than `label`.
    pub fn with_codec(mut self, label: impl Into<String>, codec: impl IdCodec + 'static) -> Self {
        let label = label.into();
        if let Some(bound) = codec.label() {
            assert_eq!(
                bound, label,
                "codec bound to label '{}' registered as '{}'",
                bound, label
            );
        }
        self.codecs.insert(label, Box::new(codec));
        self
    }

    /// Returns the codec registered for `label`.
    pub fn codec(&self, label: &str) -> Option<&dyn IdCodec> {
        self.codecs.get(label).map(|c| &**c)
    }

    /// Returns `true` if a codec is registered for `label`.
    pub fn contains(&self, label: &str) -> bool {
        self.codecs.contains_key(label)
    }

    /// Iterates over the registered labels in no particular order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }
}

impl fmt::Debug for IdCodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<&str> = self.labels().collect();
        labels.sort_unstable();
        f.debug_struct("IdCodecRegistry")
            .field("labels", &labels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn codec(label: &str) -> FeistelIdCodec {
        FeistelIdCodec::new(label, KEY).unwrap()
    }

    #[test]
    fn round_trips_edge_values() {
        let c = codec("user");
        for id in [0, 1, 2, 41, 42, u32::MAX as u64, u64::MAX - 1, u64::MAX] {
            assert_eq!(c.decode(&c.encode(id)), Some(id), "id {id}");
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let c = codec("user");

        assert_eq!(c.encode(1234), c.encode(1234));
        assert_eq!(codec("user").encode(1234), c.encode(1234));
    }

    #[test]
    fn tokens_are_url_safe() {
        let c = codec("user");
        for id in 0..200 {
            let token = c.encode(id);
            assert_eq!(token.len(), TOKEN_LEN);
            assert!(token
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'));
        }
    }

    #[test]
    fn sequential_ids_do_not_produce_sequential_tokens() {
        let c = codec("user");
        let a = c.encode(100);
        let b = c.encode(101);

        assert_ne!(a, b);
        assert_ne!(a[..8], b[..8]);
    }

    #[test]
    fn labels_produce_different_tokens() {
        assert_ne!(codec("user").encode(42), codec("order").encode(42));
    }

    #[test]
    fn tokens_do_not_cross_decode() {
        let token = codec("user").encode(42);

        assert_eq!(codec("order").decode(&token), None);
    }

    #[test]
    fn rejects_corrupt_tokens() {
        let c = codec("user");
        let token = c.encode(42);

        let mut flipped: Vec<char> = token.chars().collect();
        flipped[3] = if flipped[3] == 'A' { 'B' } else { 'A' };
        let flipped: String = flipped.into_iter().collect();

        assert_eq!(c.decode(&flipped), None);
        assert_eq!(c.decode(&token[..15]), None);
        assert_eq!(c.decode(""), None);
        assert_eq!(c.decode("!!!!!!!!!!!!!!!!"), None);
        assert_eq!(c.decode("42"), None);
    }

    #[test]
    fn rejects_short_key() {
        let err = FeistelIdCodec::new("user", b"short").unwrap_err();

        assert_eq!(err.actual_len(), 5);
        assert!(err.to_string().contains("16"));
    }

    #[test]
    fn debug_redacts_key() {
        let output = format!("{:?}", codec("user"));

        assert!(output.contains("user"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn registry_from_secret_derives_distinct_keys() {
        let master = Secret::new(KEY.to_vec());
        let registry = IdCodecRegistry::from_secret(&master, ["user", "order"]).unwrap();

        let user = registry.codec("user").unwrap();
        let order = registry.codec("order").unwrap();
        let token = user.encode(9);

        assert_eq!(user.decode(&token), Some(9));
        assert_eq!(order.decode(&token), None);
        // Derived keys differ from using the master key directly
        assert_ne!(token, codec("user").encode(9));
    }

    #[test]
    fn registry_rejects_short_master() {
        let master = Secret::new(b"tiny".to_vec());

        assert!(IdCodecRegistry::from_secret(&master, ["user"]).is_err());
    }

    #[test]
    fn registry_with_codec_and_lookup() {
        let registry = IdCodecRegistry::new().with_codec("user", codec("user"));

        assert!(registry.contains("user"));
        assert!(!registry.contains("order"));
        assert!(registry.codec("order").is_none());
        assert_eq!(registry.labels().collect::<Vec<_>>(), vec!["user"]);
    }

    #[test]
    fn registry_with_feistel_binds_the_label() {
        let registry = IdCodecRegistry::new()
            .with_feistel("user", KEY)
            .unwrap()
            .with_feistel("order", KEY)
            .unwrap();

        let user = registry.codec("user").unwrap();
        let order = registry.codec("order").unwrap();
        assert_eq!(user.label(), Some("user"));
        assert_eq!(order.label(), Some("order"));

        let token = user.encode(42);
        assert_eq!(user.decode(&token), Some(42));
        assert_eq!(order.decode(&token), None);
    }

    #[test]
    fn registry_with_feistel_rejects_short_key() {
        assert!(IdCodecRegistry::new().with_feistel("user", b"short").is_err());
    }

    #[test]
    #[should_panic(expected = "registered as 'order'")]
    fn registry_refuses_codec_bound_to_another_label() {
        let _ = IdCodecRegistry::new()
            .with_codec("user", codec("user"))
            .with_codec("order", codec("user"));
    }

    #[test]
    fn registry_accepts_unbound_codecs() {
        struct Plain;

        impl IdCodec for Plain {
            fn encode(&self, id: u64) -> String {
                id.to_string()
            }

            fn decode(&self, token: &str) -> Option<u64> {
                token.parse().ok()
            }
        }

        let registry = IdCodecRegistry::new().with_codec("legacy", Plain);
        let legacy = registry.codec("legacy").unwrap();

        assert_eq!(legacy.label(), None);
        assert_eq!(legacy.decode(&legacy.encode(7)), Some(7));
    }

    #[test]
    fn registry_debug_lists_sorted_labels() {
        let master = Secret::new(KEY.to_vec());
        let registry = IdCodecRegistry::from_secret(&master, ["user", "order"]).unwrap();

        assert_eq!(
            format!("{:?}", registry),
            r#"IdCodecRegistry { labels: ["order", "user"] }"#
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: decode(encode(id)) == id under the same label
            #[test]
            fn proptest_round_trip(id in any::<u64>()) {
                let c = codec("user");
                prop_assert_eq!(c.decode(&c.encode(id)), Some(id));
            }

            /// Property: a token never decodes under a different label
            #[test]
            fn proptest_labels_isolated(id in any::<u64>()) {
                let token = codec("user").encode(id);
                prop_assert_eq!(codec("order").decode(&token), None);
            }
        }
    }
}
