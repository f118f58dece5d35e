use std::fmt;

/// A raw request value that has not been validated yet.
///
/// Every value read from a [`ParamSource`](crate::ParamSource) arrives wrapped
/// in `Tainted`. Only the typed getters of
/// [`ParamAccessor`](crate::ParamAccessor) unwrap it, and they do so while
/// converting and validating it.
///
/// # Security Properties
///
/// - Does NOT implement `Deref` or any implicit conversion traits
/// - The inner value is only reachable from inside this crate
///
/// # Examples
///
/// ```
/// use cgi_params::Tainted;
///
/// let raw = Tainted::new("https://evil.example/");
///
/// // Debug output shows it's tainted
/// assert!(format!("{:?}", raw).starts_with("Tainted"));
///
/// // But the value cannot be used directly:
/// // let s: &str = raw; // Won't compile!
/// ```
// BREAKING CHANGE WARNING: Do NOT remove Clone - sources hand out copies of borrowed values.
#[derive(Clone)]
pub struct Tainted<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // Making it public lets callers skip conversion and validation (CWE-20).
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an unvalidated value.
    ///
    /// Parameter sources call this for every value they hand out.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Extracts the inner value for validation.
    ///
    /// `pub(crate)` so that only the typed getters can unwrap raw input.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// BREAKING CHANGE WARNING: Do NOT add Deref, AsRef, Borrow, From<T>, Into<T>, or any other
// implicit conversion traits to Tainted<T>.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tainted").field(&self.inner).finish()
    }
}
