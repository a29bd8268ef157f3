//! Dot-separated type names.
//!
//! A [`SparseDotName`] is the value handed out for every name an index stores: class names,
//! superclass and interface names, member names and annotation types. It carries the pool id it
//! came from, but identity is defined by the resolved string alone. Two indices built
//! independently over the same classes may assign different ids to the same name, and their
//! names must still compare equal.
//!
//! The package / simple-name split is not stored; it is computed from the resolved string when
//! asked for.

use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A resolved, dot-separated name.
///
/// # Examples
///
/// ```rust
/// use annodex::SparseDotName;
///
/// let name = SparseDotName::new(7, "com.acme.Foo".into());
/// assert_eq!(name, "com.acme.Foo");
/// assert_eq!(name.package(), Some("com.acme"));
/// assert_eq!(name.local(), "Foo");
///
/// // Equality ignores the pool id
/// assert_eq!(name, SparseDotName::new(3, "com.acme.Foo".into()));
/// ```
#[derive(Clone)]
pub struct SparseDotName {
    id: u32,
    value: Arc<str>,
}

impl SparseDotName {
    /// Wraps a resolved name and the pool id it was resolved from.
    #[must_use]
    pub fn new(id: u32, value: Arc<str>) -> Self {
        SparseDotName { id, value }
    }

    /// The pool id this name was resolved from.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The full name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Everything before the last `.`, or `None` for a name without a package.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.value.rsplit_once('.').map(|(package, _)| package)
    }

    /// Everything after the last `.`, or the full name if there is no package.
    #[must_use]
    pub fn local(&self) -> &str {
        match self.value.rsplit_once('.') {
            Some((_, local)) => local,
            None => &self.value,
        }
    }

    /// Returns `true` if the local part names a nested class (`Outer$Inner`).
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.local().contains('$')
    }
}

impl PartialEq for SparseDotName {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for SparseDotName {}

impl PartialEq<str> for SparseDotName {
    fn eq(&self, other: &str) -> bool {
        &*self.value == other
    }
}

impl PartialEq<&str> for SparseDotName {
    fn eq(&self, other: &&str) -> bool {
        &*self.value == *other
    }
}

impl Hash for SparseDotName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `str`'s Hash for the Borrow<str> impl to be sound
        self.value.as_ref().hash(state);
    }
}

impl PartialOrd for SparseDotName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SparseDotName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Borrow<str> for SparseDotName {
    fn borrow(&self) -> &str {
        &self.value
    }
}

impl AsRef<str> for SparseDotName {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for SparseDotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for SparseDotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SparseDotName({:?}#{})", &*self.value, self.id)
    }
}
