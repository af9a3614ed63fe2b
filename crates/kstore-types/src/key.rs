//! Dot-notation key splitting.
//!
//! A user key such as `profile.address.city` names the root entry `profile`
//! and the nested path `address.city` inside it. There is no escape syntax:
//! every `.` is a separator, so a key segment can never contain a literal dot.

/// A user key split into its root segment and optional nested path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPath<'a> {
    /// First dot-delimited segment. The only part persisted as a driver key.
    pub root: &'a str,
    /// Remaining segments rejoined with `.`, or `None` for a bare root.
    pub nested: Option<&'a str>,
}

impl<'a> KeyPath<'a> {
    /// Returns `true` if the key addresses the whole root entry.
    pub fn is_root(&self) -> bool {
        self.nested.is_none()
    }
}

/// Split a key on its first `.` into root and nested path.
///
/// A trailing dot yields an empty nested path (`"a."` -> root `a`, nested
/// `""`), which addresses the property named by the empty string.
///
/// ```
/// use kstore_types::split;
///
/// let path = split("k6.b.c.d");
/// assert_eq!(path.root, "k6");
/// assert_eq!(path.nested, Some("b.c.d"));
/// assert_eq!(split("k6").nested, None);
/// ```
pub fn split(key: &str) -> KeyPath<'_> {
    match key.split_once('.') {
        Some((root, nested)) => KeyPath {
            root,
            nested: Some(nested),
        },
        None => KeyPath { root: key, nested: None },
    }
}
