//! Key/value attributes attached to launches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A key/value metadata tag on a launch.
///
/// Uniqueness is by `(key, value)`: two attributes that agree on both are the
/// same attribute, regardless of the system flag. System attributes are
/// written by the platform itself (agent version, build references) rather
/// than by users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemAttribute {
    pub key: Option<String>,
    pub value: String,
    pub system: bool,
}

impl ItemAttribute {
    /// A user-visible attribute.
    #[must_use]
    pub fn new(key: Option<&str>, value: &str) -> Self {
        Self {
            key: key.map(str::to_string),
            value: value.to_string(),
            system: false,
        }
    }

    /// A system attribute.
    #[must_use]
    pub fn system(key: Option<&str>, value: &str) -> Self {
        Self {
            system: true,
            ..Self::new(key, value)
        }
    }

    /// The `(key, value)` identity of this attribute.
    #[must_use]
    pub fn identity(&self) -> (Option<&str>, &str) {
        (self.key.as_deref(), &self.value)
    }
}

impl fmt::Display for ItemAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}:{}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ItemAttribute;

    #[test]
    fn identity_ignores_the_system_flag() {
        let user = ItemAttribute::new(Some("env"), "staging");
        let system = ItemAttribute::system(Some("env"), "staging");
        assert_eq!(user.identity(), system.identity());
        assert_ne!(user, system);
    }

    #[test]
    fn display_elides_missing_key() {
        assert_eq!(ItemAttribute::new(Some("os"), "linux").to_string(), "os:linux");
        assert_eq!(ItemAttribute::new(None, "nightly").to_string(), "nightly");
    }
}
