//! Integer id newtypes for launches and test items.
//!
//! Ids are assigned by the backing store on first save. The value `0` is the
//! "not yet persisted" sentinel, mirroring how the stores treat inserts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a [`super::launch::Launch`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LaunchId(pub i64);

/// Identifier of a [`super::item::TestItem`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TestItemId(pub i64);

impl LaunchId {
    /// Returns `true` if the id has been assigned by a store.
    #[must_use]
    pub const fn is_persisted(self) -> bool {
        self.0 != 0
    }
}

impl TestItemId {
    /// Returns `true` if the id has been assigned by a store.
    #[must_use]
    pub const fn is_persisted(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for LaunchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TestItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
