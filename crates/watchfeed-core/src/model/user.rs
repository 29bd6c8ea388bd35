use serde::{Deserialize, Serialize};
use std::fmt;

///
/// UserIdentity
///
/// Resolved account reference. An id of zero denotes an anonymous visitor.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserIdentity {
    pub id: u64,
    pub name: String,
}

impl UserIdentity {
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn anonymous(name: impl Into<String>) -> Self {
        Self::new(0, name)
    }

    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.id != 0
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}
