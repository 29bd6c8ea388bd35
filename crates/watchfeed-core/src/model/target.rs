use serde::{Deserialize, Serialize};
use std::fmt;

///
/// PageTarget
///
/// Page reference as stored in the watchlist: namespace number plus
/// database-key title.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PageTarget {
    pub namespace: i32,
    pub title: String,
}

impl PageTarget {
    #[must_use]
    pub fn new(namespace: i32, title: impl Into<String>) -> Self {
        Self {
            namespace,
            title: title.into(),
        }
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.title)
    }
}
