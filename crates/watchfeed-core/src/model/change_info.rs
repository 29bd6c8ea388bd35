use crate::value::Value;
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// ChangeInfo
///
/// Field map of one change event, keyed by column name. Mapping keeps only
/// `rc_`-prefixed columns; post-query extensions may add their own keys.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeInfo(BTreeMap<String, Value>);

impl ChangeInfo {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }
}

impl FromIterator<(String, Value)> for ChangeInfo {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
