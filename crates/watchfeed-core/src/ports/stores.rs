use crate::{
    model::{PageTarget, UserIdentity},
    query::{JoinClause, SelectField, TableRef},
};

///
/// JoinContribution
///
/// Tables, fields and join conditions a collaborator needs merged into a
/// select to expose one logical field.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JoinContribution {
    pub tables: Vec<TableRef>,
    pub fields: Vec<SelectField>,
    pub joins: Vec<JoinClause>,
}

impl JoinContribution {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SelectField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

///
/// WhereContribution
///
/// A condition plus the tables and joins it depends on.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WhereContribution {
    pub tables: Vec<TableRef>,
    pub condition: String,
    pub joins: Vec<JoinClause>,
}

///
/// CommentStore
///

pub trait CommentStore: Send + Sync {
    fn join(&self, field: &str) -> JoinContribution;

    fn fields(&self, field: &str) -> Vec<SelectField> {
        self.join(field).fields
    }
}

///
/// ActorResolver
///
/// Maps logical user columns (`rc_user`, `rc_user_text`) onto the host's
/// actor storage.
///

pub trait ActorResolver: Send + Sync {
    fn join(&self, field: &str) -> JoinContribution;

    fn where_for_user(&self, field: &str, user_name: &str) -> WhereContribution;

    fn is_anonymous(&self, field: &str) -> String;

    fn is_not_anonymous(&self, field: &str) -> String;
}

///
/// ChangeTagStore
///

pub trait ChangeTagStore: Send + Sync {
    /// Scalar subquery that summarizes the tags of each row of `table`.
    fn summary_subquery(&self, table: &str) -> String;
}

///
/// WatchedItemStore
///

pub trait WatchedItemStore: Send + Sync {
    /// Reconcile a stored notification timestamp with pending watch state.
    fn latest_notification_timestamp(
        &self,
        timestamp: Option<&str>,
        user: &UserIdentity,
        target: &PageTarget,
    ) -> Option<String>;
}
