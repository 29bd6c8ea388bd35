//! Permission gate: owner-token verification and permission-driven
//! adjustments to the compiled feed.


use crate::{
    model::UserIdentity,
    ports::{PermissionChecker, Right, UserPreferences},
    query::{ChangeFeedOptions, ChangeFilter, WatchlistScope},
};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

///
/// AuthorizationError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum AuthorizationError {
    #[error("Incorrect watchlist token provided")]
    IncorrectWatchlistToken { owner: u64 },
}

///
/// VisibilityTier
///
/// How much deleted content the acting user may see.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum VisibilityTier {
    /// No access to deleted history.
    Base,

    /// Deleted history, but nothing suppressed.
    ViewDeleted,

    /// Everything.
    ViewSuppressed,
}

impl VisibilityTier {
    /// Revision deletion bits hiding the author (`DELETED_USER`, plus
    /// `DELETED_RESTRICTED` below full visibility).
    #[must_use]
    pub const fn author_mask(self) -> Option<u32> {
        match self {
            Self::Base => Some(DELETED_USER),
            Self::ViewDeleted => Some(DELETED_USER | DELETED_RESTRICTED),
            Self::ViewSuppressed => None,
        }
    }

    /// Log deletion bits hiding the action.
    #[must_use]
    pub const fn log_action_mask(self) -> Option<u32> {
        match self {
            Self::Base => Some(DELETED_ACTION),
            Self::ViewDeleted => Some(DELETED_ACTION | DELETED_RESTRICTED),
            Self::ViewSuppressed => None,
        }
    }
}

pub const DELETED_ACTION: u32 = 1;
pub const DELETED_USER: u32 = 4;
pub const DELETED_RESTRICTED: u32 = 8;

///
/// PermissionDecision
///
/// Everything the compiler needs from the gate: whose watchlist is read,
/// which deleted content stays hidden and which filters survive.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PermissionDecision {
    pub owner_id: u64,
    pub tier: VisibilityTier,
    pub filters: BTreeSet<ChangeFilter>,
}

///
/// PermissionGate
///

pub struct PermissionGate<'a> {
    checker: &'a dyn PermissionChecker,
    preferences: &'a dyn UserPreferences,
}

impl<'a> PermissionGate<'a> {
    #[must_use]
    pub const fn new(
        checker: &'a dyn PermissionChecker,
        preferences: &'a dyn UserPreferences,
    ) -> Self {
        Self {
            checker,
            preferences,
        }
    }

    pub fn decide(
        &self,
        acting_user: &UserIdentity,
        options: &ChangeFeedOptions,
    ) -> Result<PermissionDecision, AuthorizationError> {
        let owner_id = self.verify_scope(&options.scope)?;

        Ok(PermissionDecision {
            owner_id,
            tier: self.visibility_tier(acting_user),
            filters: self.honored_filters(acting_user, &options.filters),
        })
    }

    /// Resolve the watchlist owner, checking the token of a claimed list.
    pub fn verify_scope(&self, scope: &WatchlistScope) -> Result<u64, AuthorizationError> {
        match scope {
            WatchlistScope::Own(user) => Ok(user.id),
            WatchlistScope::Claimed { owner, token } => {
                let stored = self.preferences.watchlist_token(owner).unwrap_or_default();

                if stored.is_empty() || !tokens_match(&stored, token) {
                    warn!(owner = owner.id, "rejected watchlist token");

                    return Err(AuthorizationError::IncorrectWatchlistToken { owner: owner.id });
                }

                Ok(owner.id)
            }
        }
    }

    #[must_use]
    pub fn visibility_tier(&self, user: &UserIdentity) -> VisibilityTier {
        if !self.checker.is_allowed(user, Right::DeletedHistory) {
            VisibilityTier::Base
        } else if !self
            .checker
            .is_allowed_any(user, &[Right::SuppressRevision, Right::ViewSuppressed])
        {
            VisibilityTier::ViewDeleted
        } else {
            VisibilityTier::ViewSuppressed
        }
    }

    /// Requested filters minus patrol filters the user cannot act on.
    fn honored_filters(
        &self,
        user: &UserIdentity,
        requested: &BTreeSet<ChangeFilter>,
    ) -> BTreeSet<ChangeFilter> {
        let can_patrol = self.checker.uses_rc_patrol(user) || self.checker.uses_np_patrol(user);

        requested
            .iter()
            .copied()
            .filter(|filter| {
                let keep = can_patrol || !filter.is_patrol();
                if !keep {
                    debug!(filter = filter.tag(), "dropping patrol filter without patrol rights");
                }
                keep
            })
            .collect()
    }
}

// Compares fixed-length digests, never the raw tokens.
fn tokens_match(expected: &str, provided: &str) -> bool {
    Sha256::digest(expected.as_bytes()) == Sha256::digest(provided.as_bytes())
}
