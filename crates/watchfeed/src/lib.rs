//! ## Crate layout
//! - `core`: options, query compilation, collaborator ports and the service.
//! - `config`: TOML service configuration.
//! - `error`: stable public error taxonomy.
//!
//! [`WatchFeed`] wraps the core service and reports failures as
//! [`Error`].

pub use watchfeed_config as config;
pub use watchfeed_core as core;

pub mod error;


pub use error::{Error, ErrorKind, ErrorOrigin};

use crate::core::{
    model::{UserIdentity, WatchedItem},
    query::{ChangeFeedRequest, ChangePage, WatchlistExtension, WatchlistRequest},
    service::{Collaborators, WatchedItemQueryService},
    value::Value,
};
use std::{path::Path, sync::Arc};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// WatchFeed
///
/// Public handle over [`WatchedItemQueryService`].
///

#[derive(Clone)]
pub struct WatchFeed {
    service: WatchedItemQueryService,
}

impl WatchFeed {
    #[must_use]
    pub fn new(collaborators: Collaborators, config: &config::ServiceConfig) -> Self {
        Self {
            service: WatchedItemQueryService::new(collaborators, config.query.clone()),
        }
    }

    /// Build from a TOML configuration file.
    pub fn from_config_file(
        collaborators: Collaborators,
        path: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        let config = config::ServiceConfig::from_file(path)?;

        Ok(Self::new(collaborators, &config))
    }

    #[must_use]
    pub fn with_extension(mut self, extension: Arc<dyn WatchlistExtension>) -> Self {
        self.service = self.service.with_extension(extension);
        self
    }

    #[must_use]
    pub const fn service(&self) -> &WatchedItemQueryService {
        &self.service
    }

    pub fn list_changes_for_watched_pages(
        &self,
        acting_user: &UserIdentity,
        request: &ChangeFeedRequest,
        cursor: Option<&[Value]>,
    ) -> Result<ChangePage, Error> {
        Ok(self
            .service
            .list_changes_for_watched_pages(acting_user, request, cursor)?)
    }

    pub fn list_watched_pages(
        &self,
        acting_user: &UserIdentity,
        request: &WatchlistRequest,
    ) -> Result<Vec<WatchedItem>, Error> {
        Ok(self.service.list_watched_pages(acting_user, request)?)
    }
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Error, WatchFeed, core::prelude::*};
}
