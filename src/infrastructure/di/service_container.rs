//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::info;

use crate::application::services::{QueryService, TreeService};
use crate::config::Settings;
use crate::infrastructure::auth::TokenCredentialService;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::store::{seed_if_empty, MemoryTreeStore, SqliteTreeStore};
use crate::infrastructure::traits::{CredentialService, TreeStore};

/// Container holding all application services.
#[derive(Clone)]
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Tree store + name catalog
    pub store: Arc<dyn TreeStore>,

    /// Credential service issuing bearer tokens
    pub credentials: Arc<dyn CredentialService>,

    pub tree: Arc<TreeService>,
    pub query: Arc<QueryService>,
}

impl ServiceContainer {
    /// Create a container with the store named by `settings.database`
    /// (in-memory when unset), seeded if configured.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let store: Arc<dyn TreeStore> = match &settings.database {
            Some(path) => {
                info!(path = %path.display(), "opening sqlite store");
                Arc::new(
                    SqliteTreeStore::open(path)
                        .map_err(|e| InfraError::store(format!("open {}", path.display()), e))?,
                )
            }
            None => {
                info!("using in-memory store");
                Arc::new(MemoryTreeStore::new())
            }
        };
        if settings.seed {
            seed_if_empty(store.as_ref()).map_err(|e| InfraError::store("seed store", e))?;
        }

        let credentials = Arc::new(TokenCredentialService::new(settings.users.clone()));
        Ok(Self::with_deps(settings, store, credentials))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn TreeStore>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        let settings = Arc::new(settings);
        let tree = Arc::new(TreeService::new(
            store.clone(),
            settings.languages.clone(),
            settings.store,
        ));
        let query = Arc::new(QueryService::new(tree.clone(), settings.paging));

        Self {
            settings,
            store,
            credentials,
            tree,
            query,
        }
    }
}
