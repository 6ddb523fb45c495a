use std::collections::BTreeMap;
use std::env;
use std::sync::{Arc, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::services::{QueryService, TreeService};
use crate::config::Settings;
use crate::infrastructure::auth::{password_digest, TokenCredentialService};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::store::{seed_if_empty, MemoryTreeStore};
use crate::infrastructure::traits::TreeStore;

static TEST_SETUP: Once = Once::new();

pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "secret";

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// In-memory store loaded with the reference org chart.
pub fn seeded_memory_store() -> Arc<dyn TreeStore> {
    let store = MemoryTreeStore::new();
    if let Err(e) = seed_if_empty(&store) {
        panic!("seeding memory store failed: {e}");
    }
    Arc::new(store)
}

pub fn tree_service(store: Arc<dyn TreeStore>) -> TreeService {
    let settings = Settings::default();
    TreeService::new(store, settings.languages, settings.store)
}

pub fn query_service(store: Arc<dyn TreeStore>) -> QueryService {
    QueryService::new(Arc::new(tree_service(store)), Settings::default().paging)
}

/// Default settings plus one user, [`TEST_USER`] / [`TEST_PASSWORD`].
pub fn settings_with_user() -> Settings {
    Settings {
        users: vec![crate::config::UserConfig {
            id: 1,
            username: TEST_USER.to_string(),
            email: "admin@example.com".to_string(),
            password_sha256: password_digest(TEST_PASSWORD),
        }],
        ..Settings::default()
    }
}

/// Container over `store` with the test user configured.
pub fn container(store: Arc<dyn TreeStore>) -> ServiceContainer {
    let settings = settings_with_user();
    let credentials = Arc::new(TokenCredentialService::new(settings.users.clone()));
    ServiceContainer::with_deps(settings, store, credentials)
}

/// `{"English": english, "Italian": italian}`
pub fn both_names(english: &str, italian: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("English".to_string(), english.to_string()),
        ("Italian".to_string(), italian.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }
}
