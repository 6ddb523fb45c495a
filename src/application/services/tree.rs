//! Tree engine service
//!
//! Insertion, lookup, enumeration and name resolution over a [`TreeStore`].
//! Structure is never cached: every read goes to the store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::application::error_ext::StoreResultExt;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{LanguageSettings, StoreSettings};
use crate::domain::{
    names, nested_set, ConsistencyReport, NameEntry, NameSet, Node, NodeData, NodeId, NodeView,
    OrgForest,
};
use crate::infrastructure::traits::TreeStore;

const RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// Service implementing the nested-set tree engine.
pub struct TreeService {
    store: Arc<dyn TreeStore>,
    languages: LanguageSettings,
    insert_retries: u32,
}

impl TreeService {
    pub fn new(store: Arc<dyn TreeStore>, languages: LanguageSettings, settings: StoreSettings) -> Self {
        Self {
            store,
            languages,
            insert_retries: settings.insert_retries,
        }
    }

    pub fn languages(&self) -> &LanguageSettings {
        &self.languages
    }

    /// Append a leaf under `parent_id` with one name per supplied language.
    ///
    /// The name map is validated before the store is touched. Contention in
    /// the store is retried, then reported as [`ApplicationError::Conflict`].
    #[instrument(level = "debug", skip(self, names), fields(parent = %parent_id))]
    pub fn insert_child(
        &self,
        parent_id: NodeId,
        names: &BTreeMap<String, String>,
    ) -> ApplicationResult<Node> {
        let names = NameSet::validate(names, &self.languages.required)?;

        let attempts = self.insert_retries + 1;
        for attempt in 1..=attempts {
            match self.store.insert_child(parent_id, &names) {
                Ok(Some(node)) => {
                    info!(id = %node.id, lft = node.lft, rgt = node.rgt, "node created");
                    return Ok(node);
                }
                Ok(None) => return Err(ApplicationError::NotFound(parent_id)),
                Err(e) if e.is_retryable() => {
                    warn!(attempt, attempts, "insertion contended, retrying");
                    if attempt < attempts {
                        thread::sleep(RETRY_BACKOFF * attempt);
                    }
                }
                Err(e) => {
                    return Err(e).with_store_context(format_args!("insert under {parent_id}"))
                }
            }
        }
        Err(ApplicationError::Conflict { attempts })
    }

    pub fn get_by_id(&self, id: NodeId) -> ApplicationResult<Node> {
        self.store
            .node(id)
            .with_store_context(format_args!("read node {id}"))?
            .ok_or(ApplicationError::NotFound(id))
    }

    /// Every node in pre-order.
    pub fn list_all(&self) -> ApplicationResult<Vec<Node>> {
        self.store.nodes().with_store_context("list nodes")
    }

    /// Direct children of `parent` in `lft` order.
    pub fn get_children(&self, parent: &Node) -> ApplicationResult<Vec<Node>> {
        let within = self.within(parent)?;
        Ok(nested_set::children(parent, &within))
    }

    /// All descendants of `ancestor` in `lft` order.
    pub fn get_descendants(&self, ancestor: &Node) -> ApplicationResult<Vec<Node>> {
        let within = self.within(ancestor)?;
        Ok(nested_set::descendants(ancestor, &within))
    }

    fn within(&self, node: &Node) -> ApplicationResult<Vec<Node>> {
        self.store
            .nodes_within(node.lft, node.rgt)
            .with_store_context(format_args!("read subtree of {}", node.id))
    }

    /// Display name of `node` in `requested`, falling back to the configured
    /// fallback language and then to a placeholder. Never fails.
    pub fn resolve_name(&self, node: &Node, requested: &str) -> String {
        let entries = match self.store.names_for(&[node.id]) {
            Ok(entries) => entries,
            Err(e) => {
                error!(id = %node.id, error = %e, "name lookup failed, using placeholder");
                Vec::new()
            }
        };
        names::resolve(node.id, &entries, requested, self.languages.fallback)
    }

    /// Render `nodes` in `requested`, with one name lookup for the whole batch.
    pub fn render(&self, nodes: &[Node], requested: &str) -> ApplicationResult<Vec<NodeView>> {
        let by_node = self.names_by_node(nodes)?;
        Ok(nodes
            .iter()
            .map(|node| {
                let entries = by_node.get(&node.id).map(Vec::as_slice).unwrap_or(&[]);
                NodeView::new(
                    node,
                    names::resolve(node.id, entries, requested, self.languages.fallback),
                )
            })
            .collect())
    }

    fn names_by_node(&self, nodes: &[Node]) -> ApplicationResult<HashMap<NodeId, Vec<NameEntry>>> {
        let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
        let entries = self.store.names_for(&ids).with_store_context("read names")?;
        let mut by_node: HashMap<NodeId, Vec<NameEntry>> = HashMap::new();
        for entry in entries {
            by_node.entry(entry.node_id).or_default().push(entry);
        }
        Ok(by_node)
    }

    /// Children of `parent_id` whose name in exactly `requested` contains
    /// `keyword`, ignoring case. Children without a name in `requested` are
    /// left out.
    #[instrument(level = "debug", skip(self), fields(parent = %parent_id))]
    pub fn search_children(
        &self,
        parent_id: NodeId,
        requested: &str,
        keyword: &str,
    ) -> ApplicationResult<Vec<Node>> {
        let parent = self.get_by_id(parent_id)?;
        let children = self.get_children(&parent)?;
        let by_node = self.names_by_node(&children)?;

        let matches: Vec<Node> = children
            .into_iter()
            .filter(|child| {
                by_node
                    .get(&child.id)
                    .and_then(|entries| names::exact(entries, requested))
                    .is_some_and(|name| names::matches_keyword(name, keyword))
            })
            .collect();
        debug!(matches = matches.len(), "searched children");
        Ok(matches)
    }

    /// Validate every nested-set invariant over the whole store.
    pub fn check_consistency(&self) -> ApplicationResult<ConsistencyReport> {
        let nodes = self.list_all()?;
        let report = nested_set::validate(&nodes);
        for violation in &report.violations {
            warn!(%violation, "nested-set invariant violated");
        }
        Ok(report)
    }

    /// Materialize the whole tree with names resolved in `requested`.
    pub fn forest(&self, requested: &str) -> ApplicationResult<OrgForest> {
        let nodes = self.list_all()?;
        let views = self.render(&nodes, requested)?;
        let data = nodes
            .into_iter()
            .zip(views)
            .map(|(node, view)| NodeData {
                node,
                name: view.name,
            })
            .collect();
        Ok(OrgForest::from_preorder(data)?)
    }
}
