//! In-memory tree store.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, instrument};

use crate::domain::{nested_set, InsertionPlan, Language, NameEntry, NameSet, Node, NodeId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::TreeStore;

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<NodeId, Node>,
    names: BTreeMap<(NodeId, Language), String>,
    /// Next id to hand out; only ever grows, so ids are never reused.
    next_id: i64,
}

impl State {
    fn allocate_id(&mut self) -> NodeId {
        self.next_id = self.next_id.max(1);
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn sorted(&self, mut nodes: Vec<Node>) -> Vec<Node> {
        nodes.sort_by_key(|n| n.lft);
        nodes
    }
}

/// Process-local store holding the whole tree behind one `RwLock`.
///
/// Readers share the lock; insertion holds the write lock across reading the
/// parent, shifting and writing, which serializes insertions.
#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    state: RwLock<State>,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl TreeStore for MemoryTreeStore {
    fn node(&self, id: NodeId) -> StoreResult<Option<Node>> {
        Ok(self.read()?.nodes.get(&id).copied())
    }

    fn nodes(&self) -> StoreResult<Vec<Node>> {
        let state = self.read()?;
        Ok(state.sorted(state.nodes.values().copied().collect()))
    }

    fn nodes_within(&self, lft: i64, rgt: i64) -> StoreResult<Vec<Node>> {
        let state = self.read()?;
        let within = state
            .nodes
            .values()
            .filter(|n| lft < n.lft && n.rgt < rgt)
            .copied()
            .collect();
        Ok(state.sorted(within))
    }

    fn names_for(&self, ids: &[NodeId]) -> StoreResult<Vec<NameEntry>> {
        let guard = self.read()?;
        let state = &*guard;
        Ok(ids
            .iter()
            .flat_map(|&id| {
                Language::ALL.into_iter().filter_map(move |language| {
                    state
                        .names
                        .get(&(id, language))
                        .map(|name| NameEntry::new(id, language, name.clone()))
                })
            })
            .collect())
    }

    #[instrument(level = "debug", skip(self, names))]
    fn insert_child(&self, parent: NodeId, names: &NameSet) -> StoreResult<Option<Node>> {
        let mut state = self.write()?;
        let Some(parent) = state.nodes.get(&parent).copied() else {
            return Ok(None);
        };

        let plan = InsertionPlan::for_parent(&parent);
        let moved = plan.apply_shift(state.nodes.values_mut());
        let id = state.allocate_id();
        let node = plan.node(id);
        state.nodes.insert(id, node);
        for entry in names.entries_for(id) {
            state.names.insert((id, entry.language), entry.name);
        }

        debug!(%id, moved, lft = node.lft, "inserted child");
        Ok(Some(node))
    }

    fn load(&self, nodes: &[Node], names: &[NameEntry]) -> StoreResult<()> {
        let mut state = self.write()?;
        if let Some(orphan) = names.iter().find(|entry| {
            !state.nodes.contains_key(&entry.node_id)
                && !nodes.iter().any(|n| n.id == entry.node_id)
        }) {
            return Err(StoreError::Corrupt(format!(
                "name entry for unknown node {}",
                orphan.node_id
            )));
        }

        for node in nodes {
            state.nodes.insert(node.id, *node);
            state.next_id = state.next_id.max(node.id.0 + 1);
        }
        for entry in names {
            state
                .names
                .insert((entry.node_id, entry.language), entry.name.clone());
        }
        debug!(
            consistent = nested_set::validate(&state.nodes.values().copied().collect::<Vec<_>>())
                .is_consistent(),
            "loaded nodes"
        );
        Ok(())
    }

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.nodes.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::infrastructure::store::seed::seed_if_empty;

    fn names(english: &str, italian: &str) -> NameSet {
        let raw: BTreeMap<String, String> = [
            ("English".to_string(), english.to_string()),
            ("Italian".to_string(), italian.to_string()),
        ]
        .into_iter()
        .collect();
        NameSet::validate(&raw, &Language::ALL).unwrap()
    }

    #[test]
    fn given_empty_store_when_seeding_then_loads_once() {
        let store = MemoryTreeStore::new();
        assert!(seed_if_empty(&store).unwrap());
        assert!(!seed_if_empty(&store).unwrap());
        assert_eq!(store.nodes().unwrap().len(), 12);
    }

    #[test]
    fn given_seeded_store_when_inserting_then_id_follows_seed() {
        let store = MemoryTreeStore::new();
        seed_if_empty(&store).unwrap();

        let node = store
            .insert_child(NodeId(5), &names("Test", "Prova"))
            .unwrap()
            .unwrap();

        assert_eq!(node.id, NodeId(13));
        assert_eq!((node.lft, node.rgt, node.level), (24, 25, 2));
        assert_eq!(store.node(NodeId(5)).unwrap().unwrap().rgt, 26);
    }

    #[test]
    fn given_missing_parent_when_inserting_then_nothing_written() {
        let store = MemoryTreeStore::new();
        seed_if_empty(&store).unwrap();
        let before = store.nodes().unwrap();

        let result = store.insert_child(NodeId(999), &names("X", "Y")).unwrap();

        assert!(result.is_none());
        assert_eq!(store.nodes().unwrap(), before);
    }

    #[test]
    fn given_orphan_name_when_loading_then_corrupt() {
        let store = MemoryTreeStore::new();
        let err = store
            .load(&[], &[NameEntry::new(NodeId(1), Language::English, "x")])
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn given_orphan_name_among_valid_nodes_when_loading_then_nothing_written() {
        let store = MemoryTreeStore::new();
        let root = Node {
            id: NodeId(1),
            level: 1,
            lft: 1,
            rgt: 2,
        };

        let err = store
            .load(
                &[root],
                &[
                    NameEntry::new(NodeId(1), Language::English, "Root"),
                    NameEntry::new(NodeId(2), Language::English, "Orphan"),
                ],
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::Corrupt(_)));
        assert!(store.is_empty().unwrap());
        assert!(store.names_for(&[NodeId(1)]).unwrap().is_empty());
    }
}
