//! Reference org chart loaded into an empty store.

use tracing::info;

use crate::domain::{Language, NameEntry, Node, NodeId};
use crate::infrastructure::error::StoreResult;
use crate::infrastructure::traits::TreeStore;

/// `(id, level, lft, rgt)`
const NODES: [(i64, i64, i64, i64); 12] = [
    (1, 2, 2, 3),
    (2, 2, 4, 5),
    (3, 2, 6, 7),
    (4, 2, 8, 9),
    (5, 1, 1, 24),
    (6, 2, 10, 11),
    (7, 2, 12, 19),
    (8, 3, 15, 16),
    (9, 3, 17, 18),
    (10, 2, 20, 21),
    (11, 3, 13, 14),
    (12, 2, 22, 23),
];

/// `(node id, English, Italian)`
const NAMES: [(i64, &str, &str); 12] = [
    (1, "Marketing", "Marketing"),
    (2, "Helpdesk", "Supporto tecnico"),
    (3, "Managers", "Managers"),
    (4, "Customer Account", "Assistenza Cliente"),
    (5, "Company", "Azienda"),
    (6, "Accounting", "Amministrazione"),
    (7, "Sales", "Supporto Vendite"),
    (8, "Italy", "Italia"),
    (9, "Europe", "Europa"),
    (10, "Developers", "Sviluppatori"),
    (11, "North America", "Nord America"),
    (12, "Quality Assurance", "Controllo Qualità"),
];

pub fn seed_nodes() -> Vec<Node> {
    NODES
        .iter()
        .map(|&(id, level, lft, rgt)| Node {
            id: NodeId(id),
            level,
            lft,
            rgt,
        })
        .collect()
}

pub fn seed_names() -> Vec<NameEntry> {
    NAMES
        .iter()
        .flat_map(|&(id, english, italian)| {
            [
                NameEntry::new(NodeId(id), Language::English, english),
                NameEntry::new(NodeId(id), Language::Italian, italian),
            ]
        })
        .collect()
}

/// Load the reference chart if the store holds no nodes yet.
///
/// Returns true if data was loaded.
pub fn seed_if_empty(store: &dyn TreeStore) -> StoreResult<bool> {
    if !store.is_empty()? {
        return Ok(false);
    }
    store.load(&seed_nodes(), &seed_names())?;
    info!(nodes = NODES.len(), "seeded empty store with reference org chart");
    Ok(true)
}
