//! Storage and credential boundary traits
//!
//! These traits abstract the durable store and the external credential
//! service, allowing services to be tested against in-memory implementations.

use chrono::{DateTime, Utc};

use crate::domain::{NameEntry, NameSet, Node, NodeId};
use crate::infrastructure::error::{AuthError, StoreResult};

/// Tree Store + Name Catalog.
///
/// Reads may run concurrently. [`TreeStore::insert_child`] is the only
/// mutation and must be serializable: the parent's `rgt` is read, the
/// boundary shift applied and the node and its names written as one
/// all-or-nothing unit.
pub trait TreeStore: Send + Sync {
    /// Point lookup.
    fn node(&self, id: NodeId) -> StoreResult<Option<Node>>;

    /// Every node, ordered by `lft` ascending (pre-order).
    fn nodes(&self) -> StoreResult<Vec<Node>>;

    /// Nodes whose interval lies strictly inside `(lft, rgt)`, ordered by `lft`.
    fn nodes_within(&self, lft: i64, rgt: i64) -> StoreResult<Vec<Node>>;

    /// Name entries for the given nodes, in no particular order.
    fn names_for(&self, ids: &[NodeId]) -> StoreResult<Vec<NameEntry>>;

    /// Append a leaf as the last child of `parent`.
    ///
    /// Returns `Ok(None)` if the parent does not exist; nothing is written then.
    fn insert_child(&self, parent: NodeId, names: &NameSet) -> StoreResult<Option<Node>>;

    /// Bulk-load nodes with explicit ids and their names (seeding).
    fn load(&self, nodes: &[Node], names: &[NameEntry]) -> StoreResult<()>;

    fn is_empty(&self) -> StoreResult<bool>;
}

/// Authenticated caller, as identified by the credential service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub username: String,
}

/// Issued bearer token and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user_id,
            username: self.username.clone(),
        }
    }
}

/// External credential service.
///
/// Given a credential it returns an opaque bearer token; given a valid token
/// it identifies the caller.
pub trait CredentialService: Send + Sync {
    /// Exchange username and password for a token (get-or-create).
    fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    /// Resolve a token to its caller.
    fn identify(&self, token: &str) -> Option<Caller>;

    /// Revoke a token. Returns false if it was not known.
    fn logout(&self, token: &str) -> bool;
}
