//! SQLite-backed tree store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, instrument, warn};

use crate::domain::{InsertionPlan, Language, NameEntry, NameSet, Node, NodeId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::TreeStore;

const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

const NODE_COLUMNS: &str = "id, level, lft, rgt";

/// Ids per `IN (...)` lookup, well under SQLite's bound-parameter limit.
const NAME_LOOKUP_CHUNK: usize = 500;

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: NodeId(row.get(0)?),
        level: row.get(1)?,
        lft: row.get(2)?,
        rgt: row.get(3)?,
    })
}

/// Durable store over one SQLite connection.
///
/// Insertion runs inside an `IMMEDIATE` transaction, so the write lock is
/// taken before the parent is read. A competing writer in another process
/// surfaces as [`StoreError::Busy`] after the busy timeout.
#[derive(Debug)]
pub struct SqliteTreeStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteTreeStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(&path)?;
        let store = Self {
            path: Some(path),
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            path: None,
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn migrate(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA foreign_keys=ON;

            CREATE TABLE IF NOT EXISTS node_tree (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              level INTEGER NOT NULL,
              lft INTEGER NOT NULL,
              rgt INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS node_tree_names (
              node_id INTEGER NOT NULL REFERENCES node_tree(id) ON DELETE CASCADE,
              language TEXT NOT NULL,
              node_name TEXT NOT NULL,
              UNIQUE (node_id, language)
            );

            CREATE INDEX IF NOT EXISTS idx_node_tree_lft ON node_tree(lft);
            CREATE INDEX IF NOT EXISTS idx_node_tree_rgt ON node_tree(rgt);
            "#,
        )?;
        Ok(())
    }
}

impl TreeStore for SqliteTreeStore {
    fn node(&self, id: NodeId) -> StoreResult<Option<Node>> {
        let conn = self.lock()?;
        let node = conn
            .query_row(
                &format!("SELECT {NODE_COLUMNS} FROM node_tree WHERE id = ?1"),
                params![id.0],
                node_from_row,
            )
            .optional()?;
        Ok(node)
    }

    fn nodes(&self) -> StoreResult<Vec<Node>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {NODE_COLUMNS} FROM node_tree ORDER BY lft"))?;
        let nodes = stmt
            .query_map([], node_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    fn nodes_within(&self, lft: i64, rgt: i64) -> StoreResult<Vec<Node>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM node_tree WHERE lft > ?1 AND rgt < ?2 ORDER BY lft"
        ))?;
        let nodes = stmt
            .query_map(params![lft, rgt], node_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    fn names_for(&self, ids: &[NodeId]) -> StoreResult<Vec<NameEntry>> {
        let conn = self.lock()?;
        let mut rows = Vec::new();
        for chunk in ids.chunks(NAME_LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT node_id, language, node_name FROM node_tree_names WHERE node_id IN ({placeholders})"
            ))?;
            let found = stmt.query_map(params_from_iter(chunk.iter().map(|id| id.0)), |row| {
                Ok((
                    NodeId(row.get::<_, i64>(0)?),
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for row in found {
                rows.push(row?);
            }
        }

        Ok(rows
            .into_iter()
            .filter_map(|(node_id, tag, name)| match Language::parse(&tag) {
                Some(language) => Some(NameEntry::new(node_id, language, name)),
                None => {
                    warn!(%node_id, language = %tag, "skipping name in unsupported language");
                    None
                }
            })
            .collect())
    }

    #[instrument(level = "debug", skip(self, names))]
    fn insert_child(&self, parent: NodeId, names: &NameSet) -> StoreResult<Option<Node>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let parent = tx
            .query_row(
                &format!("SELECT {NODE_COLUMNS} FROM node_tree WHERE id = ?1"),
                params![parent.0],
                node_from_row,
            )
            .optional()?;
        let Some(parent) = parent else {
            return Ok(None);
        };

        let plan = InsertionPlan::for_parent(&parent);
        let moved_lft = tx.execute(
            "UPDATE node_tree SET lft = lft + ?2 WHERE lft >= ?1",
            params![plan.shift.from, plan.shift.by],
        )?;
        let moved_rgt = tx.execute(
            "UPDATE node_tree SET rgt = rgt + ?2 WHERE rgt >= ?1",
            params![plan.shift.from, plan.shift.by],
        )?;
        tx.execute(
            "INSERT INTO node_tree (level, lft, rgt) VALUES (?1, ?2, ?3)",
            params![plan.level, plan.lft, plan.rgt],
        )?;
        let node = plan.node(NodeId(tx.last_insert_rowid()));

        for entry in names.entries_for(node.id) {
            tx.execute(
                "INSERT INTO node_tree_names (node_id, language, node_name) VALUES (?1, ?2, ?3)",
                params![node.id.0, entry.language.as_str(), entry.name],
            )?;
        }
        tx.commit()?;

        debug!(id = %node.id, moved_lft, moved_rgt, "inserted child");
        Ok(Some(node))
    }

    fn load(&self, nodes: &[Node], names: &[NameEntry]) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for node in nodes {
            tx.execute(
                "INSERT INTO node_tree (id, level, lft, rgt) VALUES (?1, ?2, ?3, ?4)",
                params![node.id.0, node.level, node.lft, node.rgt],
            )?;
        }
        for entry in names {
            tx.execute(
                "INSERT INTO node_tree_names (node_id, language, node_name) VALUES (?1, ?2, ?3)",
                params![entry.node_id.0, entry.language.as_str(), entry.name],
            )?;
        }
        tx.commit()?;
        debug!(nodes = nodes.len(), names = names.len(), "loaded nodes");
        Ok(())
    }

    fn is_empty(&self) -> StoreResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM node_tree", [], |row| row.get(0))?;
        Ok(count == 0)
    }
}
