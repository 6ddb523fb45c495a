//! Org chart engine: a nested-set tree with per-language node names.
//!
//! Layers, leaves first: [`domain`] (nested-set arithmetic, name
//! resolution), [`infrastructure`] (stores, credentials, wiring),
//! [`application`] (tree engine and query façade), then the [`server`]
//! and [`cli`] surfaces.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod server;
pub mod util;
