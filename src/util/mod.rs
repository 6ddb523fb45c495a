//! Utilities shared by tests

pub mod testing;
