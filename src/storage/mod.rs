//! Storage module - Chef snapshot persistence

pub mod db;

pub use db::{ChefDB, SnapshotStore};
