//! Database persistence layer using Sled
//!
//! Snapshots the chef and the simulated chain so a node restart resumes the
//! same reward period, and keeps the settlement receipts in their own tree
//! keyed by sequence number.

use crate::chain::SimChain;
use crate::node::Chef;
use crate::settlement::ClaimReceipt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Db, Tree};
use std::io::{Error, ErrorKind};
use std::path::Path;

/// Database wrapper
#[derive(Debug, Clone)]
pub struct ChefDB {
    db: Db,
    state_tree: Tree,
    receipts_tree: Tree,
}

const CHEF_KEY: &str = "chef";
const CHAIN_KEY: &str = "chain";

fn encode<T: Serialize>(value: &T) -> std::io::Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> std::io::Result<T> {
    bincode::deserialize(bytes).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}

impl ChefDB {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Self::from_db(sled::open(path)?)
    }

    /// In-memory database removed on drop
    pub fn temporary() -> std::io::Result<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> std::io::Result<Self> {
        let state_tree = db.open_tree("state")?;
        let receipts_tree = db.open_tree("receipts")?;
        Ok(Self {
            db,
            state_tree,
            receipts_tree,
        })
    }

    /// Save the chef and the chain together, then append new receipts
    pub fn save_snapshot(&self, chef: &Chef, chain: &SimChain) -> std::io::Result<()> {
        self.state_tree.insert(CHEF_KEY, encode(chef)?)?;
        self.state_tree.insert(CHAIN_KEY, encode(chain)?)?;
        self.sync_receipts(chef.receipts())?;
        self.db.flush()?;
        Ok(())
    }

    /// Load the last snapshot, if any
    pub fn load_snapshot(&self) -> std::io::Result<Option<(Chef, SimChain)>> {
        let chef_bytes = self.state_tree.get(CHEF_KEY)?;
        let chain_bytes = self.state_tree.get(CHAIN_KEY)?;

        match (chef_bytes, chain_bytes) {
            (Some(chef), Some(chain)) => Ok(Some((decode(&chef)?, decode(&chain)?))),
            (None, None) => Ok(None),
            _ => Err(Error::new(ErrorKind::InvalidData, "incomplete snapshot")),
        }
    }

    /// Store a single receipt under its sequence number
    pub fn append_receipt(&self, receipt: &ClaimReceipt) -> std::io::Result<()> {
        self.receipts_tree
            .insert(receipt.sequence.to_be_bytes(), encode(receipt)?)?;
        Ok(())
    }

    /// Store every receipt not yet in the tree
    pub fn sync_receipts(&self, receipts: &[ClaimReceipt]) -> std::io::Result<()> {
        let stored = self.receipts_tree.len();
        for receipt in receipts.iter().skip(stored) {
            self.append_receipt(receipt)?;
        }
        Ok(())
    }

    /// Load all receipts in sequence order
    pub fn load_receipts(&self) -> std::io::Result<Vec<ClaimReceipt>> {
        let mut receipts = Vec::with_capacity(self.receipts_tree.len());
        for item in self.receipts_tree.iter() {
            let (_, value) = item?;
            receipts.push(decode(&value)?);
        }
        Ok(receipts)
    }
}

/// Destination of the snapshot written after every committed mutation
pub trait SnapshotStore: Send + Sync {
    fn save_snapshot(&self, chef: &Chef, chain: &SimChain) -> std::io::Result<()>;
}

impl SnapshotStore for ChefDB {
    fn save_snapshot(&self, chef: &Chef, chain: &SimChain) -> std::io::Result<()> {
        ChefDB::save_snapshot(self, chef, chain)
    }
}
