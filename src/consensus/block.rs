//! Block header and read-only chain navigation
//!
//! The retargeters never own chain data. They walk backward over a
//! snapshot supplied by the chain manager through the `ChainView` trait,
//! reading heights, times, stored compact targets, and accumulated work.

use crate::consensus::Work;
use crate::crypto::Hash;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Block header containing all metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Protocol version
    pub version: u32,
    /// Hash of the previous block
    pub prev_hash: Hash,
    /// Merkle root of all transactions
    pub merkle_root: Hash,
    /// Block timestamp (seconds since Unix epoch, 32-bit on the wire)
    pub time: i64,
    /// Difficulty target (compact representation)
    pub bits: u32,
    /// Nonce used for PoW
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a new block header
    pub fn new(
        version: u32,
        prev_hash: Hash,
        merkle_root: Hash,
        time: i64,
        bits: u32,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            prev_hash,
            merkle_root,
            time,
            bits,
            nonce,
        }
    }

    /// Serialize the header for hashing
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(80);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.prev_hash.0);
        bytes.extend_from_slice(&self.merkle_root.0);
        bytes.extend_from_slice(&(self.time as u32).to_le_bytes());
        bytes.extend_from_slice(&self.bits.to_le_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    /// Calculate the hash of this header
    pub fn hash(&self) -> Hash {
        crate::crypto::hash_bytes(&self.to_bytes())
    }
}

/// Read-only view of one chain position.
///
/// Traversal is strictly backward from the tip; the view must stay
/// stable for the duration of a consensus call.
pub trait ChainView {
    /// Height of this block, genesis being 0
    fn height(&self) -> u64;
    /// Block timestamp in Unix seconds
    fn time(&self) -> i64;
    /// Compact target this block was mined against
    fn bits(&self) -> u32;
    /// Cumulative work through and including this block
    fn chain_work(&self) -> Work;
    /// Predecessor, absent for genesis
    fn prev(&self) -> Option<&Self>;
}

/// In-memory block index node.
///
/// Built by the chain manager; contents never change after insertion.
#[derive(Debug, Clone)]
pub struct BlockIndex {
    /// Height of this block
    pub height: u64,
    /// Block timestamp in Unix seconds
    pub time: i64,
    /// Compact target this block was mined against
    pub bits: u32,
    /// Cumulative work through and including this block
    pub chain_work: Work,
    /// Predecessor node, absent for genesis
    pub prev: Option<Arc<BlockIndex>>,
}

impl BlockIndex {
    /// Create a new index node on top of an optional predecessor
    pub fn new(
        height: u64,
        time: i64,
        bits: u32,
        chain_work: Work,
        prev: Option<Arc<BlockIndex>>,
    ) -> Self {
        Self {
            height,
            time,
            bits,
            chain_work,
            prev,
        }
    }
}

impl ChainView for BlockIndex {
    fn height(&self) -> u64 {
        self.height
    }

    fn time(&self) -> i64 {
        self.time
    }

    fn bits(&self) -> u32 {
        self.bits
    }

    fn chain_work(&self) -> Work {
        self.chain_work
    }

    fn prev(&self) -> Option<&Self> {
        self.prev.as_deref()
    }
}
