use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A block aggregating a batch of mathematical discoveries.
///
/// The hash and merkle root are cosmetic identifiers, not tamper evidence:
/// the chain is never re-validated on the read path, only by the on-demand
/// integrity endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductiveBlock {
    pub id: u64,
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub previous_hash: String,
    pub merkle_root: String,
    pub difficulty: u32,
    pub nonce: u64,
    pub block_hash: String, // Cached hash of the block
    pub miner_id: String,
    pub total_scientific_value: f64,
    pub energy_consumed: f64,
    pub knowledge_created: u32,
}

impl ProductiveBlock {
    /// Create a block and cache its hash. The `id` is assigned by the
    /// ledger on append.
    #[allow(clippy::too_many_arguments)]
    pub fn seal(
        index: u64,
        previous_hash: String,
        merkle_root: String,
        difficulty: u32,
        nonce: u64,
        miner_id: String,
        total_scientific_value: f64,
        energy_consumed: f64,
        knowledge_created: u32,
    ) -> Self {
        let mut block = Self {
            id: 0,
            index,
            timestamp: Utc::now(),
            previous_hash,
            merkle_root,
            difficulty,
            nonce,
            block_hash: String::new(),
            miner_id,
            total_scientific_value,
            energy_consumed,
            knowledge_created,
        };
        block.block_hash = block.compute_hash();
        block
    }

    /// Compute the SHA-256 hash of this block from its identifying fields
    /// (excluding the cached `block_hash` itself).
    pub fn compute_hash(&self) -> String {
        let preimage = format!(
            "{}:{}:{}:{}:{}:{}",
            self.index,
            self.timestamp.timestamp(),
            self.previous_hash,
            self.merkle_root,
            self.nonce,
            self.difficulty
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Merkle root over the signatures of the aggregated discoveries.
/// A flat hash of the concatenation; leaf order is the batch order.
pub fn merkle_root(signatures: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for sig in signatures {
        hasher.update(sig.as_bytes());
        hasher.update(b":");
    }
    hex::encode(hasher.finalize())
}
