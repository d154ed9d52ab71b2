use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CHAIN_SEED_HASH, METRICS_HISTORY_LIMIT, ProductiveBlock};
use crate::engine::compute::{VerificationData, WorkResult, WorkType};

/// An immutable mathematical discovery produced by a completed mining
/// operation. `scientificValue` is a derived number from the valuation
/// engine; the signature is a cosmetic short hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathematicalWork {
    pub id: u64,
    pub work_type: WorkType,
    pub difficulty: u32,
    pub result: WorkResult,
    pub verification_data: VerificationData,
    pub computational_cost: f64,
    pub energy_efficiency: f64,
    pub scientific_value: f64,
    pub timestamp: DateTime<Utc>,
    pub worker_id: String,
    pub signature: String,
}

/// Junction row linking a block to one of the discoveries it aggregated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockWorkLink {
    pub block_id: u64,
    pub work_id: u64,
}

/// Institutional validator with a reputation mutated by simulated
/// validation outcomes. No stake, no slashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub id: String,
    pub name: String,
    pub reputation: f64,
    pub validations_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRecord {
    pub id: u64,
    pub work_id: u64,
    pub validator_id: String,
    pub outcome: ValidationOutcome,
    pub timestamp: DateTime<Utc>,
}

/// Periodically recomputed network snapshot. Derived and replaceable,
/// never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub active_miners: usize,
    pub blocks_per_hour: f64,
    pub energy_efficiency: f64,
    pub scientific_value_generated: f64,
    pub average_block_time: f64,
    pub network_hashrate: f64,
    pub total_knowledge_created: usize,
}

/// Result of an on-demand chain walk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub valid: bool,
    pub checked_blocks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_at_index: Option<u64>,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("non-monotonic block index: expected {expected}, got {got}")]
    NonMonotonicIndex { expected: u64, got: u64 },
    #[error("duplicate block hash {0}")]
    DuplicateBlockHash(String),
}

/// In-memory store for every persisted-shaped record in the platform.
/// Single-process, no durability; the only invariants enforced are block
/// index monotonicity and blockHash uniqueness.
#[derive(Debug)]
pub struct Ledger {
    blocks: Vec<ProductiveBlock>,
    discoveries: Vec<MathematicalWork>,
    block_work: Vec<BlockWorkLink>,
    validators: Vec<Validator>,
    validations: Vec<ValidationRecord>,
    metrics: Vec<NetworkMetrics>,
    next_work_id: u64,
    next_block_id: u64,
    next_validation_id: u64,
    next_metrics_id: u64,
}

/// Seed validator set (institution slugs are the public ids).
const SEED_VALIDATORS: [(&str, &str); 4] = [
    ("clay-institute", "Clay Mathematics Institute"),
    ("ias-princeton", "Institute for Advanced Study"),
    ("mit-csail", "MIT CSAIL"),
    ("cambridge-dpmms", "Cambridge DPMMS"),
];

impl Ledger {
    pub fn new() -> Self {
        let mut ledger = Self {
            blocks: Vec::new(),
            discoveries: Vec::new(),
            block_work: Vec::new(),
            validators: Vec::new(),
            validations: Vec::new(),
            metrics: Vec::new(),
            next_work_id: 1,
            next_block_id: 1,
            next_validation_id: 1,
            next_metrics_id: 1,
        };
        ledger.seed_validators();
        ledger
    }

    fn seed_validators(&mut self) {
        for (id, name) in SEED_VALIDATORS {
            self.validators.push(Validator {
                id: id.to_string(),
                name: name.to_string(),
                reputation: 80.0,
                validations_count: 0,
            });
        }
    }

    /// Drop every record and counter, then re-seed the validator set.
    pub fn reset(&mut self) {
        *self = Ledger::new();
    }

    /* ---------- Discoveries ---------- */

    /// Append a discovery, assigning its id. Returns a clone of the
    /// stored record.
    pub fn append_discovery(&mut self, mut work: MathematicalWork) -> MathematicalWork {
        work.id = self.next_work_id;
        self.next_work_id += 1;
        self.discoveries.push(work);
        self.discoveries.last().expect("just pushed").clone()
    }

    pub fn discovery(&self, id: u64) -> Option<&MathematicalWork> {
        self.discoveries.iter().find(|w| w.id == id)
    }

    /// Newest-first page, optionally filtered by work type.
    pub fn discoveries_page(
        &self,
        limit: usize,
        offset: usize,
        work_type: Option<WorkType>,
    ) -> Vec<MathematicalWork> {
        self.discoveries
            .iter()
            .rev()
            .filter(|w| work_type.is_none_or(|t| w.work_type == t))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn discoveries(&self) -> &[MathematicalWork] {
        &self.discoveries
    }

    /// Discoveries not yet linked to any block, oldest first.
    pub fn unlinked_discoveries(&self) -> Vec<&MathematicalWork> {
        self.discoveries
            .iter()
            .filter(|w| !self.block_work.iter().any(|l| l.work_id == w.id))
            .collect()
    }

    /* ---------- Blocks ---------- */

    /// Append a sealed block, enforcing index monotonicity and blockHash
    /// uniqueness. Assigns the id and records the junction rows.
    pub fn append_block(
        &mut self,
        mut block: ProductiveBlock,
        work_ids: &[u64],
    ) -> Result<ProductiveBlock, LedgerError> {
        let expected = self.next_block_index();
        if block.index != expected {
            return Err(LedgerError::NonMonotonicIndex {
                expected,
                got: block.index,
            });
        }
        if self.blocks.iter().any(|b| b.block_hash == block.block_hash) {
            return Err(LedgerError::DuplicateBlockHash(block.block_hash));
        }

        block.id = self.next_block_id;
        self.next_block_id += 1;
        for &work_id in work_ids {
            self.block_work.push(BlockWorkLink {
                block_id: block.id,
                work_id,
            });
        }
        self.blocks.push(block);
        Ok(self.blocks.last().expect("just pushed").clone())
    }

    pub fn next_block_index(&self) -> u64 {
        self.blocks.last().map(|b| b.index + 1).unwrap_or(0)
    }

    pub fn latest_block_hash(&self) -> String {
        self.blocks
            .last()
            .map(|b| b.block_hash.clone())
            .unwrap_or_else(|| CHAIN_SEED_HASH.to_string())
    }

    pub fn block(&self, id: u64) -> Option<&ProductiveBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Newest-first page of blocks.
    pub fn blocks_page(&self, limit: usize, offset: usize) -> Vec<ProductiveBlock> {
        self.blocks
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn blocks(&self) -> &[ProductiveBlock] {
        &self.blocks
    }

    /// Discoveries aggregated by a block; None when the block is unknown.
    pub fn work_for_block(&self, block_id: u64) -> Option<Vec<MathematicalWork>> {
        self.block(block_id)?;
        Some(
            self.block_work
                .iter()
                .filter(|l| l.block_id == block_id)
                .filter_map(|l| self.discovery(l.work_id))
                .cloned()
                .collect(),
        )
    }

    /// Walk the whole chain: linkage, index continuity and recomputed
    /// hashes. Only the integrity endpoint calls this.
    pub fn integrity_check(&self) -> IntegrityReport {
        let mut previous_hash = CHAIN_SEED_HASH.to_string();
        for (i, block) in self.blocks.iter().enumerate() {
            let intact = block.index == i as u64
                && block.previous_hash == previous_hash
                && block.block_hash == block.compute_hash();
            if !intact {
                return IntegrityReport {
                    valid: false,
                    checked_blocks: i + 1,
                    broken_at_index: Some(block.index),
                };
            }
            previous_hash = block.block_hash.clone();
        }
        IntegrityReport {
            valid: true,
            checked_blocks: self.blocks.len(),
            broken_at_index: None,
        }
    }

    /* ---------- Validators & validations ---------- */

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn validator(&self, id: &str) -> Option<&Validator> {
        self.validators.iter().find(|v| v.id == id)
    }

    /// Record a validation outcome and mutate the validator's reputation
    /// (+0.5 approved, -1.0 rejected, clamped to [0, 100]).
    pub fn record_validation(
        &mut self,
        work_id: u64,
        validator_id: &str,
        outcome: ValidationOutcome,
    ) -> Option<ValidationRecord> {
        let validator = self.validators.iter_mut().find(|v| v.id == validator_id)?;
        validator.validations_count += 1;
        validator.reputation = match outcome {
            ValidationOutcome::Approved => (validator.reputation + 0.5).min(100.0),
            ValidationOutcome::Rejected => (validator.reputation - 1.0).max(0.0),
        };

        let record = ValidationRecord {
            id: self.next_validation_id,
            work_id,
            validator_id: validator_id.to_string(),
            outcome,
            timestamp: Utc::now(),
        };
        self.next_validation_id += 1;
        self.validations.push(record.clone());
        Some(record)
    }

    pub fn validations_page(&self, limit: usize, offset: usize) -> Vec<ValidationRecord> {
        self.validations
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn validations_len(&self) -> usize {
        self.validations.len()
    }

    /* ---------- Metrics ---------- */

    /// Store a snapshot, assigning its id. History is capped.
    pub fn push_metrics(&mut self, mut snapshot: NetworkMetrics) -> NetworkMetrics {
        snapshot.id = self.next_metrics_id;
        self.next_metrics_id += 1;
        self.metrics.push(snapshot);
        if self.metrics.len() > METRICS_HISTORY_LIMIT {
            let excess = self.metrics.len() - METRICS_HISTORY_LIMIT;
            self.metrics.drain(..excess);
        }
        self.metrics.last().expect("just pushed").clone()
    }

    pub fn latest_metrics(&self) -> Option<&NetworkMetrics> {
        self.metrics.last()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::block::merkle_root;
    use crate::engine::compute::{VerificationData, WorkResult, WorkType};

    fn sample_work(work_type: WorkType, scientific_value: f64) -> MathematicalWork {
        MathematicalWork {
            id: 0,
            work_type,
            difficulty: 50,
            result: WorkResult::GoldbachVerification {
                test_range: 100_000,
                verifications_count: 16,
                largest_verified: 103_000,
                average_pairs: 72.0,
            },
            verification_data: VerificationData {
                theorem: "goldbach_conjecture".to_string(),
                method: "exhaustive_search".to_string(),
                verified: true,
                verification_hash: "abc123".to_string(),
            },
            computational_cost: 12.0,
            energy_efficiency: 50.0,
            scientific_value,
            timestamp: Utc::now(),
            worker_id: "m1".to_string(),
            signature: "deadbe".to_string(),
        }
    }

    fn sample_block(ledger: &Ledger, nonce: u64) -> ProductiveBlock {
        ProductiveBlock::seal(
            ledger.next_block_index(),
            ledger.latest_block_hash(),
            merkle_root(&["deadbe"]),
            50,
            nonce,
            "m1".to_string(),
            1200.0,
            0.1,
            1,
        )
    }

    #[test]
    fn discovery_ids_are_assigned_monotonically() {
        let mut ledger = Ledger::new();
        let a = ledger.append_discovery(sample_work(WorkType::RiemannZero, 1200.0));
        let b = ledger.append_discovery(sample_work(WorkType::PrimePattern, 1300.0));
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(ledger.discovery(2).unwrap().work_type, WorkType::PrimePattern);
    }

    #[test]
    fn work_type_filter_applies_to_pages() {
        let mut ledger = Ledger::new();
        ledger.append_discovery(sample_work(WorkType::RiemannZero, 1200.0));
        ledger.append_discovery(sample_work(WorkType::PrimePattern, 1300.0));
        ledger.append_discovery(sample_work(WorkType::RiemannZero, 1250.0));

        let page = ledger.discoveries_page(10, 0, Some(WorkType::RiemannZero));
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|w| w.work_type == WorkType::RiemannZero));

        // Newest first.
        let all = ledger.discoveries_page(10, 0, None);
        assert_eq!(all[0].id, 3);
    }

    #[test]
    fn append_block_enforces_index_and_hash_invariants() {
        let mut ledger = Ledger::new();
        let work = ledger.append_discovery(sample_work(WorkType::YangMills, 1400.0));

        let b0 = sample_block(&ledger, 1);
        let b0 = ledger.append_block(b0, &[work.id]).unwrap();
        assert_eq!(b0.index, 0);
        assert_eq!(b0.previous_hash, CHAIN_SEED_HASH);

        // Wrong index is rejected.
        let mut stale = sample_block(&ledger, 2);
        stale.index = 0;
        stale.block_hash = stale.compute_hash();
        assert!(matches!(
            ledger.append_block(stale, &[]),
            Err(LedgerError::NonMonotonicIndex { expected: 1, got: 0 })
        ));

        // Duplicate hash is rejected.
        let mut dup = sample_block(&ledger, 3);
        dup.block_hash = b0.block_hash.clone();
        assert!(matches!(
            ledger.append_block(dup, &[]),
            Err(LedgerError::DuplicateBlockHash(_))
        ));
    }

    #[test]
    fn unlinked_discoveries_shrink_as_blocks_form() {
        let mut ledger = Ledger::new();
        let a = ledger.append_discovery(sample_work(WorkType::RiemannZero, 1200.0));
        let b = ledger.append_discovery(sample_work(WorkType::NavierStokes, 1300.0));
        assert_eq!(ledger.unlinked_discoveries().len(), 2);

        let block = sample_block(&ledger, 4);
        let block = ledger.append_block(block, &[a.id]).unwrap();
        let unlinked = ledger.unlinked_discoveries();
        assert_eq!(unlinked.len(), 1);
        assert_eq!(unlinked[0].id, b.id);
        assert_eq!(ledger.work_for_block(block.id).unwrap().len(), 1);
        assert!(ledger.work_for_block(999).is_none());
    }

    #[test]
    fn integrity_check_walks_the_chain() {
        let mut ledger = Ledger::new();
        for nonce in 0..3 {
            let block = sample_block(&ledger, nonce);
            ledger.append_block(block, &[]).unwrap();
        }
        let report = ledger.integrity_check();
        assert!(report.valid);
        assert_eq!(report.checked_blocks, 3);

        // Corrupt a middle link.
        ledger.blocks[1].previous_hash = "garbage".to_string();
        let report = ledger.integrity_check();
        assert!(!report.valid);
        assert_eq!(report.broken_at_index, Some(1));
    }

    #[test]
    fn validation_moves_reputation_and_is_recorded() {
        let mut ledger = Ledger::new();
        let before = ledger.validator("clay-institute").unwrap().reputation;

        let record = ledger
            .record_validation(1, "clay-institute", ValidationOutcome::Approved)
            .unwrap();
        assert_eq!(record.id, 1);
        let v = ledger.validator("clay-institute").unwrap();
        assert_eq!(v.reputation, before + 0.5);
        assert_eq!(v.validations_count, 1);

        ledger
            .record_validation(1, "clay-institute", ValidationOutcome::Rejected)
            .unwrap();
        assert_eq!(
            ledger.validator("clay-institute").unwrap().reputation,
            before + 0.5 - 1.0
        );
        assert!(ledger.record_validation(1, "unknown", ValidationOutcome::Approved).is_none());
    }

    #[test]
    fn reset_clears_records_and_reseeds_validators() {
        let mut ledger = Ledger::new();
        ledger.append_discovery(sample_work(WorkType::RiemannZero, 1200.0));
        ledger.record_validation(1, "mit-csail", ValidationOutcome::Approved);
        ledger.reset();
        assert!(ledger.discoveries().is_empty());
        assert_eq!(ledger.validations_len(), 0);
        assert_eq!(ledger.validators().len(), SEED_VALIDATORS.len());
        assert_eq!(ledger.validator("mit-csail").unwrap().validations_count, 0);
    }
}
