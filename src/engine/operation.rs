use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::compute::{self, WorkType};
use super::valuation;
use super::{
    AUTONOMOUS_DIFFICULTY_MAX, AUTONOMOUS_DIFFICULTY_MIN, COMPLETE_PROGRESS, MAX_PROGRESS_STEP,
    MIN_PROGRESS_STEP, PROGRESS_SCALE,
};
use crate::api::models::AppState;
use crate::chain::model::MathematicalWork;
use crate::ws::hub::ServerMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Active,
    Completed,
    Failed,
}

/// Stage reported in `currentResult` while an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initializing,
    Computing,
    Validating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentResult {
    pub status: Stage,
}

/// An in-flight mathematical mining operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningOperation {
    pub id: u64,
    pub operation_type: WorkType,
    pub miner_id: String,
    pub start_time: DateTime<Utc>,
    pub estimated_completion: DateTime<Utc>,
    pub progress: f64,
    pub current_result: CurrentResult,
    pub difficulty: u32,
    pub status: OperationStatus,
}

impl MiningOperation {
    fn stage_for_progress(progress: f64) -> Stage {
        if progress >= 80.0 {
            Stage::Validating
        } else if progress >= 10.0 {
            Stage::Computing
        } else {
            Stage::Initializing
        }
    }
}

/// Active mining operations, keyed by id. Completed and failed operations
/// leave the set; their output lives on in the ledger.
#[derive(Debug, Default)]
pub struct OperationSet {
    ops: BTreeMap<u64, MiningOperation>,
    next_id: u64,
}

impl OperationSet {
    pub fn new() -> Self {
        Self {
            ops: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a new active operation with progress 0.
    pub fn start(
        &mut self,
        operation_type: WorkType,
        difficulty: u32,
        miner_id: String,
    ) -> MiningOperation {
        let start_time = Utc::now();
        let operation = MiningOperation {
            id: self.next_id,
            operation_type,
            miner_id,
            start_time,
            estimated_completion: start_time + Duration::seconds(difficulty as i64 * 2),
            progress: 0.0,
            current_result: CurrentResult {
                status: Stage::Initializing,
            },
            difficulty,
            status: OperationStatus::Active,
        };
        self.next_id += 1;
        self.ops.insert(operation.id, operation.clone());
        operation
    }

    pub fn active(&self) -> Vec<MiningOperation> {
        self.ops
            .values()
            .filter(|op| op.status == OperationStatus::Active)
            .cloned()
            .collect()
    }

    pub fn active_len(&self) -> usize {
        self.ops
            .values()
            .filter(|op| op.status == OperationStatus::Active)
            .count()
    }

    pub fn reset(&mut self) {
        *self = OperationSet::new();
    }

    /// Advance every active operation by one pseudo-random step (scaled
    /// inversely with difficulty, floor-bounded so completion is reached
    /// in a bounded number of ticks). Operations crossing 100 are marked
    /// completed, clamped, and removed from the set.
    fn advance(&mut self, rng: &mut impl Rng) -> (Vec<MiningOperation>, Vec<MiningOperation>) {
        let mut progressed = Vec::new();
        let mut completed = Vec::new();

        for op in self.ops.values_mut() {
            let step = (rng.gen_range(8.0..16.0) * PROGRESS_SCALE / op.difficulty as f64)
                .clamp(MIN_PROGRESS_STEP, MAX_PROGRESS_STEP);
            op.progress = (op.progress + step).min(COMPLETE_PROGRESS);
            op.current_result.status = MiningOperation::stage_for_progress(op.progress);
            if op.progress >= COMPLETE_PROGRESS {
                op.status = OperationStatus::Completed;
                completed.push(op.clone());
            } else {
                progressed.push(op.clone());
            }
        }
        self.ops
            .retain(|_, op| op.status == OperationStatus::Active);

        (progressed, completed)
    }
}

/// One scheduler tick over the mining pipeline: advance progress,
/// broadcast `mining_progress`, and turn each finished operation into
/// exactly one discovery (broadcast as `discovery_made`).
///
/// Driven by an interval in `main`; tests call it directly with a seeded
/// generator, so no wall-clock waiting is involved.
pub fn mining_tick(state: &AppState, rng: &mut impl Rng) -> Vec<MathematicalWork> {
    let (progressed, completed) = {
        let mut operations = state.operations.lock().expect("mutex poisoned");
        operations.advance(rng)
    };

    for op in &progressed {
        state.hub.send(ServerMessage::MiningProgress {
            operation_id: op.id,
            progress: op.progress,
            status: op.status,
            timestamp: Utc::now(),
        });
    }

    let mut discoveries = Vec::with_capacity(completed.len());
    for op in completed {
        state.hub.send(ServerMessage::MiningProgress {
            operation_id: op.id,
            progress: op.progress,
            status: op.status,
            timestamp: Utc::now(),
        });

        let synth = compute::compute_result(op.operation_type, op.difficulty, rng);
        let valuation = valuation::calculate_scientific_value(
            op.operation_type,
            op.difficulty,
            synth.computation_time_secs,
            synth.energy_consumed_kwh,
        );
        let signature = compute::short_hash(&format!(
            "{:?}:{}:{}:{}",
            op.operation_type,
            op.difficulty,
            op.miner_id,
            Utc::now().timestamp_millis()
        ));

        let work = MathematicalWork {
            id: 0,
            work_type: op.operation_type,
            difficulty: op.difficulty,
            result: synth.result,
            verification_data: synth.verification_data,
            computational_cost: valuation.computational_cost,
            // kWh scaled to the efficiency metric the dashboard plots.
            energy_efficiency: synth.energy_consumed_kwh * 1000.0,
            scientific_value: valuation.total_value,
            timestamp: Utc::now(),
            worker_id: op.miner_id.clone(),
            signature,
        };

        let stored = {
            let mut ledger = state.ledger.lock().expect("mutex poisoned");
            ledger.append_discovery(work)
        };

        info!(
            "MINING - operation #{} completed: {:?} worth ${:.2}",
            op.id, stored.work_type, stored.scientific_value
        );
        state.hub.send(ServerMessage::DiscoveryMade {
            discovery: stored.clone(),
        });
        discoveries.push(stored);
    }

    discoveries
}

/// Keep the pipeline alive: start random operations under generated miner
/// ids until `target` are active. A target of 0 disables autonomous
/// mining entirely.
pub fn autonomous_tick(state: &AppState, target: usize, rng: &mut impl Rng) -> usize {
    let mut started = 0;
    let mut operations = state.operations.lock().expect("mutex poisoned");
    while operations.active_len() < target {
        let work_type = WorkType::ALL[rng.gen_range(0..WorkType::ALL.len())];
        let difficulty = rng.gen_range(AUTONOMOUS_DIFFICULTY_MIN..=AUTONOMOUS_DIFFICULTY_MAX);
        let miner_id = format!("autonomous-{}", Uuid::new_v4().simple());
        let op = operations.start(work_type, difficulty, miner_id);
        debug!(
            "AUTONOMOUS - started operation #{} ({:?} at difficulty {})",
            op.id, op.operation_type, op.difficulty
        );
        started += 1;
    }
    started
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::AppState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn start_initializes_an_active_operation() {
        let mut set = OperationSet::new();
        let op = set.start(WorkType::RiemannZero, 50, "m1".to_string());
        assert_eq!(op.id, 1);
        assert_eq!(op.progress, 0.0);
        assert_eq!(op.status, OperationStatus::Active);
        assert_eq!(op.current_result.status, Stage::Initializing);
        assert_eq!(op.estimated_completion - op.start_time, Duration::seconds(100));
        assert_eq!(set.active_len(), 1);
    }

    #[test]
    fn ticks_drive_an_operation_to_exactly_one_discovery() {
        let state = AppState::default();
        let mut rng = StdRng::seed_from_u64(42);
        {
            let mut operations = state.operations.lock().unwrap();
            operations.start(WorkType::RiemannZero, 50, "m1".to_string());
        }

        let mut produced = Vec::new();
        let mut ticks = 0;
        while produced.is_empty() {
            ticks += 1;
            assert!(ticks <= 250, "operation did not complete in a bounded number of ticks");
            produced.extend(mining_tick(&state, &mut rng));
        }

        assert_eq!(produced.len(), 1);
        let work = &produced[0];
        assert_eq!(work.work_type, WorkType::RiemannZero);
        assert!(work.scientific_value > 0.0);
        assert_eq!(work.worker_id, "m1");

        // The operation left the active set and no duplicate appears on
        // further ticks.
        assert_eq!(state.operations.lock().unwrap().active_len(), 0);
        assert!(mining_tick(&state, &mut rng).is_empty());
        assert_eq!(state.ledger.lock().unwrap().discoveries().len(), 1);
    }

    #[test]
    fn high_difficulty_still_progresses_every_tick() {
        let mut set = OperationSet::new();
        set.start(WorkType::LatticeCrypto, 1000, "m2".to_string());
        let mut rng = StdRng::seed_from_u64(1);

        let (progressed, _) = set.advance(&mut rng);
        assert!(progressed[0].progress >= MIN_PROGRESS_STEP);
        assert!(progressed[0].progress <= MAX_PROGRESS_STEP);
    }

    #[test]
    fn stage_follows_progress_thresholds() {
        assert_eq!(MiningOperation::stage_for_progress(0.0), Stage::Initializing);
        assert_eq!(MiningOperation::stage_for_progress(10.0), Stage::Computing);
        assert_eq!(MiningOperation::stage_for_progress(79.9), Stage::Computing);
        assert_eq!(MiningOperation::stage_for_progress(80.0), Stage::Validating);
    }

    #[test]
    fn autonomous_tick_tops_up_to_target() {
        let state = AppState::default();
        let mut rng = StdRng::seed_from_u64(9);

        assert_eq!(autonomous_tick(&state, 3, &mut rng), 3);
        assert_eq!(state.operations.lock().unwrap().active_len(), 3);
        // Already at target: nothing new.
        assert_eq!(autonomous_tick(&state, 3, &mut rng), 0);
        // Disabled.
        assert_eq!(autonomous_tick(&state, 0, &mut rng), 0);

        for op in state.operations.lock().unwrap().active() {
            assert!((AUTONOMOUS_DIFFICULTY_MIN..=AUTONOMOUS_DIFFICULTY_MAX)
                .contains(&op.difficulty));
            assert!(op.miner_id.starts_with("autonomous-"));
        }
    }
}
