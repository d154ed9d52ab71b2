pub mod aggregator;
pub mod compute;
pub mod metrics;
pub mod operation;
pub mod security;
pub mod valuation;

use std::sync::Arc;
use std::time::Duration;

use crate::api::models::AppState;
use crate::config::Config;

/// Difficulty bounds accepted by the mining API.
pub const MIN_DIFFICULTY: u32 = 1;
pub const MAX_DIFFICULTY: u32 = 1000;

/// How many discoveries fold into one block.
pub const BLOCK_BATCH_SIZE: usize = 3;

/// Progress advances by `rand(8..16) * PROGRESS_SCALE / difficulty` per
/// tick, clamped to the step bounds below. The floor guarantees every
/// operation completes in a bounded number of ticks.
pub const PROGRESS_SCALE: f64 = 24.0;
pub const MIN_PROGRESS_STEP: f64 = 0.5;
pub const MAX_PROGRESS_STEP: f64 = 25.0;
pub const COMPLETE_PROGRESS: f64 = 100.0;

/// Difficulty range used by autonomous miners.
pub const AUTONOMOUS_DIFFICULTY_MIN: u32 = 40;
pub const AUTONOMOUS_DIFFICULTY_MAX: u32 = 80;

/// Autonomous miners top the pipeline up on a fixed cadence.
const AUTONOMOUS_TICK_MS: u64 = 15_000;

/// Spawn the interval drivers for the whole pipeline. Each driver calls
/// a plain tick function; tests call the same functions directly with a
/// seeded generator instead of waiting on wall-clock intervals.
pub fn spawn_drivers(state: Arc<AppState>, config: &Config) {
    {
        let state = state.clone();
        let period = Duration::from_millis(config.mining_tick_ms);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                operation::mining_tick(&state, &mut rand::thread_rng());
            }
        });
    }

    {
        let state = state.clone();
        let period = Duration::from_millis(config.aggregation_tick_ms);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                aggregator::aggregation_tick(&state, &mut rand::thread_rng());
            }
        });
    }

    {
        let state = state.clone();
        let period = Duration::from_millis(config.metrics_tick_ms);
        let autonomous_miners = config.autonomous_miners;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                metrics::metrics_tick(&state, autonomous_miners);
            }
        });
    }

    {
        let state = state.clone();
        let period = Duration::from_millis(config.security_tick_ms);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                security::security_tick(&state, &mut rand::thread_rng());
            }
        });
    }

    if config.autonomous_miners > 0 {
        let state = state.clone();
        let target = config.autonomous_miners;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(AUTONOMOUS_TICK_MS));
            loop {
                interval.tick().await;
                operation::autonomous_tick(&state, target, &mut rand::thread_rng());
            }
        });
    }
}
