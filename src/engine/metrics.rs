use chrono::{Duration, Utc};
use log::debug;

use crate::api::models::AppState;
use crate::chain::model::NetworkMetrics;
use crate::ws::hub::ServerMessage;

/// Snapshot served before the first collection tick has run.
pub fn default_metrics() -> NetworkMetrics {
    NetworkMetrics {
        id: 0,
        timestamp: Utc::now(),
        active_miners: 5,
        blocks_per_hour: 8.0,
        energy_efficiency: -500.0,
        scientific_value_generated: 0.0,
        average_block_time: 450.0,
        network_hashrate: 1000.0,
        total_knowledge_created: 0,
    }
}

/// Recompute the network snapshot from current state, store it and
/// broadcast `metrics_update`. Everything here is derived, nothing is
/// authoritative.
pub fn metrics_tick(state: &AppState, autonomous_miners: usize) -> NetworkMetrics {
    let now = Utc::now();
    let hour_ago = now - Duration::hours(1);

    let (active_operations, network_hashrate) = {
        let operations = state.operations.lock().expect("mutex poisoned");
        let active = operations.active();
        let hashrate: f64 = active.iter().map(|op| op.difficulty as f64).sum::<f64>() * 1000.0;
        (active.len(), hashrate)
    };

    let stored = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");

        let blocks_per_hour = ledger
            .blocks()
            .iter()
            .filter(|b| b.timestamp > hour_ago)
            .count() as f64;
        let average_block_time = 3600.0 / blocks_per_hour.max(1.0);

        let total_knowledge_created = ledger.discoveries().len();
        let recent_energy_kwh: f64 = ledger
            .discoveries()
            .iter()
            .rev()
            .take(10)
            .map(|w| w.energy_efficiency / 1000.0)
            .sum();
        // Negative means the network nets out as an energy producer in
        // the platform's accounting.
        let energy_efficiency = -recent_energy_kwh * 100.0;

        let scientific_value_generated: f64 = ledger
            .discoveries()
            .iter()
            .filter(|w| w.timestamp > hour_ago)
            .map(|w| w.scientific_value)
            .sum();

        ledger.push_metrics(NetworkMetrics {
            id: 0,
            timestamp: now,
            active_miners: active_operations + autonomous_miners,
            blocks_per_hour,
            energy_efficiency,
            scientific_value_generated,
            average_block_time,
            network_hashrate,
            total_knowledge_created,
        })
    };

    debug!(
        "METRICS - {} miners, {:.0} blocks/h, ${:.2} generated",
        stored.active_miners, stored.blocks_per_hour, stored.scientific_value_generated
    );
    state.hub.send(ServerMessage::MetricsUpdate {
        metrics: stored.clone(),
    });
    stored
}
