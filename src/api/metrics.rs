use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, web};

use super::error::ApiError;
use super::models::{AppState, StatisticsResponse};
use crate::engine::metrics::default_metrics;

/// Latest network metrics snapshot; documented defaults before the first
/// collection tick.
#[get("/metrics")]
pub async fn get_metrics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    let snapshot = ledger
        .latest_metrics()
        .cloned()
        .unwrap_or_else(default_metrics);
    Ok(HttpResponse::Ok().json(snapshot))
}

/// All-time totals across the platform.
#[get("/statistics")]
pub async fn get_statistics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let active_operations = {
        let operations = state.operations.lock().map_err(|_| ApiError::Internal)?;
        operations.active_len()
    };

    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    let discoveries = ledger.discoveries();
    let mut work_type_breakdown = BTreeMap::new();
    for work in discoveries {
        *work_type_breakdown.entry(work.work_type).or_insert(0) += 1;
    }

    Ok(HttpResponse::Ok().json(StatisticsResponse {
        total_blocks: ledger.blocks().len(),
        total_discoveries: discoveries.len(),
        total_scientific_value: discoveries.iter().map(|w| w.scientific_value).sum(),
        total_energy_consumed: discoveries
            .iter()
            .map(|w| w.energy_efficiency / 1000.0)
            .sum(),
        total_validations: ledger.validations_len(),
        active_operations,
        work_type_breakdown,
    }))
}
