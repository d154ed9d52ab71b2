use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::chain::model::{ValidationRecord, Validator};
use crate::chain::{DEFAULT_PAGE_LIMIT, Ledger, MAX_PAGE_LIMIT};
use crate::engine::compute::WorkType;
use crate::engine::operation::OperationSet;
use crate::engine::security::SecurityMonitor;
use crate::ws::EventHub;

/// Shared application state: the in-memory ledger, the active operation
/// set, the security monitor and the event hub. Owned here and injected
/// into handlers and tick drivers; nothing lives in module-level statics.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
    pub operations: Mutex<OperationSet>,
    pub security: Mutex<SecurityMonitor>,
    pub hub: EventHub,
    pub dev_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            ledger: Mutex::new(Ledger::new()),
            operations: Mutex::new(OperationSet::new()),
            security: Mutex::new(SecurityMonitor::new()),
            hub: EventHub::default(),
            dev_mode: true,
        }
    }
}

fn clamp_page(limit: Option<usize>, offset: Option<usize>) -> (usize, usize) {
    (
        limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
        offset.unwrap_or(0),
    )
}

/* ---------- Pagination ---------- */

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageQuery {
    pub fn page(&self) -> (usize, usize) {
        clamp_page(self.limit, self.offset)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveriesQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub work_type: Option<WorkType>,
}

impl DiscoveriesQuery {
    pub fn page(&self) -> (usize, usize) {
        clamp_page(self.limit, self.offset)
    }
}

/* ---------- Mining API models ---------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMiningRequest {
    pub operation_type: WorkType,
    pub difficulty: u32,
    pub miner_id: String,
}

/* ---------- Validation API models ---------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitValidationRequest {
    pub discovery_id: u64,
    pub validator_id: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitValidationResponse {
    pub validation: ValidationRecord,
    pub validator: Validator,
}

/* ---------- Admin API models ---------- */

#[derive(Debug, Deserialize)]
pub struct RestartRequest {
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

fn default_confirm() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct RestartResponse {
    pub restarted: bool,
}

/* ---------- Statistics API models ---------- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_blocks: usize,
    pub total_discoveries: usize,
    pub total_scientific_value: f64,
    pub total_energy_consumed: f64,
    pub total_validations: usize,
    pub active_operations: usize,
    pub work_type_breakdown: BTreeMap<WorkType, usize>,
}
