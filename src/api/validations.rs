use actix_web::{HttpResponse, get, post, web};
use log::info;
use rand::Rng;

use super::error::ApiError;
use super::models::{AppState, PageQuery, SubmitValidationRequest, SubmitValidationResponse};
use crate::chain::model::ValidationOutcome;

/// Probability that a simulated validation approves a discovery.
const APPROVAL_PROBABILITY: f64 = 0.9;

/// List validation records, newest first.
#[get("/validations")]
pub async fn list_validations(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (limit, offset) = query.page();
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    Ok(HttpResponse::Ok().json(ledger.validations_page(limit, offset)))
}

/// List the institutional validator set.
#[get("/validators")]
pub async fn list_validators(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    Ok(HttpResponse::Ok().json(ledger.validators().to_vec()))
}

/// Submit a discovery for validation. The outcome is simulated; the
/// validator's reputation moves with it.
#[post("/validations/submit")]
pub async fn submit_validation(
    state: web::Data<AppState>,
    req: web::Json<SubmitValidationRequest>,
) -> Result<HttpResponse, ApiError> {
    let outcome = if rand::thread_rng().gen_bool(APPROVAL_PROBABILITY) {
        ValidationOutcome::Approved
    } else {
        ValidationOutcome::Rejected
    };

    let mut ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    ledger
        .discovery(req.discovery_id)
        .ok_or(ApiError::NotFound("discovery"))?;
    let validation = ledger
        .record_validation(req.discovery_id, &req.validator_id, outcome)
        .ok_or(ApiError::NotFound("validator"))?;
    let validator = ledger
        .validator(&req.validator_id)
        .ok_or(ApiError::NotFound("validator"))?
        .clone();

    info!(
        "VALIDATION - {} {:?} discovery #{} (reputation now {:.1})",
        validator.id, validation.outcome, req.discovery_id, validator.reputation
    );
    Ok(HttpResponse::Ok().json(SubmitValidationResponse {
        validation,
        validator,
    }))
}
