use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::error::ApiError;
use super::models::{AppState, RestartRequest, RestartResponse};
use crate::ws::hub::ServerMessage;

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("Productive mining API is up and running 🦀")
}

/// On-demand chain walk. The only place linkage is ever verified.
#[get("/blockchain/integrity")]
pub async fn check_integrity(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let report = {
        let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
        ledger.integrity_check()
    };
    if !report.valid {
        warn!(
            "INTEGRITY - chain broken at index {:?} after {} blocks",
            report.broken_at_index, report.checked_blocks
        );
    }
    state.hub.send(ServerMessage::IntegrityUpdate {
        report: report.clone(),
    });
    Ok(HttpResponse::Ok().json(report))
}

/// Dev-only: drop every record and start over.
#[post("/blockchain/restart")]
pub async fn restart_blockchain(
    state: web::Data<AppState>,
    req: web::Json<RestartRequest>,
) -> Result<HttpResponse, ApiError> {
    if !state.dev_mode {
        return Err(ApiError::Forbidden(
            "restart is disabled outside development".to_string(),
        ));
    }
    if !req.confirm {
        return Err(ApiError::Validation("confirm must be true".to_string()));
    }

    state
        .ledger
        .lock()
        .map_err(|_| ApiError::Internal)?
        .reset();
    state
        .operations
        .lock()
        .map_err(|_| ApiError::Internal)?
        .reset();
    state
        .security
        .lock()
        .map_err(|_| ApiError::Internal)?
        .reset();

    info!("ADMIN - blockchain state cleared");
    Ok(HttpResponse::Ok().json(RestartResponse { restarted: true }))
}

/// Adaptive security status.
#[get("/security")]
pub async fn get_security(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let monitor = state.security.lock().map_err(|_| ApiError::Internal)?;
    Ok(HttpResponse::Ok().json(monitor.status()))
}
