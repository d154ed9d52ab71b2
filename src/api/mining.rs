use actix_web::{HttpResponse, get, post, web};
use log::info;

use super::error::ApiError;
use super::models::{AppState, StartMiningRequest};
use crate::engine::{MAX_DIFFICULTY, MIN_DIFFICULTY};

/// List active mining operations.
#[get("/mining/operations")]
pub async fn list_operations(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let operations = state.operations.lock().map_err(|_| ApiError::Internal)?;
    Ok(HttpResponse::Ok().json(operations.active()))
}

/// Start a new mining operation. The operation is created with progress 0
/// and advanced by the tick driver; completion produces the discovery.
#[post("/mining/start")]
pub async fn start_mining(
    state: web::Data<AppState>,
    req: web::Json<StartMiningRequest>,
) -> Result<HttpResponse, ApiError> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&req.difficulty) {
        return Err(ApiError::Validation(format!(
            "difficulty must be between {MIN_DIFFICULTY} and {MAX_DIFFICULTY}"
        )));
    }
    let miner_id = req.miner_id.trim();
    if miner_id.is_empty() {
        return Err(ApiError::Validation("minerId required".to_string()));
    }

    let operation = {
        let mut operations = state.operations.lock().map_err(|_| ApiError::Internal)?;
        operations.start(req.operation_type, req.difficulty, miner_id.to_string())
    };

    info!(
        "MINING - started operation #{} ({:?} at difficulty {} for {})",
        operation.id, operation.operation_type, operation.difficulty, operation.miner_id
    );
    Ok(HttpResponse::Created().json(operation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::engine::operation::mining_tick;
    use actix_web::{App, test};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[actix_web::test]
    async fn start_then_tick_produces_a_discovery() {
        let state = web::Data::new(AppState::default());
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/mining/start")
            .set_json(serde_json::json!({
                "operationType": "riemann_zero",
                "difficulty": 50,
                "minerId": "m1"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let op: serde_json::Value = test::read_body_json(resp).await;
        assert!(op["id"].as_u64().unwrap() > 0);
        assert_eq!(op["status"], "active");
        assert_eq!(op["progress"], 0.0);
        assert_eq!(op["currentResult"]["status"], "initializing");

        // The new operation is visible as active.
        let req = test::TestRequest::get()
            .uri("/api/mining/operations")
            .to_request();
        let active: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(active.as_array().unwrap().len(), 1);

        // Drive the scheduler until completion.
        let mut rng = StdRng::seed_from_u64(6);
        while state.ledger.lock().unwrap().discoveries().is_empty() {
            mining_tick(&state, &mut rng);
        }

        let req = test::TestRequest::get().uri("/api/discoveries").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["workType"], "riemann_zero");
        assert!(items[0]["scientificValue"].as_f64().unwrap() > 0.0);

        let req = test::TestRequest::get()
            .uri("/api/mining/operations")
            .to_request();
        let active: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(active.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn invalid_requests_get_field_level_details() {
        let state = web::Data::new(AppState::default());
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/mining/start")
            .set_json(serde_json::json!({
                "operationType": "yang_mills",
                "difficulty": 0,
                "minerId": "m1"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation failed");
        assert_eq!(body["details"], "difficulty must be between 1 and 1000");

        let req = test::TestRequest::post()
            .uri("/api/mining/start")
            .set_json(serde_json::json!({
                "operationType": "yang_mills",
                "difficulty": 10,
                "minerId": "   "
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["details"], "minerId required");
    }
}
