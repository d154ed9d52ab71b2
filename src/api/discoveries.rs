use actix_web::{HttpResponse, get, web};

use super::error::ApiError;
use super::models::{AppState, DiscoveriesQuery};

/// List mathematical discoveries, newest first, optionally filtered by
/// work type.
#[get("/discoveries")]
pub async fn list_discoveries(
    state: web::Data<AppState>,
    query: web::Query<DiscoveriesQuery>,
) -> Result<HttpResponse, ApiError> {
    let (limit, offset) = query.page();
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    Ok(HttpResponse::Ok().json(ledger.discoveries_page(limit, offset, query.work_type)))
}

/// Fetch one discovery by id.
#[get("/discoveries/{id}")]
pub async fn get_discovery(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    let discovery = ledger.discovery(id).ok_or(ApiError::NotFound("discovery"))?;
    Ok(HttpResponse::Ok().json(discovery))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::engine::compute::WorkType;
    use crate::engine::operation::mining_tick;
    use actix_web::{App, test};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    async fn seeded_state(count: usize) -> web::Data<AppState> {
        let state = web::Data::new(AppState::default());
        let mut rng = StdRng::seed_from_u64(21);
        {
            let mut operations = state.operations.lock().unwrap();
            let types = [WorkType::RiemannZero, WorkType::PrimePattern];
            for i in 0..count {
                operations.start(types[i % 2], 1, format!("m{i}"));
            }
        }
        while state.ledger.lock().unwrap().discoveries().len() < count {
            mining_tick(&state, &mut rng);
        }
        state
    }

    #[actix_web::test]
    async fn listing_filters_by_work_type() {
        let state = seeded_state(4).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/discoveries?workType=riemann_zero")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|w| w["workType"] == "riemann_zero"));

        let req = test::TestRequest::get()
            .uri("/api/discoveries?limit=1&offset=1")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn unknown_discovery_is_a_404_envelope() {
        let state = seeded_state(1).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/discoveries/999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "discovery not found");

        let req = test::TestRequest::get().uri("/api/discoveries/1").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], 1);
        assert!(body["scientificValue"].as_f64().unwrap() > 0.0);
    }
}
