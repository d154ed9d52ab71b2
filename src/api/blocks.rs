use actix_web::{HttpResponse, get, web};

use super::error::ApiError;
use super::models::{AppState, PageQuery};

/// List productive blocks, newest first.
#[get("/blocks")]
pub async fn list_blocks(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (limit, offset) = query.page();
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    Ok(HttpResponse::Ok().json(ledger.blocks_page(limit, offset)))
}

/// Fetch one block by id.
#[get("/blocks/{id}")]
pub async fn get_block(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    let block = ledger.block(id).ok_or(ApiError::NotFound("block"))?;
    Ok(HttpResponse::Ok().json(block))
}

/// Discoveries aggregated into a block.
#[get("/blocks/{id}/work")]
pub async fn get_block_work(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let ledger = state.ledger.lock().map_err(|_| ApiError::Internal)?;
    let work = ledger
        .work_for_block(id)
        .ok_or(ApiError::NotFound("block"))?;
    Ok(HttpResponse::Ok().json(work))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::engine::aggregator::aggregation_tick;
    use crate::engine::compute::WorkType;
    use crate::engine::operation::mining_tick;
    use crate::engine::BLOCK_BATCH_SIZE;
    use actix_web::{App, test};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    async fn state_with_blocks(blocks: usize) -> web::Data<AppState> {
        let state = web::Data::new(AppState::default());
        let mut rng = StdRng::seed_from_u64(33);
        let needed = blocks * BLOCK_BATCH_SIZE;
        {
            let mut operations = state.operations.lock().unwrap();
            for i in 0..needed {
                operations.start(WorkType::GoldbachVerification, 1, format!("m{i}"));
            }
        }
        while state.ledger.lock().unwrap().discoveries().len() < needed {
            mining_tick(&state, &mut rng);
        }
        assert_eq!(aggregation_tick(&state, &mut rng).len(), blocks);
        state
    }

    #[actix_web::test]
    async fn blocks_list_newest_first_with_pagination() {
        let state = state_with_blocks(2).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/blocks").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["index"], 1);
        assert_eq!(items[1]["index"], 0);

        let req = test::TestRequest::get()
            .uri("/api/blocks?limit=1")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn block_work_resolves_through_the_junction() {
        let state = state_with_blocks(1).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/blocks/1/work").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), BLOCK_BATCH_SIZE);

        let req = test::TestRequest::get().uri("/api/blocks/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = test::TestRequest::get().uri("/api/blocks/42/work").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
