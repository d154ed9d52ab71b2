mod admin;
mod blocks;
mod discoveries;
pub mod error;
mod metrics;
mod mining;
pub mod models;
mod validations;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(
            web::scope("/api")
                .service(admin::health_check)
                .service(discoveries::list_discoveries)
                .service(discoveries::get_discovery)
                .service(blocks::list_blocks)
                .service(blocks::get_block)
                .service(blocks::get_block_work)
                .service(mining::list_operations)
                .service(mining::start_mining)
                .service(metrics::get_metrics)
                .service(metrics::get_statistics)
                .service(validations::list_validations)
                .service(validations::list_validators)
                .service(validations::submit_validation)
                .service(admin::get_security)
                .service(admin::check_integrity)
                .service(admin::restart_blockchain),
        );
}
