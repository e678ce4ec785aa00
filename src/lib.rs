pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod utils;
pub mod validation;

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, post},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::services::{payment::PaymentProcessor, scan::ScanHub};

pub type LoginRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

const LOGIN_ATTEMPTS_PER_MINUTE: u32 = 10;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Config,
    pub payments: PaymentProcessor,
    pub scan_hub: ScanHub,
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let scan_hub = ScanHub::new(config.scan_channel_capacity);
        let payments = PaymentProcessor::new(db.clone());
        let quota = Quota::per_minute(
            NonZeroU32::new(LOGIN_ATTEMPTS_PER_MINUTE).expect("limit is nonzero"),
        );

        Self {
            db,
            config,
            payments,
            scan_hub,
            login_limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .route("/stats/", get(handlers::stats::get_stats))
        .route("/users/", get(handlers::users::list_users))
        .route("/users/create/", post(handlers::users::create_user))
        .route("/users/delete/", post(handlers::users::delete_user))
        .route("/users/:band_id/", get(handlers::users::get_user))
        .route("/fund/", post(handlers::users::fund_band))
        .route("/block/", post(handlers::users::toggle_block))
        .route("/payment/", post(handlers::payment::process_payment))
        .route("/sellers/register/", post(handlers::sellers::register_seller))
        .route("/sellers/login/", post(handlers::sellers::seller_login))
        .route(
            "/scan/",
            get(handlers::scan::scan_stream).post(handlers::scan::scan_ingest),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(axum_middleware::from_fn_with_state(
            state.config.clone(),
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) => {
            let parsed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
