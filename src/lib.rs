pub mod analytics;
pub mod db;
pub mod export;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod questions;
pub mod rejections;
pub mod services;
pub mod utils;
pub mod validation;

use axum::Router;

use services::{auth::AuthService, responses::ResponseService, tokens::TokenKeys};

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub auth: AuthService,
    pub responses: ResponseService,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(db: db::Db, tokens: TokenKeys) -> Self {
        Self {
            auth: AuthService::new(db.clone(), tokens.clone()),
            responses: ResponseService::new(db.clone()),
            db,
            tokens,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::surveys::routes())
        .merge(handlers::responses::routes())
        .merge(handlers::respondents::routes())
        .merge(handlers::templates::routes());

    Router::new()
        .nest(names::API_PREFIX, api)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> rejections::AppError {
    rejections::AppError::NotFound("Route")
}
