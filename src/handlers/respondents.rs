use axum::{extract::State, response::IntoResponse, routing::get, Router};
use serde_json::json;

use super::success;
use crate::{
    extractors::{AuthGuard, QueryParams},
    models::SearchQuery,
    rejections::{AppError, ResultExt},
    utils::{Page, PageQuery},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/respondents", get(list_respondents))
}

async fn list_respondents(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
    QueryParams(page): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::from(page);

    let (respondents, total) = state
        .db
        .respondents(user_id, query.search.as_deref(), page)
        .await
        .reject("could not list respondents")?;

    Ok(success(json!({
        "respondents": respondents,
        "pagination": page.summary(total),
    })))
}
