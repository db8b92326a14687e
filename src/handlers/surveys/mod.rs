mod crud;
mod results;

use axum::{
    routing::{get, put},
    Router,
};

use crate::{
    db::{Survey, SurveyDraft},
    models::SurveyBody,
    questions::check_questions,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/surveys", get(crud::list_surveys).post(crud::create_survey))
        .route(
            "/surveys/{id}",
            get(crud::get_survey)
                .put(crud::update_survey)
                .delete(crud::delete_survey),
        )
        .route("/surveys/{id}/publish", put(crud::publish_survey))
        .route("/surveys/{id}/unpublish", put(crud::unpublish_survey))
        .route("/surveys/{id}/analytics", get(results::analytics))
        .route("/surveys/{id}/responses/export", get(results::export_responses))
}

/// The caller's survey, or 404 for both missing and foreign surveys.
async fn owned_survey(state: &AppState, survey_id: &str, user_id: i64) -> Result<Survey, AppError> {
    state
        .db
        .find_owned_survey(survey_id, user_id)
        .await
        .reject("could not load survey")?
        .ok_or(AppError::NotFound("Survey"))
}

fn survey_draft(body: SurveyBody) -> Result<SurveyDraft, AppError> {
    let title = body
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::input("Title is required"))?;

    let questions = check_questions(body.questions).map_err(|e| AppError::input(e.to_string()))?;

    Ok(SurveyDraft {
        title,
        description: body
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        questions,
    })
}
