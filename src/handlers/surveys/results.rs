use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use super::owned_survey;
use crate::{
    analytics::{self, ResponseView},
    export,
    extractors::AuthGuard,
    handlers::success,
    names,
    rejections::{AppError, ResultExt},
    AppState,
};

pub(super) async fn analytics(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let survey = owned_survey(&state, &survey_id, user_id).await?;

    let responses = state
        .db
        .responses_for_survey(&survey.id)
        .await
        .reject("could not load responses")?;

    let views: Vec<ResponseView<'_>> = responses
        .iter()
        .map(|r| ResponseView {
            answers: &r.answers,
            completed_at: r.completed_at,
        })
        .collect();

    Ok(success(analytics::aggregate(
        &survey.id,
        &survey.questions,
        &views,
    )))
}

pub(super) async fn export_responses(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let survey = owned_survey(&state, &survey_id, user_id).await?;

    let responses = state
        .db
        .responses_for_export(&survey.id)
        .await
        .reject("could not load responses")?;

    let csv = export::responses_csv(&survey.questions, &responses);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        names::survey_export_filename(&survey.id)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
