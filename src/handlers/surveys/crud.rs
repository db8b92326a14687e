use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::{owned_survey, survey_draft};
use crate::{
    db::{SurveyFilter, SurveyStatus},
    extractors::{AuthGuard, JsonBody, QueryParams},
    handlers::{done, success, success_with},
    models::{SurveyBody, SurveyListQuery},
    rejections::{AppError, ResultExt},
    utils::{Page, PageQuery},
    AppState,
};

pub(super) async fn list_surveys(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SurveyListQuery>,
    QueryParams(page): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::from(page);
    let filter = SurveyFilter {
        status: query.status,
        search: query.search,
    };

    let (surveys, total) = state
        .db
        .surveys(user_id, &filter, page)
        .await
        .reject("could not list surveys")?;

    Ok(success(json!({
        "surveys": surveys,
        "pagination": page.summary(total),
    })))
}

pub(super) async fn create_survey(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SurveyBody>,
) -> Result<impl IntoResponse, AppError> {
    let draft = survey_draft(body)?;

    let survey = state
        .db
        .create_survey(user_id, draft)
        .await
        .reject("could not create survey")?;

    Ok((
        StatusCode::CREATED,
        success_with("Survey created successfully", json!({ "survey": survey })),
    ))
}

pub(super) async fn get_survey(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let survey = owned_survey(&state, &survey_id, user_id).await?;
    Ok(success(json!({ "survey": survey })))
}

pub(super) async fn update_survey(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
    JsonBody(body): JsonBody<SurveyBody>,
) -> Result<impl IntoResponse, AppError> {
    let draft = survey_draft(body)?;

    let updated = state
        .db
        .update_survey(&survey_id, user_id, draft)
        .await
        .reject("could not update survey")?;

    match updated {
        Some(survey) => Ok(success_with(
            "Survey updated successfully",
            json!({ "survey": survey }),
        )),
        None => {
            // Tell "not yours / gone" apart from "no longer editable".
            owned_survey(&state, &survey_id, user_id).await?;
            Err(AppError::input("Only draft surveys can be edited"))
        }
    }
}

pub(super) async fn delete_survey(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .db
        .delete_survey(&survey_id, user_id)
        .await
        .reject("could not delete survey")?;

    if !deleted {
        return Err(AppError::NotFound("Survey"));
    }
    Ok(done("Survey deleted successfully"))
}

pub(super) async fn publish_survey(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let survey = state
        .db
        .set_survey_status(&survey_id, user_id, SurveyStatus::Active)
        .await
        .reject("could not publish survey")?
        .ok_or(AppError::NotFound("Survey"))?;

    Ok(success_with(
        "Survey published successfully",
        json!({ "survey": survey }),
    ))
}

pub(super) async fn unpublish_survey(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let survey = state
        .db
        .set_survey_status(&survey_id, user_id, SurveyStatus::Draft)
        .await
        .reject("could not unpublish survey")?
        .ok_or(AppError::NotFound("Survey"))?;

    Ok(success_with(
        "Survey unpublished successfully",
        json!({ "survey": survey }),
    ))
}
