use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::{success, success_with};
use crate::{
    db::SurveyStatus,
    extractors::{AuthGuard, ClientInfo, JsonBody, QueryParams},
    models::{GeneralSubmissionBody, SubmissionBody},
    rejections::{AppError, ResultExt},
    services::responses::{Submission, SubmitOutcome},
    utils::{Page, PageQuery},
    validation::SubmissionRules,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/surveys/{id}/responses",
            get(list_responses).post(submit_to_survey),
        )
        .route(
            "/surveys/{id}/public",
            get(public_survey).post(submit_to_survey),
        )
        .route("/responses", post(submit_response))
}

async fn public_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let survey = state
        .db
        .find_survey(&survey_id)
        .await
        .reject("could not load survey")?
        .ok_or(AppError::NotFound("Survey"))?;

    if survey.status != SurveyStatus::Active {
        return Err(AppError::NotActive);
    }

    Ok(success(json!({
        "survey": {
            "id": survey.id,
            "title": survey.title,
            "description": survey.description,
            "questions": survey.questions,
        }
    })))
}

async fn submit_to_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
    ClientInfo(client): ClientInfo,
    JsonBody(body): JsonBody<SubmissionBody>,
) -> Result<impl IntoResponse, AppError> {
    let answers = body
        .answers
        .ok_or_else(|| AppError::input("Answers are required"))?;

    let submission = Submission {
        respondent: body.respondent.unwrap_or_default().into(),
        answers,
        client,
    };

    submit(&state, &survey_id, submission, &SubmissionRules::SURVEY_SCOPED).await
}

async fn submit_response(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    JsonBody(body): JsonBody<GeneralSubmissionBody>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(survey_id), Some(answers)) = (
        body.survey_id.filter(|id| !id.trim().is_empty()),
        body.answers,
    ) else {
        return Err(AppError::input("Survey ID and answers are required"));
    };

    let submission = Submission {
        respondent: body.respondent.unwrap_or_default().into(),
        answers,
        client,
    };

    submit(&state, &survey_id, submission, &SubmissionRules::GENERAL).await
}

async fn submit(
    state: &AppState,
    survey_id: &str,
    submission: Submission,
    rules: &SubmissionRules,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .responses
        .submit(survey_id, submission, rules)
        .await
        .reject("could not record response")?;

    match outcome {
        SubmitOutcome::Created(response_id) => Ok((
            StatusCode::CREATED,
            success_with(
                "Response submitted successfully",
                json!({ "response_id": response_id }),
            ),
        )),
        SubmitOutcome::SurveyNotFound => Err(AppError::NotFound("Survey")),
        SubmitOutcome::SurveyNotActive => Err(AppError::NotActive),
        SubmitOutcome::Rejected(rejection) => Err(AppError::Input(rejection.message)),
    }
}

async fn list_responses(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
    QueryParams(page): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::from(page);

    state
        .db
        .find_owned_survey(&survey_id, user_id)
        .await
        .reject("could not load survey")?
        .ok_or(AppError::NotFound("Survey"))?;

    let (responses, total) = state
        .db
        .responses_page(&survey_id, page)
        .await
        .reject("could not list responses")?;

    Ok(success(json!({
        "responses": responses,
        "pagination": page.summary(total),
    })))
}
