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
    db::{NewTemplate, TemplateKind},
    extractors::{AuthGuard, JsonBody},
    models::TemplateBody,
    questions::check_questions,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/{id}/use", post(use_template))
}

async fn list_templates(
    AuthGuard(_): AuthGuard,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let templates = state
        .db
        .templates()
        .await
        .reject("could not list templates")?;

    Ok(success(json!({ "templates": templates })))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::input(format!("Template {field} is required")))
}

fn new_template(body: TemplateBody) -> Result<NewTemplate, AppError> {
    let kind = required(body.kind, "type")?;
    let kind = TemplateKind::try_from(kind)
        .map_err(|_| AppError::input("Template type must be Pre-Purchase or Post-Purchase"))?;

    Ok(NewTemplate {
        id: required(body.id, "id")?,
        title: required(body.title, "title")?,
        description: required(body.description, "description")?,
        kind,
        questions: check_questions(body.questions).map_err(|e| AppError::input(e.to_string()))?,
        features: body.features,
        time: required(body.time, "time")?,
    })
}

async fn create_template(
    AuthGuard(user_id): AuthGuard,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TemplateBody>,
) -> Result<impl IntoResponse, AppError> {
    let template = new_template(body)?;
    let template_id = template.id.clone();

    let created = state
        .db
        .create_template(user_id, template)
        .await
        .reject("could not create template")?
        .ok_or_else(|| AppError::input(format!("Template {template_id} already exists")))?;

    Ok((
        StatusCode::CREATED,
        success_with("Template created successfully", json!({ "template": created })),
    ))
}

async fn use_template(
    AuthGuard(_): AuthGuard,
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let template = state
        .db
        .use_template(&template_id)
        .await
        .reject("could not use template")?
        .ok_or(AppError::NotFound("Template"))?;

    tracing::info!(
        "template {template_id} used, count now {}",
        template.usage_count
    );
    Ok(success(json!({ "template": template })))
}
