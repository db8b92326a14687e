// Database model structs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::questions::Question;
use crate::validation::Answers;

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Draft,
    Active,
    Completed,
}

impl SurveyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SurveyStatus::Draft => "draft",
            SurveyStatus::Active => "active",
            SurveyStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SurveyStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "draft" => Ok(SurveyStatus::Draft),
            "active" => Ok(SurveyStatus::Active),
            "completed" => Ok(SurveyStatus::Completed),
            _ => Err(UnknownVariant {
                kind: "survey status",
                value,
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: String,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: SurveyStatus,
    #[sqlx(json)]
    pub questions: Vec<Question>,
    pub responses_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Title, description and checked questions of a survey being created or
/// edited.
pub struct SurveyDraft {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
}

/// Who is answering. Anything besides email and name lands in `metadata`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RespondentInfo {
    pub email: Option<String>,
    pub name: Option<String>,
    pub metadata: Map<String, Value>,
}

/// A validated submission ready to be stored.
#[derive(Clone, Debug, PartialEq)]
pub struct NewResponse {
    pub survey_id: String,
    pub respondent: RespondentInfo,
    pub answers: Answers,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded {
        response_id: String,
        respondent_id: String,
    },
    /// The survey left the active state before the write landed.
    SurveyNotActive,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub id: String,
    pub survey_id: String,
    pub respondent_id: String,
    #[sqlx(json)]
    pub answers: Answers,
    pub completed_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResponseWithRespondent {
    pub id: String,
    pub survey_id: String,
    pub respondent_id: String,
    pub respondent_email: Option<String>,
    pub respondent_name: Option<String>,
    #[sqlx(json)]
    pub answers: Answers,
    pub completed_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RespondentSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub surveys: i64,
    pub last_active: DateTime<Utc>,
    #[sqlx(json)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
pub enum TemplateKind {
    #[serde(rename = "Pre-Purchase")]
    PrePurchase,
    #[serde(rename = "Post-Purchase")]
    PostPurchase,
}

impl TemplateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::PrePurchase => "Pre-Purchase",
            TemplateKind::PostPurchase => "Post-Purchase",
        }
    }
}

impl TryFrom<String> for TemplateKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Pre-Purchase" => Ok(TemplateKind::PrePurchase),
            "Post-Purchase" => Ok(TemplateKind::PostPurchase),
            _ => Err(UnknownVariant {
                kind: "template type",
                value,
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: TemplateKind,
    #[sqlx(json)]
    pub questions: Vec<Question>,
    #[sqlx(json)]
    pub features: Vec<String>,
    pub time: String,
    pub usage_count: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: TemplateKind,
    pub questions: Vec<Question>,
    pub features: Vec<String>,
    pub time: String,
}
