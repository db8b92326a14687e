// Request payloads. Fields are optional where a missing value gets its own
// error message instead of a generic body rejection.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::db::RespondentInfo;
use crate::questions::QuestionDraft;

#[derive(Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SurveyBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

#[derive(Deserialize)]
pub struct SurveyListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// `respondent` as sent by a survey taker. Unknown keys are kept as metadata.
#[derive(Debug, Default, Deserialize)]
pub struct RespondentBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl From<RespondentBody> for RespondentInfo {
    fn from(body: RespondentBody) -> Self {
        RespondentInfo {
            email: body.email,
            name: body.name,
            metadata: body.metadata,
        }
    }
}

#[derive(Deserialize)]
pub struct SubmissionBody {
    #[serde(default)]
    pub respondent: Option<RespondentBody>,
    #[serde(default)]
    pub answers: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSubmissionBody {
    #[serde(default)]
    pub survey_id: Option<String>,
    #[serde(default)]
    pub respondent: Option<RespondentBody>,
    #[serde(default)]
    pub answers: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct TemplateBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub time: Option<String>,
}
