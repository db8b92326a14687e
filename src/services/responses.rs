use std::future::Future;

use color_eyre::Result;
use serde_json::{Map, Value};

use crate::db::{Db, NewResponse, RecordOutcome, RespondentInfo, Survey, SurveyStatus};
use crate::validation::{validate_submission, AnswerRejection, SubmissionRules};

// ---------------------------------------------------------------------------
// ResponseRepository trait
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait ResponseRepository: Send + Sync {
    fn find_survey(&self, survey_id: &str) -> impl Future<Output = Result<Option<Survey>>> + Send;

    fn record_response(
        &self,
        response: NewResponse,
    ) -> impl Future<Output = Result<RecordOutcome>> + Send;
}

impl ResponseRepository for Db {
    async fn find_survey(&self, survey_id: &str) -> Result<Option<Survey>> {
        Db::find_survey(self, survey_id).await
    }

    async fn record_response(&self, response: NewResponse) -> Result<RecordOutcome> {
        Db::record_response(self, response).await
    }
}

// ---------------------------------------------------------------------------
// Inputs and outcomes
// ---------------------------------------------------------------------------

/// Where a submission came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub respondent: RespondentInfo,
    pub answers: Map<String, Value>,
    pub client: ClientMeta,
}

#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Stored; carries the new response id.
    Created(String),
    SurveyNotFound,
    SurveyNotActive,
    Rejected(AnswerRejection),
}

// ---------------------------------------------------------------------------
// ResponseService
// ---------------------------------------------------------------------------

pub struct ResponseService<R: ResponseRepository = Db> {
    repo: R,
}

impl<R: ResponseRepository + Clone> Clone for ResponseService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: ResponseRepository> ResponseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validate a submission against the survey's questions and store it.
    /// Nothing is written unless every answer passes.
    pub async fn submit(
        &self,
        survey_id: &str,
        submission: Submission,
        rules: &SubmissionRules,
    ) -> Result<SubmitOutcome> {
        let Some(survey) = self.repo.find_survey(survey_id).await? else {
            return Ok(SubmitOutcome::SurveyNotFound);
        };

        if survey.status != SurveyStatus::Active {
            return Ok(SubmitOutcome::SurveyNotActive);
        }

        let answers = match validate_submission(&survey.questions, &submission.answers, rules) {
            Ok(answers) => answers,
            Err(rejection) => {
                tracing::warn!(
                    "submission to survey {survey_id} rejected at question {}: {rejection}",
                    rejection.question_id
                );
                return Ok(SubmitOutcome::Rejected(rejection));
            }
        };

        let outcome = self
            .repo
            .record_response(NewResponse {
                survey_id: survey.id,
                respondent: submission.respondent,
                answers,
                ip_address: submission.client.ip_address,
                user_agent: submission.client.user_agent,
            })
            .await?;

        Ok(match outcome {
            RecordOutcome::Recorded { response_id, .. } => SubmitOutcome::Created(response_id),
            RecordOutcome::SurveyNotActive => SubmitOutcome::SurveyNotActive,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
