use chrono::Utc;
use color_eyre::Result;
use sqlx::types::Json;
use ulid::Ulid;

use super::models::{NewResponse, RecordOutcome, ResponseRecord, ResponseWithRespondent};
use super::respondent::resolve_respondent;
use super::Db;
use crate::utils::Page;

const RESPONSE_WITH_RESPONDENT: &str = r#"
    SELECT
        rs.id AS id,
        rs.survey_id AS survey_id,
        rs.respondent_id AS respondent_id,
        r.email AS respondent_email,
        r.name AS respondent_name,
        rs.answers AS answers,
        rs.completed_at AS completed_at,
        rs.ip_address AS ip_address,
        rs.user_agent AS user_agent
    FROM responses rs
    JOIN respondents r ON r.id = rs.respondent_id
    WHERE rs.survey_id = ?1
"#;

impl Db {
    /// Store an already validated submission.
    ///
    /// The survey's counter bump, the respondent upsert and the response row
    /// commit together. The bump only matches an active survey, so a survey
    /// unpublished between validation and write is reported as
    /// [`RecordOutcome::SurveyNotActive`] and nothing is stored.
    pub async fn record_response(&self, response: NewResponse) -> Result<RecordOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query(
            r#"
            UPDATE surveys
            SET responses_count = responses_count + 1, updated_at = ?1
            WHERE id = ?2 AND status = 'active'
            "#,
        )
        .bind(now)
        .bind(&response.survey_id)
        .execute(&mut *tx)
        .await?;

        if bumped.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::warn!(
                "response dropped, survey {} is not active",
                response.survey_id
            );
            return Ok(RecordOutcome::SurveyNotActive);
        }

        let respondent_id = resolve_respondent(&mut tx, &response.respondent).await?;

        let response_id = Ulid::new().to_string();
        sqlx::query(
            r#"
            INSERT INTO responses (id, survey_id, respondent_id, answers, completed_at,
                                   ip_address, user_agent)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&response_id)
        .bind(&response.survey_id)
        .bind(&respondent_id)
        .bind(Json(&response.answers))
        .bind(now)
        .bind(response.ip_address.as_deref())
        .bind(response.user_agent.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "response {response_id} recorded for survey {} (respondent {respondent_id})",
            response.survey_id
        );
        Ok(RecordOutcome::Recorded {
            response_id,
            respondent_id,
        })
    }

    /// One page of a survey's responses, newest first.
    pub async fn responses_page(
        &self,
        survey_id: &str,
        page: Page,
    ) -> Result<(Vec<ResponseWithRespondent>, i64)> {
        let total = self.count_responses(survey_id).await?;

        let responses = sqlx::query_as::<_, ResponseWithRespondent>(&format!(
            "{RESPONSE_WITH_RESPONDENT} ORDER BY rs.completed_at DESC, rs.id DESC LIMIT ?2 OFFSET ?3"
        ))
        .bind(survey_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((responses, total))
    }

    /// Every response of a survey, oldest first.
    pub async fn responses_for_survey(&self, survey_id: &str) -> Result<Vec<ResponseRecord>> {
        let responses = sqlx::query_as::<_, ResponseRecord>(
            r#"
            SELECT id, survey_id, respondent_id, answers, completed_at, ip_address, user_agent
            FROM responses
            WHERE survey_id = ?
            ORDER BY completed_at ASC, id ASC
            "#,
        )
        .bind(survey_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(responses)
    }

    pub async fn responses_for_export(
        &self,
        survey_id: &str,
    ) -> Result<Vec<ResponseWithRespondent>> {
        let responses = sqlx::query_as::<_, ResponseWithRespondent>(&format!(
            "{RESPONSE_WITH_RESPONDENT} ORDER BY rs.completed_at ASC, rs.id ASC"
        ))
        .bind(survey_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(responses)
    }

    pub async fn count_responses(&self, survey_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE survey_id = ?")
            .bind(survey_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
