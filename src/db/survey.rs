use chrono::Utc;
use color_eyre::Result;
use sqlx::types::Json;
use ulid::Ulid;

use super::models::{Survey, SurveyDraft, SurveyStatus};
use super::Db;
use crate::utils::Page;

const SURVEY_COLUMNS: &str = "id, user_id, title, description, status, questions, \
     responses_count, created_at, updated_at, published_at";

/// Filters for the owner's survey list. `status` is matched verbatim, so an
/// unknown value selects nothing.
#[derive(Debug, Clone, Default)]
pub struct SurveyFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

impl Db {
    pub async fn create_survey(&self, user_id: i64, draft: SurveyDraft) -> Result<Survey> {
        let id = Ulid::new().to_string();
        let now = Utc::now();

        let survey = sqlx::query_as::<_, Survey>(&format!(
            r#"
            INSERT INTO surveys (id, user_id, title, description, status, questions,
                                 responses_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'draft', ?, 0, ?, ?)
            RETURNING {SURVEY_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(Json(&draft.questions))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("new survey created with id: {id} for user_id: {user_id}");
        Ok(survey)
    }

    /// Owner's surveys, newest first, plus the unpaginated total.
    pub async fn surveys(
        &self,
        user_id: i64,
        filter: &SurveyFilter,
        page: Page,
    ) -> Result<(Vec<Survey>, i64)> {
        let status = filter.status.as_deref().filter(|s| !s.is_empty());
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let conditions = r#"
            WHERE user_id = ?1
              AND (?2 IS NULL OR status = ?2)
              AND (?3 IS NULL
                   OR instr(lower(title), ?3) > 0
                   OR instr(lower(COALESCE(description, '')), ?3) > 0)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM surveys {conditions}"))
            .bind(user_id)
            .bind(status)
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await?;

        let surveys = sqlx::query_as::<_, Survey>(&format!(
            r#"
            SELECT {SURVEY_COLUMNS} FROM surveys
            {conditions}
            ORDER BY created_at DESC, id DESC
            LIMIT ?4 OFFSET ?5
            "#
        ))
        .bind(user_id)
        .bind(status)
        .bind(search.as_deref())
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((surveys, total))
    }

    pub async fn find_survey(&self, survey_id: &str) -> Result<Option<Survey>> {
        let survey =
            sqlx::query_as::<_, Survey>(&format!("SELECT {SURVEY_COLUMNS} FROM surveys WHERE id = ?"))
                .bind(survey_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(survey)
    }

    /// A survey that belongs to `user_id`; someone else's survey reads as absent.
    pub async fn find_owned_survey(&self, survey_id: &str, user_id: i64) -> Result<Option<Survey>> {
        let survey = sqlx::query_as::<_, Survey>(&format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys WHERE id = ? AND user_id = ?"
        ))
        .bind(survey_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(survey)
    }

    /// Replace the editable content of a draft survey. `None` when the survey
    /// is missing, not owned, or no longer a draft.
    pub async fn update_survey(
        &self,
        survey_id: &str,
        user_id: i64,
        draft: SurveyDraft,
    ) -> Result<Option<Survey>> {
        let survey = sqlx::query_as::<_, Survey>(&format!(
            r#"
            UPDATE surveys
            SET title = ?, description = ?, questions = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND status = 'draft'
            RETURNING {SURVEY_COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(Json(&draft.questions))
        .bind(Utc::now())
        .bind(survey_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if survey.is_some() {
            tracing::info!("survey updated with id: {survey_id} by user_id: {user_id}");
        }
        Ok(survey)
    }

    /// Move a survey between draft and active. Publishing stamps `published_at`.
    pub async fn set_survey_status(
        &self,
        survey_id: &str,
        user_id: i64,
        status: SurveyStatus,
    ) -> Result<Option<Survey>> {
        let now = Utc::now();
        let survey = sqlx::query_as::<_, Survey>(&format!(
            r#"
            UPDATE surveys
            SET status = ?1,
                updated_at = ?2,
                published_at = CASE WHEN ?1 = 'active' THEN ?2 ELSE published_at END
            WHERE id = ?3 AND user_id = ?4
            RETURNING {SURVEY_COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(now)
        .bind(survey_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if survey.is_some() {
            tracing::info!("survey {survey_id} is now {status} (user_id: {user_id})");
        }
        Ok(survey)
    }

    /// Deletes the survey; its responses go with it.
    pub async fn delete_survey(&self, survey_id: &str, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = ? AND user_id = ?")
            .bind(survey_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("survey deleted with id: {survey_id} by user_id: {user_id}");
        }
        Ok(deleted)
    }
}
