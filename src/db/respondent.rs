use chrono::Utc;
use color_eyre::Result;
use sqlx::{types::Json, SqliteConnection};
use ulid::Ulid;

use super::models::{RespondentInfo, RespondentSummary};
use super::Db;
use crate::utils::{normalize_email, Page};

/// Resolve the respondent for an accepted submission.
///
/// With an email this is a single upsert against the unique email index, so
/// concurrent submissions sharing an email land on one row. Without an email
/// every call creates a fresh respondent.
pub(super) async fn resolve_respondent(
    conn: &mut SqliteConnection,
    info: &RespondentInfo,
) -> Result<String> {
    let now = Utc::now();
    let email = info
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty());
    let name = info
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let id: String = match email {
        Some(email) => {
            sqlx::query_scalar(
                r#"
                INSERT INTO respondents (id, email, name, metadata, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ON CONFLICT(email) DO UPDATE SET
                    name = COALESCE(excluded.name, respondents.name),
                    metadata = json_patch(respondents.metadata, excluded.metadata),
                    updated_at = excluded.updated_at
                RETURNING id
                "#,
            )
            .bind(Ulid::new().to_string())
            .bind(email)
            .bind(name)
            .bind(Json(&info.metadata))
            .bind(now)
            .fetch_one(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_scalar(
                r#"
                INSERT INTO respondents (id, email, name, metadata, created_at, updated_at)
                VALUES (?1, NULL, ?2, ?3, ?4, ?4)
                RETURNING id
                "#,
            )
            .bind(Ulid::new().to_string())
            .bind(name)
            .bind(Json(&info.metadata))
            .bind(now)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    Ok(id)
}

impl Db {
    /// Respondents who answered any of `user_id`'s surveys, most recently
    /// updated first, with their response count and last activity.
    pub async fn respondents(
        &self,
        user_id: i64,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<RespondentSummary>, i64)> {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let owned = r#"
            FROM respondents r
            JOIN responses rs ON rs.respondent_id = r.id
            JOIN surveys s ON s.id = rs.survey_id AND s.user_id = ?1
            WHERE ?2 IS NULL
               OR instr(lower(COALESCE(r.name, '')), ?2) > 0
               OR instr(lower(COALESCE(r.email, '')), ?2) > 0
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(DISTINCT r.id) {owned}"))
                .bind(user_id)
                .bind(search.as_deref())
                .fetch_one(&self.pool)
                .await?;

        let respondents = sqlx::query_as::<_, RespondentSummary>(&format!(
            r#"
            SELECT
                r.id AS id,
                r.name AS name,
                r.email AS email,
                COUNT(rs.id) AS surveys,
                MAX(rs.completed_at) AS last_active,
                r.metadata AS metadata,
                r.created_at AS created_at,
                r.updated_at AS updated_at
            {owned}
            GROUP BY r.id
            ORDER BY r.updated_at DESC, r.id DESC
            LIMIT ?3 OFFSET ?4
            "#
        ))
        .bind(user_id)
        .bind(search.as_deref())
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((respondents, total))
    }
}
