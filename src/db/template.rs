use chrono::Utc;
use color_eyre::Result;
use sqlx::types::Json;

use super::models::{NewTemplate, Template};
use super::Db;

const TEMPLATE_COLUMNS: &str = "id, title, description, kind, questions, features, time, \
     usage_count, created_by, created_at, updated_at";

impl Db {
    /// All templates, most used first.
    pub async fn templates(&self) -> Result<Vec<Template>> {
        let templates = sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates ORDER BY usage_count DESC, created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// `None` when a template with the same id already exists.
    pub async fn create_template(
        &self,
        user_id: i64,
        template: NewTemplate,
    ) -> Result<Option<Template>> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Template>(&format!(
            r#"
            INSERT INTO templates (id, title, description, kind, questions, features, time,
                                   usage_count, created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?9)
            ON CONFLICT(id) DO NOTHING
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(&template.id)
        .bind(&template.title)
        .bind(&template.description)
        .bind(template.kind.as_str())
        .bind(Json(&template.questions))
        .bind(Json(&template.features))
        .bind(&template.time)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if created.is_some() {
            tracing::info!("template {} created by user_id: {user_id}", template.id);
        }
        Ok(created)
    }

    /// Count one more use of a template. `None` when it does not exist.
    pub async fn use_template(&self, template_id: &str) -> Result<Option<Template>> {
        let template = sqlx::query_as::<_, Template>(&format!(
            r#"
            UPDATE templates
            SET usage_count = usage_count + 1, updated_at = ?1
            WHERE id = ?2
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(Utc::now())
        .bind(template_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }
}
