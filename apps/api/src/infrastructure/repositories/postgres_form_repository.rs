use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::unique_violation;
use crate::domain::forms::{DynamicForm, FieldType, FormField, FormResponse};
use crate::domain::repositories::{FormRepository, RepositoryResult};

/// PostgreSQL implementation of FormRepository
pub struct PostgresFormRepository {
    pool: PgPool,
}

impl PostgresFormRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FieldRow {
    id: Uuid,
    form_id: Uuid,
    label: String,
    field_type: FieldType,
    required: bool,
    choices: Vec<String>,
    position: i32,
}

impl From<FieldRow> for FormField {
    fn from(r: FieldRow) -> Self {
        FormField {
            id: r.id,
            form_id: r.form_id,
            label: r.label,
            field_type: r.field_type,
            required: r.required,
            choices: r.choices,
            position: r.position,
        }
    }
}

const SELECT_FORM: &str = r#"
    SELECT id, league_id, title, description, is_active, created_at
    FROM dynamic_forms
"#;

#[async_trait]
impl FormRepository for PostgresFormRepository {
    async fn create_form(&self, form: &DynamicForm) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE dynamic_forms SET is_active = FALSE WHERE league_id = $1 AND is_active")
            .bind(form.league_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO dynamic_forms (id, league_id, title, description, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(form.id)
        .bind(form.league_id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.is_active)
        .bind(form.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_form(&self, id: Uuid) -> RepositoryResult<Option<DynamicForm>> {
        let row = sqlx::query_as::<_, DynamicForm>(&format!("{} WHERE id = $1", SELECT_FORM))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn active_form(&self, league_id: Uuid) -> RepositoryResult<Option<DynamicForm>> {
        let row = sqlx::query_as::<_, DynamicForm>(&format!(
            "{} WHERE league_id = $1 AND is_active",
            SELECT_FORM
        ))
        .bind(league_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn add_field(&self, field: &FormField) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO form_fields (id, form_id, label, field_type, required, choices, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(field.id)
        .bind(field.form_id)
        .bind(&field.label)
        .bind(field.field_type)
        .bind(field.required)
        .bind(&field.choices)
        .bind(field.position)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fields(&self, form_id: Uuid) -> RepositoryResult<Vec<FormField>> {
        let rows = sqlx::query_as::<_, FieldRow>(
            r#"
            SELECT id, form_id, label, field_type, required, choices, position
            FROM form_fields
            WHERE form_id = $1
            ORDER BY position, label
            "#,
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FormField::from).collect())
    }

    async fn save_response(&self, response: &FormResponse) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO form_responses (id, form_id, registration_id, answers, submitted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(response.id)
        .bind(response.form_id)
        .bind(response.registration_id)
        .bind(Json(&response.answers))
        .bind(response.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(unique_violation(
            "A response was already submitted for this registration",
        ))?;

        Ok(())
    }
}
