use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::forms::{DynamicForm, FormField, FormResponse};

/// Repository trait for per-league registration forms
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Insert a form and deactivate the league's other forms
    async fn create_form(&self, form: &DynamicForm) -> RepositoryResult<()>;

    async fn find_form(&self, id: Uuid) -> RepositoryResult<Option<DynamicForm>>;

    async fn active_form(&self, league_id: Uuid) -> RepositoryResult<Option<DynamicForm>>;

    async fn add_field(&self, field: &FormField) -> RepositoryResult<()>;

    /// Fields ordered by position
    async fn fields(&self, form_id: Uuid) -> RepositoryResult<Vec<FormField>>;

    /// Insert; one response per form and registration
    async fn save_response(&self, response: &FormResponse) -> RepositoryResult<()>;
}
