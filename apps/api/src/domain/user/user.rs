use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::value_objects::{Email, UserType};
use crate::domain::errors::{require_text, DomainResult};

/// An account that can sign in
///
/// Captaincy is not stored on the user; it is derived from `TeamCaptain`
/// rows (see `TeamRepository::is_captain`).
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Creates an active customer account
    pub fn new_customer(
        username: &str,
        email: Email,
        password_hash: String,
        first_name: &str,
        last_name: &str,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            username: require_text(username, "Username")?,
            email,
            password_hash,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            user_type: UserType::Customer,
            phone_number: None,
            date_of_birth: None,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
