use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::{require_text, DomainError, DomainResult};
use crate::domain::user::{Email, User};

/// Contact details of the person running a team
///
/// A captain may exist before the person has an account; the captain is
/// linked to a user once that user claims the team with a matching email.
#[derive(Debug, Clone, Serialize)]
pub struct TeamCaptain {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: String,
    pub user_id: Option<Uuid>,
    pub is_system_captain: bool,
    pub created_at: DateTime<Utc>,
}

impl TeamCaptain {
    pub fn new(first_name: &str, last_name: &str, email: Email, phone_number: &str) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            first_name: require_text(first_name, "Captain first name")?,
            last_name: require_text(last_name, "Captain last name")?,
            email,
            phone_number: phone_number.trim().to_string(),
            user_id: None,
            is_system_captain: false,
            created_at: Utc::now(),
        })
    }

    /// Placeholder captain for teams created without one
    pub fn system() -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: "System".to_string(),
            last_name: "Admin".to_string(),
            email: Email::from_static("admin@example.com"),
            phone_number: "000-000-0000".to_string(),
            user_id: None,
            is_system_captain: true,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// True when the user is linked, or the captain is unlinked and shares the user's email
    pub fn is_held_by(&self, user: &User) -> bool {
        match self.user_id {
            Some(id) => id == user.id,
            None => !self.is_system_captain && self.email == user.email,
        }
    }

    /// True when `user` may link this captain to their account
    pub fn is_claimable_by(&self, user: &User) -> bool {
        self.user_id.is_none() && !self.is_system_captain && self.email == user.email
    }

    /// Links the captain to the user
    pub fn claim(&mut self, user: &User) -> DomainResult<()> {
        if !self.is_claimable_by(user) {
            return Err(DomainError::validation(
                "You are not authorized to claim this team.",
            ));
        }
        self.user_id = Some(user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new_customer("u", Email::new(email).unwrap(), "h".to_string(), "U", "Ser").unwrap()
    }

    fn captain(email: &str) -> TeamCaptain {
        TeamCaptain::new("Casey", "Cap", Email::new(email).unwrap(), "555").unwrap()
    }

    #[test]
    fn unlinked_captain_held_by_matching_email() {
        let cap = captain("casey@example.com");
        assert!(cap.is_held_by(&user("Casey@example.com")));
        assert!(!cap.is_held_by(&user("other@example.com")));
    }

    #[test]
    fn linked_captain_held_only_by_user() {
        let owner = user("casey@example.com");
        let mut cap = captain("casey@example.com");
        cap.claim(&owner).unwrap();

        assert_eq!(cap.user_id, Some(owner.id));
        assert!(cap.is_held_by(&owner));
        // same email, different account
        assert!(!cap.is_held_by(&user("casey@example.com")));
    }

    #[test]
    fn claim_requires_matching_email_and_unlinked() {
        let mut cap = captain("casey@example.com");
        assert!(cap.claim(&user("x@example.com")).is_err());

        cap.claim(&user("casey@example.com")).unwrap();
        assert!(cap.claim(&user("casey@example.com")).is_err());
    }

    #[test]
    fn system_captain_is_never_claimable() {
        let cap = TeamCaptain::system();
        assert!(cap.is_system_captain);
        assert!(!cap.is_claimable_by(&user("admin@example.com")));
        assert!(!cap.is_held_by(&user("admin@example.com")));
    }
}
