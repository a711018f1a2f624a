use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{require_text, DomainResult};
use crate::domain::user::Email;

/// Identity and contact data shared by players and free agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub membership_number: Option<String>,
    #[serde(default)]
    pub is_member: bool,
}

impl PersonalDetails {
    /// Trims names and drops blank optional fields
    pub fn normalized(self) -> DomainResult<Self> {
        let blank_to_none = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Ok(Self {
            first_name: require_text(&self.first_name, "First name")?,
            last_name: require_text(&self.last_name, "Last name")?,
            email: self.email,
            phone_number: require_text(&self.phone_number, "Phone number")?,
            date_of_birth: self.date_of_birth,
            parent_name: blank_to_none(self.parent_name),
            membership_number: blank_to_none(self.membership_number),
            is_member: self.is_member,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Where a free agent stands in the search for a team
///
/// # Status Transitions
/// ```text
/// Available -> Invited -> Joined
///     ^           |
///     +-----------+          (last pending invitation declined/cancelled)
/// Available | Invited -> Inactive -> Available
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "free_agent_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FreeAgentStatus {
    Available,
    Invited,
    Joined,
    Inactive,
}

impl FreeAgentStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// Invited -> Invited is allowed: a free agent may hold several pending
    /// invitations from different teams.
    pub fn can_transition_to(&self, next: FreeAgentStatus) -> bool {
        use FreeAgentStatus::*;
        matches!(
            (self, next),
            (Available, Invited)
                | (Invited, Invited)
                | (Invited, Joined)
                | (Invited, Available)
                | (Available, Inactive)
                | (Invited, Inactive)
                | (Inactive, Available)
        )
    }

    /// Whether captains may still send invitations
    pub fn is_invitable(&self) -> bool {
        matches!(self, FreeAgentStatus::Available | FreeAgentStatus::Invited)
    }
}

impl fmt::Display for FreeAgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeAgentStatus::Available => write!(f, "AVAILABLE"),
            FreeAgentStatus::Invited => write!(f, "INVITED"),
            FreeAgentStatus::Joined => write!(f, "JOINED"),
            FreeAgentStatus::Inactive => write!(f, "INACTIVE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FreeAgentStatus::*;

    #[test]
    fn valid_transitions() {
        assert!(Available.can_transition_to(Invited));
        assert!(Invited.can_transition_to(Invited));
        assert!(Invited.can_transition_to(Joined));
        assert!(Invited.can_transition_to(Available));
        assert!(Available.can_transition_to(Inactive));
        assert!(Inactive.can_transition_to(Available));
    }

    #[test]
    fn joined_is_final() {
        for next in [Available, Invited, Joined, Inactive] {
            assert!(!Joined.can_transition_to(next));
        }
    }

    #[test]
    fn available_cannot_join_directly() {
        assert!(!Available.can_transition_to(Joined));
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Available).unwrap(), "\"AVAILABLE\"");
        assert_eq!(Inactive.to_string(), "INACTIVE");
    }

    #[test]
    fn normalized_drops_blank_optionals() {
        let details = PersonalDetails {
            first_name: " Sam ".to_string(),
            last_name: "Lee".to_string(),
            email: Email::new("sam@example.com").unwrap(),
            phone_number: "555-0100".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2010, 5, 4).unwrap(),
            parent_name: Some("  ".to_string()),
            membership_number: Some(" M-1 ".to_string()),
            is_member: true,
        }
        .normalized()
        .unwrap();

        assert_eq!(details.first_name, "Sam");
        assert_eq!(details.parent_name, None);
        assert_eq!(details.membership_number.as_deref(), Some("M-1"));
        assert_eq!(details.full_name(), "Sam Lee");
    }
}
