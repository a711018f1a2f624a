use serde::Serialize;
use uuid::Uuid;

use super::value_objects::PersonalDetails;
use crate::domain::errors::DomainResult;

/// A person playing in a league, on a team or not
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub is_active: bool,
}

impl Player {
    pub fn new(details: PersonalDetails, user_id: Option<Uuid>, team_id: Option<Uuid>) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            details: details.normalized()?,
            user_id,
            team_id,
            is_active: true,
        })
    }

    pub fn is_free_agent(&self) -> bool {
        self.team_id.is_none()
    }

    pub fn full_name(&self) -> String {
        self.details.full_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Email;
    use chrono::NaiveDate;

    fn details() -> PersonalDetails {
        PersonalDetails {
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            email: Email::new("ana@example.com").unwrap(),
            phone_number: "555".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            parent_name: None,
            membership_number: None,
            is_member: false,
        }
    }

    #[test]
    fn player_without_team_is_free_agent() {
        let player = Player::new(details(), None, None).unwrap();
        assert!(player.is_free_agent());
        assert!(player.is_active);
    }

    #[test]
    fn player_on_team() {
        let team_id = Uuid::new_v4();
        let player = Player::new(details(), None, Some(team_id)).unwrap();
        assert!(!player.is_free_agent());
        assert_eq!(player.full_name(), "Ana Ruiz");
    }

    #[test]
    fn player_requires_phone() {
        let mut d = details();
        d.phone_number = String::new();
        assert!(Player::new(d, None, None).is_err());
    }
}
