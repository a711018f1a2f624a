use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::value_objects::{FreeAgentStatus, PersonalDetails};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::league::League;

/// A user's profile in one league while looking for a team
///
/// # Invariants
/// - One profile per user per league (enforced by storage)
/// - The division is offered by the league
/// - Status changes follow [`FreeAgentStatus::can_transition_to`]
#[derive(Debug, Clone, Serialize)]
pub struct FreeAgent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub league_id: Uuid,
    pub division_id: Uuid,
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub notes: String,
    pub status: FreeAgentStatus,
    pub created_at: DateTime<Utc>,
}

impl FreeAgent {
    pub fn register(
        user_id: Uuid,
        league: &League,
        division_id: Uuid,
        details: PersonalDetails,
        notes: &str,
    ) -> DomainResult<Self> {
        if !league.offers_division(division_id) {
            return Err(DomainError::validation(
                "Selected division is not available in this league",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            league_id: league.id(),
            division_id,
            details: details.normalized()?,
            notes: notes.trim().to_string(),
            status: FreeAgentStatus::Available,
            created_at: Utc::now(),
        })
    }

    pub fn transition_to(&mut self, next: FreeAgentStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::transition("free agent", self.status, next));
        }
        self.status = next;
        Ok(())
    }

    pub fn mark_invited(&mut self) -> DomainResult<()> {
        self.transition_to(FreeAgentStatus::Invited)
    }

    pub fn mark_joined(&mut self) -> DomainResult<()> {
        self.transition_to(FreeAgentStatus::Joined)
    }

    /// Back to the pool once no invitation is outstanding
    pub fn release(&mut self) -> DomainResult<()> {
        match self.status {
            FreeAgentStatus::Invited => self.transition_to(FreeAgentStatus::Available),
            _ => Ok(()),
        }
    }

    pub fn full_name(&self) -> String {
        self.details.full_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::league::{Division, LeaguePricing, LeagueSchedule};
    use crate::domain::user::Email;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn details() -> PersonalDetails {
        PersonalDetails {
            first_name: "Kai".to_string(),
            last_name: "Moss".to_string(),
            email: Email::new("kai@example.com").unwrap(),
            phone_number: "555".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1999, 9, 9).unwrap(),
            parent_name: None,
            membership_number: None,
            is_member: true,
        }
    }

    fn league(division: &Division) -> League {
        let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day).unwrap();
        let mut league = League::new(
            division.sport_id,
            "Winter",
            "",
            LeagueSchedule {
                registration_start_date: d(1, 1),
                registration_end_date: d(1, 31),
                early_registration_deadline: d(1, 10),
                league_start_date: d(2, 1),
                league_end_date: d(3, 1),
            },
            LeaguePricing {
                regular_registration_price: Decimal::ONE,
                early_registration_price: Decimal::ONE,
            },
            None,
            None,
        )
        .unwrap();
        league.set_divisions(&[division.clone()]).unwrap();
        league
    }

    #[test]
    fn register_starts_available() {
        let division = Division::new(Uuid::new_v4(), "Open", "", "").unwrap();
        let agent = FreeAgent::register(Uuid::new_v4(), &league(&division), division.id, details(), "").unwrap();
        assert_eq!(agent.status, FreeAgentStatus::Available);
    }

    #[test]
    fn register_rejects_unoffered_division() {
        let division = Division::new(Uuid::new_v4(), "Open", "", "").unwrap();
        let result = FreeAgent::register(Uuid::new_v4(), &league(&division), Uuid::new_v4(), details(), "");
        assert!(result.is_err());
    }

    #[test]
    fn invite_then_join() {
        let division = Division::new(Uuid::new_v4(), "Open", "", "").unwrap();
        let mut agent = FreeAgent::register(Uuid::new_v4(), &league(&division), division.id, details(), "").unwrap();

        agent.mark_invited().unwrap();
        agent.mark_invited().unwrap();
        agent.mark_joined().unwrap();
        assert_eq!(agent.status, FreeAgentStatus::Joined);
        assert!(agent.mark_invited().is_err());
    }

    #[test]
    fn release_only_moves_invited() {
        let division = Division::new(Uuid::new_v4(), "Open", "", "").unwrap();
        let mut agent = FreeAgent::register(Uuid::new_v4(), &league(&division), division.id, details(), "").unwrap();

        agent.release().unwrap();
        assert_eq!(agent.status, FreeAgentStatus::Available);

        agent.mark_invited().unwrap();
        agent.release().unwrap();
        assert_eq!(agent.status, FreeAgentStatus::Available);
    }
}
