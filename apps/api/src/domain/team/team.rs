use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::SignupCode;
use crate::domain::errors::{require_text, DomainError, DomainResult};
use crate::domain::league::{Division, League};

/// Team aggregate root
///
/// A team plays in one league and one division and is run by a captain.
///
/// # Invariants
/// - Name cannot be empty
/// - The division belongs to the league's sport
/// - The division is offered by the league
/// - The signup code is well formed (uniqueness is enforced by storage)
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use league_signup_api::domain::league::{Division, League, LeaguePricing, LeagueSchedule};
/// use league_signup_api::domain::team::{value_objects::SignupCode, Team};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day).unwrap();
/// let sport_id = Uuid::new_v4();
/// let division = Division::new(sport_id, "Open", "", "").unwrap();
/// let mut league = League::new(
///     sport_id,
///     "Summer",
///     "",
///     LeagueSchedule {
///         registration_start_date: d(4, 1),
///         registration_end_date: d(5, 1),
///         early_registration_deadline: d(4, 15),
///         league_start_date: d(5, 10),
///         league_end_date: d(8, 1),
///     },
///     LeaguePricing {
///         regular_registration_price: Decimal::new(100, 0),
///         early_registration_price: Decimal::new(80, 0),
///     },
///     None,
///     None,
/// )
/// .unwrap();
/// league.set_divisions(&[division.clone()]).unwrap();
///
/// let team = Team::new("Hawks", &league, &division, Uuid::new_v4(), SignupCode::random())
///     .expect("valid team");
/// assert_eq!(team.name(), "Hawks");
/// ```
#[derive(Debug, Clone)]
pub struct Team {
    id: Uuid,
    name: String,
    league_id: Uuid,
    division_id: Uuid,
    captain_id: Uuid,
    signup_code: SignupCode,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new Team aggregate
    ///
    /// # Business Rules Enforced
    /// - Name must not be empty
    /// - Division must belong to the same sport as the league
    /// - Division must be available in the league
    pub fn new(
        name: &str,
        league: &League,
        division: &Division,
        captain_id: Uuid,
        signup_code: SignupCode,
    ) -> DomainResult<Self> {
        let name = require_text(name, "Team name")?;
        Self::check_placement(league, division)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            league_id: league.id(),
            division_id: division.id,
            captain_id,
            signup_code,
            created_at: Utc::now(),
        })
    }

    /// Renames and/or moves the team to another league and division
    pub fn edit(&mut self, name: &str, league: &League, division: &Division) -> DomainResult<()> {
        let name = require_text(name, "Team name")?;
        Self::check_placement(league, division)?;

        self.name = name;
        self.league_id = league.id();
        self.division_id = division.id;
        Ok(())
    }

    pub fn assign_captain(&mut self, captain_id: Uuid) {
        self.captain_id = captain_id;
    }

    fn check_placement(league: &League, division: &Division) -> DomainResult<()> {
        if division.sport_id != league.sport_id() {
            return Err(DomainError::validation(
                "Division must belong to the same sport as the league",
            ));
        }
        if !league.offers_division(division.id) {
            return Err(DomainError::validation(
                "Selected division is not available in the selected league.",
            ));
        }
        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn league_id(&self) -> Uuid {
        self.league_id
    }

    pub fn division_id(&self) -> Uuid {
        self.division_id
    }

    pub fn captain_id(&self) -> Uuid {
        self.captain_id
    }

    pub fn signup_code(&self) -> &SignupCode {
        &self.signup_code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Path players follow to join this team
    pub fn signup_path(&self) -> String {
        format!("/api/teams/signup/{}", self.signup_code)
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// This method bypasses business rules validation since the data
    /// is already validated and stored in the database.
    pub fn from_persistence(
        id: Uuid,
        name: String,
        league_id: Uuid,
        division_id: Uuid,
        captain_id: Uuid,
        signup_code: SignupCode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            league_id,
            division_id,
            captain_id,
            signup_code,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::league::{LeaguePricing, LeagueSchedule};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn league_with(divisions: &[Division], sport_id: Uuid) -> League {
        let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day).unwrap();
        let mut league = League::new(
            sport_id,
            "Fall",
            "",
            LeagueSchedule {
                registration_start_date: d(8, 1),
                registration_end_date: d(9, 1),
                early_registration_deadline: d(8, 10),
                league_start_date: d(9, 10),
                league_end_date: d(11, 30),
            },
            LeaguePricing {
                regular_registration_price: Decimal::new(50, 0),
                early_registration_price: Decimal::new(40, 0),
            },
            None,
            None,
        )
        .unwrap();
        league.set_divisions(divisions).unwrap();
        league
    }

    #[test]
    fn create_team_in_offered_division() {
        let sport_id = Uuid::new_v4();
        let division = Division::new(sport_id, "A", "", "").unwrap();
        let league = league_with(&[division.clone()], sport_id);
        let captain_id = Uuid::new_v4();

        let team = Team::new("Hawks", &league, &division, captain_id, SignupCode::random()).unwrap();

        assert_eq!(team.league_id(), league.id());
        assert_eq!(team.division_id(), division.id);
        assert_eq!(team.captain_id(), captain_id);
        assert!(team.signup_path().ends_with(team.signup_code().as_str()));
    }

    #[test]
    fn division_from_other_sport_rejected() {
        let sport_id = Uuid::new_v4();
        let league = league_with(&[], sport_id);
        let foreign = Division::new(Uuid::new_v4(), "X", "", "").unwrap();

        let err = Team::new("Hawks", &league, &foreign, Uuid::new_v4(), SignupCode::random())
            .unwrap_err();
        assert!(err.to_string().contains("same sport"));
    }

    #[test]
    fn division_not_offered_rejected() {
        let sport_id = Uuid::new_v4();
        let offered = Division::new(sport_id, "A", "", "").unwrap();
        let other = Division::new(sport_id, "B", "", "").unwrap();
        let league = league_with(&[offered], sport_id);

        let err = Team::new("Hawks", &league, &other, Uuid::new_v4(), SignupCode::random())
            .unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn empty_name_rejected() {
        let sport_id = Uuid::new_v4();
        let division = Division::new(sport_id, "A", "", "").unwrap();
        let league = league_with(&[division.clone()], sport_id);
        assert!(Team::new(" ", &league, &division, Uuid::new_v4(), SignupCode::random()).is_err());
    }

    #[test]
    fn edit_moves_team() {
        let sport_id = Uuid::new_v4();
        let a = Division::new(sport_id, "A", "", "").unwrap();
        let b = Division::new(sport_id, "B", "", "").unwrap();
        let league = league_with(&[a.clone(), b.clone()], sport_id);
        let mut team = Team::new("Hawks", &league, &a, Uuid::new_v4(), SignupCode::random()).unwrap();

        team.edit("Falcons", &league, &b).unwrap();
        assert_eq!(team.name(), "Falcons");
        assert_eq!(team.division_id(), b.id);
    }
}
