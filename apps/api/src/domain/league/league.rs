use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::sport::Division;
use crate::domain::errors::{require_text, DomainError, DomainResult};

/// Registration and play calendar of a league
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueSchedule {
    pub registration_start_date: NaiveDate,
    pub registration_end_date: NaiveDate,
    pub early_registration_deadline: NaiveDate,
    pub league_start_date: NaiveDate,
    pub league_end_date: NaiveDate,
}

impl LeagueSchedule {
    /// Checks the date ordering
    ///
    /// registration start <= registration end <= league start <= league end,
    /// and the early deadline falls inside the registration window.
    pub fn validate(&self) -> DomainResult<()> {
        if self.registration_start_date > self.registration_end_date {
            return Err(DomainError::validation(
                "Registration start date must be before end date",
            ));
        }
        if self.registration_end_date > self.league_start_date {
            return Err(DomainError::validation(
                "Registration end date must be before league start date",
            ));
        }
        if self.league_start_date > self.league_end_date {
            return Err(DomainError::validation(
                "League start date must be before end date",
            ));
        }
        if self.early_registration_deadline < self.registration_start_date
            || self.early_registration_deadline > self.registration_end_date
        {
            return Err(DomainError::validation(
                "Early registration deadline must fall within the registration window",
            ));
        }
        Ok(())
    }
}

/// Early and regular registration prices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaguePricing {
    pub regular_registration_price: Decimal,
    pub early_registration_price: Decimal,
}

impl LeaguePricing {
    fn validate(&self) -> DomainResult<()> {
        if self.regular_registration_price < Decimal::ZERO
            || self.early_registration_price < Decimal::ZERO
        {
            return Err(DomainError::validation("Prices cannot be negative"));
        }
        Ok(())
    }
}

/// A timed registration and competition period for a sport
///
/// # Invariants
/// - Name cannot be empty
/// - Schedule dates are ordered (see [`LeagueSchedule::validate`])
/// - Prices are non-negative
/// - Every available division belongs to the league's sport
#[derive(Debug, Clone)]
pub struct League {
    id: Uuid,
    sport_id: Uuid,
    name: String,
    description: String,
    stripe_product_id: Option<String>,
    schedule: LeagueSchedule,
    pricing: LeaguePricing,
    max_teams: Option<i32>,
    division_ids: Vec<Uuid>,
}

impl League {
    pub fn new(
        sport_id: Uuid,
        name: &str,
        description: &str,
        schedule: LeagueSchedule,
        pricing: LeaguePricing,
        max_teams: Option<i32>,
        stripe_product_id: Option<String>,
    ) -> DomainResult<Self> {
        let name = require_text(name, "League name")?;
        schedule.validate()?;
        pricing.validate()?;
        if let Some(max) = max_teams {
            if max <= 0 {
                return Err(DomainError::validation("Max teams must be positive"));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            sport_id,
            name,
            description: description.trim().to_string(),
            stripe_product_id: stripe_product_id.filter(|id| !id.trim().is_empty()),
            schedule,
            pricing,
            max_teams,
            division_ids: Vec::new(),
        })
    }

    /// Applies an edit, re-checking every invariant except division membership
    pub fn update(
        &mut self,
        name: &str,
        description: &str,
        schedule: LeagueSchedule,
        pricing: LeaguePricing,
        max_teams: Option<i32>,
        stripe_product_id: Option<String>,
    ) -> DomainResult<()> {
        let updated = League::new(
            self.sport_id,
            name,
            description,
            schedule,
            pricing,
            max_teams,
            stripe_product_id,
        )?;
        self.name = updated.name;
        self.description = updated.description;
        self.schedule = updated.schedule;
        self.pricing = updated.pricing;
        self.max_teams = updated.max_teams;
        self.stripe_product_id = updated.stripe_product_id;
        Ok(())
    }

    /// Replaces the divisions offered in this league
    pub fn set_divisions(&mut self, divisions: &[Division]) -> DomainResult<()> {
        if let Some(foreign) = divisions.iter().find(|d| d.sport_id != self.sport_id) {
            return Err(DomainError::validation(format!(
                "Division '{}' does not belong to the league's sport",
                foreign.name
            )));
        }
        let mut ids: Vec<Uuid> = divisions.iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        self.division_ids = ids;
        Ok(())
    }

    pub fn offers_division(&self, division_id: Uuid) -> bool {
        self.division_ids.contains(&division_id)
    }

    pub fn is_registration_open(&self, today: NaiveDate) -> bool {
        self.schedule.registration_start_date <= today
            && today <= self.schedule.registration_end_date
    }

    pub fn is_early_registration_active(&self, today: NaiveDate) -> bool {
        self.schedule.registration_start_date <= today
            && today <= self.schedule.early_registration_deadline
    }

    /// Price a registration made on `today` pays
    pub fn price_for(&self, today: NaiveDate) -> Decimal {
        if self.is_early_registration_active(today) {
            self.pricing.early_registration_price
        } else {
            self.pricing.regular_registration_price
        }
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sport_id(&self) -> Uuid {
        self.sport_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stripe_product_id(&self) -> Option<&str> {
        self.stripe_product_id.as_deref()
    }

    pub fn schedule(&self) -> LeagueSchedule {
        self.schedule
    }

    pub fn pricing(&self) -> LeaguePricing {
        self.pricing
    }

    pub fn max_teams(&self) -> Option<i32> {
        self.max_teams
    }

    pub fn division_ids(&self) -> &[Uuid] {
        &self.division_ids
    }

    /// Reconstructs a League from persistence layer data
    ///
    /// Only to be used by repository implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        sport_id: Uuid,
        name: String,
        description: String,
        stripe_product_id: Option<String>,
        schedule: LeagueSchedule,
        pricing: LeaguePricing,
        max_teams: Option<i32>,
        division_ids: Vec<Uuid>,
    ) -> Self {
        Self {
            id,
            sport_id,
            name,
            description,
            stripe_product_id,
            schedule,
            pricing,
            max_teams,
            division_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule() -> LeagueSchedule {
        LeagueSchedule {
            registration_start_date: date(2026, 1, 1),
            registration_end_date: date(2026, 2, 28),
            early_registration_deadline: date(2026, 1, 15),
            league_start_date: date(2026, 3, 7),
            league_end_date: date(2026, 6, 1),
        }
    }

    fn pricing() -> LeaguePricing {
        LeaguePricing {
            regular_registration_price: dec(12000),
            early_registration_price: dec(9500),
        }
    }

    fn league() -> League {
        League::new(Uuid::new_v4(), "Spring Soccer", "", schedule(), pricing(), None, None).unwrap()
    }

    #[test]
    fn registration_window() {
        let league = league();
        assert!(!league.is_registration_open(date(2025, 12, 31)));
        assert!(league.is_registration_open(date(2026, 1, 1)));
        assert!(league.is_registration_open(date(2026, 2, 28)));
        assert!(!league.is_registration_open(date(2026, 3, 1)));
    }

    #[test]
    fn early_price_until_deadline() {
        let league = league();
        assert!(league.is_early_registration_active(date(2026, 1, 15)));
        assert_eq!(league.price_for(date(2026, 1, 15)), dec(9500));
        assert!(!league.is_early_registration_active(date(2026, 1, 16)));
        assert_eq!(league.price_for(date(2026, 1, 16)), dec(12000));
    }

    #[test]
    fn registration_start_after_end_rejected() {
        let mut s = schedule();
        s.registration_start_date = date(2026, 3, 1);
        let err = League::new(Uuid::new_v4(), "L", "", s, pricing(), None, None).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("Registration start date must be before end date")
        );
    }

    #[test]
    fn registration_must_close_before_league_starts() {
        let mut s = schedule();
        s.registration_end_date = date(2026, 3, 10);
        assert!(League::new(Uuid::new_v4(), "L", "", s, pricing(), None, None).is_err());
    }

    #[test]
    fn league_start_after_end_rejected() {
        let mut s = schedule();
        s.league_end_date = date(2026, 3, 1);
        assert!(League::new(Uuid::new_v4(), "L", "", s, pricing(), None, None).is_err());
    }

    #[test]
    fn early_deadline_outside_window_rejected() {
        let mut s = schedule();
        s.early_registration_deadline = date(2026, 3, 1);
        assert!(League::new(Uuid::new_v4(), "L", "", s, pricing(), None, None).is_err());
    }

    #[test]
    fn negative_price_rejected() {
        let p = LeaguePricing {
            regular_registration_price: dec(-1),
            early_registration_price: dec(0),
        };
        assert!(League::new(Uuid::new_v4(), "L", "", schedule(), p, None, None).is_err());
    }

    #[test]
    fn divisions_must_match_sport() {
        let mut league = league();
        let own = Division::new(league.sport_id(), "Open", "", "").unwrap();
        let other = Division::new(Uuid::new_v4(), "Other", "", "").unwrap();

        assert!(league.set_divisions(&[own.clone(), other]).is_err());
        assert!(league.division_ids().is_empty());

        league.set_divisions(&[own.clone(), own.clone()]).unwrap();
        assert_eq!(league.division_ids(), &[own.id]);
        assert!(league.offers_division(own.id));
    }

    #[test]
    fn blank_stripe_product_is_dropped() {
        let league = League::new(
            Uuid::new_v4(),
            "L",
            "",
            schedule(),
            pricing(),
            Some(8),
            Some("  ".to_string()),
        )
        .unwrap();
        assert_eq!(league.stripe_product_id(), None);
        assert_eq!(league.max_teams(), Some(8));
    }
}
