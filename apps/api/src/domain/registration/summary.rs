use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::PaymentStatus;
use crate::domain::league::Division;

/// Registration joined with the player, team and division it refers to
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RegistrationSummary {
    pub id: Uuid,
    pub player_id: Uuid,
    pub player_first_name: String,
    pub player_last_name: String,
    pub player_email: String,
    pub player_phone_number: String,
    pub player_user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub team_name: Option<String>,
    pub league_id: Uuid,
    pub division_id: Uuid,
    pub division_name: String,
    pub payment_status: PaymentStatus,
    pub is_late_registration: bool,
    pub registered_at: DateTime<Utc>,
}

impl RegistrationSummary {
    pub fn player_name(&self) -> String {
        format!("{} {}", self.player_first_name, self.player_last_name)
    }
}

/// Filters accepted by the registration listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationFilter {
    pub league: Option<Uuid>,
    pub division: Option<Uuid>,
    pub team: Option<Uuid>,
    pub search: Option<String>,
}

impl RegistrationFilter {
    /// Search term, trimmed and lowercased; blank means no search
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    pub fn matches(&self, summary: &RegistrationSummary) -> bool {
        if self.league.is_some_and(|id| id != summary.league_id) {
            return false;
        }
        if self.division.is_some_and(|id| id != summary.division_id) {
            return false;
        }
        if let Some(team) = self.team {
            if summary.team_id != Some(team) {
                return false;
            }
        }
        match self.search_term() {
            None => true,
            Some(term) => [
                &summary.player_first_name,
                &summary.player_last_name,
                &summary.player_email,
                &summary.player_phone_number,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term)),
        }
    }
}

/// Orders by division, then team (free agents last), then player last name
pub fn sort_for_management(summaries: &mut [RegistrationSummary]) {
    summaries.sort_by(|a, b| {
        a.division_name
            .cmp(&b.division_name)
            .then_with(|| match (&a.team_name, &b.team_name) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.player_last_name.cmp(&b.player_last_name))
    });
}

/// Head counts shown above the management listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManagementStats {
    pub total_registrations: usize,
    pub total_free_agents: usize,
    pub divisions_count: usize,
    pub teams_count: usize,
}

impl ManagementStats {
    pub fn from_summaries(summaries: &[RegistrationSummary]) -> Self {
        let mut divisions: Vec<Uuid> = summaries.iter().map(|s| s.division_id).collect();
        divisions.sort();
        divisions.dedup();
        let mut teams: Vec<Uuid> = summaries.iter().filter_map(|s| s.team_id).collect();
        teams.sort();
        teams.dedup();

        Self {
            total_registrations: summaries.len(),
            total_free_agents: summaries.iter().filter(|s| s.team_id.is_none()).count(),
            divisions_count: divisions.len(),
            teams_count: teams.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamGroup {
    pub team_id: Uuid,
    pub team_name: String,
    pub registrations: Vec<RegistrationSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DivisionGroup {
    pub division_id: Uuid,
    pub division_name: String,
    pub teams: Vec<TeamGroup>,
    pub free_agents: Vec<RegistrationSummary>,
}

/// Groups already-sorted summaries by division, then team
///
/// Registrations whose player has no team land in `free_agents`.
pub fn group_by_division(summaries: &[RegistrationSummary]) -> Vec<DivisionGroup> {
    let mut groups: Vec<DivisionGroup> = Vec::new();

    for summary in summaries {
        let index = match groups.iter().position(|g| g.division_id == summary.division_id) {
            Some(index) => index,
            None => {
                groups.push(DivisionGroup {
                    division_id: summary.division_id,
                    division_name: summary.division_name.clone(),
                    teams: Vec::new(),
                    free_agents: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];

        match (summary.team_id, &summary.team_name) {
            (Some(team_id), Some(team_name)) => {
                match group.teams.iter_mut().find(|t| t.team_id == team_id) {
                    Some(team) => team.registrations.push(summary.clone()),
                    None => group.teams.push(TeamGroup {
                        team_id,
                        team_name: team_name.clone(),
                        registrations: vec![summary.clone()],
                    }),
                }
            }
            _ => group.free_agents.push(summary.clone()),
        }
    }

    groups
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DivisionCounts {
    pub total: usize,
    pub paid: usize,
    pub pending: usize,
}

/// Payment overview of a league
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeagueRegistrationStats {
    pub total_registrations: usize,
    pub paid_registrations: usize,
    pub pending_registrations: usize,
    pub late_registrations: usize,
    pub by_division: BTreeMap<String, DivisionCounts>,
}

impl LeagueRegistrationStats {
    /// Every offered division appears, even with zero registrations
    pub fn compute(summaries: &[RegistrationSummary], divisions: &[Division]) -> Self {
        let count = |status: PaymentStatus, items: &[&RegistrationSummary]| {
            items.iter().filter(|s| s.payment_status == status).count()
        };
        let all: Vec<&RegistrationSummary> = summaries.iter().collect();

        let by_division = divisions
            .iter()
            .map(|division| {
                let in_division: Vec<&RegistrationSummary> = summaries
                    .iter()
                    .filter(|s| s.division_id == division.id)
                    .collect();
                (
                    division.name.clone(),
                    DivisionCounts {
                        total: in_division.len(),
                        paid: count(PaymentStatus::Paid, &in_division),
                        pending: count(PaymentStatus::Pending, &in_division),
                    },
                )
            })
            .collect();

        Self {
            total_registrations: summaries.len(),
            paid_registrations: count(PaymentStatus::Paid, &all),
            pending_registrations: count(PaymentStatus::Pending, &all),
            late_registrations: summaries.iter().filter(|s| s.is_late_registration).count(),
            by_division,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        league: Uuid,
        div_a: Division,
        div_b: Division,
        team: (Uuid, &'static str),
    }

    fn fixture() -> Fixture {
        let sport = Uuid::new_v4();
        Fixture {
            league: Uuid::new_v4(),
            div_a: Division::new(sport, "A Division", "", "").unwrap(),
            div_b: Division::new(sport, "B Division", "", "").unwrap(),
            team: (Uuid::new_v4(), "Otters"),
        }
    }

    fn summary(
        f: &Fixture,
        division: &Division,
        team: Option<(Uuid, &str)>,
        last: &str,
        status: PaymentStatus,
    ) -> RegistrationSummary {
        RegistrationSummary {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            player_first_name: "Pat".to_string(),
            player_last_name: last.to_string(),
            player_email: format!("{}@example.com", last.to_lowercase()),
            player_phone_number: "555-0199".to_string(),
            player_user_id: None,
            team_id: team.map(|t| t.0),
            team_name: team.map(|t| t.1.to_string()),
            league_id: f.league,
            division_id: division.id,
            division_name: division.name.clone(),
            payment_status: status,
            is_late_registration: status == PaymentStatus::Pending,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn filter_by_search_is_case_insensitive() {
        let f = fixture();
        let s = summary(&f, &f.div_a, None, "Nguyen", PaymentStatus::Paid);
        let filter = |q: &str| RegistrationFilter {
            search: Some(q.to_string()),
            ..Default::default()
        };

        assert!(filter("nguy").matches(&s));
        assert!(filter("NGUYEN@").matches(&s));
        assert!(filter("0199").matches(&s));
        assert!(filter("   ").matches(&s));
        assert!(!filter("smith").matches(&s));
    }

    #[test]
    fn filter_by_team_excludes_free_agents() {
        let f = fixture();
        let free = summary(&f, &f.div_a, None, "Free", PaymentStatus::Paid);
        let rostered = summary(&f, &f.div_a, Some(f.team), "Team", PaymentStatus::Paid);
        let filter = RegistrationFilter {
            team: Some(f.team.0),
            ..Default::default()
        };

        assert!(!filter.matches(&free));
        assert!(filter.matches(&rostered));
    }

    #[test]
    fn filter_by_league_and_division() {
        let f = fixture();
        let s = summary(&f, &f.div_a, None, "X", PaymentStatus::Paid);
        let other_league = RegistrationFilter {
            league: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let other_division = RegistrationFilter {
            division: Some(f.div_b.id),
            ..Default::default()
        };
        assert!(!other_league.matches(&s));
        assert!(!other_division.matches(&s));
    }

    #[test]
    fn sorting_puts_free_agents_after_teams() {
        let f = fixture();
        let mut items = vec![
            summary(&f, &f.div_b, None, "Adams", PaymentStatus::Paid),
            summary(&f, &f.div_a, None, "Zed", PaymentStatus::Paid),
            summary(&f, &f.div_a, Some(f.team), "Young", PaymentStatus::Paid),
            summary(&f, &f.div_a, Some(f.team), "Baker", PaymentStatus::Paid),
        ];
        sort_for_management(&mut items);

        let order: Vec<&str> = items.iter().map(|s| s.player_last_name.as_str()).collect();
        assert_eq!(order, vec!["Baker", "Young", "Zed", "Adams"]);
    }

    #[test]
    fn grouping_and_stats() {
        let f = fixture();
        let mut items = vec![
            summary(&f, &f.div_a, Some(f.team), "One", PaymentStatus::Paid),
            summary(&f, &f.div_a, Some(f.team), "Two", PaymentStatus::Pending),
            summary(&f, &f.div_a, None, "Three", PaymentStatus::Paid),
            summary(&f, &f.div_b, None, "Four", PaymentStatus::Cancelled),
        ];
        sort_for_management(&mut items);

        let groups = group_by_division(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].division_name, "A Division");
        assert_eq!(groups[0].teams.len(), 1);
        assert_eq!(groups[0].teams[0].registrations.len(), 2);
        assert_eq!(groups[0].free_agents.len(), 1);
        assert_eq!(groups[1].free_agents.len(), 1);

        let stats = ManagementStats::from_summaries(&items);
        assert_eq!(
            stats,
            ManagementStats {
                total_registrations: 4,
                total_free_agents: 2,
                divisions_count: 2,
                teams_count: 1,
            }
        );
    }

    #[test]
    fn league_stats_include_empty_divisions() {
        let f = fixture();
        let sport = f.div_a.sport_id;
        let empty = Division::new(sport, "C Division", "", "").unwrap();
        let items = vec![
            summary(&f, &f.div_a, None, "One", PaymentStatus::Paid),
            summary(&f, &f.div_a, None, "Two", PaymentStatus::Pending),
            summary(&f, &f.div_b, None, "Three", PaymentStatus::Refunded),
        ];

        let stats = LeagueRegistrationStats::compute(&items, &[f.div_a.clone(), f.div_b.clone(), empty]);

        assert_eq!(stats.total_registrations, 3);
        assert_eq!(stats.paid_registrations, 1);
        assert_eq!(stats.pending_registrations, 1);
        assert_eq!(stats.late_registrations, 1);
        assert_eq!(
            stats.by_division["A Division"],
            DivisionCounts { total: 2, paid: 1, pending: 1 }
        );
        assert_eq!(stats.by_division["B Division"].total, 1);
        assert_eq!(stats.by_division["C Division"], DivisionCounts::default());
    }
}
