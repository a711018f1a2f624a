//! In-memory implementation of every repository port.
//!
//! Backs `STORAGE_BACKEND=memory` and the HTTP integration tests. Uniqueness
//! rules mirror the database constraints so both backends reject the same
//! writes.
//!
//! Not suitable for production: nothing is persisted and state is not shared
//! across processes.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::forms::{DynamicForm, FormField, FormResponse};
use crate::domain::invitation::{InvitationNotification, TeamInvitation};
use crate::domain::league::{Division, League, Sport};
use crate::domain::payment::{StripePrice, StripeProduct};
use crate::domain::player::{FreeAgent, FreeAgentStatus, Player};
use crate::domain::registration::{PaymentStatus, Registration, RegistrationFilter, RegistrationSummary};
use crate::domain::repositories::{
    CatalogRepository, FormRepository, InvitationRepository, LeagueRepository, PlayerRepository,
    RegistrationRepository, RepositoryError, RepositoryResult, TeamFilter, TeamRepository,
    UserRepository,
};
use crate::domain::team::{SignupCode, Team, TeamCaptain};
use crate::domain::user::{Email, User};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    sports: HashMap<Uuid, Sport>,
    divisions: HashMap<Uuid, Division>,
    leagues: HashMap<Uuid, League>,
    captains: HashMap<Uuid, TeamCaptain>,
    teams: HashMap<Uuid, Team>,
    players: HashMap<Uuid, Player>,
    free_agents: HashMap<Uuid, FreeAgent>,
    invitations: HashMap<Uuid, TeamInvitation>,
    notifications: HashMap<Uuid, InvitationNotification>,
    registrations: HashMap<Uuid, Registration>,
    products: HashMap<Uuid, StripeProduct>,
    prices: HashMap<Uuid, StripePrice>,
    forms: HashMap<Uuid, DynamicForm>,
    fields: HashMap<Uuid, FormField>,
    responses: HashMap<Uuid, FormResponse>,
}

impl State {
    fn league_name(&self, id: Uuid) -> &str {
        self.leagues.get(&id).map(League::name).unwrap_or_default()
    }

    fn division_name(&self, id: Uuid) -> &str {
        self.divisions.get(&id).map(|d| d.name.as_str()).unwrap_or_default()
    }

    fn sorted_teams<'a>(&self, teams: impl Iterator<Item = &'a Team>) -> Vec<Team> {
        let mut teams: Vec<Team> = teams.cloned().collect();
        teams.sort_by(|a, b| a.name().cmp(b.name()));
        teams
    }

    /// Same uniqueness rules as the `registrations` table
    fn check_registration(&self, registration: &Registration) -> RepositoryResult<()> {
        if self.registrations.values().any(|r| {
            r.player_id == registration.player_id && r.league_id == registration.league_id
        }) {
            return Err(RepositoryError::conflict(
                "This player is already registered in this league",
            ));
        }
        if let Some(session) = &registration.stripe_checkout_session {
            if self
                .registrations
                .values()
                .any(|r| r.stripe_checkout_session.as_ref() == Some(session))
            {
                return Err(RepositoryError::conflict(
                    "A registration already exists for this checkout session",
                ));
            }
        }
        Ok(())
    }

    fn summary(&self, registration: &Registration) -> Option<RegistrationSummary> {
        let player = self.players.get(&registration.player_id)?;
        let team = player.team_id.and_then(|id| self.teams.get(&id));
        Some(RegistrationSummary {
            id: registration.id,
            player_id: player.id,
            player_first_name: player.details.first_name.clone(),
            player_last_name: player.details.last_name.clone(),
            player_email: player.details.email.to_string(),
            player_phone_number: player.details.phone_number.clone(),
            player_user_id: player.user_id,
            team_id: team.map(Team::id),
            team_name: team.map(|t| t.name().to_string()),
            league_id: registration.league_id,
            division_id: registration.division_id,
            division_name: self.division_name(registration.division_id).to_string(),
            payment_status: registration.payment_status,
            is_late_registration: registration.is_late_registration,
            registered_at: registration.registered_at,
        })
    }
}

/// Thread-safe store holding every aggregate behind one `RwLock`
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

/// Converts a lock poison error to a storage error.
fn poison_err<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Storage("in-memory store lock poisoned".to_string())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(poison_err)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(poison_err)
    }
}

fn newest_first<T, F>(items: &mut [T], created_at: F)
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::conflict("Username already taken"));
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::conflict("Email already registered"));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        Ok(self.read()?.users.values().find(|u| &u.email == email).cloned())
    }

    async fn update_profile(&self, user: &User) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| RepositoryError::not_found("User"))?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.phone_number = user.phone_number.clone();
        stored.date_of_birth = user.date_of_birth;
        Ok(())
    }

    async fn update_last_login(&self, user_id: Uuid) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.last_login = Some(chrono::Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl LeagueRepository for InMemoryStore {
    async fn create_sport(&self, sport: &Sport) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state.sports.values().any(|s| s.name == sport.name) {
            return Err(RepositoryError::conflict("A sport with this name already exists"));
        }
        state.sports.insert(sport.id, sport.clone());
        Ok(())
    }

    async fn find_sport(&self, id: Uuid) -> RepositoryResult<Option<Sport>> {
        Ok(self.read()?.sports.get(&id).cloned())
    }

    async fn list_sports(&self) -> RepositoryResult<Vec<Sport>> {
        let mut sports: Vec<Sport> = self.read()?.sports.values().cloned().collect();
        sports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sports)
    }

    async fn create_division(&self, division: &Division) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state
            .divisions
            .values()
            .any(|d| d.sport_id == division.sport_id && d.name == division.name)
        {
            return Err(RepositoryError::conflict(
                "A division with this name already exists for the sport",
            ));
        }
        state.divisions.insert(division.id, division.clone());
        Ok(())
    }

    async fn find_division(&self, id: Uuid) -> RepositoryResult<Option<Division>> {
        Ok(self.read()?.divisions.get(&id).cloned())
    }

    async fn save_league(&self, league: &League) -> RepositoryResult<()> {
        self.write()?.leagues.insert(league.id(), league.clone());
        Ok(())
    }

    async fn find_league(&self, id: Uuid) -> RepositoryResult<Option<League>> {
        Ok(self.read()?.leagues.get(&id).cloned())
    }

    async fn list_leagues(&self) -> RepositoryResult<Vec<League>> {
        let mut leagues: Vec<League> = self.read()?.leagues.values().cloned().collect();
        leagues.sort_by_key(|l| std::cmp::Reverse(l.schedule().registration_start_date));
        Ok(leagues)
    }

    async fn league_divisions(&self, league_id: Uuid) -> RepositoryResult<Vec<Division>> {
        let state = self.read()?;
        let Some(league) = state.leagues.get(&league_id) else {
            return Ok(Vec::new());
        };
        let mut divisions: Vec<Division> = league
            .division_ids()
            .iter()
            .filter_map(|id| state.divisions.get(id).cloned())
            .collect();
        divisions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(divisions)
    }
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state
            .teams
            .values()
            .any(|t| t.id() != team.id() && t.signup_code() == team.signup_code())
        {
            return Err(RepositoryError::conflict("Signup code already in use"));
        }
        state.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        Ok(self.read()?.teams.get(&id).cloned())
    }

    async fn find_by_signup_code(&self, code: &SignupCode) -> RepositoryResult<Option<Team>> {
        Ok(self
            .read()?
            .teams
            .values()
            .find(|t| t.signup_code() == code)
            .cloned())
    }

    async fn signup_code_exists(&self, code: &SignupCode) -> RepositoryResult<bool> {
        Ok(self.read()?.teams.values().any(|t| t.signup_code() == code))
    }

    async fn list(&self, filter: &TeamFilter) -> RepositoryResult<Vec<Team>> {
        let state = self.read()?;
        let term = filter.search_term();
        let mut teams: Vec<Team> = state
            .teams
            .values()
            .filter(|t| filter.league.map_or(true, |id| t.league_id() == id))
            .filter(|t| filter.division.map_or(true, |id| t.division_id() == id))
            .filter(|t| {
                term.as_deref()
                    .map_or(true, |term| t.name().to_lowercase().contains(term))
            })
            .cloned()
            .collect();
        teams.sort_by(|a, b| {
            state
                .league_name(a.league_id())
                .cmp(state.league_name(b.league_id()))
                .then_with(|| {
                    state
                        .division_name(a.division_id())
                        .cmp(state.division_name(b.division_id()))
                })
                .then_with(|| a.name().cmp(b.name()))
        });
        Ok(teams)
    }

    async fn find_by_division(&self, division_id: Uuid) -> RepositoryResult<Vec<Team>> {
        let state = self.read()?;
        Ok(state.sorted_teams(state.teams.values().filter(|t| t.division_id() == division_id)))
    }

    async fn find_by_captain_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Team>> {
        let state = self.read()?;
        Ok(state.sorted_teams(state.teams.values().filter(|t| {
            state
                .captains
                .get(&t.captain_id())
                .is_some_and(|c| c.user_id == Some(user_id))
        })))
    }

    async fn find_claimable(&self, email: &Email) -> RepositoryResult<Vec<Team>> {
        let state = self.read()?;
        Ok(state.sorted_teams(state.teams.values().filter(|t| {
            state.captains.get(&t.captain_id()).is_some_and(|c| {
                c.user_id.is_none() && !c.is_system_captain && &c.email == email
            })
        })))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut state = self.write()?;
        state
            .teams
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("Team"))?;
        for player in state.players.values_mut() {
            if player.team_id == Some(id) {
                player.team_id = None;
            }
        }
        let invitation_ids: Vec<Uuid> = state
            .invitations
            .values()
            .filter(|i| i.team_id == id)
            .map(|i| i.id)
            .collect();
        state.invitations.retain(|_, i| i.team_id != id);
        state
            .notifications
            .retain(|_, n| !invitation_ids.contains(&n.invitation_id));
        Ok(())
    }

    async fn save_captain(&self, captain: &TeamCaptain) -> RepositoryResult<()> {
        self.write()?.captains.insert(captain.id, captain.clone());
        Ok(())
    }

    async fn find_captain(&self, id: Uuid) -> RepositoryResult<Option<TeamCaptain>> {
        Ok(self.read()?.captains.get(&id).cloned())
    }

    async fn find_captain_by_email(&self, email: &Email) -> RepositoryResult<Option<TeamCaptain>> {
        let state = self.read()?;
        let mut matches: Vec<&TeamCaptain> = state
            .captains
            .values()
            .filter(|c| &c.email == email && !c.is_system_captain)
            .collect();
        matches.sort_by_key(|c| c.created_at);
        Ok(matches.first().map(|c| (*c).clone()))
    }

    async fn find_system_captain(&self) -> RepositoryResult<Option<TeamCaptain>> {
        Ok(self
            .read()?
            .captains
            .values()
            .find(|c| c.is_system_captain)
            .cloned())
    }

    async fn is_captain(&self, user_id: Uuid, email: &Email) -> RepositoryResult<bool> {
        Ok(self.read()?.captains.values().any(|c| match c.user_id {
            Some(linked) => linked == user_id,
            None => !c.is_system_captain && &c.email == email,
        }))
    }
}

#[async_trait]
impl PlayerRepository for InMemoryStore {
    async fn save_player(&self, player: &Player) -> RepositoryResult<()> {
        self.write()?.players.insert(player.id, player.clone());
        Ok(())
    }

    async fn find_player(&self, id: Uuid) -> RepositoryResult<Option<Player>> {
        Ok(self.read()?.players.get(&id).cloned())
    }

    async fn team_players(&self, team_id: Uuid) -> RepositoryResult<Vec<Player>> {
        let mut players: Vec<Player> = self
            .read()?
            .players
            .values()
            .filter(|p| p.team_id == Some(team_id) && p.is_active)
            .cloned()
            .collect();
        players.sort_by(|a, b| {
            a.details
                .last_name
                .cmp(&b.details.last_name)
                .then_with(|| a.details.first_name.cmp(&b.details.first_name))
        });
        Ok(players)
    }

    async fn create_free_agent(&self, free_agent: &FreeAgent) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state
            .free_agents
            .values()
            .any(|f| f.user_id == free_agent.user_id && f.league_id == free_agent.league_id)
        {
            return Err(RepositoryError::conflict(
                "You are already registered as a free agent in this league",
            ));
        }
        state.free_agents.insert(free_agent.id, free_agent.clone());
        Ok(())
    }

    async fn update_free_agent(&self, free_agent: &FreeAgent) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .free_agents
            .get_mut(&free_agent.id)
            .ok_or_else(|| RepositoryError::not_found("Free agent"))?;
        *stored = free_agent.clone();
        Ok(())
    }

    async fn find_free_agent(&self, id: Uuid) -> RepositoryResult<Option<FreeAgent>> {
        Ok(self.read()?.free_agents.get(&id).cloned())
    }

    async fn available_free_agents(
        &self,
        league_id: Uuid,
        division_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<FreeAgent>> {
        let mut agents: Vec<FreeAgent> = self
            .read()?
            .free_agents
            .values()
            .filter(|f| f.league_id == league_id && f.status == FreeAgentStatus::Available)
            .filter(|f| division_id.map_or(true, |id| f.division_id == id))
            .cloned()
            .collect();
        newest_first(&mut agents, |f| f.created_at);
        Ok(agents)
    }

    async fn free_agents_of_user(&self, user_id: Uuid) -> RepositoryResult<Vec<FreeAgent>> {
        let mut agents: Vec<FreeAgent> = self
            .read()?
            .free_agents
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut agents, |f| f.created_at);
        Ok(agents)
    }
}

#[async_trait]
impl InvitationRepository for InMemoryStore {
    async fn create(&self, invitation: &TeamInvitation) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state.invitations.values().any(|i| {
            i.team_id == invitation.team_id && i.free_agent_id == invitation.free_agent_id
        }) {
            return Err(RepositoryError::conflict(
                "This team has already invited this free agent",
            ));
        }
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn update(&self, invitation: &TeamInvitation) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .invitations
            .get_mut(&invitation.id)
            .ok_or_else(|| RepositoryError::not_found("Invitation"))?;
        *stored = invitation.clone();
        Ok(())
    }

    async fn record_acceptance(
        &self,
        accepted: &TeamInvitation,
        free_agent: &FreeAgent,
        player: &Player,
        cancelled: &[TeamInvitation],
    ) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let known = |id: &Uuid| state.invitations.contains_key(id);
        if !known(&accepted.id) || !cancelled.iter().all(|i| known(&i.id)) {
            return Err(RepositoryError::not_found("Invitation"));
        }
        if !state.free_agents.contains_key(&free_agent.id) {
            return Err(RepositoryError::not_found("Free agent"));
        }

        for invitation in std::iter::once(accepted).chain(cancelled) {
            state.invitations.insert(invitation.id, invitation.clone());
        }
        state.free_agents.insert(free_agent.id, free_agent.clone());
        state.players.insert(player.id, player.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<TeamInvitation>> {
        Ok(self.read()?.invitations.get(&id).cloned())
    }

    async fn find_for_pair(
        &self,
        team_id: Uuid,
        free_agent_id: Uuid,
    ) -> RepositoryResult<Option<TeamInvitation>> {
        Ok(self
            .read()?
            .invitations
            .values()
            .find(|i| i.team_id == team_id && i.free_agent_id == free_agent_id)
            .cloned())
    }

    async fn for_teams(&self, team_ids: &[Uuid]) -> RepositoryResult<Vec<TeamInvitation>> {
        let mut invitations: Vec<TeamInvitation> = self
            .read()?
            .invitations
            .values()
            .filter(|i| team_ids.contains(&i.team_id))
            .cloned()
            .collect();
        newest_first(&mut invitations, |i| i.created_at);
        Ok(invitations)
    }

    async fn for_free_agents(&self, free_agent_ids: &[Uuid]) -> RepositoryResult<Vec<TeamInvitation>> {
        let mut invitations: Vec<TeamInvitation> = self
            .read()?
            .invitations
            .values()
            .filter(|i| free_agent_ids.contains(&i.free_agent_id))
            .cloned()
            .collect();
        newest_first(&mut invitations, |i| i.created_at);
        Ok(invitations)
    }

    async fn create_notification(&self, notification: &InvitationNotification) -> RepositoryResult<()> {
        self.write()?
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_notification(&self, id: Uuid) -> RepositoryResult<Option<InvitationNotification>> {
        Ok(self.read()?.notifications.get(&id).cloned())
    }

    async fn update_notification(&self, notification: &InvitationNotification) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .notifications
            .get_mut(&notification.id)
            .ok_or_else(|| RepositoryError::not_found("Notification"))?;
        stored.read_at = notification.read_at;
        Ok(())
    }

    async fn notifications_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<InvitationNotification>> {
        let mut notifications: Vec<InvitationNotification> = self
            .read()?
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut notifications, |n| n.created_at);
        Ok(notifications)
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryStore {
    async fn create(&self, registration: &Registration) -> RepositoryResult<()> {
        let mut state = self.write()?;
        state.check_registration(registration)?;
        state.registrations.insert(registration.id, registration.clone());
        Ok(())
    }

    async fn create_with_player(&self, player: &Player, registration: &Registration) -> RepositoryResult<()> {
        let mut state = self.write()?;
        state.check_registration(registration)?;
        state.players.insert(player.id, player.clone());
        state.registrations.insert(registration.id, registration.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Registration>> {
        Ok(self.read()?.registrations.get(&id).cloned())
    }

    async fn find_by_checkout_session(&self, session_id: &str) -> RepositoryResult<Option<Registration>> {
        Ok(self
            .read()?
            .registrations
            .values()
            .find(|r| r.stripe_checkout_session.as_deref() == Some(session_id))
            .cloned())
    }

    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let registration = state
            .registrations
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Registration"))?;
        registration.set_payment_status(status);
        Ok(())
    }

    async fn summaries(&self, filter: &RegistrationFilter) -> RepositoryResult<Vec<RegistrationSummary>> {
        let state = self.read()?;
        Ok(state
            .registrations
            .values()
            .filter_map(|r| state.summary(r))
            .filter(|s| filter.matches(s))
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn upsert_product(&self, product: &StripeProduct) -> RepositoryResult<(StripeProduct, bool)> {
        let mut state = self.write()?;
        if let Some(stored) = state
            .products
            .values_mut()
            .find(|p| p.stripe_id == product.stripe_id)
        {
            stored.name = product.name.clone();
            stored.description = product.description.clone();
            stored.active = product.active;
            stored.metadata = product.metadata.clone();
            stored.updated_at = chrono::Utc::now();
            return Ok((stored.clone(), false));
        }
        state.products.insert(product.id, product.clone());
        Ok((product.clone(), true))
    }

    async fn upsert_price(&self, price: &StripePrice) -> RepositoryResult<bool> {
        let mut state = self.write()?;
        if let Some(stored) = state
            .prices
            .values_mut()
            .find(|p| p.stripe_id == price.stripe_id)
        {
            let id = stored.id;
            let created_at = stored.created_at;
            *stored = price.clone();
            stored.id = id;
            stored.created_at = created_at;
            stored.updated_at = chrono::Utc::now();
            return Ok(false);
        }
        state.prices.insert(price.id, price.clone());
        Ok(true)
    }

    async fn find_product_by_stripe_id(&self, stripe_id: &str) -> RepositoryResult<Option<StripeProduct>> {
        Ok(self
            .read()?
            .products
            .values()
            .find(|p| p.stripe_id == stripe_id)
            .cloned())
    }

    async fn prices_for_product(&self, product_id: Uuid) -> RepositoryResult<Vec<StripePrice>> {
        let mut prices: Vec<StripePrice> = self
            .read()?
            .prices
            .values()
            .filter(|p| p.product_id == product_id)
            .cloned()
            .collect();
        prices.sort_by_key(|p| p.created_at);
        Ok(prices)
    }
}

#[async_trait]
impl FormRepository for InMemoryStore {
    async fn create_form(&self, form: &DynamicForm) -> RepositoryResult<()> {
        let mut state = self.write()?;
        for existing in state.forms.values_mut() {
            if existing.league_id == form.league_id {
                existing.is_active = false;
            }
        }
        state.forms.insert(form.id, form.clone());
        Ok(())
    }

    async fn find_form(&self, id: Uuid) -> RepositoryResult<Option<DynamicForm>> {
        Ok(self.read()?.forms.get(&id).cloned())
    }

    async fn active_form(&self, league_id: Uuid) -> RepositoryResult<Option<DynamicForm>> {
        Ok(self
            .read()?
            .forms
            .values()
            .find(|f| f.league_id == league_id && f.is_active)
            .cloned())
    }

    async fn add_field(&self, field: &FormField) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if !state.forms.contains_key(&field.form_id) {
            return Err(RepositoryError::not_found("Form"));
        }
        state.fields.insert(field.id, field.clone());
        Ok(())
    }

    async fn fields(&self, form_id: Uuid) -> RepositoryResult<Vec<FormField>> {
        let mut fields: Vec<FormField> = self
            .read()?
            .fields
            .values()
            .filter(|f| f.form_id == form_id)
            .cloned()
            .collect();
        fields.sort_by_key(|f| f.position);
        Ok(fields)
    }

    async fn save_response(&self, response: &FormResponse) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state.responses.values().any(|r| {
            r.form_id == response.form_id && r.registration_id == response.registration_id
        }) {
            return Err(RepositoryError::conflict(
                "A response was already submitted for this registration",
            ));
        }
        state.responses.insert(response.id, response.clone());
        Ok(())
    }
}
