use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    auth as auth_handlers, forms, free_agents, invitations, leagues, registrations, teams,
};
use crate::state::AppState;

/// Builds the full HTTP surface over the given state
pub fn router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(auth_handlers::health_check))
        // Accounts
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route(
            "/api/accounts/me",
            get(auth_handlers::me).put(auth_handlers::update_me),
        )
        // Sports, leagues and divisions
        .route(
            "/api/sports",
            get(leagues::list_sports).post(leagues::create_sport),
        )
        .route("/api/sports/:id/divisions", post(leagues::create_division))
        .route(
            "/api/leagues",
            get(leagues::open_leagues).post(leagues::create_league),
        )
        .route(
            "/api/leagues/:id",
            get(leagues::get_league).put(leagues::update_league),
        )
        .route(
            "/api/leagues/:id/divisions",
            get(leagues::league_divisions).put(leagues::set_league_divisions),
        )
        .route(
            "/api/leagues/:id/divisions-teams",
            get(leagues::league_divisions_teams),
        )
        .route(
            "/api/leagues/:id/registrations",
            get(registrations::league_registrations),
        )
        .route(
            "/api/leagues/:id/registration-stats",
            get(registrations::league_registration_stats),
        )
        .route(
            "/api/leagues/:id/checkout",
            post(registrations::create_checkout),
        )
        .route(
            "/api/leagues/:id/form",
            get(forms::active_form).post(forms::create_form),
        )
        .route("/api/forms/:id/fields", post(forms::add_field))
        .route("/api/divisions/:id", get(leagues::get_division))
        .route("/api/divisions/:id/teams", get(leagues::division_teams))
        // Teams
        .route("/api/teams/manage", get(teams::manage_teams))
        .route(
            "/api/teams",
            get(teams::manage_teams).post(teams::create_team),
        )
        .route("/api/teams/dashboard", get(teams::dashboard))
        .route(
            "/api/teams/signup/:code",
            get(teams::signup_team).post(teams::signup_player),
        )
        .route(
            "/api/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/api/teams/:id/claim", post(teams::claim_team))
        .route("/api/teams/:id/players", get(teams::team_players))
        .route(
            "/api/teams/:id/pending-invitations",
            get(teams::pending_invitations),
        )
        .route("/api/teams/:id/assign-player", post(teams::assign_player))
        .route(
            "/api/teams/:id/remove-player/:player_id",
            post(teams::remove_player),
        )
        // Free agents and invitations
        .route(
            "/api/free-agents/league/:league_id",
            get(free_agents::pool).post(free_agents::register),
        )
        .route("/api/free-agents/mine", get(free_agents::mine))
        .route("/api/free-agents/:id", get(free_agents::get_free_agent))
        .route("/api/free-agents/:id/invite", post(free_agents::invite))
        .route("/api/invitations/sent", get(invitations::sent))
        .route("/api/invitations/received", get(invitations::received))
        .route("/api/invitations/:id/accept", post(invitations::accept))
        .route("/api/invitations/:id/decline", post(invitations::decline))
        .route("/api/invitations/:id/cancel", post(invitations::cancel))
        .route("/api/notifications", get(invitations::notifications))
        .route(
            "/api/notifications/:id/read",
            post(invitations::mark_notification_read),
        )
        // Registrations and payments
        .route("/api/registrations/manage", get(registrations::manage))
        .route(
            "/api/registrations/success",
            get(registrations::success),
        )
        .route("/api/registrations/cancel", get(registrations::cancel))
        .route(
            "/api/registrations/:id/update-status",
            post(registrations::update_status),
        )
        .route(
            "/api/registrations/:id/form-response",
            post(forms::submit_response),
        )
        .route("/api/admin/stripe/sync", post(registrations::sync_catalog))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
