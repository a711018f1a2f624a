//! Paid registration through the hosted checkout.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::domain::errors::DomainError;
use crate::domain::league::League;
use crate::domain::payment::{select_price_for_membership, to_minor_units};
use crate::domain::player::{PersonalDetails, Player};
use crate::domain::registration::{CheckoutMetadata, Registration};
use crate::domain::repositories::RepositoryError;
use crate::domain::user::User;
use crate::infrastructure::payments::{CheckoutRequest, LineItem};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStarted {
    pub session_id: String,
    pub checkout_url: Option<String>,
}

async fn line_item_for(state: &AppState, league: &League, is_member: bool) -> ServiceResult<LineItem> {
    if let Some(stripe_id) = league.stripe_product_id() {
        if let Some(product) = state.catalog.find_product_by_stripe_id(stripe_id).await? {
            let prices = state.catalog.prices_for_product(product.id).await?;
            if let Some(price) = select_price_for_membership(&prices, is_member) {
                return Ok(LineItem::Catalog {
                    price_id: price.stripe_id.clone(),
                });
            }
            tracing::warn!(
                league_id = %league.id(),
                product = %stripe_id,
                is_member,
                "no mirrored price matches membership, charging inline price"
            );
        }
    }

    let today = Utc::now().date_naive();
    Ok(LineItem::Inline {
        currency: state.config.stripe_currency.clone(),
        unit_amount: to_minor_units(league.price_for(today))?,
        name: league.name().to_string(),
        description: league.description().to_string(),
    })
}

/// Opens a checkout session for a league registration
///
/// The player and registration are only created once the session is paid;
/// until then everything needed travels as session metadata.
pub async fn start_checkout(
    state: &AppState,
    league_id: Uuid,
    division_id: Uuid,
    details: PersonalDetails,
    notes: &str,
) -> ServiceResult<CheckoutStarted> {
    let league = state
        .leagues
        .find_league(league_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("League not found"))?;

    let today = Utc::now().date_naive();
    if !league.is_registration_open(today) {
        return Err(DomainError::validation("Registration is not open for this league").into());
    }
    if !league.offers_division(division_id) {
        return Err(DomainError::validation("Selected division is not available in this league").into());
    }

    let details = details.normalized()?;
    let line_item = line_item_for(state, &league, details.is_member).await?;
    let metadata = CheckoutMetadata {
        player: details.clone(),
        notes: notes.trim().to_string(),
        league_id,
        division_id,
        is_late_registration: !league.is_early_registration_active(today),
    };

    let base = state.config.public_base_url.trim_end_matches('/');
    let request = CheckoutRequest {
        line_item,
        metadata: metadata.to_metadata()?,
        customer_email: Some(details.email.as_str().to_string()),
        success_url: format!("{}/api/registrations/success?session_id={{CHECKOUT_SESSION_ID}}", base),
        cancel_url: format!("{}/api/registrations/cancel", base),
    };

    let session = state.payments.create_checkout_session(&request).await?;
    tracing::info!(
        session_id = %session.id,
        league_id = %league_id,
        division_id = %division_id,
        "checkout session created"
    );

    Ok(CheckoutStarted {
        session_id: session.id,
        checkout_url: session.url,
    })
}

/// Hands back a stored registration only to its player's account or an admin
async fn owned_by(state: &AppState, user: &User, registration: Registration) -> ServiceResult<Registration> {
    if user.is_admin() {
        return Ok(registration);
    }
    let player = state.players.find_player(registration.player_id).await?;
    if player.and_then(|p| p.user_id) != Some(user.id) {
        return Err(ServiceError::forbidden("This registration belongs to another account"));
    }
    Ok(registration)
}

/// Records the registration for a paid session
///
/// Calling it again for the same session returns the stored registration.
pub async fn complete_registration(
    state: &AppState,
    user: &User,
    session_id: &str,
) -> ServiceResult<Registration> {
    let session_id = session_id.trim();
    if session_id.is_empty() {
        return Err(DomainError::validation("No session ID provided").into());
    }

    if let Some(existing) = state.registrations.find_by_checkout_session(session_id).await? {
        return owned_by(state, user, existing).await;
    }

    let session = state.payments.retrieve_checkout_session(session_id).await?;
    if !session.is_paid() {
        return Err(ServiceError::PaymentRequired(format!(
            "Checkout session is {}",
            session.payment_status
        )));
    }

    let metadata = CheckoutMetadata::from_metadata(&session.metadata)?;
    let player = Player::new(metadata.player, Some(user.id), None)?;
    let registration = Registration::paid(
        player.id,
        metadata.league_id,
        metadata.division_id,
        session.id.clone(),
        session.payment_intent.clone(),
        &metadata.notes,
        metadata.is_late_registration,
    );

    match state.registrations.create_with_player(&player, &registration).await {
        Ok(()) => {}
        // Another request for the same session won the race
        Err(RepositoryError::Conflict(_)) => {
            if let Some(existing) = state.registrations.find_by_checkout_session(&session.id).await? {
                return owned_by(state, user, existing).await;
            }
            return Err(RepositoryError::conflict("Registration already exists").into());
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        event = "registration.paid",
        registration_id = %registration.id,
        player_id = %player.id,
        league_id = %registration.league_id,
        late = registration.is_late_registration,
        "registration recorded"
    );
    Ok(registration)
}
