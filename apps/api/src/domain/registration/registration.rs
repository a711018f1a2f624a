use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::value_objects::PaymentStatus;

/// A player's entry into a league division
///
/// # Invariants
/// - One registration per (player, league) (enforced by storage)
/// - A checkout session backs at most one registration
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub player_id: Uuid,
    pub league_id: Uuid,
    pub division_id: Uuid,
    pub registered_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub stripe_payment_intent: Option<String>,
    pub stripe_checkout_session: Option<String>,
    pub notes: String,
    pub is_late_registration: bool,
}

impl Registration {
    /// Registration created once a checkout session is confirmed paid
    pub fn paid(
        player_id: Uuid,
        league_id: Uuid,
        division_id: Uuid,
        checkout_session: String,
        payment_intent: Option<String>,
        notes: &str,
        is_late_registration: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            league_id,
            division_id,
            registered_at: Utc::now(),
            payment_status: PaymentStatus::Paid,
            stripe_payment_intent: payment_intent,
            stripe_checkout_session: Some(checkout_session),
            notes: notes.trim().to_string(),
            is_late_registration,
        }
    }

    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_registration_carries_session() {
        let reg = Registration::paid(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "cs_test_1".to_string(),
            Some("pi_1".to_string()),
            " note ",
            true,
        );
        assert_eq!(reg.payment_status, PaymentStatus::Paid);
        assert_eq!(reg.stripe_checkout_session.as_deref(), Some("cs_test_1"));
        assert_eq!(reg.notes, "note");
        assert!(reg.is_late_registration);
    }

    #[test]
    fn status_can_be_overridden() {
        let mut reg = Registration::paid(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "cs".to_string(),
            None,
            "",
            false,
        );
        reg.set_payment_status(PaymentStatus::Refunded);
        assert_eq!(reg.payment_status, PaymentStatus::Refunded);
    }
}
