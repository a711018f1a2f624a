use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a team invitation
///
/// # Status Transitions
/// ```text
/// Pending -> Accepted
///        \-> Declined
///        \-> Expired
///        \-> Cancelled
/// Declined | Expired | Cancelled -> Pending   (captain re-sends)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Cancelled,
}

impl InvitationStatus {
    pub const ALL: [InvitationStatus; 5] = [
        InvitationStatus::Pending,
        InvitationStatus::Accepted,
        InvitationStatus::Declined,
        InvitationStatus::Expired,
        InvitationStatus::Cancelled,
    ];

    /// Checks if a transition from current status to next status is valid
    ///
    /// # Example
    /// ```
    /// use league_signup_api::domain::invitation::InvitationStatus;
    ///
    /// assert!(InvitationStatus::Pending.can_transition_to(InvitationStatus::Accepted));
    /// assert!(!InvitationStatus::Accepted.can_transition_to(InvitationStatus::Declined));
    /// ```
    pub fn can_transition_to(&self, next: InvitationStatus) -> bool {
        use InvitationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Declined)
                | (Pending, Expired)
                | (Pending, Cancelled)
                | (Declined, Pending)
                | (Expired, Pending)
                | (Cancelled, Pending)
        )
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvitationStatus::Pending => write!(f, "PENDING"),
            InvitationStatus::Accepted => write!(f, "ACCEPTED"),
            InvitationStatus::Declined => write!(f, "DECLINED"),
            InvitationStatus::Expired => write!(f, "EXPIRED"),
            InvitationStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvitationStatus::*;

    #[test]
    fn pending_resolves_every_way() {
        for next in [Accepted, Declined, Expired, Cancelled] {
            assert!(Pending.can_transition_to(next), "Pending -> {}", next);
        }
    }

    #[test]
    fn accepted_is_final() {
        for next in InvitationStatus::ALL {
            assert!(!Accepted.can_transition_to(next));
        }
    }

    #[test]
    fn closed_invitations_can_be_reopened() {
        assert!(Declined.can_transition_to(Pending));
        assert!(Expired.can_transition_to(Pending));
        assert!(Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn closed_invitations_cannot_be_accepted() {
        assert!(!Declined.can_transition_to(Accepted));
        assert!(!Expired.can_transition_to(Accepted));
        assert!(!Cancelled.can_transition_to(Declined));
    }

    #[test]
    fn status_display() {
        assert_eq!(Pending.to_string(), "PENDING");
        assert_eq!(Cancelled.to_string(), "CANCELLED");
        assert_eq!(serde_json::to_string(&Expired).unwrap(), "\"EXPIRED\"");
    }
}
