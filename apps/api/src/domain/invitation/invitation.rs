use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::events::InvitationEvent;
use super::value_objects::InvitationStatus;
use crate::domain::errors::{DomainError, DomainResult};

/// An offer from a team captain to a free agent
///
/// # Invariants
/// - One invitation row per (team, free agent) pair (enforced by storage);
///   re-sending reopens the existing row
/// - `response_at` is set exactly when the free agent answered
/// - Status changes follow [`InvitationStatus::can_transition_to`]
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamInvitation {
    pub id: Uuid,
    pub team_id: Uuid,
    pub free_agent_id: Uuid,
    pub status: InvitationStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub response_at: Option<DateTime<Utc>>,
}

impl TeamInvitation {
    /// Creates a pending invitation together with its `Sent` event
    pub fn new(team_id: Uuid, free_agent_id: Uuid, message: Option<String>) -> (Self, InvitationEvent) {
        let invitation = Self {
            id: Uuid::new_v4(),
            team_id,
            free_agent_id,
            status: InvitationStatus::Pending,
            message: message.map(|m| m.trim().to_string()).unwrap_or_default(),
            created_at: Utc::now(),
            response_at: None,
        };
        let event = invitation.sent_event();
        (invitation, event)
    }

    /// Sends a closed invitation again, restarting the expiry clock
    pub fn reopen(&mut self, message: Option<String>) -> DomainResult<InvitationEvent> {
        match self.status {
            InvitationStatus::Pending => {
                return Err(DomainError::conflict(
                    "An invitation is already pending for this free agent",
                ))
            }
            InvitationStatus::Accepted => {
                return Err(DomainError::conflict(
                    "This free agent has already joined a team",
                ))
            }
            _ => {}
        }
        self.move_to(InvitationStatus::Pending)?;
        self.created_at = Utc::now();
        self.response_at = None;
        if let Some(message) = message {
            self.message = message.trim().to_string();
        }
        Ok(self.sent_event())
    }

    /// True when still pending after `window` has elapsed since it was sent
    pub fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.status == InvitationStatus::Pending && now > self.created_at + window
    }

    /// Marks the invitation expired if the window has passed
    ///
    /// Returns the event only when the status actually changed.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>, window: Duration) -> Option<InvitationEvent> {
        if !self.is_expired(now, window) {
            return None;
        }
        self.status = InvitationStatus::Expired;
        Some(InvitationEvent::Expired { invitation_id: self.id })
    }

    pub fn accept(&mut self, now: DateTime<Utc>) -> DomainResult<InvitationEvent> {
        self.move_to(InvitationStatus::Accepted)?;
        self.response_at = Some(now);
        Ok(InvitationEvent::Accepted {
            invitation_id: self.id,
            team_id: self.team_id,
            free_agent_id: self.free_agent_id,
        })
    }

    pub fn decline(&mut self, now: DateTime<Utc>) -> DomainResult<InvitationEvent> {
        self.move_to(InvitationStatus::Declined)?;
        self.response_at = Some(now);
        Ok(InvitationEvent::Declined { invitation_id: self.id })
    }

    pub fn cancel(&mut self) -> DomainResult<InvitationEvent> {
        self.move_to(InvitationStatus::Cancelled)?;
        Ok(InvitationEvent::Cancelled { invitation_id: self.id })
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    fn move_to(&mut self, next: InvitationStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::transition("invitation", self.status, next));
        }
        self.status = next;
        Ok(())
    }

    fn sent_event(&self) -> InvitationEvent {
        InvitationEvent::Sent {
            invitation_id: self.id,
            team_id: self.team_id,
            free_agent_id: self.free_agent_id,
        }
    }
}
