use uuid::Uuid;

/// Domain events in the life of a team invitation
///
/// Handlers log these and turn `Sent` into a notification for the free
/// agent's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationEvent {
    /// A captain invited a free agent (new or re-sent invitation)
    Sent {
        invitation_id: Uuid,
        team_id: Uuid,
        free_agent_id: Uuid,
    },
    /// The free agent joined the team
    Accepted {
        invitation_id: Uuid,
        team_id: Uuid,
        free_agent_id: Uuid,
    },
    /// The free agent turned the team down
    Declined { invitation_id: Uuid },
    /// The invitation sat pending past the expiry window
    Expired { invitation_id: Uuid },
    /// The captain withdrew it, or the free agent joined another team
    Cancelled { invitation_id: Uuid },
}

impl InvitationEvent {
    pub fn invitation_id(&self) -> Uuid {
        match self {
            InvitationEvent::Sent { invitation_id, .. }
            | InvitationEvent::Accepted { invitation_id, .. }
            | InvitationEvent::Declined { invitation_id }
            | InvitationEvent::Expired { invitation_id }
            | InvitationEvent::Cancelled { invitation_id } => *invitation_id,
        }
    }

    /// Short name used as the `event` field in logs
    pub fn name(&self) -> &'static str {
        match self {
            InvitationEvent::Sent { .. } => "invitation.sent",
            InvitationEvent::Accepted { .. } => "invitation.accepted",
            InvitationEvent::Declined { .. } => "invitation.declined",
            InvitationEvent::Expired { .. } => "invitation.expired",
            InvitationEvent::Cancelled { .. } => "invitation.cancelled",
        }
    }
}
