use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Tells a user an invitation is waiting for them
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvitationNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invitation_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl InvitationNotification {
    pub fn new(user_id: Uuid, invitation_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            invitation_id,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    /// Marks read; the first read time is kept
    pub fn mark_read(&mut self, now: DateTime<Utc>) {
        self.read_at.get_or_insert(now);
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
