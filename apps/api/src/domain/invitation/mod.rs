// Invitation domain module
// Team invitations to free agents, their lifecycle events and notifications

#![allow(clippy::module_inception)]

pub mod events;
pub mod invitation;
pub mod notification;
pub mod value_objects;

pub use events::InvitationEvent;
pub use invitation::TeamInvitation;
pub use notification::InvitationNotification;
pub use value_objects::InvitationStatus;
