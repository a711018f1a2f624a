// Player domain module
// Rostered players and free agents looking for a team

pub mod free_agent;
pub mod player;
pub mod value_objects;

pub use free_agent::FreeAgent;
pub use player::Player;
pub use value_objects::{FreeAgentStatus, PersonalDetails};
