// Team domain module
// Contains the team aggregate root, its captain and signup codes

#![allow(clippy::module_inception)]

pub mod captain;
pub mod team;
pub mod value_objects;

pub use captain::TeamCaptain;
pub use team::Team;
pub use value_objects::SignupCode;
