// User domain module
// Accounts, their email value object and account type

#![allow(clippy::module_inception)]

pub mod user;
pub mod value_objects;

pub use user::User;
pub use value_objects::{Email, UserType};
