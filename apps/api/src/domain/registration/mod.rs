// Registration domain module
// League registrations, their payment status, checkout metadata and read models

#![allow(clippy::module_inception)]

pub mod checkout;
pub mod registration;
pub mod summary;
pub mod value_objects;

pub use checkout::{CheckoutMetadata, METADATA_VALUE_LIMIT};
pub use registration::Registration;
pub use summary::{
    group_by_division, sort_for_management, DivisionGroup, LeagueRegistrationStats,
    ManagementStats, RegistrationFilter, RegistrationSummary,
};
pub use value_objects::PaymentStatus;
