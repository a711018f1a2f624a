// Payment domain module
// Mirrors of the payment provider's product catalog and price selection

pub mod catalog;

pub use catalog::{
    select_price_for_membership, to_minor_units, RecurringInterval, StripePrice, StripeProduct,
};
