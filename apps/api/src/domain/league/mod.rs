// League domain module
// Sports, their divisions, and the leagues that run registration windows

pub mod league;
pub mod sport;

pub use league::{League, LeaguePricing, LeagueSchedule};
pub use sport::{Division, Sport};
