//! The search stages that fill in flights, stays and activities, plus the
//! cost accountant that closes each cycle.

pub mod activities;
pub mod cost;
pub mod flights;
pub mod hotels;

pub use activities::ActivityFinder;
pub use cost::CostAccountant;
pub use flights::FlightFinder;
pub use hotels::HotelFinder;
