//! The trip pipeline: record, stage contract, routing and the bounded
//! plan-refine controller.

pub mod orchestrator;
pub mod record;
pub mod routing;
pub mod stages;
pub mod types;

pub use orchestrator::TripController;
pub use record::{
    Activity, ActivityGroup, FlightInfo, FlightLeg, HotelStay, ItineraryRecord, TripDelta,
};
pub use stages::{StageError, TripStage};
pub use types::{StageKind, TripStatus};
