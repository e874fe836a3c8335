use async_trait::async_trait;
use tracing::info;

use crate::trip::{
    ActivityGroup, FlightInfo, HotelStay, ItineraryRecord, StageError, StageKind, TripDelta,
    TripStage, TripStatus,
};

/// Missing or non-finite amounts count as zero.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn total_cost(flight: &FlightInfo, hotels: &[HotelStay], activities: &[ActivityGroup]) -> f64 {
    finite_or_zero(flight.price)
        + hotels.iter().map(|stay| finite_or_zero(stay.price)).sum::<f64>()
        + activities
            .iter()
            .map(|group| finite_or_zero(group.cost))
            .sum::<f64>()
}

pub fn budget_status(total: f64, budget: f64) -> TripStatus {
    if total <= budget {
        TripStatus::WithinBudget
    } else {
        TripStatus::OverBudget
    }
}

/// Sums the itinerary and compares it with the budget.
pub struct CostAccountant;

#[async_trait]
impl TripStage for CostAccountant {
    fn kind(&self) -> StageKind {
        StageKind::Cost
    }

    async fn run(&self, record: &ItineraryRecord) -> Result<TripDelta, StageError> {
        let total = total_cost(&record.flight_info, &record.hotel_info, &record.activity_info);
        let status = budget_status(total, record.budget);
        info!(total, budget = record.budget, %status, "cost accounted");

        Ok(TripDelta {
            total_cost: Some(total),
            status: Some(status),
            ..TripDelta::default()
        })
    }
}
