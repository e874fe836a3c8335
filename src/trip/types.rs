use std::fmt;

use serde::Serialize;

/// Logical stages in the trip pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Planner,
    Flights,
    Hotels,
    Activities,
    Cost,
    Controller,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageKind::Planner => "planner",
            StageKind::Flights => "flights",
            StageKind::Hotels => "hotels",
            StageKind::Activities => "activities",
            StageKind::Cost => "cost",
            StageKind::Controller => "controller",
        };
        write!(f, "{label}")
    }
}

/// Where the record sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Started,
    PlanningComplete,
    FlightsFound,
    HotelsFound,
    ActivitiesFound,
    WithinBudget,
    OverBudget,
    Error,
    BudgetUnreachable,
    Cancelled,
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TripStatus::Started => "started",
            TripStatus::PlanningComplete => "planning_complete",
            TripStatus::FlightsFound => "flights_found",
            TripStatus::HotelsFound => "hotels_found",
            TripStatus::ActivitiesFound => "activities_found",
            TripStatus::WithinBudget => "within_budget",
            TripStatus::OverBudget => "over_budget",
            TripStatus::Error => "error",
            TripStatus::BudgetUnreachable => "budget_unreachable",
            TripStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}
