use serde::{Deserialize, Serialize};

use crate::collab::parsing::lenient_nights;

use super::types::{StageKind, TripStatus};

/// One flight in a multi-city itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub date: String,
    #[serde(default = "unknown_carrier", alias = "airline")]
    pub carrier: String,
    #[serde(default, alias = "duration_of_stay", deserialize_with = "lenient_nights")]
    pub nights: u32,
}

fn unknown_carrier() -> String {
    "TBD".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightInfo {
    pub price: f64,
    pub summary: String,
    pub legs: Vec<FlightLeg>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelStay {
    pub location: String,
    pub price: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub vibe: String,
    #[serde(default = "no_source")]
    pub url: String,
}

fn no_source() -> String {
    "N/A".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityGroup {
    pub location: String,
    pub cost: f64,
    pub activities: Vec<Activity>,
}

/// A diagnostic appended to the record's log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub stage: StageKind,
    pub cycle: u32,
    pub text: String,
}

/// The itinerary threaded through every stage of a planning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryRecord {
    request: String,
    pub origin: String,
    pub destinations: Vec<String>,
    pub durations: Vec<u32>,
    pub start_window: String,
    pub budget: f64,
    pub flight_info: FlightInfo,
    pub hotel_info: Vec<HotelStay>,
    pub activity_info: Vec<ActivityGroup>,
    pub total_cost: f64,
    pub status: TripStatus,
    pub cycle: u32,
    messages: Vec<Diagnostic>,
}

impl ItineraryRecord {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            origin: String::new(),
            destinations: Vec::new(),
            durations: Vec::new(),
            start_window: String::new(),
            budget: 0.0,
            flight_info: FlightInfo::default(),
            hotel_info: Vec::new(),
            activity_info: Vec::new(),
            total_cost: 0.0,
            status: TripStatus::Started,
            cycle: 0,
            messages: Vec::new(),
        }
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Diagnostic> {
        self.messages.last()
    }

    pub fn record_message(&mut self, stage: StageKind, text: impl Into<String>) {
        let cycle = self.cycle;
        self.messages.push(Diagnostic {
            stage,
            cycle,
            text: text.into(),
        });
    }

    /// Merge a stage's partial update. Present fields overwrite wholesale;
    /// messages are appended in order.
    pub fn apply(&mut self, delta: TripDelta) {
        let TripDelta {
            origin,
            destinations,
            durations,
            start_window,
            budget,
            flight_info,
            hotel_info,
            activity_info,
            total_cost,
            status,
            messages,
        } = delta;

        if let Some(origin) = origin {
            self.origin = origin;
        }
        if let Some(destinations) = destinations {
            self.destinations = destinations;
        }
        if let Some(durations) = durations {
            self.durations = durations;
        }
        if let Some(start_window) = start_window {
            self.start_window = start_window;
        }
        if let Some(budget) = budget {
            self.budget = budget;
        }
        if let Some(flight_info) = flight_info {
            self.flight_info = flight_info;
        }
        if let Some(hotel_info) = hotel_info {
            self.hotel_info = hotel_info;
        }
        if let Some(activity_info) = activity_info {
            self.activity_info = activity_info;
        }
        if let Some(total_cost) = total_cost {
            self.total_cost = total_cost;
        }
        if let Some(status) = status {
            self.status = status;
        }
        for (stage, text) in messages {
            self.record_message(stage, text);
        }
    }
}

/// Sparse update produced by a stage. `None` leaves the record field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripDelta {
    pub origin: Option<String>,
    pub destinations: Option<Vec<String>>,
    pub durations: Option<Vec<u32>>,
    pub start_window: Option<String>,
    pub budget: Option<f64>,
    pub flight_info: Option<FlightInfo>,
    pub hotel_info: Option<Vec<HotelStay>>,
    pub activity_info: Option<Vec<ActivityGroup>>,
    pub total_cost: Option<f64>,
    pub status: Option<TripStatus>,
    pub messages: Vec<(StageKind, String)>,
}

impl TripDelta {
    pub fn status(status: TripStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Error partial: status flips to `error` and the reason is logged.
    pub fn failed(stage: StageKind, reason: impl Into<String>) -> Self {
        Self::status(TripStatus::Error).with_message(stage, reason)
    }

    pub fn with_message(mut self, stage: StageKind, text: impl Into<String>) -> Self {
        self.messages.push((stage, text.into()));
        self
    }
}
