use serde::Deserialize;
use serde_json::Value;

use crate::collab::parsing::{lenient_nights, parse_amount};
use crate::trip::StageError;

pub(crate) const DEFAULT_ORIGIN: &str = "Unknown";
pub(crate) const DEFAULT_START_WINDOW: &str = "Flexible";
pub(crate) const DEFAULT_BUDGET: f64 = 2500.0;
pub(crate) const DEFAULT_NIGHTS: u32 = 3;

/// Validated planner output.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub origin: String,
    pub destinations: Vec<String>,
    pub durations: Vec<u32>,
    pub start_window: String,
    pub budget: f64,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct Nights(#[serde(deserialize_with = "lenient_nights")] pub(crate) u32);

/// Raw extraction as returned by the generator. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PlannerPayload {
    pub(crate) origin: Option<String>,
    pub(crate) destinations: Option<Vec<String>>,
    pub(crate) durations: Option<Vec<Nights>>,
    pub(crate) start_window: Option<String>,
    pub(crate) budget: Option<Value>,
}

impl PlannerPayload {
    /// Apply defaults and validate. Returns the plan plus any diagnostics
    /// about adjustments that were made.
    pub(crate) fn into_plan(self) -> Result<(TripPlan, Vec<String>), StageError> {
        let mut notes = Vec::new();

        let destinations: Vec<String> = self
            .destinations
            .unwrap_or_default()
            .into_iter()
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .collect();
        if destinations.is_empty() {
            return Err(StageError::InvalidPlan(
                "no destinations could be extracted from the request".to_string(),
            ));
        }

        let mut durations: Vec<u32> = self
            .durations
            .unwrap_or_default()
            .into_iter()
            .map(|nights| nights.0)
            .collect();
        if durations.len() > destinations.len() {
            notes.push(format!(
                "Planner returned {} durations for {} destinations; extra durations dropped",
                durations.len(),
                destinations.len()
            ));
            durations.truncate(destinations.len());
        }
        durations.resize(destinations.len(), DEFAULT_NIGHTS);

        let budget = match self.budget {
            None | Some(Value::Null) => DEFAULT_BUDGET,
            Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(text)) => parse_amount(&text).ok_or_else(|| {
                StageError::InvalidPlan(format!("budget {text:?} is not a readable amount"))
            })?,
            Some(other) => {
                return Err(StageError::InvalidPlan(format!(
                    "budget has unexpected shape: {other}"
                )));
            }
        };
        if !budget.is_finite() || budget < 0.0 {
            return Err(StageError::InvalidPlan(format!(
                "budget must be a non-negative amount, got {budget}"
            )));
        }

        let plan = TripPlan {
            origin: non_blank(self.origin, DEFAULT_ORIGIN),
            destinations,
            durations,
            start_window: non_blank(self.start_window, DEFAULT_START_WINDOW),
            budget,
        };
        Ok((plan, notes))
    }
}

fn non_blank(value: Option<String>, fallback: &str) -> String {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
