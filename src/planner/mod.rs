//! Turns the free-text request into origin, destinations, stay lengths,
//! departure window and budget.

mod prompt;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::collab::{CollaboratorError, GenerationRequest, TextGenerator};
use crate::trip::{ItineraryRecord, StageError, StageKind, TripDelta, TripStage, TripStatus};

use prompt::{PLANNER_SYSTEM_PROMPT, planner_user_content};
use types::PlannerPayload;

/// Ask the generator for a structured plan and validate it locally.
pub async fn plan(
    generator: &dyn TextGenerator,
    record: &ItineraryRecord,
) -> Result<(types::TripPlan, Vec<String>), StageError> {
    let replanning = record.status == TripStatus::OverBudget;
    let request = GenerationRequest::json(
        PLANNER_SYSTEM_PROMPT,
        planner_user_content(record, replanning),
    );

    let value = generator.generate_json(request).await?;
    let payload: PlannerPayload = serde_json::from_value(value).map_err(|err| {
        CollaboratorError::malformed("text generation", format!("planner payload: {err}"))
    })?;

    let (plan, notes) = payload.into_plan()?;
    debug!(
        origin = %plan.origin,
        destinations = ?plan.destinations,
        budget = plan.budget,
        replanning,
        "trip plan extracted"
    );
    Ok((plan, notes))
}

pub struct PlannerStage {
    generator: Arc<dyn TextGenerator>,
}

impl PlannerStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl TripStage for PlannerStage {
    fn kind(&self) -> StageKind {
        StageKind::Planner
    }

    async fn run(&self, record: &ItineraryRecord) -> Result<TripDelta, StageError> {
        let (plan, notes) = plan(self.generator.as_ref(), record).await?;

        let mut delta = TripDelta {
            origin: Some(plan.origin),
            destinations: Some(plan.destinations),
            durations: Some(plan.durations),
            start_window: Some(plan.start_window),
            budget: Some(plan.budget),
            status: Some(TripStatus::PlanningComplete),
            ..TripDelta::default()
        };
        for note in notes {
            delta = delta.with_message(StageKind::Planner, note);
        }
        Ok(delta)
    }
}
