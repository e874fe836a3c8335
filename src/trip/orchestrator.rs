use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::collab::Collaborators;
use crate::config::{Config, constants::DEFAULT_MAX_CYCLES};
use crate::finders::{ActivityFinder, CostAccountant, FlightFinder, HotelFinder};
use crate::planner::PlannerStage;

use super::record::{ItineraryRecord, TripDelta};
use super::routing::{Route, RoutingPolicy};
use super::stages::TripStage;
use super::types::{StageKind, TripStatus};

/// Runs the stage chain in order, merging each delta, and loops back to the
/// first stage while the trip stays over budget, at most `max_cycles` times.
pub struct TripController {
    stages: Vec<Box<dyn TripStage>>,
    max_cycles: u32,
    cancel: Arc<AtomicBool>,
}

impl TripController {
    pub fn new(stages: Vec<Box<dyn TripStage>>, max_cycles: u32) -> Self {
        Self {
            stages,
            max_cycles: max_cycles.max(1),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn builder() -> TripPipelineBuilder {
        TripPipelineBuilder::new()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub async fn run(&self, request: impl Into<String>) -> ItineraryRecord {
        let mut record = ItineraryRecord::new(request);

        loop {
            if self.is_cancelled() {
                return cancelled(record);
            }

            record.cycle += 1;
            info!(cycle = record.cycle, max_cycles = self.max_cycles, "planning cycle started");

            for stage in &self.stages {
                if self.is_cancelled() {
                    return cancelled(record);
                }

                let kind = stage.kind();
                debug!(stage = %kind, cycle = record.cycle, "stage started");
                let delta = match stage.run(&record).await {
                    Ok(delta) => delta,
                    Err(error) => {
                        warn!(stage = %kind, cycle = record.cycle, %error, "stage failed");
                        TripDelta::failed(kind, format!("{kind} failed: {error}"))
                    }
                };
                record.apply(delta);
                info!(stage = %kind, status = %record.status, "stage finished");

                if record.status == TripStatus::Error {
                    return record;
                }
            }

            match RoutingPolicy::decide(record.status) {
                Route::Success => {
                    info!(
                        cycle = record.cycle,
                        total = record.total_cost,
                        budget = record.budget,
                        "trip fits the budget"
                    );
                    return record;
                }
                Route::Recalculate if record.cycle >= self.max_cycles => {
                    return budget_unreachable(record);
                }
                Route::Recalculate => {
                    let text = format!(
                        "Over budget: total ${:.2} exceeds budget ${:.2}, replanning",
                        record.total_cost, record.budget
                    );
                    info!(cycle = record.cycle, "{text}");
                    record.record_message(StageKind::Controller, text);
                }
                Route::Halt => return record,
            }
        }
    }
}

fn budget_unreachable(mut record: ItineraryRecord) -> ItineraryRecord {
    warn!(
        cycles = record.cycle,
        total = record.total_cost,
        budget = record.budget,
        "budget still exceeded, giving up"
    );
    let text = format!(
        "Budget unreachable: total ${:.2} still exceeds budget ${:.2} after {} planning cycles",
        record.total_cost, record.budget, record.cycle
    );
    record.apply(
        TripDelta::status(TripStatus::BudgetUnreachable).with_message(StageKind::Controller, text),
    );
    record
}

fn cancelled(mut record: ItineraryRecord) -> ItineraryRecord {
    info!(cycle = record.cycle, "run cancelled");
    record.apply(
        TripDelta::status(TripStatus::Cancelled)
            .with_message(StageKind::Controller, "Planning cancelled"),
    );
    record
}

pub struct TripPipelineBuilder {
    stages: Vec<Box<dyn TripStage>>,
    max_cycles: u32,
    cancel: Option<Arc<AtomicBool>>,
}

impl TripPipelineBuilder {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            max_cycles: DEFAULT_MAX_CYCLES,
            cancel: None,
        }
    }

    pub fn add_stage<S>(mut self, stage: S) -> Self
    where
        S: TripStage + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn max_cycles(mut self, max_cycles: u32) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Share an externally owned cancellation flag, e.g. one set from a
    /// Ctrl-C handler.
    pub fn cancel_on(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Standard planner → flights → hotels → activities → cost chain.
    pub fn with_standard_stages(self, config: &Config, collaborators: &Collaborators) -> Self {
        let pipeline = &config.pipeline;
        self.add_stage(PlannerStage::new(Arc::clone(&collaborators.text)))
            .add_stage(FlightFinder::new(
                Arc::clone(&collaborators.text),
                Arc::clone(&collaborators.search),
                pipeline.seat_class.clone(),
            ))
            .add_stage(HotelFinder::new(
                Arc::clone(&collaborators.store),
                pipeline.hotel_budget_share,
                config.store.top_k,
                pipeline.hotel_pricing,
            ))
            .add_stage(ActivityFinder::new(
                Arc::clone(&collaborators.text),
                Arc::clone(&collaborators.search),
                pipeline.activity_cost_per_city,
                pipeline.max_activities,
            ))
            .add_stage(CostAccountant)
    }

    pub fn build(self) -> TripController {
        let mut controller = TripController::new(self.stages, self.max_cycles);
        if let Some(flag) = self.cancel {
            controller.cancel = flag;
        }
        controller
    }
}

impl Default for TripPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
