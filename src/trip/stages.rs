use async_trait::async_trait;
use thiserror::Error;

use crate::collab::CollaboratorError;

use super::record::{ItineraryRecord, TripDelta};
use super::types::StageKind;

/// Failure a stage hands back to the controller. It never escapes a run;
/// the controller turns it into an `error` status plus a diagnostic.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("{0}")]
    NoResults(String),

    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}

/// One step of the trip pipeline. Stages read the record and return a delta;
/// only the controller mutates the record.
#[async_trait]
pub trait TripStage: Send + Sync {
    fn kind(&self) -> StageKind;

    async fn run(&self, record: &ItineraryRecord) -> Result<TripDelta, StageError>;
}
