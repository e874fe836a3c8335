use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::collab::{CollaboratorError, GenerationRequest, SearchDepth, TextGenerator, WebSearch};
use crate::trip::{
    Activity, ActivityGroup, ItineraryRecord, StageError, StageKind, TripDelta, TripStage,
    TripStatus,
};

const SEARCH_RESULTS: usize = 6;

/// Per-destination activity discovery. A failing city gets an empty list
/// and a diagnostic; it never fails the stage.
pub struct ActivityFinder {
    generator: Arc<dyn TextGenerator>,
    search: Arc<dyn WebSearch>,
    cost_per_city: f64,
    max_activities: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActivityList {
    activities: Vec<Activity>,
}

fn refine_prompt(city: &str, request: &str) -> String {
    format!(
        "Transform this user request into a highly effective search engine query for finding \
         local activities in {city}. Reply with the query only. Request: {request}"
    )
}

fn extraction_prompt(request: &str, limit: usize) -> String {
    format!(
        r#"You are a local tour guide. Based on the context provided, find {limit} activities that best match the traveller's interest: "{request}".

Return ONLY a JSON object with a key "activities" containing a list of objects:
- name (string)
- description (string, one sentence)
- cost (string, e.g. "Free", "$15" or "Pricey")
- vibe (string, e.g. "Adventurous", "Relaxing" or "Cultural")
- url (string, the source URL if provided, else "N/A")"#
    )
}

impl ActivityFinder {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
        cost_per_city: f64,
        max_activities: usize,
    ) -> Self {
        Self {
            generator,
            search,
            cost_per_city,
            max_activities,
        }
    }

    pub async fn activities_for(
        &self,
        city: &str,
        request: &str,
    ) -> Result<Vec<Activity>, CollaboratorError> {
        let query = self
            .generator
            .generate(GenerationRequest::text(refine_prompt(city, request)))
            .await?;
        let query = query.trim().trim_matches('"');
        debug!(city, query, "activity query refined");

        let hits = self
            .search
            .search(query, SearchDepth::Advanced, SEARCH_RESULTS)
            .await?;
        let context = hits
            .iter()
            .map(|hit| format!("{} (source: {})", hit.content, hit.url))
            .collect::<Vec<_>>()
            .join("\n");

        let value = self
            .generator
            .generate_json(GenerationRequest::json(
                extraction_prompt(request, self.max_activities),
                format!("Destination: {city}\n\nContext: {context}"),
            ))
            .await?;
        let mut list: ActivityList = serde_json::from_value(value).map_err(|err| {
            CollaboratorError::malformed("text generation", format!("activities: {err}"))
        })?;

        list.activities.truncate(self.max_activities);
        Ok(list.activities)
    }
}

#[async_trait]
impl TripStage for ActivityFinder {
    fn kind(&self) -> StageKind {
        StageKind::Activities
    }

    async fn run(&self, record: &ItineraryRecord) -> Result<TripDelta, StageError> {
        let lookups = record
            .destinations
            .iter()
            .map(|city| self.activities_for(city, record.request()));
        let results = join_all(lookups).await;

        let mut delta = TripDelta::status(TripStatus::ActivitiesFound);
        let mut groups = Vec::with_capacity(results.len());
        for (city, result) in record.destinations.iter().zip(results) {
            let activities = match result {
                Ok(activities) => activities,
                Err(error) => {
                    warn!(city = %city, %error, "activity lookup failed");
                    delta = delta.with_message(
                        StageKind::Activities,
                        format!("Activity lookup for {city} failed: {error}"),
                    );
                    Vec::new()
                }
            };
            groups.push(ActivityGroup {
                location: city.clone(),
                cost: self.cost_per_city,
                activities,
            });
        }

        delta.activity_info = Some(groups);
        Ok(delta)
    }
}
