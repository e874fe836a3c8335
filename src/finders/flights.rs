use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::collab::parsing::amount_or_zero;
use crate::collab::{CollaboratorError, GenerationRequest, SearchDepth, TextGenerator, WebSearch};
use crate::trip::{
    FlightInfo, FlightLeg, ItineraryRecord, StageError, StageKind, TripDelta, TripStage,
    TripStatus,
};

const SEARCH_RESULTS: usize = 5;
const MAX_ITINERARIES: usize = 3;

/// Multi-city flight search: web search for fares, then structured
/// extraction of complete itineraries. The first itinerary returned wins.
pub struct FlightFinder {
    generator: Arc<dyn TextGenerator>,
    search: Arc<dyn WebSearch>,
    seat_class: String,
}

#[derive(Debug, Deserialize)]
struct ItineraryCandidate {
    #[serde(default, alias = "total_price", deserialize_with = "amount_or_zero")]
    total_price_usd: f64,
    #[serde(default)]
    options_description: Option<String>,
    #[serde(default)]
    legs: Vec<FlightLeg>,
}

impl From<ItineraryCandidate> for FlightInfo {
    fn from(candidate: ItineraryCandidate) -> Self {
        FlightInfo {
            price: candidate.total_price_usd,
            summary: candidate.options_description.unwrap_or_default(),
            legs: candidate.legs,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItineraryList {
    itineraries: Vec<ItineraryCandidate>,
}

/// Describe the journey as one continuous route returning to the origin.
pub(crate) fn itinerary_description(
    origin: &str,
    destinations: &[String],
    durations: &[u32],
) -> String {
    let mut description = format!("Start at {origin}, then ");
    for (city, nights) in destinations.iter().zip(durations) {
        description.push_str(&format!("spend approximately {nights} nights in {city}, then "));
    }
    description.push_str(&format!("return to {origin}."));
    description
}

pub(crate) fn flight_query(description: &str, start_window: &str, seat_class: &str) -> String {
    format!(
        "Find flight itineraries for: {description}. \
         Departure window: {start_window}. Class: {seat_class}. \
         Search for 'multi-city fare calendars' and 'flexible round trip multi-stop'. \
         Identify the cheapest sequence of dates that respects the stay durations."
    )
}

fn extraction_prompt() -> String {
    format!(
        r#"You are a world-class travel agent. Using the search context, find the {MAX_ITINERARIES} best full itinerary options.
Each option must include ALL legs of the trip, including the return to the origin.

Return ONLY a JSON object with a key "itineraries" containing a list of objects, best option first:
- total_price_usd (number)
- options_description (string, e.g. "Cheapest route using budget airlines")
- legs (list of objects):
    - from (string)
    - to (string)
    - date (string, YYYY-MM-DD)
    - airline (string)
    - duration_of_stay (integer, nights spent in the "to" city)"#
    )
}

impl FlightFinder {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
        seat_class: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            search,
            seat_class: seat_class.into(),
        }
    }

    /// Candidate itineraries in the order the generator ranked them.
    pub async fn find_itineraries(
        &self,
        record: &ItineraryRecord,
    ) -> Result<Vec<FlightInfo>, CollaboratorError> {
        let description =
            itinerary_description(&record.origin, &record.destinations, &record.durations);
        let query = flight_query(&description, &record.start_window, &self.seat_class);

        let hits = self
            .search
            .search(&query, SearchDepth::Advanced, SEARCH_RESULTS)
            .await?;
        debug!(hits = hits.len(), "flight search returned");

        let context = hits
            .iter()
            .map(|hit| hit.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let request = GenerationRequest::json(
            extraction_prompt(),
            format!("Trip: {description}\n\nContext: {context}"),
        );

        let value = self.generator.generate_json(request).await?;
        let list: ItineraryList = serde_json::from_value(value).map_err(|err| {
            CollaboratorError::malformed("text generation", format!("itineraries: {err}"))
        })?;

        Ok(list.itineraries.into_iter().map(FlightInfo::from).collect())
    }
}

#[async_trait]
impl TripStage for FlightFinder {
    fn kind(&self) -> StageKind {
        StageKind::Flights
    }

    async fn run(&self, record: &ItineraryRecord) -> Result<TripDelta, StageError> {
        let candidates = self.find_itineraries(record).await?;
        let count = candidates.len();

        let Some(best) = candidates.into_iter().next() else {
            return Err(StageError::NoResults("No flights found".to_string()));
        };
        info!(candidates = count, price = best.price, "flight itinerary selected");

        Ok(TripDelta {
            flight_info: Some(best),
            status: Some(TripStatus::FlightsFound),
            ..TripDelta::default()
        })
    }
}
