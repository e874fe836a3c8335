use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info};

use crate::collab::{CollaboratorError, DocumentStore, PriceFilter, StoredDocument};
use crate::config::HotelPricing;
use crate::trip::{
    HotelStay, ItineraryRecord, StageError, StageKind, TripDelta, TripStage, TripStatus,
};

const SUMMARY_CHARS: usize = 200;
pub(crate) const NO_STAYS: &str = "No stays found matching that criteria and budget.";

/// Accommodation lookup against the listings store, one query per
/// destination under an even split of the hotel share of the budget.
pub struct HotelFinder {
    store: Arc<dyn DocumentStore>,
    budget_share: f64,
    top_k: usize,
    pricing: HotelPricing,
}

/// Per-destination nightly ceiling. `None` when there is nothing to split across.
pub fn per_city_ceiling(budget: f64, share: f64, destinations: usize) -> Option<f64> {
    if destinations == 0 {
        return None;
    }
    Some(budget * share / destinations as f64)
}

pub(crate) fn stay_query(city: &str, request: &str) -> String {
    format!("Best stay in {city} for {request}")
}

/// Render matches as a readable listing, or the no-match sentence.
pub(crate) fn describe_matches(matches: &[StoredDocument]) -> String {
    if matches.is_empty() {
        return NO_STAYS.to_string();
    }

    let mut output = String::from("Here are the top matches within your budget:\n\n");
    for doc in matches {
        let id = doc.metadata.id.as_deref().unwrap_or("listing");
        let price = doc
            .metadata
            .price
            .map(|price| format!("${price}"))
            .unwrap_or_else(|| "$?".to_string());
        let summary: String = doc.document.chars().take(SUMMARY_CHARS).collect();
        let link = doc.metadata.url.as_deref().unwrap_or("N/A");

        output.push_str(&format!("🏨 {id}: {price}/night\n"));
        output.push_str(&format!("Summary: {summary}...\n"));
        output.push_str(&format!("Link: {link}\n\n"));
    }
    output
}

impl HotelFinder {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        budget_share: f64,
        top_k: usize,
        pricing: HotelPricing,
    ) -> Self {
        Self {
            store,
            budget_share,
            top_k,
            pricing,
        }
    }

    async fn stay_for(
        &self,
        city: &str,
        request: &str,
        ceiling: f64,
    ) -> Result<HotelStay, CollaboratorError> {
        let matches = self
            .store
            .query(
                &stay_query(city, request),
                PriceFilter {
                    price_ceiling: ceiling,
                },
                self.top_k,
            )
            .await?;
        debug!(city, ceiling, matches = matches.len(), "stay lookup");

        let price = match self.pricing {
            HotelPricing::Ceiling => ceiling,
            HotelPricing::Matched => matches
                .first()
                .and_then(|doc| doc.metadata.price)
                .filter(|price| price.is_finite())
                .unwrap_or(ceiling),
        };

        Ok(HotelStay {
            location: city.to_string(),
            price,
            description: describe_matches(&matches),
        })
    }
}

#[async_trait]
impl TripStage for HotelFinder {
    fn kind(&self) -> StageKind {
        StageKind::Hotels
    }

    async fn run(&self, record: &ItineraryRecord) -> Result<TripDelta, StageError> {
        let cities = record.destinations.len();
        let ceiling = per_city_ceiling(record.budget, self.budget_share, cities).ok_or_else(|| {
            StageError::InvalidPlan("no destinations to split the hotel budget across".to_string())
        })?;

        let lookups = record
            .destinations
            .iter()
            .map(|city| self.stay_for(city, record.request(), ceiling));
        let stays = join_all(lookups)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        info!(cities = stays.len(), ceiling, pricing = %self.pricing, "stays assigned");
        Ok(TripDelta {
            hotel_info: Some(stays),
            status: Some(TripStatus::HotelsFound),
            ..TripDelta::default()
        })
    }
}
