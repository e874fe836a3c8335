use super::constants::*;
use super::types::{
    HotelPricing, LlmSettings, PipelineSettings, RetrySettings, SearchSettings, StoreSettings,
};

pub fn default_user_agent() -> String {
    format!("nomad/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_BASE_URL.to_string(),
            collection: DEFAULT_STORE_COLLECTION.to_string(),
            top_k: DEFAULT_STORE_TOP_K,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            hotel_budget_share: DEFAULT_HOTEL_BUDGET_SHARE,
            activity_cost_per_city: DEFAULT_ACTIVITY_COST_PER_CITY,
            max_activities: DEFAULT_MAX_ACTIVITIES,
            seat_class: DEFAULT_SEAT_CLASS.to_string(),
            hotel_pricing: HotelPricing::Ceiling,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
        }
    }
}
