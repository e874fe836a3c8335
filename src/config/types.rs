use anyhow::anyhow;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub store: StoreSettings,
    pub pipeline: PipelineSettings,
    pub retry: RetrySettings,
}

/// OpenAI-compatible endpoint used for both chat completions and embeddings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub collection: String,
    pub top_k: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_cycles: u32,
    pub hotel_budget_share: f64,
    pub activity_cost_per_city: f64,
    pub max_activities: usize,
    pub seat_class: String,
    pub hotel_pricing: HotelPricing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

/// Which figure the hotel stage records as the per-city price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotelPricing {
    /// The per-city ceiling handed to the store.
    Ceiling,
    /// The best match's listed price, falling back to the ceiling.
    Matched,
}

impl fmt::Display for HotelPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotelPricing::Ceiling => write!(f, "ceiling"),
            HotelPricing::Matched => write!(f, "matched"),
        }
    }
}

impl std::str::FromStr for HotelPricing {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ceiling" => Ok(HotelPricing::Ceiling),
            "matched" => Ok(HotelPricing::Matched),
            other => Err(anyhow!("Unknown hotel pricing mode '{other}'")),
        }
    }
}

// File configuration types
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FileConfig {
    pub llm: FileLlmSettings,
    pub search: FileSearchSettings,
    pub store: FileStoreSettings,
    pub pipeline: FilePipelineSettings,
    pub retry: FileRetrySettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FileLlmSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub embedding_model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_tokens: Option<u32>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FileSearchSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FileStoreSettings {
    pub base_url: Option<String>,
    pub collection: Option<String>,
    pub top_k: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FilePipelineSettings {
    pub max_cycles: Option<u32>,
    pub hotel_budget_share: Option<f64>,
    pub activity_cost_per_city: Option<f64>,
    pub max_activities: Option<usize>,
    pub seat_class: Option<String>,
    pub hotel_pricing: Option<HotelPricing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FileRetrySettings {
    pub max_attempts: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
}

// Serialization helpers for `--show-config`
#[derive(Serialize)]
pub(super) struct RedactedConfig<'a> {
    pub llm: RedactedLlm<'a>,
    pub search: RedactedSearch<'a>,
    pub store: RedactedStore<'a>,
    pub pipeline: RedactedPipeline<'a>,
    pub retry: RedactedRetry,
}

#[derive(Serialize)]
pub(super) struct RedactedLlm<'a> {
    pub api_key: String,
    pub base_url: &'a str,
    pub model: &'a str,
    pub embedding_model: &'a str,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub user_agent: &'a str,
}

#[derive(Serialize)]
pub(super) struct RedactedSearch<'a> {
    pub api_key: String,
    pub base_url: &'a str,
    pub timeout_secs: u64,
}

#[derive(Serialize)]
pub(super) struct RedactedStore<'a> {
    pub base_url: &'a str,
    pub collection: &'a str,
    pub top_k: usize,
    pub timeout_secs: u64,
}

#[derive(Serialize)]
pub(super) struct RedactedPipeline<'a> {
    pub max_cycles: u32,
    pub hotel_budget_share: f64,
    pub activity_cost_per_city: f64,
    pub max_activities: usize,
    pub seat_class: &'a str,
    pub hotel_pricing: HotelPricing,
}

#[derive(Serialize)]
pub(super) struct RedactedRetry {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

fn mask(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.is_empty() {
        String::new()
    } else if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{visible}")
    }
}

impl<'a> From<&'a Config> for RedactedConfig<'a> {
    fn from(config: &'a Config) -> Self {
        RedactedConfig {
            llm: RedactedLlm {
                api_key: mask(&config.llm.api_key),
                base_url: &config.llm.base_url,
                model: &config.llm.model,
                embedding_model: &config.llm.embedding_model,
                timeout_secs: config.llm.timeout_secs,
                max_tokens: config.llm.max_tokens,
                user_agent: &config.llm.user_agent,
            },
            search: RedactedSearch {
                api_key: mask(&config.search.api_key),
                base_url: &config.search.base_url,
                timeout_secs: config.search.timeout_secs,
            },
            store: RedactedStore {
                base_url: &config.store.base_url,
                collection: &config.store.collection,
                top_k: config.store.top_k,
                timeout_secs: config.store.timeout_secs,
            },
            pipeline: RedactedPipeline {
                max_cycles: config.pipeline.max_cycles,
                hotel_budget_share: config.pipeline.hotel_budget_share,
                activity_cost_per_city: config.pipeline.activity_cost_per_city,
                max_activities: config.pipeline.max_activities,
                seat_class: &config.pipeline.seat_class,
                hotel_pricing: config.pipeline.hotel_pricing,
            },
            retry: RedactedRetry {
                max_attempts: config.retry.max_attempts,
                initial_backoff_ms: config.retry.initial_backoff_ms,
            },
        }
    }
}
