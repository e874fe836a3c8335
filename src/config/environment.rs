use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;

use super::builder::ConfigBuilder;
use super::types::HotelPricing;

pub fn apply_env_overrides(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(api_key) = env_string("OPENAI_API_KEY")? {
        builder = builder.with_llm(|llm| llm.api_key = api_key);
    }

    if let Some(base_url) = env_string("NOMAD_LLM_BASE_URL")? {
        builder = builder.with_llm(|llm| llm.base_url = base_url);
    }

    if let Some(model) = env_string("NOMAD_MODEL")? {
        builder = builder.with_llm(|llm| llm.model = model);
    }

    if let Some(model) = env_string("NOMAD_EMBEDDING_MODEL")? {
        builder = builder.with_llm(|llm| llm.embedding_model = model);
    }

    if let Some(timeout) = env_parse::<u64>("NOMAD_TIMEOUT_SECS")? {
        builder = builder
            .with_llm(|llm| llm.timeout_secs = timeout)
            .with_search(|search| search.timeout_secs = timeout)
            .with_store(|store| store.timeout_secs = timeout);
    }

    if let Some(max_tokens) = env_parse::<u32>("NOMAD_MAX_TOKENS")? {
        builder = builder.with_llm(|llm| llm.max_tokens = max_tokens);
    }

    if let Some(api_key) = env_string("TAVILY_API_KEY")? {
        builder = builder.with_search(|search| search.api_key = api_key);
    }

    if let Some(base_url) = env_string("NOMAD_SEARCH_BASE_URL")? {
        builder = builder.with_search(|search| search.base_url = base_url);
    }

    if let Some(base_url) = env_string("NOMAD_STORE_URL")? {
        builder = builder.with_store(|store| store.base_url = base_url);
    }

    if let Some(collection) = env_string("NOMAD_STORE_COLLECTION")? {
        builder = builder.with_store(|store| store.collection = collection);
    }

    if let Some(max_cycles) = env_parse::<u32>("NOMAD_MAX_CYCLES")? {
        builder = builder.with_pipeline(|pipeline| pipeline.max_cycles = max_cycles);
    }

    if let Some(pricing) = env_parse::<HotelPricing>("NOMAD_HOTEL_PRICING")? {
        builder = builder.with_pipeline(|pipeline| pipeline.hotel_pricing = pricing);
    }

    if let Some(attempts) = env_parse::<u32>("NOMAD_RETRY_ATTEMPTS")? {
        builder = builder.with_retry(|retry| retry.max_attempts = attempts);
    }

    Ok(builder)
}

pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key)? {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow!("{err}"))
            .with_context(|| format!("Failed to parse {key} value '{value}'")),
        None => Ok(None),
    }
}
