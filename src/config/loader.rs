use anyhow::{Context, Result};
use dirs::home_dir;
use std::{fs, path::Path};

use super::Config;
use super::builder::ConfigBuilder;
use super::environment::apply_env_overrides;
use super::types::{FileConfig, RedactedConfig};
use super::validation::validate;

impl Config {
    pub fn config_path() -> Result<std::path::PathBuf> {
        let mut path = home_dir().context("Could not determine home directory")?;
        path.push(".nomad/config");
        Ok(path)
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Resolve defaults, the config file and the environment, without validating.
    pub fn resolve() -> Result<ConfigBuilder> {
        let path = Self::config_path()?;
        let mut builder = Self::builder();

        if path.exists() {
            builder = Self::apply_file(builder, &path)?;
        }

        apply_env_overrides(builder)
    }

    #[cfg(test)]
    pub fn load() -> Result<Self> {
        let config = Self::resolve()?.build()?;
        validate(&config)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate(self)
    }

    /// Effective settings with API keys masked.
    pub fn redacted_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&RedactedConfig::from(self))
            .context("Failed to serialize configuration to JSON")
    }

    fn apply_file(builder: ConfigBuilder, path: &Path) -> Result<ConfigBuilder> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed reading config at {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(builder);
        }

        let file: FileConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed parsing JSON config at {}", path.display()))?;

        Ok(file.apply(builder))
    }
}

impl FileConfig {
    pub fn apply(self, builder: ConfigBuilder) -> ConfigBuilder {
        let FileConfig {
            llm,
            search,
            store,
            pipeline,
            retry,
        } = self;

        builder
            .with_llm(|settings| {
                if let Some(api_key) = llm.api_key {
                    settings.api_key = api_key;
                }
                if let Some(base_url) = llm.base_url {
                    settings.base_url = base_url;
                }
                if let Some(model) = llm.model {
                    settings.model = model;
                }
                if let Some(model) = llm.embedding_model {
                    settings.embedding_model = model;
                }
                if let Some(timeout) = llm.timeout_secs {
                    settings.timeout_secs = timeout;
                }
                if let Some(max_tokens) = llm.max_tokens {
                    settings.max_tokens = max_tokens;
                }
                if let Some(user_agent) = llm.user_agent {
                    settings.user_agent = user_agent;
                }
            })
            .with_search(|settings| {
                if let Some(api_key) = search.api_key {
                    settings.api_key = api_key;
                }
                if let Some(base_url) = search.base_url {
                    settings.base_url = base_url;
                }
                if let Some(timeout) = search.timeout_secs {
                    settings.timeout_secs = timeout;
                }
            })
            .with_store(|settings| {
                if let Some(base_url) = store.base_url {
                    settings.base_url = base_url;
                }
                if let Some(collection) = store.collection {
                    settings.collection = collection;
                }
                if let Some(top_k) = store.top_k {
                    settings.top_k = top_k;
                }
                if let Some(timeout) = store.timeout_secs {
                    settings.timeout_secs = timeout;
                }
            })
            .with_pipeline(|settings| {
                if let Some(max_cycles) = pipeline.max_cycles {
                    settings.max_cycles = max_cycles;
                }
                if let Some(share) = pipeline.hotel_budget_share {
                    settings.hotel_budget_share = share;
                }
                if let Some(cost) = pipeline.activity_cost_per_city {
                    settings.activity_cost_per_city = cost;
                }
                if let Some(max_activities) = pipeline.max_activities {
                    settings.max_activities = max_activities;
                }
                if let Some(seat_class) = pipeline.seat_class {
                    settings.seat_class = seat_class;
                }
                if let Some(pricing) = pipeline.hotel_pricing {
                    settings.hotel_pricing = pricing;
                }
            })
            .with_retry(|settings| {
                if let Some(attempts) = retry.max_attempts {
                    settings.max_attempts = attempts;
                }
                if let Some(backoff) = retry.initial_backoff_ms {
                    settings.initial_backoff_ms = backoff;
                }
            })
    }
}
