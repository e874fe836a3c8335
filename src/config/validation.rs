use anyhow::{Result, bail};

use super::types::Config;

pub fn validate(config: &Config) -> Result<()> {
    if config.llm.api_key.trim().is_empty() {
        bail!(
            "OpenAI API key not found. Set OPENAI_API_KEY or add llm.api_key to {}",
            Config::config_path()?.display()
        );
    }

    if config.search.api_key.trim().is_empty() {
        bail!(
            "Tavily API key not found. Set TAVILY_API_KEY or add search.api_key to {}",
            Config::config_path()?.display()
        );
    }

    if config.pipeline.max_cycles == 0 {
        bail!("pipeline.max_cycles must be at least 1");
    }

    let share = config.pipeline.hotel_budget_share;
    if !(share > 0.0 && share <= 1.0) {
        bail!("pipeline.hotel_budget_share must be in (0, 1], got {share}");
    }

    if !config.pipeline.activity_cost_per_city.is_finite()
        || config.pipeline.activity_cost_per_city < 0.0
    {
        bail!("pipeline.activity_cost_per_city must be a non-negative number");
    }

    if config.retry.max_attempts == 0 {
        bail!("retry.max_attempts must be at least 1");
    }

    Ok(())
}
