use anyhow::Result;

use super::types::{
    Config, LlmSettings, PipelineSettings, RetrySettings, SearchSettings, StoreSettings,
};

#[derive(Debug)]
pub struct ConfigBuilder {
    pub(super) llm: LlmSettings,
    pub(super) search: SearchSettings,
    pub(super) store: StoreSettings,
    pub(super) pipeline: PipelineSettings,
    pub(super) retry: RetrySettings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            llm: LlmSettings::default(),
            search: SearchSettings::default(),
            store: StoreSettings::default(),
            pipeline: PipelineSettings::default(),
            retry: RetrySettings::default(),
        }
    }

    pub fn with_llm<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut LlmSettings),
    {
        update(&mut self.llm);
        self
    }

    pub fn with_search<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut SearchSettings),
    {
        update(&mut self.search);
        self
    }

    pub fn with_store<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut StoreSettings),
    {
        update(&mut self.store);
        self
    }

    pub fn with_pipeline<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut PipelineSettings),
    {
        update(&mut self.pipeline);
        self
    }

    pub fn with_retry<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut RetrySettings),
    {
        update(&mut self.retry);
        self
    }

    pub fn build(self) -> Result<Config> {
        Ok(Config {
            llm: self.llm,
            search: self.search,
            store: self.store,
            pipeline: self.pipeline,
            retry: self.retry,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
