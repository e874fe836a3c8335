pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_STORE_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STORE_COLLECTION: &str = "tokyo_listings";
pub const DEFAULT_STORE_TOP_K: usize = 3;
pub const DEFAULT_MAX_CYCLES: u32 = 3;
pub const DEFAULT_HOTEL_BUDGET_SHARE: f64 = 0.6;
pub const DEFAULT_ACTIVITY_COST_PER_CITY: f64 = 50.0;
pub const DEFAULT_MAX_ACTIVITIES: usize = 5;
pub const DEFAULT_SEAT_CLASS: &str = "economy";
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
