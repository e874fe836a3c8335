//! Configuration for the nomad trip planner.
//!
//! Settings are layered in this order, later layers winning:
//! - built-in defaults
//! - the JSON file at `~/.nomad/config`
//! - environment variables
//! - command-line overrides applied by the CLI

mod builder;
pub(crate) mod constants;
mod defaults;
mod environment;
mod loader;
mod types;
mod validation;

pub use builder::ConfigBuilder;
pub use types::{Config, HotelPricing, LlmSettings, RetrySettings, SearchSettings, StoreSettings};
