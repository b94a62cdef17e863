pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handler;
pub mod notify;
pub mod performance;
pub mod store;
pub mod strategy;
pub mod types;

pub use error::{FetchFailure, LookoutError, Result};
pub use handler::Lookout;
pub use types::{
    HealthReport, HealthSnapshot, Instance, LogLevel, LookoutConfig, PostRecord, ProbeOutcome,
    ProbeSettings, RunOutcome,
};

// Re-export commonly used items
pub use cache::HealthCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{diagnostic_instances, load_config, resolve_config, NormalizedConfig, ProbeConfig};
pub use fetch::{fetch_with_fallback, Fetcher, RssFetcher};
pub use notify::{DiscordWebhook, Notifier};
pub use performance::{rank_instances, HttpProbe, Probe};
pub use store::LastSeenStore;
pub use strategy::{fallback_order, Strategy};
