pub mod fallback_order;

use serde::{Deserialize, Serialize};

pub use fallback_order::fallback_order;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Health-ranked instances first, the rest after
    #[default]
    Ranked,
    /// Configured order, no health check
    Configured,
}
