pub mod probe;
pub mod rank;

pub use probe::{is_valid_timeline_response, HttpProbe, Probe};
pub use rank::rank_instances;
