pub mod resolve_config;

pub use resolve_config::{
    diagnostic_instances, load_config, normalize_instances, resolve_config, NormalizedConfig, ProbeConfig,
};
