pub mod config;
pub mod metrics;

pub use config::{Config, DetectionConfig};
pub use metrics::{article_name, OddpubMetrics, OpenDataCategory};
