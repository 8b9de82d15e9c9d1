pub mod ingest;
pub mod oddpub_client;

pub use ingest::{IngestService, MetricsStore};
pub use oddpub_client::OddpubClient;
