//! Application state and service initialization
//!
//! The HTTP server shares one analyzer across all workers; it holds no
//! per-request state.

use std::sync::Arc;

use crate::model::Config;
use crate::oddpub::{OddpubAnalyzer, OddpubError, PdfAnalyzer};

/// Application state injected into Actix-web handlers
pub struct AppState {
    /// Analyzer serving `POST /oddpub`
    pub analyzer: Arc<dyn PdfAnalyzer>,
    pub config: Config,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn PdfAnalyzer>, config: Config) -> Self {
        Self { analyzer, config }
    }

    /// Build the in-process analyzer from configuration
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let analyzer = OddpubAnalyzer::new(&config.detection).map_err(AppError::AnalyzerInit)?;

        tracing::info!(
            field_repositories = config.detection.field_repositories.len(),
            general_repositories = config.detection.general_repositories.len(),
            code_hosts = config.detection.code_hosts.len(),
            "ODDPub analyzer initialized"
        );

        Ok(Self::new(Arc::new(analyzer), config))
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Detection vocabulary could not be compiled
    #[error("Analyzer initialization failed: {0}")]
    AnalyzerInit(#[source] OddpubError),

    /// Server could not bind or run
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DetectionConfig;

    #[test]
    fn test_from_config_uses_configured_terms() {
        let config = Config {
            detection: DetectionConfig {
                code_hosts: vec!["codeberg".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let state = AppState::from_config(config).unwrap();
        assert_eq!(state.analyzer.name(), "oddpub");
        assert_eq!(state.config.detection.code_hosts, vec!["codeberg"]);
    }
}
