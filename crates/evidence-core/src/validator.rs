//! Ordered strategy runner

use std::path::Path;

use shared_crypto::CmsDigestVerifier;

use crate::error::StrategyError;
use crate::report::ValidationReport;
use crate::strategy::{FieldEnumerationStrategy, MarkerHeuristicStrategy, ValidationStrategy};
use crate::vocabulary::MarkerVocabulary;

/// Produces a [`ValidationReport`] for any input, never an error
pub struct EvidenceClassifier {
    vocabulary: MarkerVocabulary,
    strategies: Vec<Box<dyn ValidationStrategy>>,
}

impl EvidenceClassifier {
    /// Field enumeration first, marker heuristic as fallback
    pub fn new(vocabulary: MarkerVocabulary) -> Self {
        Self::with_strategies(
            vocabulary,
            vec![
                Box::new(FieldEnumerationStrategy::new(CmsDigestVerifier)),
                Box::new(MarkerHeuristicStrategy),
            ],
        )
    }

    /// Degraded mode without a document model
    pub fn heuristic_only(vocabulary: MarkerVocabulary) -> Self {
        Self::with_strategies(vocabulary, vec![Box::new(MarkerHeuristicStrategy)])
    }

    pub fn with_strategies(
        vocabulary: MarkerVocabulary,
        strategies: Vec<Box<dyn ValidationStrategy>>,
    ) -> Self {
        Self {
            vocabulary,
            strategies,
        }
    }

    /// Read a file and validate it. Read failures become a degraded report.
    pub fn validate_path(&self, path: &Path) -> ValidationReport {
        match std::fs::read(path) {
            Ok(bytes) => self.validate_bytes(&bytes),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Cannot read PDF");
                ValidationReport::failure(e)
            }
        }
    }

    pub fn validate_bytes(&self, document: &[u8]) -> ValidationReport {
        let mut last_error = StrategyError::NoStrategies;
        for strategy in &self.strategies {
            match strategy.evaluate(document, &self.vocabulary) {
                Ok(report) => {
                    tracing::info!(
                        strategy = strategy.name(),
                        has_signatures = report.has_signatures(),
                        signature_count = report.signature_count(),
                        system_type = ?report.system_type(),
                        is_valid = report.is_valid,
                        "Validation finished"
                    );
                    return report;
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "Validation strategy failed, trying next"
                    );
                    last_error = e;
                }
            }
        }
        ValidationReport::failure(last_error)
    }
}

impl Default for EvidenceClassifier {
    fn default() -> Self {
        Self::new(MarkerVocabulary::default())
    }
}
