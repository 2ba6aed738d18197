//! Search, summarize and synthesize, in sequence.

use crate::agents::{InsightSynthesizer, SearchClient, Summarizer};
use crate::config::{Config, Credentials};
use crate::models::{PaperEntry, PaperRecord, PipelineReport};
use crate::sources::SourceError;

/// Errors raised while assembling a pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to build search client: {0}")]
    Search(#[from] SourceError),
}

/// Progress notifications from [`Pipeline::run_with_progress`]
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The search stage produced `count` records
    SearchFinished { count: usize, degraded: bool },
    /// Paper `index` (0-based) of `total` has been summarized
    Summarized {
        index: usize,
        total: usize,
        title: String,
    },
    /// The insight is ready
    InsightReady,
}

/// The three stages wired together
///
/// Stages run one after another; every paper is summarized before the insight
/// is requested. A run always produces a report.
#[derive(Debug)]
pub struct Pipeline {
    search: SearchClient,
    summarizer: Summarizer,
    insight: InsightSynthesizer,
    max_results: usize,
}

impl Pipeline {
    pub fn new(
        search: SearchClient,
        summarizer: Summarizer,
        insight: InsightSynthesizer,
        max_results: usize,
    ) -> Self {
        Self {
            search,
            summarizer,
            insight,
            max_results,
        }
    }

    /// Build every stage from configuration.
    ///
    /// Inference backends are not contacted here; they are acquired when first used.
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self, PipelineError> {
        Ok(Self::new(
            SearchClient::from_config(&config.search)?,
            Summarizer::new(&config.summarizer, credentials),
            InsightSynthesizer::new(&config.insight, credentials),
            config.search.max_results,
        ))
    }

    /// Default number of papers per run
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Run all three stages for `topic`, using the configured result count unless overridden
    pub async fn run(&self, topic: &str, max_results: Option<usize>) -> PipelineReport {
        self.run_with_progress(topic, max_results, |_| {}).await
    }

    /// Like [`Pipeline::run`], reporting each completed step to `on_event`
    pub async fn run_with_progress<F>(
        &self,
        topic: &str,
        max_results: Option<usize>,
        mut on_event: F,
    ) -> PipelineReport
    where
        F: FnMut(PipelineEvent),
    {
        let max_results = max_results.unwrap_or(self.max_results);
        tracing::info!("Starting analysis of '{}' (max_results={})", topic.trim(), max_results);

        let records = self.search.search(topic, max_results).await;
        on_event(PipelineEvent::SearchFinished {
            count: records.len(),
            degraded: records.iter().any(PaperRecord::is_placeholder),
        });

        let total = records.len();
        let mut papers = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            let summary = self.summarizer.summarize(&record.summary).await;
            on_event(PipelineEvent::Summarized {
                index,
                total,
                title: record.title.clone(),
            });
            papers.push(PaperEntry { record, summary });
        }

        let summaries: Vec<&str> = papers.iter().map(|p| p.summary.as_str()).collect();
        let insight = self.insight.synthesize(&summaries).await;
        on_event(PipelineEvent::InsightReady);

        tracing::info!("Finished analysis of '{}' ({} papers)", topic.trim(), papers.len());
        PipelineReport::new(topic.trim(), papers, insight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::OFFLINE_PREFIX;
    use crate::config::SearchConfig;
    use crate::models::PlaceholderKind;
    use crate::sources::mock::make_record;
    use crate::sources::MockSource;
    use std::sync::Arc;

    fn offline_pipeline(source: Arc<MockSource>) -> Pipeline {
        let config = SearchConfig {
            backoff_factor: 0.0,
            ..SearchConfig::default()
        };
        Pipeline::new(
            SearchClient::new(source, &config).unwrap(),
            Summarizer::offline(),
            InsightSynthesizer::offline(),
            config.max_results,
        )
    }

    #[tokio::test]
    async fn test_run_summarizes_every_record_in_order() {
        let source = Arc::new(MockSource::new());
        source.push_records(vec![
            make_record("2401.00001", "Alpha"),
            make_record("2401.00002", "Beta"),
        ]);
        let pipeline = offline_pipeline(source);

        let mut events = Vec::new();
        let report = pipeline
            .run_with_progress("graph learning", None, |e| events.push(e))
            .await;

        assert_eq!(report.query, "graph learning");
        let titles: Vec<_> = report.records().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
        assert_eq!(
            report.papers[0].summary,
            "Abstract of Alpha. It studies 2401."
        );
        assert!(report.insight.starts_with(OFFLINE_PREFIX));
        assert!(!report.is_degraded());

        assert_eq!(
            events.first(),
            Some(&PipelineEvent::SearchFinished {
                count: 2,
                degraded: false
            })
        );
        assert_eq!(events.last(), Some(&PipelineEvent::InsightReady));
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn test_run_degrades_on_invalid_topic() {
        let source = Arc::new(MockSource::new());
        let pipeline = offline_pipeline(source.clone());

        let report = pipeline.run("a", Some(3)).await;

        assert_eq!(source.calls(), 0);
        assert_eq!(report.papers.len(), 1);
        assert_eq!(
            report.papers[0].record.placeholder,
            Some(PlaceholderKind::InvalidQuery)
        );
        assert!(report.is_degraded());
        assert!(!report.insight.is_empty());
    }

    #[tokio::test]
    async fn test_run_respects_max_results_override() {
        let source = Arc::new(MockSource::new());
        source.push_records((0..5).map(|i| make_record(&format!("id{}", i), "Paper")).collect());
        let pipeline = offline_pipeline(source);

        let report = pipeline.run("topic", Some(2)).await;
        assert_eq!(report.papers.len(), 2);
    }
}
