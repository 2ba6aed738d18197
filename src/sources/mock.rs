//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::PaperRecord;
use crate::sources::{FetchRequest, Source, SourceError};

/// A scripted outcome for one fetch
#[derive(Debug)]
pub enum MockOutcome {
    Records(Vec<PaperRecord>),
    Error(SourceError),
}

/// A mock source for testing that replays scripted outcomes in order.
///
/// Once the script runs out, the fallback outcome is cloned for every further
/// call: an empty result set unless [`MockSource::failing`] was used.
#[derive(Debug, Default)]
pub struct MockSource {
    script: Mutex<VecDeque<MockOutcome>>,
    always_fail: Option<u16>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source that returns no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every call fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            always_fail: Some(status),
            ..Self::default()
        }
    }

    /// Queue records to return on the next unscripted call.
    pub fn push_records(&self, records: Vec<PaperRecord>) {
        self.push(MockOutcome::Records(records));
    }

    /// Queue an error to return on the next unscripted call.
    pub fn push_error(&self, error: SourceError) {
        self.push(MockOutcome::Error(error));
    }

    /// Number of times `fetch` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, outcome: MockOutcome) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<PaperRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(MockOutcome::Records(records)) => {
                Ok(records.into_iter().take(request.max_results).collect())
            }
            Some(MockOutcome::Error(error)) => Err(error),
            None => match self.always_fail {
                Some(status) => Err(SourceError::Status(status)),
                None => Ok(Vec::new()),
            },
        }
    }
}

/// Helper function to create a mock record for testing.
pub fn make_record(id: &str, title: &str) -> PaperRecord {
    PaperRecord::new(
        title,
        format!("Abstract of {}. It studies {}.", title, id),
        format!("http://arxiv.org/abs/{}", id),
    )
}
