//! Testing utilities for the Gradeflow workspace
//!
//! Shared fakes, fixtures, and assembly helpers: counting similarity
//! backends, scripted chat, in-memory stores, and a recording
//! dispatcher.

#![allow(missing_docs)]

use gradeflow_core::{
    AnswerScorer, AnswerSet, AssessmentResult, EvaluationWorkflow, FeedbackGenerator, Question,
    ResponseRecord, ResponseStore, ResultStore, StoreError, TestDefinition, TestStore,
};
use gradeflow_inference::{
    ChatBackend, CrossEncoderBackend, DeliveryError, EmbeddingBackend, ReportDispatcher,
    ServiceError,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn outage(endpoint: &str) -> ServiceError {
    ServiceError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
        body: "service unavailable".to_string(),
        attempts: 3,
    }
}

/// Similarity backend pair returning fixed values, counting calls.
#[derive(Debug, Default)]
pub struct FixedSimilarity {
    embed: f64,
    cross: f64,
    embed_calls: AtomicUsize,
    cross_calls: AtomicUsize,
}

impl FixedSimilarity {
    pub fn new(embed: f64, cross: f64) -> Arc<Self> {
        Arc::new(Self {
            embed,
            cross,
            embed_calls: AtomicUsize::new(0),
            cross_calls: AtomicUsize::new(0),
        })
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn cross_calls(&self) -> usize {
        self.cross_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingBackend for FixedSimilarity {
    async fn similarity(&self, _anchor: &str, _candidate: &str) -> Result<f64, ServiceError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.embed)
    }
}

#[async_trait::async_trait]
impl CrossEncoderBackend for FixedSimilarity {
    async fn relatedness(&self, _student: &str, _teacher: &str) -> Result<f64, ServiceError> {
        self.cross_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.cross)
    }
}

/// Similarity backend pair that always fails, simulating an outage.
#[derive(Debug, Default)]
pub struct FailingSimilarity;

#[async_trait::async_trait]
impl EmbeddingBackend for FailingSimilarity {
    async fn similarity(&self, _anchor: &str, _candidate: &str) -> Result<f64, ServiceError> {
        Err(outage("embedding"))
    }
}

#[async_trait::async_trait]
impl CrossEncoderBackend for FailingSimilarity {
    async fn relatedness(&self, _student: &str, _teacher: &str) -> Result<f64, ServiceError> {
        Err(outage("cross-encoder"))
    }
}

/// Chat backend with a scripted reply (or scripted failure).
#[derive(Debug, Default)]
pub struct ScriptedChat {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedChat {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedChat {
    async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(outage("chat-completions")),
        }
    }
}

/// In-memory test store.
#[derive(Debug, Default)]
pub struct MemoryTestStore {
    tests: RwLock<Vec<TestDefinition>>,
}

impl MemoryTestStore {
    pub fn with_test(test: TestDefinition) -> Arc<Self> {
        Arc::new(Self {
            tests: RwLock::new(vec![test]),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait::async_trait]
impl TestStore for MemoryTestStore {
    async fn get_test(&self, test_id: &str) -> Result<Option<TestDefinition>, StoreError> {
        Ok(self.tests.read().iter().find(|t| t.id == test_id).cloned())
    }
}

/// In-memory append-only response store.
#[derive(Debug, Default)]
pub struct MemoryResponseStore {
    records: RwLock<Vec<ResponseRecord>>,
}

impl MemoryResponseStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<ResponseRecord> {
        self.records.read().clone()
    }
}

#[async_trait::async_trait]
impl ResponseStore for MemoryResponseStore {
    async fn record_response(&self, record: ResponseRecord) -> Result<(), StoreError> {
        self.records.write().push(record);
        Ok(())
    }
}

/// In-memory append-only result store.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: RwLock<Vec<AssessmentResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn results(&self) -> Vec<AssessmentResult> {
        self.results.read().clone()
    }
}

#[async_trait::async_trait]
impl ResultStore for MemoryResultStore {
    async fn record_result(&self, result: AssessmentResult) -> Result<(), StoreError> {
        self.results.write().push(result);
        Ok(())
    }

    async fn list_results(
        &self,
        student_email: &str,
    ) -> Result<Vec<AssessmentResult>, StoreError> {
        Ok(self
            .results
            .read()
            .iter()
            .filter(|r| r.student_email == student_email)
            .cloned()
            .collect())
    }
}

/// One captured dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReport {
    pub to: String,
    pub subject: String,
    pub plain: String,
    pub html: String,
}

/// Dispatcher that records sends (or fails them all).
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: RwLock<Vec<SentReport>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: RwLock::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<SentReport> {
        self.sent.read().clone()
    }
}

#[async_trait::async_trait]
impl ReportDispatcher for RecordingDispatcher {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError("mail relay down".to_string()));
        }
        self.sent.write().push(SentReport {
            to: to.to_string(),
            subject: subject.to_string(),
            plain: plain_body.to_string(),
            html: html_body.to_string(),
        });
        Ok(())
    }
}

/// Two-question fixture test.
pub fn sample_test() -> TestDefinition {
    TestDefinition {
        id: "test-1".to_string(),
        title: "Memory Basics".to_string(),
        questions: vec![
            Question {
                id: "q1".to_string(),
                text: "What is stack memory?".to_string(),
                ideal_answer: "Stack memory stores local variables in call order".to_string(),
            },
            Question {
                id: "q2".to_string(),
                text: "What is heap memory?".to_string(),
                ideal_answer: "Heap memory holds dynamically allocated data".to_string(),
            },
        ],
    }
}

/// Answer every question of `test` with its ideal answer verbatim.
pub fn answers_matching_ideals(test: &TestDefinition) -> AnswerSet {
    test.questions
        .iter()
        .map(|q| (q.id.clone(), q.ideal_answer.clone()))
        .collect()
}

/// Assemble a workflow over in-memory stores and the given backends.
///
/// Returns the workflow along with the stores the test will want to
/// inspect afterwards.
pub fn setup_workflow(
    tests: Arc<MemoryTestStore>,
    embedding: Arc<dyn EmbeddingBackend>,
    cross_encoder: Arc<dyn CrossEncoderBackend>,
    chat: Arc<dyn ChatBackend>,
    dispatcher: Arc<dyn ReportDispatcher>,
) -> (
    EvaluationWorkflow,
    Arc<MemoryResponseStore>,
    Arc<MemoryResultStore>,
) {
    let responses = MemoryResponseStore::new();
    let results = MemoryResultStore::new();
    let workflow = EvaluationWorkflow::new(
        tests,
        responses.clone(),
        results.clone(),
        AnswerScorer::new(embedding, cross_encoder),
        FeedbackGenerator::new(chat, "test-model"),
        dispatcher,
    );
    (workflow, responses, results)
}
