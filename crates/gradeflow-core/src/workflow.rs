//! Evaluation workflow
//!
//! Drives one run through an explicit state machine:
//!
//! `Fetching -> Evaluating -> Aggregating -> Reporting -> Dispatching -> Done`
//!
//! with `Failed` terminal reachable from the fallible stages. Each
//! stage consumes the previous stage's output value and produces a
//! new one — no stage mutates shared state in place, which keeps the
//! linear pipeline semantics without cross-stage aliasing.
//!
//! Failure policy: an unknown test id or a scoring/store failure is
//! fatal; feedback generation and report delivery are best-effort and
//! never fail the run.

use crate::blend::round2;
use crate::error::EvalError;
use crate::feedback::FeedbackGenerator;
use crate::report::{render_report, ReportBundle};
use crate::scorer::AnswerScorer;
use crate::store::{ResponseStore, ResultStore, TestStore};
use crate::types::{
    AssessmentResult, DeliveryStatus, QuestionResult, ResponseRecord, RunOutcome, RunRequest,
    TestDefinition,
};
use chrono::Utc;
use gradeflow_inference::ReportDispatcher;
use std::collections::HashSet;
use std::sync::Arc;

/// Workflow run states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Fetching,
    Evaluating,
    Aggregating,
    Reporting,
    Dispatching,
    Done,
    Failed,
}

/// States reachable from `from`.
#[must_use]
pub fn allowed_transitions(from: RunState) -> Vec<RunState> {
    use RunState::*;
    match from {
        Fetching => vec![Evaluating, Failed],
        Evaluating => vec![Aggregating, Failed],
        Aggregating => vec![Reporting, Failed],
        Reporting => vec![Dispatching],
        Dispatching => vec![Done],
        Done | Failed => vec![],
    }
}

/// Validates a state transition.
pub fn validate_transition(from: RunState, to: RunState) -> Result<(), EvalError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(EvalError::IllegalTransition { from, to })
    }
}

fn advance(state: &mut RunState, to: RunState) -> Result<(), EvalError> {
    let from = *state;
    validate_transition(from, to)?;
    tracing::debug!(from = ?from, to = ?to, "workflow transition");
    *state = to;
    Ok(())
}

// Per-stage values. Each stage hands the next one everything it
// needs; nothing is threaded through a shared mutable map.

struct FetchedRun {
    request: RunRequest,
    test: TestDefinition,
}

struct EvaluatedRun {
    request: RunRequest,
    test: TestDefinition,
    results: Vec<QuestionResult>,
}

struct AggregatedRun {
    request: RunRequest,
    test: TestDefinition,
    results: Vec<QuestionResult>,
    overall_pct: f64,
}

struct RenderedRun {
    request: RunRequest,
    results: Vec<QuestionResult>,
    overall_pct: f64,
    report: ReportBundle,
}

/// Orchestrator for evaluation runs.
///
/// All collaborators are injected once at construction and shared
/// read-only across runs; concurrent runs for different students may
/// proceed fully in parallel.
#[derive(Clone)]
pub struct EvaluationWorkflow {
    tests: Arc<dyn TestStore>,
    responses: Arc<dyn ResponseStore>,
    results: Arc<dyn ResultStore>,
    scorer: AnswerScorer,
    feedback: FeedbackGenerator,
    dispatcher: Arc<dyn ReportDispatcher>,
}

impl EvaluationWorkflow {
    #[must_use]
    pub fn new(
        tests: Arc<dyn TestStore>,
        responses: Arc<dyn ResponseStore>,
        results: Arc<dyn ResultStore>,
        scorer: AnswerScorer,
        feedback: FeedbackGenerator,
        dispatcher: Arc<dyn ReportDispatcher>,
    ) -> Self {
        Self {
            tests,
            responses,
            results,
            scorer,
            feedback,
            dispatcher,
        }
    }

    /// Execute one evaluation run to completion.
    ///
    /// On success the caller receives the overall score, per-question
    /// detail, and the delivery status of the single dispatch attempt.
    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome, EvalError> {
        validate_request(&request)?;
        tracing::info!(
            test_id = %request.test_id,
            student = %request.student_email,
            "starting evaluation run"
        );

        let mut state = RunState::Fetching;

        let fetched = match self.fetch(request).await {
            Ok(fetched) => {
                advance(&mut state, RunState::Evaluating)?;
                fetched
            }
            Err(err) => {
                advance(&mut state, RunState::Failed)?;
                return Err(err);
            }
        };

        let evaluated = match self.evaluate(fetched).await {
            Ok(evaluated) => {
                advance(&mut state, RunState::Aggregating)?;
                evaluated
            }
            Err(err) => {
                tracing::error!(error = %err, "evaluation aborted");
                advance(&mut state, RunState::Failed)?;
                return Err(err);
            }
        };

        let aggregated = match self.aggregate(evaluated).await {
            Ok(aggregated) => {
                advance(&mut state, RunState::Reporting)?;
                aggregated
            }
            Err(err) => {
                advance(&mut state, RunState::Failed)?;
                return Err(err);
            }
        };

        let rendered = Self::render(aggregated);
        advance(&mut state, RunState::Dispatching)?;

        let outcome = self.dispatch(rendered).await;
        advance(&mut state, RunState::Done)?;
        tracing::info!(
            overall_pct = outcome.overall_pct,
            delivery = ?outcome.delivery,
            "evaluation run complete"
        );
        Ok(outcome)
    }

    async fn fetch(&self, request: RunRequest) -> Result<FetchedRun, EvalError> {
        let test = self
            .tests
            .get_test(&request.test_id)
            .await?
            .ok_or_else(|| EvalError::TestNotFound(request.test_id.clone()))?;
        Ok(FetchedRun { request, test })
    }

    async fn evaluate(&self, run: FetchedRun) -> Result<EvaluatedRun, EvalError> {
        let FetchedRun { request, test } = run;

        let known: HashSet<&str> = test.questions.iter().map(|q| q.id.as_str()).collect();
        for qid in request.answers.keys() {
            if !known.contains(qid.as_str()) {
                tracing::warn!(question_id = %qid, "answer for unknown question id ignored");
            }
        }

        let mut results = Vec::with_capacity(test.questions.len());
        for (idx, question) in test.questions.iter().enumerate() {
            // A missing answer evaluates as an empty one.
            let answer = request.answers.get(&question.id).cloned().unwrap_or_default();

            let (score, breakdown) = self
                .scorer
                .evaluate(&answer, &question.ideal_answer)
                .await?;

            self.responses
                .record_response(ResponseRecord {
                    student_email: request.student_email.clone(),
                    test_id: request.test_id.clone(),
                    question_id: question.id.clone(),
                    question_text: question.text.clone(),
                    student_answer: answer.clone(),
                    score,
                    recorded_at: Utc::now(),
                })
                .await?;

            let feedback = self.feedback.generate(&question.text, &answer, score).await;

            tracing::debug!(
                question = idx + 1,
                question_id = %question.id,
                score,
                "question evaluated"
            );

            results.push(QuestionResult {
                question_id: question.id.clone(),
                question_text: question.text.clone(),
                student_answer: answer,
                final_pct: score,
                breakdown,
                feedback,
            });
        }

        Ok(EvaluatedRun {
            request,
            test,
            results,
        })
    }

    async fn aggregate(&self, run: EvaluatedRun) -> Result<AggregatedRun, EvalError> {
        let total: f64 = run.results.iter().map(|r| r.final_pct).sum();
        // Safe denominator: a test without questions aggregates to 0.
        let overall_pct = round2(total / run.results.len().max(1) as f64);

        self.results
            .record_result(AssessmentResult {
                student_email: run.request.student_email.clone(),
                test_id: run.request.test_id.clone(),
                overall_pct,
                per_question: run.results.clone(),
                timestamp: Utc::now(),
            })
            .await?;

        Ok(AggregatedRun {
            request: run.request,
            test: run.test,
            results: run.results,
            overall_pct,
        })
    }

    fn render(run: AggregatedRun) -> RenderedRun {
        let report = render_report(
            &run.request.student_name,
            &run.test.title,
            run.overall_pct,
            &run.results,
        );
        RenderedRun {
            request: run.request,
            results: run.results,
            overall_pct: run.overall_pct,
            report,
        }
    }

    async fn dispatch(&self, run: RenderedRun) -> RunOutcome {
        let delivery = match self
            .dispatcher
            .send(
                &run.request.student_email,
                &run.report.subject,
                &run.report.plain,
                &run.report.html,
            )
            .await
        {
            Ok(()) => DeliveryStatus::Sent,
            Err(err) => {
                // At-most-once delivery: log, flag, move on.
                tracing::error!(
                    recipient = %run.request.student_email,
                    error = %err,
                    "report delivery failed"
                );
                DeliveryStatus::Failed
            }
        };

        RunOutcome {
            overall_pct: run.overall_pct,
            per_question: run.results,
            delivery,
        }
    }
}

impl std::fmt::Debug for EvaluationWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationWorkflow").finish_non_exhaustive()
    }
}

fn validate_request(request: &RunRequest) -> Result<(), EvalError> {
    if request.student_email.trim().is_empty() {
        return Err(EvalError::Validation("student email is empty".to_string()));
    }
    if request.test_id.trim().is_empty() {
        return Err(EvalError::Validation("test id is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        use RunState::*;
        for (from, to) in [
            (Fetching, Evaluating),
            (Evaluating, Aggregating),
            (Aggregating, Reporting),
            (Reporting, Dispatching),
            (Dispatching, Done),
        ] {
            validate_transition(from, to).unwrap();
        }
    }

    #[test]
    fn failure_is_reachable_only_from_fallible_stages() {
        use RunState::*;
        for from in [Fetching, Evaluating, Aggregating] {
            validate_transition(from, Failed).unwrap();
        }
        for from in [Reporting, Dispatching, Done, Failed] {
            assert!(matches!(
                validate_transition(from, Failed),
                Err(EvalError::IllegalTransition { .. })
            ));
        }
    }

    #[test]
    fn terminal_states_have_no_successors() {
        assert!(allowed_transitions(RunState::Done).is_empty());
        assert!(allowed_transitions(RunState::Failed).is_empty());
    }

    #[test]
    fn skipping_stages_is_illegal() {
        assert!(matches!(
            validate_transition(RunState::Fetching, RunState::Reporting),
            Err(EvalError::IllegalTransition { .. })
        ));
        assert!(matches!(
            validate_transition(RunState::Evaluating, RunState::Done),
            Err(EvalError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn requests_are_validated_up_front() {
        let request = RunRequest {
            student_name: "Ada".to_string(),
            student_email: String::new(),
            test_id: "t1".to_string(),
            answers: Default::default(),
        };
        assert!(matches!(
            validate_request(&request),
            Err(EvalError::Validation(_))
        ));
    }
}
