//! Clarification round controller
//!
//! Drives a session through its rounds: start, answer batches, follow-up
//! question generation and the status transitions between
//! `in_progress` and `ready_to_generate`.
//!
//! No operation holds anything across a generator call. A session is read,
//! changed in local memory and written back in one store update, so two
//! concurrent rounds on the same id race and the last update wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ClarifyError;
use super::generator::Generator;
use super::parse;
use crate::domain::{
    Clarification, CompletenessScore, RequirementAnalysis, Session, SessionContext, SessionStatus,
};
use crate::prompts::{PromptKind, PromptSet, input};
use crate::scoring::{self, READY_THRESHOLD};
use crate::state::{SessionStore, SessionUpdate};

/// One answer in a submitted batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerInput {
    pub question_id: String,
    pub answer: String,
}

impl AnswerInput {
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }
}

/// Result of starting a session
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub session: Session,
    pub analysis: RequirementAnalysis,
    /// First-round questions, in order
    pub questions: Vec<Clarification>,
}

/// Result of one answer round
#[derive(Debug)]
pub struct RoundOutcome {
    pub session: Session,
    /// The round just completed (equals `session.round_count`)
    pub round: u32,
    /// Answers in the submitted batch
    pub answers_recorded: usize,
    /// Answers whose id matched a clarification
    pub answers_matched: usize,
    pub new_questions: Vec<Clarification>,
    pub pending: Vec<Clarification>,
    /// Set when follow-up generation produced unusable output
    pub generation_error: Option<ClarifyError>,
}

impl RoundOutcome {
    /// What the caller should do next
    pub fn next_step(&self) -> String {
        if self.session.status == SessionStatus::ReadyToGenerate {
            "Completeness threshold reached. Use /generate to compile the specification.".to_string()
        } else {
            format!("Answer the {} pending questions to continue.", self.pending.len())
        }
    }
}

/// Question counts for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionTotals {
    pub total: usize,
    pub answered: usize,
    pub pending: usize,
}

/// Snapshot of one session's progress
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub session_id: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub requirement: String,
    pub context: SessionContext,
    pub completeness: CompletenessScore,
    pub round_count: u32,
    pub totals: QuestionTotals,
    pub pending_questions: Vec<Clarification>,
    pub assumptions: Vec<String>,
}

/// Listing entry for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub requirement: String,
    pub status: SessionStatus,
    pub completeness: u32,
    pub created_at: DateTime<Utc>,
}

/// Max characters of the requirement shown in a listing
pub const SUMMARY_REQUIREMENT_CHARS: usize = 100;

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        let mut requirement: String = session.requirement.chars().take(SUMMARY_REQUIREMENT_CHARS).collect();
        if session.requirement.chars().count() > SUMMARY_REQUIREMENT_CHARS {
            requirement.push_str("...");
        }
        Self {
            id: session.id.clone(),
            requirement,
            status: session.status,
            completeness: session.completeness.overall,
            created_at: session.created_at,
        }
    }
}

/// Session counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub total: usize,
    pub in_progress: usize,
    pub ready_to_generate: usize,
    pub complete: usize,
}

/// Entry point for every clarification operation
#[derive(Clone)]
pub struct ClarifyService {
    pub(super) store: SessionStore,
    pub(super) generator: Arc<dyn Generator>,
    pub(super) prompts: Arc<PromptSet>,
}

impl ClarifyService {
    pub fn new(store: SessionStore, generator: Arc<dyn Generator>, prompts: PromptSet) -> Self {
        debug!("ClarifyService::new: called");
        Self {
            store,
            generator,
            prompts: Arc::new(prompts),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Call the generator with the given prompt
    pub(super) async fn generate(&self, kind: PromptKind, input: &Value) -> Result<String, ClarifyError> {
        debug!(%kind, "generate: called");
        self.generator
            .generate(self.prompts.get(kind), input)
            .await
            .map_err(|e| {
                let err = ClarifyError::from(e);
                warn!(%kind, error = %err, "generate: upstream failure");
                err
            })
    }

    /// Load a session or report it missing
    pub(super) async fn load(&self, session_id: &str) -> Result<Session, ClarifyError> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| ClarifyError::not_found(session_id))
    }

    /// Analyze a requirement and open a session seeded with the first questions
    ///
    /// Nothing is stored unless the analyzer call and its parse succeed.
    pub async fn start_session(
        &self,
        requirement: &str,
        domain: Option<String>,
        audience: Option<&str>,
    ) -> Result<StartOutcome, ClarifyError> {
        debug!(requirement_len = requirement.len(), ?domain, ?audience, "start_session: called");
        let context = SessionContext::from_parts(domain, audience);

        let raw = self
            .generate(PromptKind::RequirementAnalyzer, &input::analyzer_input(requirement, &context))
            .await?;
        let (analysis, raw_questions) = parse::parse_analysis(&raw)?;

        let mut session = Session::new(requirement, context);
        let questions = parse::into_clarifications(raw_questions, session.round_count + 1);
        session.clarifications.extend(questions.iter().cloned());
        session.assumptions.extend(analysis.implicit_assumptions.iter().cloned());

        let session = self.store.insert(session).await?;
        info!(
            session_id = %session.id,
            questions = questions.len(),
            "Started clarification session"
        );

        Ok(StartOutcome {
            session,
            analysis,
            questions,
        })
    }

    /// Record a batch of answers and run one round
    ///
    /// Unknown question ids are ignored. When the score is still below the
    /// ready threshold and the round cap has not been hit, follow-up questions
    /// are requested; unusable generator output means zero new questions,
    /// while a failed call aborts the round with the session untouched.
    pub async fn submit_answers(&self, session_id: &str, answers: &[AnswerInput]) -> Result<RoundOutcome, ClarifyError> {
        debug!(%session_id, count = answers.len(), "submit_answers: called");
        let mut session = self.load(session_id).await?;

        let answers_matched = answers
            .iter()
            .filter(|a| session.apply_answer(&a.question_id, a.answer.as_str()))
            .count();

        // Interim score, round not yet counted
        session.completeness = scoring::score(&session);

        let mut new_questions = Vec::new();
        let mut generation_error = None;

        if scoring::needs_more_questions(session.completeness.overall, session.round_count) {
            debug!(
                overall = session.completeness.overall,
                round_count = session.round_count,
                "submit_answers: requesting follow-up questions"
            );
            let raw = self
                .generate(PromptKind::QuestionGenerator, &input::question_generator_input(&session))
                .await?;
            match parse::parse_questions(&raw) {
                Ok(raw_questions) => {
                    new_questions = parse::into_clarifications(raw_questions, session.round_count + 2);
                }
                Err(e) => {
                    warn!(%session_id, error = %e, "submit_answers: continuing without new questions");
                    generation_error = Some(e);
                }
            }
            session.clarifications.extend(new_questions.iter().cloned());
        } else {
            debug!(
                overall = session.completeness.overall,
                round_count = session.round_count,
                "submit_answers: no follow-up needed"
            );
        }

        session.round_count += 1;
        session.completeness = scoring::score(&session);
        session.status = if session.completeness.overall >= READY_THRESHOLD {
            SessionStatus::ReadyToGenerate
        } else {
            SessionStatus::InProgress
        };

        let update = SessionUpdate::new()
            .clarifications(session.clarifications)
            .completeness(session.completeness)
            .status(session.status)
            .round_count(session.round_count);
        let session = self
            .store
            .update(session_id, update)
            .await?
            .ok_or_else(|| ClarifyError::not_found(session_id))?;

        info!(
            %session_id,
            round = session.round_count,
            overall = session.completeness.overall,
            status = %session.status,
            "Finished clarification round"
        );

        let pending = session.pending().into_iter().cloned().collect();
        Ok(RoundOutcome {
            round: session.round_count,
            answers_recorded: answers.len(),
            answers_matched,
            new_questions,
            pending,
            generation_error,
            session,
        })
    }

    /// Progress snapshot for one session
    pub async fn status(&self, session_id: &str) -> Result<StatusReport, ClarifyError> {
        debug!(%session_id, "status: called");
        let session = self.load(session_id).await?;
        let pending_questions: Vec<Clarification> = session.pending().into_iter().cloned().collect();
        let totals = QuestionTotals {
            total: session.clarifications.len(),
            answered: session.answered_count(),
            pending: pending_questions.len(),
        };

        Ok(StatusReport {
            session_id: session.id,
            status: session.status,
            created_at: session.created_at,
            updated_at: session.updated_at,
            requirement: session.requirement,
            context: session.context,
            completeness: session.completeness,
            round_count: session.round_count,
            totals,
            pending_questions,
            assumptions: session.assumptions,
        })
    }

    /// Summaries of every session, oldest first
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ClarifyError> {
        debug!("list_sessions: called");
        let sessions = self.store.list().await?;
        Ok(sessions.iter().map(SessionSummary::from_session).collect())
    }

    /// Session counts by status
    pub async fn stats(&self) -> Result<SessionStats, ClarifyError> {
        debug!("stats: called");
        let sessions = self.store.list().await?;
        let mut stats = SessionStats {
            total: sessions.len(),
            ..Default::default()
        };
        for s in &sessions {
            match s.status {
                SessionStatus::InProgress => stats.in_progress += 1,
                SessionStatus::ReadyToGenerate => stats.ready_to_generate += 1,
                SessionStatus::Complete => stats.complete += 1,
            }
        }
        Ok(stats)
    }

    /// Append caller-supplied assumptions (kept verbatim, duplicates included)
    pub async fn add_assumptions(&self, session_id: &str, texts: Vec<String>) -> Result<Session, ClarifyError> {
        debug!(%session_id, count = texts.len(), "add_assumptions: called");
        let session = self.load(session_id).await?;
        let mut assumptions = session.assumptions;
        assumptions.extend(texts.into_iter().filter(|t| !t.trim().is_empty()));

        self.store
            .update(session_id, SessionUpdate::new().assumptions(assumptions))
            .await?
            .ok_or_else(|| ClarifyError::not_found(session_id))
    }

    /// Remove a session
    pub async fn delete_session(&self, session_id: &str) -> Result<(), ClarifyError> {
        debug!(%session_id, "delete_session: called");
        if self.store.delete(session_id).await? {
            info!(%session_id, "Deleted clarification session");
            Ok(())
        } else {
            Err(ClarifyError::not_found(session_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clarify::generator::ScriptedGenerator;
    use crate::domain::{QuestionCategory, QuestionPriority};
    use crate::llm::LlmError;

    const ANALYSIS: &str = r#"```json
{
  "core_need": "See order status",
  "entities": ["order", "customer"],
  "implicit_assumptions": ["Orders already exist in a database"],
  "questions": [
    {"question": "Who checks order status?", "category": "functional", "priority": "critical", "why": "users"},
    {"question": "Where do orders live?", "category": "technical", "priority": "important"},
    {"question": "Mobile or desktop?", "category": "ux", "priority": "nice_to_have"}
  ]
}
```"#;

    fn service(generator: Arc<ScriptedGenerator>) -> ClarifyService {
        ClarifyService::new(SessionStore::spawn(), generator, PromptSet::embedded())
    }

    fn questions_json(categories: &[&str]) -> String {
        let questions: Vec<Value> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| serde_json::json!({"question": format!("Follow-up {}", i + 1), "category": c, "priority": "important"}))
            .collect();
        serde_json::json!({ "questions": questions }).to_string()
    }

    fn clarification(id: &str, category: QuestionCategory) -> Clarification {
        Clarification::new(id, format!("Question {}", id), category, QuestionPriority::Important, None)
    }

    #[tokio::test]
    async fn test_start_session_seeds_first_round() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(ANALYSIS));
        let svc = service(generator.clone());

        let outcome = svc
            .start_session("Order tracking", Some("e-commerce".to_string()), Some("business"))
            .await
            .unwrap();

        let ids: Vec<_> = outcome.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1_1", "q1_2", "q1_3"]);
        assert_eq!(outcome.session.round_count, 0);
        assert_eq!(outcome.session.status, SessionStatus::InProgress);
        assert_eq!(outcome.session.completeness, CompletenessScore::baseline());
        assert_eq!(outcome.session.assumptions, vec!["Orders already exist in a database"]);
        assert_eq!(outcome.analysis.core_need, "See order status");
        assert_eq!(outcome.session.context.domain.as_deref(), Some("e-commerce"));

        let stored = svc.store().get_required(&outcome.session.id).await.unwrap();
        assert_eq!(stored.clarifications.len(), 3);

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input["requirement"], "Order tracking");
        assert_eq!(calls[0].input["context"]["audience"], "business");
    }

    #[tokio::test]
    async fn test_start_session_parse_failure_stores_nothing() {
        let generator = Arc::new(ScriptedGenerator::new().with_text("not json at all"));
        let svc = service(generator);

        let err = svc.start_session("X", None, None).await.unwrap_err();
        assert!(matches!(err, ClarifyError::GenerationParse { raw, .. } if raw == "not json at all"));
        assert!(svc.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_session_upstream_failure_stores_nothing() {
        let generator = Arc::new(ScriptedGenerator::new().with_error(LlmError::ApiError {
            status: 401,
            message: "invalid x-api-key".to_string(),
        }));
        let svc = service(generator);

        let err = svc.start_session("X", None, None).await.unwrap_err();
        assert!(matches!(
            err,
            ClarifyError::Upstream {
                kind: crate::clarify::UpstreamKind::Authentication,
                ..
            }
        ));
        assert!(svc.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_numbers_follow_up_ids_with_offset_two() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .with_text(ANALYSIS)
                .with_text(questions_json(&["edge_case", "constraint"])),
        );
        let svc = service(generator.clone());
        let start = svc.start_session("Order tracking", None, None).await.unwrap();

        let outcome = svc
            .submit_answers(&start.session.id, &[AnswerInput::new("q1_1", "Customers")])
            .await
            .unwrap();

        let ids: Vec<_> = outcome.new_questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q2_1", "q2_2"]);
        assert_eq!(outcome.round, 1);
        assert_eq!(outcome.session.round_count, 1);
        assert_eq!(outcome.answers_recorded, 1);
        assert_eq!(outcome.answers_matched, 1);
        assert_eq!(outcome.pending.len(), 4);
        assert!(outcome.generation_error.is_none());
        assert_eq!(outcome.session.completeness, scoring::score(&outcome.session));

        // The generator saw the interim score and the recorded answer
        let calls = generator.calls();
        assert_eq!(calls[1].input["round_count"], 0);
        assert_eq!(calls[1].input["clarifications"][0]["answer"], "Customers");
    }

    #[tokio::test]
    async fn test_unknown_question_id_is_ignored() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(ANALYSIS).with_text(questions_json(&[])));
        let svc = service(generator);
        let start = svc.start_session("X", None, None).await.unwrap();

        let outcome = svc
            .submit_answers(&start.session.id, &[AnswerInput::new("q9_9", "whatever")])
            .await
            .unwrap();

        assert_eq!(outcome.answers_recorded, 1);
        assert_eq!(outcome.answers_matched, 0);
        assert_eq!(outcome.session.round_count, 1);
        assert_eq!(outcome.session.answered_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_degrades_to_no_new_questions() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(ANALYSIS).with_text("sorry, no JSON today"));
        let svc = service(generator);
        let start = svc.start_session("X", None, None).await.unwrap();

        let outcome = svc
            .submit_answers(&start.session.id, &[AnswerInput::new("q1_2", "Postgres")])
            .await
            .unwrap();

        assert!(outcome.new_questions.is_empty());
        assert!(matches!(outcome.generation_error, Some(ClarifyError::GenerationParse { .. })));
        assert_eq!(outcome.session.round_count, 1);

        let stored = svc.store().get_required(&start.session.id).await.unwrap();
        assert_eq!(stored.clarification("q1_2").unwrap().answer.as_deref(), Some("Postgres"));
        assert_eq!(stored.round_count, 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_session_unchanged() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(ANALYSIS).with_error(LlmError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
        }));
        let svc = service(generator);
        let start = svc.start_session("X", None, None).await.unwrap();

        let err = svc
            .submit_answers(&start.session.id, &[AnswerInput::new("q1_1", "Customers")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClarifyError::Upstream {
                kind: crate::clarify::UpstreamKind::ServiceUnavailable,
                ..
            }
        ));

        let stored = svc.store().get_required(&start.session.id).await.unwrap();
        assert_eq!(stored, start.session);
    }

    #[tokio::test]
    async fn test_submit_answers_unknown_session() {
        let svc = service(Arc::new(ScriptedGenerator::new()));
        let err = svc.submit_answers("missing", &[]).await.unwrap_err();
        assert!(matches!(err, ClarifyError::NotFound { session_id } if session_id == "missing"));
    }

    #[tokio::test]
    async fn test_round_cap_skips_generation() {
        let generator = Arc::new(ScriptedGenerator::new());
        let svc = service(generator.clone());

        let mut session = Session::with_id("capped", "X", SessionContext::default());
        session.round_count = 5;
        session.clarifications.push(clarification("q5_1", QuestionCategory::Functional));
        svc.store().insert(session).await.unwrap();

        let outcome = svc.submit_answers("capped", &[]).await.unwrap();

        assert_eq!(generator.call_count(), 0);
        assert_eq!(outcome.session.round_count, 6);
        assert!(outcome.new_questions.is_empty());
    }

    #[tokio::test]
    async fn test_ready_threshold_skips_generation_and_marks_ready() {
        let generator = Arc::new(ScriptedGenerator::new());
        let svc = service(generator.clone());

        let mut session = Session::with_id("ready", "X", SessionContext::default());
        for (i, category) in QuestionCategory::ALL.iter().enumerate() {
            session.clarifications.push(clarification(&format!("q1_{}", i + 1), *category));
        }
        svc.store().insert(session).await.unwrap();

        let answers: Vec<_> = (1..=5).map(|i| AnswerInput::new(format!("q1_{}", i), "done")).collect();
        let outcome = svc.submit_answers("ready", &answers).await.unwrap();

        assert_eq!(generator.call_count(), 0);
        assert_eq!(outcome.session.completeness.overall, 100);
        assert_eq!(outcome.session.status, SessionStatus::ReadyToGenerate);
        assert!(outcome.next_step().contains("/generate"));
    }

    #[tokio::test]
    async fn test_complete_session_still_accepts_answers() {
        let generator = Arc::new(ScriptedGenerator::new());
        let svc = service(generator);

        let mut session = Session::with_id("done", "X", SessionContext::default());
        for (i, category) in QuestionCategory::ALL.iter().enumerate() {
            let mut c = clarification(&format!("q1_{}", i + 1), *category);
            c.answer = Some("yes".to_string());
            session.clarifications.push(c);
        }
        session.round_count = 2;
        session.status = SessionStatus::Complete;
        svc.store().insert(session).await.unwrap();

        let outcome = svc
            .submit_answers("done", &[AnswerInput::new("q1_1", "changed my mind")])
            .await
            .unwrap();

        assert_eq!(outcome.session.status, SessionStatus::ReadyToGenerate);
        assert_eq!(
            outcome.session.clarification("q1_1").unwrap().answer.as_deref(),
            Some("changed my mind")
        );
    }

    #[tokio::test]
    async fn test_status_list_stats() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(ANALYSIS));
        let svc = service(generator);
        let long_requirement = "a".repeat(150);
        let start = svc.start_session(&long_requirement, None, None).await.unwrap();

        let report = svc.status(&start.session.id).await.unwrap();
        assert_eq!(
            report.totals,
            QuestionTotals {
                total: 3,
                answered: 0,
                pending: 3
            }
        );
        assert_eq!(report.pending_questions.len(), 3);
        assert_eq!(report.requirement, long_requirement);

        let summaries = svc.list_sessions().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].requirement.len(), 103);
        assert!(summaries[0].requirement.ends_with("..."));
        assert_eq!(summaries[0].completeness, 10);

        let stats = svc.stats().await.unwrap();
        assert_eq!(
            stats,
            SessionStats {
                total: 1,
                in_progress: 1,
                ready_to_generate: 0,
                complete: 0
            }
        );
    }

    #[tokio::test]
    async fn test_short_requirement_not_truncated() {
        let session = Session::with_id("s", "Short", SessionContext::default());
        assert_eq!(SessionSummary::from_session(&session).requirement, "Short");
    }

    #[tokio::test]
    async fn test_add_assumptions_appends_without_dedup() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(ANALYSIS));
        let svc = service(generator);
        let start = svc.start_session("X", None, None).await.unwrap();

        let session = svc
            .add_assumptions(
                &start.session.id,
                vec!["Orders already exist in a database".to_string(), "  ".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(
            session.assumptions,
            vec!["Orders already exist in a database", "Orders already exist in a database"]
        );
    }

    #[tokio::test]
    async fn test_delete_session() {
        let generator = Arc::new(ScriptedGenerator::new().with_text(ANALYSIS));
        let svc = service(generator);
        let start = svc.start_session("X", None, None).await.unwrap();

        svc.delete_session(&start.session.id).await.unwrap();
        assert!(matches!(
            svc.delete_session(&start.session.id).await,
            Err(ClarifyError::NotFound { .. })
        ));
        assert!(matches!(svc.status(&start.session.id).await, Err(ClarifyError::NotFound { .. })));
    }
}
