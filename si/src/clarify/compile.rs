//! Specification compilation behind the readiness gate

use tracing::{debug, info};

use super::controller::ClarifyService;
use super::error::ClarifyError;
use super::parse;
use crate::domain::{CompletenessScore, GeneratedSpec, Session, SessionStatus};
use crate::prompts::{PromptKind, input};
use crate::scoring::{COMPILE_THRESHOLD, Readiness};
use crate::state::SessionUpdate;

/// Result of a compile request
#[derive(Debug, Clone)]
pub enum CompileOutcome {
    /// Refused: completeness under the compile gate. Nothing was changed.
    BelowThreshold {
        completeness: CompletenessScore,
        warning: String,
        suggestion: String,
    },
    /// Compiled; the session is now `complete`
    Compiled {
        session: Session,
        spec: GeneratedSpec,
        /// Present when compiled in the marginal band
        warning: Option<String>,
    },
}

impl ClarifyService {
    /// Compile a session into a specification
    ///
    /// Refuses below the compile gate without calling the generator. Parse
    /// or upstream failures leave the session unchanged.
    pub async fn compile_spec(&self, session_id: &str) -> Result<CompileOutcome, ClarifyError> {
        debug!(%session_id, "compile_spec: called");
        let session = self.load(session_id).await?;
        let overall = session.completeness.overall;

        let readiness = Readiness::from_overall(overall);
        if !readiness.can_compile() {
            debug!(%overall, "compile_spec: below compile threshold");
            return Ok(CompileOutcome::BelowThreshold {
                completeness: session.completeness,
                warning: format!(
                    "Completeness is {}%, below {}%. The specification would have significant gaps.",
                    overall, COMPILE_THRESHOLD
                ),
                suggestion: "Continue answering questions or use /gaps to see what's missing.".to_string(),
            });
        }

        let raw = self
            .generate(PromptKind::SpecCompiler, &input::spec_compiler_input(&session))
            .await?;
        let spec = parse::parse_spec(&raw)?;

        let warning = (readiness == Readiness::Marginal).then(|| {
            format!(
                "Compiled at {}% completeness. Review assumptions and open questions before relying on it.",
                overall
            )
        });

        let session = self
            .store
            .update(session_id, SessionUpdate::new().status(SessionStatus::Complete))
            .await?
            .ok_or_else(|| ClarifyError::not_found(session_id))?;

        info!(%session_id, title = %spec.title, features = spec.features.len(), "Compiled specification");

        Ok(CompileOutcome::Compiled { session, spec, warning })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clarify::generator::ScriptedGenerator;
    use crate::domain::{Clarification, QuestionCategory, QuestionPriority, SessionContext};
    use crate::prompts::PromptSet;
    use crate::state::SessionStore;
    use std::sync::Arc;

    const SPEC: &str = r#"```json
{
  "title": "Order Tracker",
  "problem_statement": {"pain": "Customers call support", "who": "Shoppers", "current_workarounds": ["Phone"]},
  "user_flow": [{"step": 1, "actor": "Shopper", "action": "Opens order page", "outcome": "Sees status"}],
  "features": [{"name": "Status page", "description": "Shows status", "acceptance_criteria": ["Loads in 1s"], "priority": "mvp"}],
  "edge_cases": [{"scenario": "Unknown order", "handling": "Show 404"}],
  "assumptions": ["Orders have ids"],
  "open_questions": []
}
```"#;

    async fn service_with_score(overall: u32, text: &str) -> (ClarifyService, Arc<ScriptedGenerator>) {
        let generator = Arc::new(ScriptedGenerator::new().with_text(text));
        let svc = ClarifyService::new(SessionStore::spawn(), generator.clone(), PromptSet::embedded());

        let mut session = Session::with_id("c1", "Order tracking", SessionContext::default());
        session.completeness.overall = overall;
        let mut answered = Clarification::new(
            "q1_1",
            "Who?",
            QuestionCategory::Functional,
            QuestionPriority::Critical,
            None,
        );
        answered.answer = Some("Shoppers".to_string());
        session.clarifications.push(answered);
        session.clarifications.push(Clarification::new(
            "q1_2",
            "Where?",
            QuestionCategory::Technical,
            QuestionPriority::Important,
            None,
        ));
        svc.store().insert(session).await.unwrap();
        (svc, generator)
    }

    #[tokio::test]
    async fn test_gate_refuses_at_59() {
        let (svc, generator) = service_with_score(59, SPEC).await;

        let outcome = svc.compile_spec("c1").await.unwrap();

        assert!(matches!(outcome, CompileOutcome::BelowThreshold { completeness, .. } if completeness.overall == 59));
        assert_eq!(generator.call_count(), 0);
        assert_eq!(
            svc.store().get_required("c1").await.unwrap().status,
            SessionStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_compiles_at_60_with_warning() {
        let (svc, generator) = service_with_score(60, SPEC).await;

        let outcome = svc.compile_spec("c1").await.unwrap();

        match outcome {
            CompileOutcome::Compiled { session, spec, warning } => {
                assert_eq!(session.status, SessionStatus::Complete);
                assert_eq!(spec.title, "Order Tracker");
                assert!(warning.is_some());
            }
            other => panic!("expected Compiled, got {:?}", other),
        }

        // Only answered clarifications reach the compiler
        let input = &generator.calls()[0].input;
        assert_eq!(input["clarifications"].as_array().unwrap().len(), 1);
        assert_eq!(input["clarifications"][0]["id"], "q1_1");
    }

    #[tokio::test]
    async fn test_compiles_at_80_without_warning() {
        let (svc, _) = service_with_score(80, SPEC).await;
        match svc.compile_spec("c1").await.unwrap() {
            CompileOutcome::Compiled { warning, .. } => assert!(warning.is_none()),
            other => panic!("expected Compiled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_parse_failure_leaves_session_unchanged() {
        let (svc, _) = service_with_score(90, "{\"not_a_spec\": true}").await;
        let before = svc.store().get_required("c1").await.unwrap();

        let err = svc.compile_spec("c1").await.unwrap_err();

        assert!(matches!(err, ClarifyError::GenerationParse { .. }));
        assert_eq!(svc.store().get_required("c1").await.unwrap(), before);
    }
}
