//! Structured inputs handed to the generator alongside each system prompt

use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{Session, SessionContext};

fn context_json(context: &SessionContext) -> Value {
    json!({
        "domain": context.domain,
        "audience": context.audience.map(|a| a.to_string()),
    })
}

/// Input for the requirement analyzer
pub fn analyzer_input(requirement: &str, context: &SessionContext) -> Value {
    debug!(requirement_len = requirement.len(), "analyzer_input: called");
    json!({
        "requirement": requirement,
        "context": context_json(context),
    })
}

/// Input for the follow-up question generator
pub fn question_generator_input(session: &Session) -> Value {
    debug!(session_id = %session.id, "question_generator_input: called");
    let clarifications: Vec<Value> = session
        .clarifications
        .iter()
        .map(|c| {
            json!({
                "question": c.question,
                "answer": c.answer,
                "category": c.category,
            })
        })
        .collect();

    json!({
        "requirement": session.requirement,
        "context": context_json(&session.context),
        "clarifications": clarifications,
        "completeness": session.completeness,
        "round_count": session.round_count,
    })
}

/// Input for the gap analyzer
pub fn gap_analyzer_input(session: &Session) -> Value {
    debug!(session_id = %session.id, "gap_analyzer_input: called");
    json!({
        "requirement": session.requirement,
        "clarifications": session.clarifications,
        "completeness": session.completeness,
        "assumptions": session.assumptions,
    })
}

/// Input for the spec compiler; only answered clarifications are included
pub fn spec_compiler_input(session: &Session) -> Value {
    debug!(session_id = %session.id, "spec_compiler_input: called");
    let answered: Vec<_> = session.clarifications.iter().filter(|c| c.is_answered()).collect();
    json!({
        "requirement": session.requirement,
        "context": context_json(&session.context),
        "clarifications": answered,
        "assumptions": session.assumptions,
        "completeness": session.completeness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audience, Clarification, QuestionCategory, QuestionPriority};

    fn session() -> Session {
        let ctx = SessionContext {
            domain: Some("fintech".to_string()),
            audience: Some(Audience::Business),
            complexity: None,
        };
        let mut session = Session::with_id("s1", "Build a budget tracker", ctx);
        session.clarifications.push(Clarification::new(
            "q1_1",
            "Who uses it?",
            QuestionCategory::Functional,
            QuestionPriority::Critical,
            None,
        ));
        session.clarifications.push(Clarification::new(
            "q1_2",
            "Which bank APIs?",
            QuestionCategory::Technical,
            QuestionPriority::Important,
            Some("integration scope".to_string()),
        ));
        session.apply_answer("q1_1", "Households");
        session.assumptions.push("Web only".to_string());
        session
    }

    #[test]
    fn test_analyzer_input_shape() {
        let ctx = SessionContext::from_parts(Some("health".to_string()), Some("technical"));
        let input = analyzer_input("Track vitals", &ctx);

        assert_eq!(input["requirement"], "Track vitals");
        assert_eq!(input["context"]["domain"], "health");
        assert_eq!(input["context"]["audience"], "technical");
    }

    #[test]
    fn test_analyzer_input_missing_context_is_null() {
        let input = analyzer_input("X", &SessionContext::default());
        assert!(input["context"]["domain"].is_null());
        assert!(input["context"]["audience"].is_null());
    }

    #[test]
    fn test_question_generator_input_includes_unanswered() {
        let input = question_generator_input(&session());

        let clarifications = input["clarifications"].as_array().unwrap();
        assert_eq!(clarifications.len(), 2);
        assert_eq!(clarifications[0]["answer"], "Households");
        assert!(clarifications[1]["answer"].is_null());
        assert_eq!(clarifications[1]["category"], "technical");
        assert_eq!(input["round_count"], 0);
        assert_eq!(input["completeness"]["edge_cases"], 5);
        assert_eq!(input["context"]["audience"], "business");
    }

    #[test]
    fn test_spec_compiler_input_only_answered() {
        let input = spec_compiler_input(&session());

        let clarifications = input["clarifications"].as_array().unwrap();
        assert_eq!(clarifications.len(), 1);
        assert_eq!(clarifications[0]["id"], "q1_1");
        assert_eq!(input["assumptions"][0], "Web only");
    }

    #[test]
    fn test_gap_analyzer_input_has_everything() {
        let input = gap_analyzer_input(&session());
        assert_eq!(input["clarifications"].as_array().unwrap().len(), 2);
        assert_eq!(input["clarifications"][1]["why"], "integration scope");
        assert_eq!(input["completeness"]["overall"], 10);
    }
}
