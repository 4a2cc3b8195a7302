//! Generator output parsing and boundary validation
//!
//! Generator text is loosely shaped JSON, sometimes fenced in a code block.
//! Everything is checked against the closed category and priority sets here,
//! before it can reach a Session.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ClarifyError;
use crate::domain::{
    Clarification, GapAnalysis, GapItem, GeneratedSpec, Impact, QuestionCategory, QuestionPriority,
    RequirementAnalysis,
};

/// Strip a code fence (with or without a language tag) around a JSON payload
///
/// Only a fence that opens the text is stripped, so backticks inside JSON
/// strings survive. Prose around a bare object falls back to the outermost
/// braces.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        let body = rest[tag_len..].trim_end();
        return body.strip_suffix("```").unwrap_or(body).trim();
    }

    if let Some(start) = trimmed.find('{')
        && let Some(end) = trimmed.rfind('}')
        && end > start
    {
        return &trimmed[start..=end];
    }

    trimmed
}

fn parse_json<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, ClarifyError> {
    let json = extract_json(raw);
    serde_json::from_str(json).map_err(|e| {
        debug!(%what, error = %e, "parse_json: failed");
        ClarifyError::parse(format!("invalid {} JSON: {}", what, e), raw)
    })
}

/// A question as the generator wrote it, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawQuestion {
    pub question: String,
    pub category: String,
    pub priority: Option<String>,
    pub why: Option<String>,
}

/// Validate raw questions into unanswered clarifications for `round`
///
/// Questions with empty text or an unknown category are dropped. Unknown or
/// missing priorities become `important`. Ids are numbered over the kept
/// questions, starting at 1.
pub fn into_clarifications(raw: Vec<RawQuestion>, round: u32) -> Vec<Clarification> {
    debug!(count = raw.len(), %round, "into_clarifications: called");
    let mut kept = Vec::with_capacity(raw.len());

    for q in raw {
        let text = q.question.trim();
        if text.is_empty() {
            warn!(%round, "into_clarifications: dropping question with empty text");
            continue;
        }
        let category = match q.category.parse::<QuestionCategory>() {
            Ok(c) => c,
            Err(e) => {
                warn!(%round, error = %e, "into_clarifications: dropping question");
                continue;
            }
        };
        let priority = match q.priority.as_deref().map(str::parse::<QuestionPriority>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                debug!(error = %e, "into_clarifications: coercing priority to important");
                QuestionPriority::Important
            }
            None => QuestionPriority::Important,
        };
        let why = q.why.filter(|w| !w.trim().is_empty());

        kept.push(Clarification::new(
            Clarification::make_id(round, kept.len() + 1),
            text,
            category,
            priority,
            why,
        ));
    }

    kept
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnalysisResponse {
    core_need: String,
    entities: Vec<String>,
    implicit_assumptions: Vec<String>,
    questions: Vec<RawQuestion>,
}

/// Parse requirement-analyzer output
pub fn parse_analysis(raw: &str) -> Result<(RequirementAnalysis, Vec<RawQuestion>), ClarifyError> {
    debug!(raw_len = raw.len(), "parse_analysis: called");
    let response: AnalysisResponse = parse_json(raw, "requirement analysis")?;
    let analysis = RequirementAnalysis {
        core_need: response.core_need,
        entities: response.entities,
        implicit_assumptions: response.implicit_assumptions,
    };
    Ok((analysis, response.questions))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuestionsResponse {
    questions: Vec<RawQuestion>,
    observations: Vec<String>,
}

/// Parse question-generator output
pub fn parse_questions(raw: &str) -> Result<Vec<RawQuestion>, ClarifyError> {
    debug!(raw_len = raw.len(), "parse_questions: called");
    let response: QuestionsResponse = parse_json(raw, "follow-up questions")?;
    if !response.observations.is_empty() {
        debug!(observations = ?response.observations, "parse_questions: generator observations");
    }
    Ok(response.questions)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGap {
    category: String,
    description: String,
    impact: String,
    recommendation: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GapResponse {
    gaps: Vec<RawGap>,
    ready_to_generate: bool,
    blocking_gaps: Vec<String>,
}

/// Parse gap-analyzer output
///
/// Gaps with unknown categories are dropped; unknown impacts become `medium`.
pub fn parse_gaps(raw: &str) -> Result<GapAnalysis, ClarifyError> {
    debug!(raw_len = raw.len(), "parse_gaps: called");
    let response: GapResponse = parse_json(raw, "gap analysis")?;

    let gaps = response
        .gaps
        .into_iter()
        .filter_map(|g| match g.category.parse::<QuestionCategory>() {
            Ok(category) => Some(GapItem {
                category,
                description: g.description,
                impact: Impact::from(g.impact),
                recommendation: g.recommendation,
            }),
            Err(e) => {
                warn!(error = %e, "parse_gaps: dropping gap");
                None
            }
        })
        .collect();

    Ok(GapAnalysis {
        gaps,
        ready_to_generate: response.ready_to_generate,
        blocking_gaps: response.blocking_gaps,
    })
}

/// Parse spec-compiler output
pub fn parse_spec(raw: &str) -> Result<GeneratedSpec, ClarifyError> {
    debug!(raw_len = raw.len(), "parse_spec: called");
    let spec: GeneratedSpec = parse_json(raw, "specification")?;
    if spec.title.trim().is_empty() {
        return Err(ClarifyError::parse("specification has an empty title", raw));
    }
    Ok(spec)
}
