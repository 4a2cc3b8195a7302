//! Rendering of compiled specifications
//!
//! Pure formatting: markdown through a Handlebars template (overridable via
//! the prompt directory) and pretty-printed JSON.

use chrono::NaiveDate;
use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::domain::{EdgeCase, GeneratedSpec, Session, UserFlowStep};
use crate::prompts::embedded;

#[derive(Serialize)]
struct FeatureView<'a> {
    name: &'a str,
    description: &'a str,
    priority: String,
    acceptance_criteria: &'a [String],
}

#[derive(Serialize)]
struct MarkdownView<'a> {
    title: &'a str,
    generated: String,
    session_id: &'a str,
    completeness: u32,
    pain: &'a str,
    who: &'a str,
    workarounds: &'a [String],
    user_flow: &'a [UserFlowStep],
    features: Vec<FeatureView<'a>>,
    edge_cases: &'a [EdgeCase],
    assumptions: &'a [String],
    open_questions: &'a [String],
}

/// Render with the embedded markdown template
pub fn markdown(spec: &GeneratedSpec, session: &Session, date: NaiveDate) -> Result<String> {
    markdown_with_template(embedded::SPEC_MARKDOWN, spec, session, date)
}

/// Render with a caller-supplied Handlebars template
pub fn markdown_with_template(
    template: &str,
    spec: &GeneratedSpec,
    session: &Session,
    date: NaiveDate,
) -> Result<String> {
    debug!(session_id = %session.id, title = %spec.title, "markdown_with_template: called");
    let view = MarkdownView {
        title: &spec.title,
        generated: date.format("%Y-%m-%d").to_string(),
        session_id: &session.id,
        completeness: session.completeness.overall,
        pain: &spec.problem_statement.pain,
        who: &spec.problem_statement.who,
        workarounds: &spec.problem_statement.current_workarounds,
        user_flow: &spec.user_flow,
        features: spec
            .features
            .iter()
            .map(|f| FeatureView {
                name: &f.name,
                description: &f.description,
                priority: f.priority.to_string().to_uppercase(),
                acceptance_criteria: &f.acceptance_criteria,
            })
            .collect(),
        edge_cases: &spec.edge_cases,
        assumptions: &spec.assumptions,
        open_questions: &spec.open_questions,
    };

    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);
    hbs.render_template(template, &view)
        .map_err(|e| eyre!("Failed to render specification markdown: {}", e))
}

/// Render as `{session_id, status, completeness, specification}`
pub fn json(spec: &GeneratedSpec, session: &Session) -> Result<String> {
    debug!(session_id = %session.id, "json: called");
    let value = json!({
        "session_id": session.id,
        "status": session.status,
        "completeness": session.completeness,
        "specification": spec,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
