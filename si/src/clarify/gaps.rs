//! Gap analysis
//!
//! Classification comes from the generator; this side only attaches the
//! current score and readiness band. Sessions are never modified here.

use serde::Serialize;
use tracing::{debug, info};

use super::controller::ClarifyService;
use super::error::ClarifyError;
use super::parse;
use crate::domain::{CompletenessScore, GapAnalysis};
use crate::prompts::{PromptKind, input};
use crate::scoring::Readiness;

/// Gap analysis for one session
#[derive(Debug, Clone, Serialize)]
pub struct GapReport {
    pub session_id: String,
    pub completeness: CompletenessScore,
    pub readiness: Readiness,
    pub analysis: GapAnalysis,
    pub recommendation: String,
}

fn recommendation(analysis: &GapAnalysis) -> String {
    if analysis.ready_to_generate {
        "Ready to generate specification. Use /generate.".to_string()
    } else if analysis.blocking_gaps.is_empty() {
        "Keep answering questions to raise completeness.".to_string()
    } else {
        format!("Resolve blocking gaps first: {}", analysis.blocking_gaps.join(", "))
    }
}

impl ClarifyService {
    /// Ask the generator what is still missing from a session
    pub async fn analyze_gaps(&self, session_id: &str) -> Result<GapReport, ClarifyError> {
        debug!(%session_id, "analyze_gaps: called");
        let session = self.load(session_id).await?;

        let raw = self
            .generate(PromptKind::GapAnalyzer, &input::gap_analyzer_input(&session))
            .await?;
        let analysis = parse::parse_gaps(&raw)?;

        info!(
            %session_id,
            gaps = analysis.gaps.len(),
            blocking = analysis.blocking_gaps.len(),
            "Analyzed gaps"
        );

        Ok(GapReport {
            session_id: session.id,
            completeness: session.completeness,
            readiness: Readiness::from_overall(session.completeness.overall),
            recommendation: recommendation(&analysis),
            analysis,
        })
    }
}
