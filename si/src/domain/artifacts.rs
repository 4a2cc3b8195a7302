//! Generator-produced artifacts
//!
//! Structures the external generator returns after they have been parsed and
//! validated at the boundary: requirement analysis, gap analysis and the
//! compiled specification.

use serde::{Deserialize, Serialize};

use super::session::QuestionCategory;

/// Summary of the initial requirement analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementAnalysis {
    pub core_need: String,
    pub entities: Vec<String>,
    pub implicit_assumptions: Vec<String>,
}

/// Impact of a gap on the implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Impact {
    High,
    #[default]
    Medium,
    Low,
}

impl From<String> for Impact {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Impact::High,
            "low" => Impact::Low,
            _ => Impact::Medium,
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// One missing piece of understanding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapItem {
    pub category: QuestionCategory,
    pub description: String,
    pub impact: Impact,
    pub recommendation: String,
}

/// Gap report as classified by the generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub gaps: Vec<GapItem>,
    pub ready_to_generate: bool,
    pub blocking_gaps: Vec<String>,
}

/// Release bucket for a compiled feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FeaturePriority {
    Mvp,
    V2,
    #[default]
    Future,
}

impl From<String> for FeaturePriority {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "mvp" => FeaturePriority::Mvp,
            "v2" => FeaturePriority::V2,
            _ => FeaturePriority::Future,
        }
    }
}

impl std::fmt::Display for FeaturePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mvp => write!(f, "mvp"),
            Self::V2 => write!(f, "v2"),
            Self::Future => write!(f, "future"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemStatement {
    pub pain: String,
    pub who: String,
    pub current_workarounds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFlowStep {
    pub step: u32,
    pub actor: String,
    pub action: String,
    pub outcome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub priority: FeaturePriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCase {
    pub scenario: String,
    pub handling: String,
}

/// The compiled specification document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSpec {
    pub title: String,
    #[serde(default)]
    pub problem_statement: ProblemStatement,
    #[serde(default)]
    pub user_flow: Vec<UserFlowStep>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub edge_cases: Vec<EdgeCase>,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub open_questions: Vec<String>,
}
