//! Session domain type
//!
//! A Session is one clarification dialogue tied to one original requirement.
//! It owns the ordered list of Clarifications, the last computed
//! CompletenessScore and the round bookkeeping used by the controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::scoring;

/// Normalize a loosely formatted enum label ("Edge Case", "nice-to-have")
/// into snake_case for matching
fn normalize_label(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Category a clarifying question belongs to
///
/// The set is closed: the scorer's weights depend on exactly these five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    /// What the system does (features, users, rules)
    Functional,
    /// How it is built (integrations, data, APIs)
    Technical,
    /// User experience (flows, errors, accessibility)
    Ux,
    /// Error scenarios, boundaries, recovery
    EdgeCase,
    /// Budget, timeline, compliance, scale
    Constraint,
}

impl QuestionCategory {
    /// All categories in scoring order
    pub const ALL: [QuestionCategory; 5] = [
        QuestionCategory::Functional,
        QuestionCategory::Technical,
        QuestionCategory::Ux,
        QuestionCategory::EdgeCase,
        QuestionCategory::Constraint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Functional => "functional",
            Self::Technical => "technical",
            Self::Ux => "ux",
            Self::EdgeCase => "edge_case",
            Self::Constraint => "constraint",
        }
    }
}

impl std::fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionCategory {
    type Err = String;

    /// Accepts the canonical labels plus common plural/spaced spellings.
    /// Anything else is rejected rather than becoming a sixth category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "functional" => Ok(Self::Functional),
            "technical" => Ok(Self::Technical),
            "ux" | "user_experience" => Ok(Self::Ux),
            "edge_case" | "edge_cases" | "edgecase" | "edgecases" => Ok(Self::EdgeCase),
            "constraint" | "constraints" => Ok(Self::Constraint),
            _ => Err(format!("unknown question category '{}'", s)),
        }
    }
}

/// How much a question matters to the implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPriority {
    Critical,
    #[default]
    Important,
    NiceToHave,
}

impl std::fmt::Display for QuestionPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Important => write!(f, "important"),
            Self::NiceToHave => write!(f, "nice_to_have"),
        }
    }
}

impl FromStr for QuestionPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "critical" => Ok(Self::Critical),
            "important" => Ok(Self::Important),
            "nice_to_have" | "nicetohave" => Ok(Self::NiceToHave),
            _ => Err(format!("unknown question priority '{}'", s)),
        }
    }
}

/// Session status in the clarification workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still gathering answers
    #[default]
    InProgress,
    /// Completeness reached the round-continuation threshold
    ReadyToGenerate,
    /// A specification was compiled from this session
    Complete,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::ReadyToGenerate => write!(f, "ready_to_generate"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Target audience for the resulting specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Technical,
    Business,
    Mixed,
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Technical => write!(f, "technical"),
            Self::Business => write!(f, "business"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "technical" => Ok(Self::Technical),
            "business" => Ok(Self::Business),
            "mixed" => Ok(Self::Mixed),
            _ => Err(format!("unknown audience '{}'", s)),
        }
    }
}

/// Rough size of the requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

/// Supplementary context for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub domain: Option<String>,
    pub audience: Option<Audience>,
    pub complexity: Option<Complexity>,
}

impl SessionContext {
    /// Build a context from caller-supplied strings
    ///
    /// Unknown audience labels are ignored rather than rejected.
    pub fn from_parts(domain: Option<String>, audience: Option<&str>) -> Self {
        let audience = audience.and_then(|a| match a.parse::<Audience>() {
            Ok(audience) => Some(audience),
            Err(e) => {
                debug!(error = %e, "SessionContext::from_parts: ignoring audience");
                None
            }
        });
        Self {
            domain: domain.filter(|d| !d.trim().is_empty()),
            audience,
            complexity: None,
        }
    }

    /// Merge another context into this one; only fields present in `other` win
    pub fn merge(&mut self, other: SessionContext) {
        if other.domain.is_some() {
            self.domain = other.domain;
        }
        if other.audience.is_some() {
            self.audience = other.audience;
        }
        if other.complexity.is_some() {
            self.complexity = other.complexity;
        }
    }
}

/// One question/answer unit within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarification {
    /// `q<round>_<index>`, unique within the session
    pub id: String,
    pub question: String,
    /// None means unanswered
    pub answer: Option<String>,
    pub category: QuestionCategory,
    pub priority: QuestionPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
}

impl Clarification {
    /// Create an unanswered clarification
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        category: QuestionCategory,
        priority: QuestionPriority,
        why: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: None,
            category,
            priority,
            why,
        }
    }

    /// Format a clarification id for the given round (1-based) and index (1-based)
    pub fn make_id(round: u32, index: usize) -> String {
        format!("q{}_{}", round, index)
    }

    /// An empty answer does not count as an answer
    pub fn is_answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Per-category and overall completeness, each in [0,100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessScore {
    pub overall: u32,
    pub functional: u32,
    pub technical: u32,
    pub ux: u32,
    pub edge_cases: u32,
    pub constraints: u32,
}

impl CompletenessScore {
    /// The prior used before anything has been measured
    pub fn baseline() -> Self {
        scoring::baseline()
    }

    /// Score for a single category
    pub fn category(&self, category: QuestionCategory) -> u32 {
        match category {
            QuestionCategory::Functional => self.functional,
            QuestionCategory::Technical => self.technical,
            QuestionCategory::Ux => self.ux,
            QuestionCategory::EdgeCase => self.edge_cases,
            QuestionCategory::Constraint => self.constraints,
        }
    }
}

impl Default for CompletenessScore {
    fn default() -> Self {
        Self::baseline()
    }
}

/// The unit of conversation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Original free-text input, never changed after creation
    pub requirement: String,
    pub context: SessionContext,
    /// Append-only; entries gain answers in place but are never removed
    pub clarifications: Vec<Clarification>,
    pub completeness: CompletenessScore,
    pub assumptions: Vec<String>,
    pub status: SessionStatus,
    /// Completed answer-processing rounds
    pub round_count: u32,
}

impl Session {
    /// Create a fresh session with a generated id
    pub fn new(requirement: impl Into<String>, context: SessionContext) -> Self {
        Self::with_id(Uuid::now_v7().to_string(), requirement, context)
    }

    /// Create a session with a specific id (for testing)
    pub fn with_id(id: impl Into<String>, requirement: impl Into<String>, context: SessionContext) -> Self {
        let now = Utc::now();
        let mut merged = SessionContext {
            complexity: Some(Complexity::Moderate),
            ..Default::default()
        };
        merged.merge(context);
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            requirement: requirement.into(),
            context: merged,
            clarifications: Vec::new(),
            completeness: CompletenessScore::baseline(),
            assumptions: Vec::new(),
            status: SessionStatus::InProgress,
            round_count: 0,
        }
    }

    /// Find a clarification by id
    pub fn clarification(&self, id: &str) -> Option<&Clarification> {
        self.clarifications.iter().find(|c| c.id == id)
    }

    /// Attach an answer to the clarification with the given id
    ///
    /// Returns false (and changes nothing) when no clarification matches.
    pub fn apply_answer(&mut self, id: &str, answer: impl Into<String>) -> bool {
        match self.clarifications.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.answer = Some(answer.into());
                true
            }
            None => {
                debug!(%id, session_id = %self.id, "apply_answer: no matching clarification");
                false
            }
        }
    }

    /// Clarifications still waiting for an answer
    pub fn pending(&self) -> Vec<&Clarification> {
        self.clarifications.iter().filter(|c| !c.is_answered()).collect()
    }

    /// Number of answered clarifications
    pub fn answered_count(&self) -> usize {
        self.clarifications.iter().filter(|c| c.is_answered()).count()
    }
}
