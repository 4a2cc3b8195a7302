//! Domain types for speciterator
//!
//! Core types: Session, Clarification, CompletenessScore and the artifacts
//! produced by the external generator.

mod artifacts;
mod session;

pub use artifacts::{
    EdgeCase, Feature, FeaturePriority, GapAnalysis, GapItem, GeneratedSpec, Impact, ProblemStatement,
    RequirementAnalysis, UserFlowStep,
};
pub use session::{
    Audience, Clarification, CompletenessScore, Complexity, QuestionCategory, QuestionPriority, Session,
    SessionContext, SessionStatus,
};
