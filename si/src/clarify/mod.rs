//! Clarification workflow
//!
//! The round controller, gap analysis, specification compilation and the
//! boundary between the session model and the external generator.

mod compile;
mod controller;
mod error;
mod gaps;
pub mod generator;
pub mod parse;

pub use compile::CompileOutcome;
pub use controller::{
    AnswerInput, ClarifyService, QuestionTotals, RoundOutcome, SUMMARY_REQUIREMENT_CHARS, SessionStats,
    SessionSummary, StartOutcome, StatusReport,
};
pub use error::{ClarifyError, UpstreamKind};
pub use gaps::GapReport;
pub use generator::{Generator, GeneratorCall, LlmGenerator, ScriptedGenerator};
