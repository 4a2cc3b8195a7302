//! Speciterator - iterative requirement clarification
//!
//! Takes a rough requirement through rounds of clarifying questions, scores
//! how complete the understanding is across five weighted categories and,
//! once the score clears the compile gate, compiles a structured
//! specification. Question and document text come from an external
//! generator; this crate owns the session state machine and the scoring.

pub mod clarify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod prompts;
pub mod render;
pub mod repl;
pub mod scoring;
pub mod state;

pub use clarify::{ClarifyError, ClarifyService, CompileOutcome, Generator};
pub use config::Config;
pub use domain::{Clarification, CompletenessScore, Session, SessionStatus};
pub use state::SessionStore;
