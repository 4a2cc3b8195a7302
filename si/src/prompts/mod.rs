//! Prompts for the external generator
//!
//! Embedded system prompts, an override loader and the builders for the
//! structured JSON each call receives.

pub mod embedded;
pub mod input;
mod loader;

pub use loader::{PromptKind, PromptLoader, PromptSet};
