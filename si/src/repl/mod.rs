//! Interactive REPL for Speciterator
//!
//! Exposes every clarification operation to a human through slash commands.

mod batch;
mod command;
mod session;

pub use command::ReplCommand;
pub use session::ReplSession;

use std::sync::Arc;

use colored::Colorize;
use eyre::{Context, Result};

use crate::clarify::{ClarifyService, LlmGenerator};
use crate::config::Config;
use crate::domain::QuestionCategory;
use crate::llm;
use crate::prompts::PromptLoader;
use crate::scoring;
use crate::state::SessionStore;

/// Run the interactive REPL
///
/// This is the main entry point for `si repl`.
pub async fn run_interactive(
    config: &Config,
    requirement: Option<String>,
    domain: Option<String>,
    audience: Option<String>,
) -> Result<()> {
    config.validate()?;

    let client = llm::create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let generator = Arc::new(LlmGenerator::new(client, config.llm.max_tokens));

    let loader = PromptLoader::new(config.prompts.resolved_dir());
    let prompts = loader.load_set().context("Failed to load prompts")?;
    let markdown_template = loader
        .spec_markdown_template()
        .context("Failed to load markdown template")?;

    let service = ClarifyService::new(SessionStore::spawn(), generator, prompts);

    let mut session = ReplSession::new(service, config.output.format, markdown_template).with_context(domain, audience);
    session.run(requirement).await
}

/// Print the fixed scoring model: weights, defaults and thresholds
pub fn print_scoring_model() {
    println!("{}", "Category weights (default before any question):".bright_cyan());
    for category in QuestionCategory::ALL {
        println!(
            "  {:12} {:>3}%  ({})",
            category.to_string(),
            scoring::weight(category),
            scoring::default_score(category)
        );
    }
    println!(
        "{} ready at {}%, compile allowed from {}%, at most {} rounds, +{} per round up to {}",
        "Thresholds:".bright_cyan(),
        scoring::READY_THRESHOLD,
        scoring::COMPILE_THRESHOLD,
        scoring::MAX_ROUNDS,
        scoring::ROUND_BONUS_STEP,
        scoring::ROUND_BONUS_CAP
    );
    println!();
}

/// Print version, API key health and the scoring model
pub fn print_info(config: &Config) {
    println!("{} {}", "speciterator".bright_cyan().bold(), env!("CARGO_PKG_VERSION"));
    let api = if config.llm.has_api_key() {
        "configured".green()
    } else {
        "missing".red()
    };
    println!(
        "{} {} ({}, model {})",
        "API key:".bright_cyan(),
        api,
        config.llm.api_key_env,
        config.llm.model
    );
    println!("{} {}", "Output format:".bright_cyan(), config.output.format);
    println!();
    print_scoring_model();
}
