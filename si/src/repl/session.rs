//! REPL session management

use chrono::Local;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use super::batch::AnswerBatch;
use super::command::ReplCommand;
use crate::clarify::{AnswerInput, ClarifyError, ClarifyService, CompileOutcome, RoundOutcome, StartOutcome};
use crate::config::OutputFormat;
use crate::domain::{Clarification, CompletenessScore, QuestionCategory};
use crate::render;
use crate::scoring::Readiness;

/// Interactive clarification session
pub struct ReplSession {
    service: ClarifyService,
    /// Session the commands act on
    current: Option<String>,
    /// Answers queued for the current session's next round
    batch: AnswerBatch,
    domain: Option<String>,
    audience: Option<String>,
    output_format: OutputFormat,
    markdown_template: String,
}

impl ReplSession {
    pub fn new(service: ClarifyService, output_format: OutputFormat, markdown_template: String) -> Self {
        Self {
            service,
            current: None,
            batch: AnswerBatch::default(),
            domain: None,
            audience: None,
            output_format,
            markdown_template,
        }
    }

    /// Context applied to sessions started from this REPL
    pub fn with_context(mut self, domain: Option<String>, audience: Option<String>) -> Self {
        self.domain = domain;
        self.audience = audience;
        self
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_requirement: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(requirement) = initial_requirement {
            println!("{} /start {}", ">".bright_green(), requirement);
            self.execute(ReplCommand::Start(requirement)).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    match ReplCommand::parse(input) {
                        Ok(command) => {
                            if self.execute(command).await == SlashResult::Quit {
                                break;
                            }
                        }
                        Err(message) => {
                            println!("{} {}", "?".yellow(), message);
                            println!("Type {} for available commands", "/help".yellow());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.discard_batch();
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Speciterator - requirement clarification".bright_cyan().bold());
        println!("Start with {} or pass a requirement on the command line.", "/start <requirement>".yellow());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Execute one command, reporting failures without leaving the loop
    async fn execute(&mut self, command: ReplCommand) -> SlashResult {
        debug!(?command, "execute: called");
        let result = match command {
            ReplCommand::Quit => return SlashResult::Quit,
            ReplCommand::Help => {
                self.print_help();
                Ok(())
            }
            ReplCommand::Info => self.info().await,
            ReplCommand::Start(requirement) => self.start(&requirement).await,
            ReplCommand::Sessions => self.sessions().await,
            ReplCommand::Switch(id) => self.switch(&id).await,
            ReplCommand::Delete(id) => self.delete(&id).await,
            other => match self.current.clone() {
                Some(id) => self.execute_for(&id, other).await,
                None => {
                    println!("{}", "No active session. Use /start <requirement> or /switch <id>.".yellow());
                    Ok(())
                }
            },
        };

        if let Err(e) = result {
            print_error(&e);
        }
        SlashResult::Continue
    }

    /// Commands that act on the current session
    async fn execute_for(&mut self, id: &str, command: ReplCommand) -> Result<(), ClarifyError> {
        match command {
            ReplCommand::Answer { question_id, answer } => {
                let pending = self.service.status(id).await?.pending_questions;
                self.queue(&pending, AnswerInput::new(question_id, answer));
                Ok(())
            }
            ReplCommand::AnswerNext(answer) => {
                let pending = self.service.status(id).await?.pending_questions;
                match self.batch.next_unqueued(&pending) {
                    Some(next) => {
                        let question_id = next.id.clone();
                        self.queue(&pending, AnswerInput::new(question_id, answer));
                    }
                    None if self.batch.is_empty() => {
                        println!("{}", "No pending questions. Try /gaps or /generate.".dimmed());
                    }
                    None => {
                        println!("{}", "Every pending question has an answer queued. Use /submit.".yellow());
                    }
                }
                Ok(())
            }
            ReplCommand::Submit => self.submit(id).await,
            ReplCommand::Discard => {
                self.discard_batch();
                Ok(())
            }
            ReplCommand::Pending => {
                let report = self.service.status(id).await?;
                if report.pending_questions.is_empty() {
                    println!("{}", "No pending questions.".dimmed());
                } else {
                    for q in &report.pending_questions {
                        let marker = if self.batch.is_queued(&q.id) { "✓".green() } else { " ".normal() };
                        println!("{} {} {}", marker, q.id.bright_white(), q.question);
                    }
                    println!();
                }
                if !self.batch.is_empty() {
                    println!("{} answers queued. Use /submit to finish the round.", self.batch.len());
                }
                Ok(())
            }
            ReplCommand::Status => self.status(id).await,
            ReplCommand::Gaps => self.gaps(id).await,
            ReplCommand::Generate(format) => self.generate(id, format.unwrap_or(self.output_format)).await,
            ReplCommand::Assume(text) => {
                let session = self.service.add_assumptions(id, vec![text]).await?;
                println!("{} {} assumptions recorded", "✓".green(), session.assumptions.len());
                Ok(())
            }
            other => {
                debug!(?other, "execute_for: not a session command");
                Ok(())
            }
        }
    }

    async fn start(&mut self, requirement: &str) -> Result<(), ClarifyError> {
        self.discard_batch();
        println!("{}", "Analyzing requirement...".dimmed());
        let StartOutcome {
            session,
            analysis,
            questions,
        } = self
            .service
            .start_session(requirement, self.domain.clone(), self.audience.as_deref())
            .await?;

        println!();
        println!("{} {}", "Session:".bright_cyan(), session.id);
        if !analysis.core_need.is_empty() {
            println!("{} {}", "Core need:".bright_cyan(), analysis.core_need);
        }
        if !analysis.entities.is_empty() {
            println!("{} {}", "Entities:".bright_cyan(), analysis.entities.join(", "));
        }
        for assumption in &analysis.implicit_assumptions {
            println!("  {} {}", "assumes".dimmed(), assumption);
        }
        println!();
        print_completeness(&session.completeness);
        print_questions(&questions);
        println!(
            "Answer with plain text (next pending question) or {}, then {}.",
            "/answer <id> <text>".yellow(),
            "/submit".yellow()
        );

        self.current = Some(session.id);
        Ok(())
    }

    /// Queue an answer for the next round
    fn queue(&mut self, pending: &[Clarification], answer: AnswerInput) {
        println!("{} {} queued", "✓".green(), answer.question_id);
        self.batch.queue(answer);
        if self.batch.next_unqueued(pending).is_none() {
            println!(
                "{} answers queued. Use {} to finish the round.",
                self.batch.len(),
                "/submit".yellow()
            );
        }
    }

    /// Submit the queued answers as one round
    async fn submit(&mut self, id: &str) -> Result<(), ClarifyError> {
        if self.batch.is_empty() {
            println!("{}", "No answers queued. Answer a question first.".dimmed());
            return Ok(());
        }
        println!("{}", "Recording answers...".dimmed());
        let answers = self.batch.take();
        match self.service.submit_answers(id, &answers).await {
            Ok(outcome) => {
                print_round(&outcome);
                Ok(())
            }
            Err(e) => {
                // Nothing was recorded; keep the answers for a retry
                for answer in answers {
                    self.batch.queue(answer);
                }
                Err(e)
            }
        }
    }

    fn discard_batch(&mut self) {
        if !self.batch.is_empty() {
            println!("{} {} queued answers discarded", "!".yellow(), self.batch.len());
            self.batch.take();
        }
    }

    async fn status(&self, id: &str) -> Result<(), ClarifyError> {
        let report = self.service.status(id).await?;
        println!();
        println!("{} {}", "Session:".bright_cyan(), report.session_id);
        println!("{} {}", "Requirement:".bright_cyan(), report.requirement);
        if let Some(ref domain) = report.context.domain {
            println!("{} {}", "Domain:".bright_cyan(), domain);
        }
        if let Some(audience) = report.context.audience {
            println!("{} {}", "Audience:".bright_cyan(), audience);
        }
        println!(
            "{} {}  {} {}",
            "Status:".bright_cyan(),
            report.status,
            "Round:".bright_cyan(),
            report.round_count
        );
        println!(
            "{} {} total, {} answered, {} pending",
            "Questions:".bright_cyan(),
            report.totals.total,
            report.totals.answered,
            report.totals.pending
        );
        print_completeness(&report.completeness);
        if !report.assumptions.is_empty() {
            println!("{}", "Assumptions:".bright_cyan());
            for a in &report.assumptions {
                println!("  - {}", a);
            }
        }
        println!();
        Ok(())
    }

    async fn gaps(&self, id: &str) -> Result<(), ClarifyError> {
        println!("{}", "Analyzing gaps...".dimmed());
        let report = self.service.analyze_gaps(id).await?;
        println!();
        print_completeness(&report.completeness);
        if report.analysis.gaps.is_empty() {
            println!("{}", "No gaps reported.".dimmed());
        }
        for gap in &report.analysis.gaps {
            println!(
                "  [{}] {} {}",
                gap.impact.to_string().yellow(),
                gap.category.to_string().bright_white(),
                gap.description
            );
            println!("      {} {}", "->".dimmed(), gap.recommendation);
        }
        println!();
        println!("{}", report.recommendation);
        println!();
        Ok(())
    }

    async fn generate(&self, id: &str, format: OutputFormat) -> Result<(), ClarifyError> {
        println!("{}", "Compiling specification...".dimmed());
        match self.service.compile_spec(id).await? {
            CompileOutcome::BelowThreshold {
                completeness,
                warning,
                suggestion,
            } => {
                println!("{} {}", "!".yellow(), warning);
                print_completeness(&completeness);
                println!("{}", suggestion);
            }
            CompileOutcome::Compiled { session, spec, warning } => {
                if let Some(warning) = warning {
                    println!("{} {}", "!".yellow(), warning);
                }
                let rendered = match format {
                    OutputFormat::Markdown => render::markdown_with_template(
                        &self.markdown_template,
                        &spec,
                        &session,
                        Local::now().date_naive(),
                    ),
                    OutputFormat::Json => render::json(&spec, &session),
                };
                match rendered {
                    Ok(text) => {
                        println!();
                        println!("{}", text);
                    }
                    Err(e) => println!("{} {}", "Error:".red(), e),
                }
            }
        }
        Ok(())
    }

    async fn sessions(&self) -> Result<(), ClarifyError> {
        let summaries = self.service.list_sessions().await?;
        if summaries.is_empty() {
            println!("{}", "No sessions yet.".dimmed());
            return Ok(());
        }
        println!();
        for s in summaries {
            let marker = if self.current.as_deref() == Some(s.id.as_str()) {
                "*".bright_green()
            } else {
                " ".normal()
            };
            println!(
                "{} {} {:>3}% {:<18} {}",
                marker,
                s.id.bright_white(),
                s.completeness,
                s.status.to_string(),
                s.requirement
            );
        }
        println!();
        Ok(())
    }

    async fn switch(&mut self, id: &str) -> Result<(), ClarifyError> {
        let report = self.service.status(id).await?;
        self.discard_batch();
        println!("{} {}", "Switched to".dimmed(), report.session_id);
        self.current = Some(report.session_id);
        Ok(())
    }

    async fn delete(&mut self, id: &str) -> Result<(), ClarifyError> {
        self.service.delete_session(id).await?;
        if self.current.as_deref() == Some(id) {
            self.discard_batch();
            self.current = None;
        }
        println!("{} Deleted {}", "✓".green(), id);
        Ok(())
    }

    async fn info(&self) -> Result<(), ClarifyError> {
        let stats = self.service.stats().await?;
        println!();
        println!(
            "{} {} total, {} in progress, {} ready, {} complete",
            "Sessions:".bright_cyan(),
            stats.total,
            stats.in_progress,
            stats.ready_to_generate,
            stats.complete
        );
        super::print_scoring_model();
        Ok(())
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:24} Start a new session", "/start <requirement>".yellow());
        println!("  {:24} Queue an answer by question id", "/answer <id> <text>".yellow());
        println!("  {:24} Queue an answer to the next pending question", "<text>".yellow());
        println!("  {:24} Submit queued answers as one round", "/submit".yellow());
        println!("  {:24} Drop queued answers", "/discard".yellow());
        println!("  {:24} List unanswered questions", "/pending".yellow());
        println!("  {:24} Show session progress", "/status".yellow());
        println!("  {:24} Analyze what is still missing", "/gaps".yellow());
        println!("  {:24} Compile the specification", "/generate [markdown|json]".yellow());
        println!("  {:24} Record an assumption", "/assume <text>".yellow());
        println!("  {:24} List sessions", "/sessions".yellow());
        println!("  {:24} Make another session current", "/switch <id>".yellow());
        println!("  {:24} Delete a session", "/delete <id>".yellow());
        println!("  {:24} Scoring model and session counts", "/info".yellow());
        println!("  {:24} Show this help", "/help".yellow());
        println!("  {:24} Exit", "/quit".yellow());
        println!();
    }
}

fn print_error(err: &ClarifyError) {
    println!("{} {}", "Error:".red(), err);
    println!("  {}", err.hint().dimmed());
}

fn print_completeness(score: &CompletenessScore) {
    let readiness = Readiness::from_overall(score.overall);
    let overall = format!("{}%", score.overall);
    let overall = match readiness {
        Readiness::Blocked => overall.red(),
        Readiness::Marginal => overall.yellow(),
        Readiness::Ready => overall.green(),
    };
    let categories: Vec<String> = QuestionCategory::ALL
        .iter()
        .map(|c| format!("{} {}%", c, score.category(*c)))
        .collect();
    println!(
        "{} {} ({})  {}",
        "Completeness:".bright_cyan(),
        overall,
        readiness,
        categories.join("  ").dimmed()
    );
}

fn print_questions(questions: &[Clarification]) {
    for q in questions {
        println!(
            "  {} {} {}",
            q.id.bright_white(),
            format!("[{}/{}]", q.category, q.priority).dimmed(),
            q.question
        );
        if let Some(ref why) = q.why {
            println!("        {}", why.dimmed());
        }
    }
    println!();
}

fn print_round(outcome: &RoundOutcome) {
    println!();
    println!(
        "{} {} ({} of {} answers matched)",
        "Round".bright_cyan(),
        outcome.round,
        outcome.answers_matched,
        outcome.answers_recorded
    );
    if outcome.answers_matched < outcome.answers_recorded {
        println!("{}", "Unknown question ids were ignored.".yellow());
    }
    if let Some(ref e) = outcome.generation_error {
        println!("{} {}", "!".yellow(), e);
    }
    print_completeness(&outcome.session.completeness);
    if !outcome.new_questions.is_empty() {
        println!("{}", "New questions:".bright_cyan());
        print_questions(&outcome.new_questions);
    }
    println!("{}", outcome.next_step());
    println!();
}

/// Result of handling a command
#[derive(Debug, PartialEq, Eq)]
enum SlashResult {
    Continue,
    Quit,
}
