//! Completeness scoring
//!
//! Maps a session's clarifications and round count to per-category and overall
//! completeness in [0,100]. The score measures coverage (fraction of asked
//! questions answered), not answer quality, blended with a flat per-round
//! credit.
//!
//! All arithmetic is done on integers so rounding is exact: half values round
//! up, which for non-negative inputs matches round-half-away-from-zero.

use serde::Serialize;
use tracing::debug;

use crate::domain::{CompletenessScore, QuestionCategory, Session};

/// Overall score at or above which no further questions are requested
pub const READY_THRESHOLD: u32 = 80;

/// Overall score below which compilation is refused
pub const COMPILE_THRESHOLD: u32 = 60;

/// Hard cap on rounds that may request more questions
pub const MAX_ROUNDS: u32 = 5;

/// Credit added per completed round
pub const ROUND_BONUS_STEP: u32 = 10;

/// Upper bound of the round credit
pub const ROUND_BONUS_CAP: u32 = 30;

/// Category weights in percent; they sum to 100
pub const WEIGHT_FUNCTIONAL: u32 = 30;
pub const WEIGHT_TECHNICAL: u32 = 25;
pub const WEIGHT_UX: u32 = 20;
pub const WEIGHT_EDGE_CASES: u32 = 15;
pub const WEIGHT_CONSTRAINTS: u32 = 10;

/// Prior belief for a category before any of its questions were asked
pub const DEFAULT_FUNCTIONAL: u32 = 15;
pub const DEFAULT_TECHNICAL: u32 = 10;
pub const DEFAULT_UX: u32 = 5;
pub const DEFAULT_EDGE_CASES: u32 = 5;
pub const DEFAULT_CONSTRAINTS: u32 = 10;

/// Weight of a category in percent
pub fn weight(category: QuestionCategory) -> u32 {
    match category {
        QuestionCategory::Functional => WEIGHT_FUNCTIONAL,
        QuestionCategory::Technical => WEIGHT_TECHNICAL,
        QuestionCategory::Ux => WEIGHT_UX,
        QuestionCategory::EdgeCase => WEIGHT_EDGE_CASES,
        QuestionCategory::Constraint => WEIGHT_CONSTRAINTS,
    }
}

/// Score used for a category with no questions
pub fn default_score(category: QuestionCategory) -> u32 {
    match category {
        QuestionCategory::Functional => DEFAULT_FUNCTIONAL,
        QuestionCategory::Technical => DEFAULT_TECHNICAL,
        QuestionCategory::Ux => DEFAULT_UX,
        QuestionCategory::EdgeCase => DEFAULT_EDGE_CASES,
        QuestionCategory::Constraint => DEFAULT_CONSTRAINTS,
    }
}

/// Divide rounding half up
fn div_round(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Flat credit for completed rounds
pub fn round_bonus(round_count: u32) -> u32 {
    round_count.saturating_mul(ROUND_BONUS_STEP).min(ROUND_BONUS_CAP)
}

/// Weighted combination of category scores, before the round bonus
fn weighted_overall(raw: &[(QuestionCategory, u32)]) -> u32 {
    let sum: u64 = raw.iter().map(|(c, s)| u64::from(*s) * u64::from(weight(*c))).sum();
    div_round(sum, 100) as u32
}

/// Assemble a score from raw category values and a round count
fn assemble(raw: &[(QuestionCategory, u32)], round_count: u32) -> CompletenessScore {
    let bonus = round_bonus(round_count);
    let finish = |value: u32| (value + bonus).min(100);
    let get = |category: QuestionCategory| {
        raw.iter()
            .find(|(c, _)| *c == category)
            .map(|(_, s)| *s)
            .unwrap_or_else(|| default_score(category))
    };

    CompletenessScore {
        overall: finish(weighted_overall(raw)),
        functional: finish(get(QuestionCategory::Functional)),
        technical: finish(get(QuestionCategory::Technical)),
        ux: finish(get(QuestionCategory::Ux)),
        edge_cases: finish(get(QuestionCategory::EdgeCase)),
        constraints: finish(get(QuestionCategory::Constraint)),
    }
}

/// The "nothing known yet" score a new session starts with
pub fn baseline() -> CompletenessScore {
    let raw: Vec<_> = QuestionCategory::ALL.iter().map(|c| (*c, default_score(*c))).collect();
    assemble(&raw, 0)
}

/// Score a session from its full clarification set and round count
///
/// Pure: the same session always yields the same score.
pub fn score(session: &Session) -> CompletenessScore {
    let raw: Vec<(QuestionCategory, u32)> = QuestionCategory::ALL
        .iter()
        .map(|category| {
            let (answered, total) = session
                .clarifications
                .iter()
                .filter(|c| c.category == *category)
                .fold((0u64, 0u64), |(a, t), c| (a + u64::from(c.is_answered()), t + 1));

            let value = if total == 0 {
                default_score(*category)
            } else {
                div_round(100 * answered, total) as u32
            };
            (*category, value)
        })
        .collect();

    let result = assemble(&raw, session.round_count);
    debug!(session_id = %session.id, round_count = session.round_count, overall = result.overall, "score: computed");
    result
}

/// Whether the controller should ask for another batch of questions
pub fn needs_more_questions(overall: u32, round_count: u32) -> bool {
    overall < READY_THRESHOLD && round_count < MAX_ROUNDS
}

/// Where a session's overall score sits relative to the two thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// Below the compile threshold: compilation refused
    Blocked,
    /// Compilation allowed, with a warning
    Marginal,
    /// At or above the round-continuation threshold
    Ready,
}

impl Readiness {
    pub fn from_overall(overall: u32) -> Self {
        if overall < COMPILE_THRESHOLD {
            Readiness::Blocked
        } else if overall < READY_THRESHOLD {
            Readiness::Marginal
        } else {
            Readiness::Ready
        }
    }

    pub fn can_compile(&self) -> bool {
        !matches!(self, Readiness::Blocked)
    }
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocked => write!(f, "blocked"),
            Self::Marginal => write!(f, "marginal"),
            Self::Ready => write!(f, "ready"),
        }
    }
}
