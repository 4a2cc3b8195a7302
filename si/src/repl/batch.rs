//! Answers queued in the REPL until the round is submitted

use crate::clarify::AnswerInput;
use crate::domain::Clarification;

/// Answers collected for one round of the current session
#[derive(Debug, Default)]
pub struct AnswerBatch {
    answers: Vec<AnswerInput>,
}

impl AnswerBatch {
    /// Queue an answer; a second answer to the same id replaces the first
    pub fn queue(&mut self, answer: AnswerInput) {
        match self.answers.iter_mut().find(|a| a.question_id == answer.question_id) {
            Some(existing) => existing.answer = answer.answer,
            None => self.answers.push(answer),
        }
    }

    pub fn is_queued(&self, question_id: &str) -> bool {
        self.answers.iter().any(|a| a.question_id == question_id)
    }

    /// First pending question without a queued answer
    pub fn next_unqueued<'a>(&self, pending: &'a [Clarification]) -> Option<&'a Clarification> {
        pending.iter().find(|q| !self.is_queued(&q.id))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Hand over the queued answers, leaving the batch empty
    pub fn take(&mut self) -> Vec<AnswerInput> {
        std::mem::take(&mut self.answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuestionCategory, QuestionPriority};

    fn question(id: &str) -> Clarification {
        Clarification::new(id, "?", QuestionCategory::Functional, QuestionPriority::Important, None)
    }

    #[test]
    fn test_requeue_replaces_answer() {
        let mut batch = AnswerBatch::default();
        batch.queue(AnswerInput::new("q1_1", "first"));
        batch.queue(AnswerInput::new("q1_2", "other"));
        batch.queue(AnswerInput::new("q1_1", "second"));

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.take()[0].answer, "second");
    }

    #[test]
    fn test_next_unqueued_skips_queued() {
        let pending = vec![question("q1_1"), question("q1_2")];
        let mut batch = AnswerBatch::default();
        assert_eq!(batch.next_unqueued(&pending).map(|q| q.id.as_str()), Some("q1_1"));

        batch.queue(AnswerInput::new("q1_1", "a"));
        assert_eq!(batch.next_unqueued(&pending).map(|q| q.id.as_str()), Some("q1_2"));

        batch.queue(AnswerInput::new("q1_2", "b"));
        assert!(batch.next_unqueued(&pending).is_none());
    }

    #[test]
    fn test_take_empties_batch() {
        let mut batch = AnswerBatch::default();
        batch.queue(AnswerInput::new("q1_1", "a"));

        let taken = batch.take();
        assert_eq!(taken.len(), 1);
        assert!(batch.is_empty());
    }
}
