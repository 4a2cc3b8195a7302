//! Slash command parsing

use crate::config::OutputFormat;

/// A parsed line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Start a new session from a requirement
    Start(String),
    /// Queue an answer by question id
    Answer { question_id: String, answer: String },
    /// Queue an answer to the first pending question not yet answered
    AnswerNext(String),
    /// Submit the queued answers as one round
    Submit,
    /// Drop the queued answers
    Discard,
    Pending,
    Status,
    Gaps,
    Generate(Option<OutputFormat>),
    Assume(String),
    Sessions,
    Switch(String),
    Delete(String),
    Info,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one trimmed, non-empty input line
    ///
    /// Lines not starting with `/` queue an answer to the next pending question.
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if !input.starts_with('/') {
            return Ok(Self::AnswerNext(input.to_string()));
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        let required = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("Usage: {} <{}>", cmd, what))
            } else {
                Ok(rest.to_string())
            }
        };

        match cmd {
            "/start" | "/s" => required("requirement").map(Self::Start),
            "/answer" | "/a" => {
                let (question_id, answer) = rest
                    .split_once(char::is_whitespace)
                    .map(|(id, answer)| (id.to_string(), answer.trim().to_string()))
                    .filter(|(_, answer)| !answer.is_empty())
                    .ok_or_else(|| format!("Usage: {} <question-id> <answer>", cmd))?;
                Ok(Self::Answer { question_id, answer })
            }
            "/submit" | "/done" => Ok(Self::Submit),
            "/discard" => Ok(Self::Discard),
            "/pending" | "/p" => Ok(Self::Pending),
            "/status" => Ok(Self::Status),
            "/gaps" | "/g" => Ok(Self::Gaps),
            "/generate" | "/gen" => {
                if rest.is_empty() {
                    Ok(Self::Generate(None))
                } else {
                    rest.parse::<OutputFormat>().map(|f| Self::Generate(Some(f)))
                }
            }
            "/assume" => required("assumption").map(Self::Assume),
            "/sessions" | "/ls" => Ok(Self::Sessions),
            "/switch" => required("session-id").map(Self::Switch),
            "/delete" | "/rm" => required("session-id").map(Self::Delete),
            "/info" => Ok(Self::Info),
            "/help" | "/h" => Ok(Self::Help),
            "/quit" | "/q" | "/exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_answers_next() {
        assert_eq!(
            ReplCommand::parse("Small businesses").unwrap(),
            ReplCommand::AnswerNext("Small businesses".to_string())
        );
    }

    #[test]
    fn test_start_requires_requirement() {
        assert_eq!(
            ReplCommand::parse("/start Build a CRM for dentists").unwrap(),
            ReplCommand::Start("Build a CRM for dentists".to_string())
        );
        assert!(ReplCommand::parse("/start").unwrap_err().contains("Usage"));
    }

    #[test]
    fn test_answer_splits_id_and_text() {
        assert_eq!(
            ReplCommand::parse("/answer q2_3  Under 100 users ").unwrap(),
            ReplCommand::Answer {
                question_id: "q2_3".to_string(),
                answer: "Under 100 users".to_string(),
            }
        );
        assert!(ReplCommand::parse("/answer q2_3").is_err());
        assert!(ReplCommand::parse("/answer").is_err());
    }

    #[test]
    fn test_submit_and_discard() {
        assert_eq!(ReplCommand::parse("/submit").unwrap(), ReplCommand::Submit);
        assert_eq!(ReplCommand::parse("/done").unwrap(), ReplCommand::Submit);
        assert_eq!(ReplCommand::parse("/discard").unwrap(), ReplCommand::Discard);
    }

    #[test]
    fn test_generate_format() {
        assert_eq!(ReplCommand::parse("/generate").unwrap(), ReplCommand::Generate(None));
        assert_eq!(
            ReplCommand::parse("/generate json").unwrap(),
            ReplCommand::Generate(Some(OutputFormat::Json))
        );
        assert!(ReplCommand::parse("/generate pdf").is_err());
    }

    #[test]
    fn test_simple_commands_and_aliases() {
        assert_eq!(ReplCommand::parse("/pending").unwrap(), ReplCommand::Pending);
        assert_eq!(ReplCommand::parse("/status").unwrap(), ReplCommand::Status);
        assert_eq!(ReplCommand::parse("/g").unwrap(), ReplCommand::Gaps);
        assert_eq!(ReplCommand::parse("/ls").unwrap(), ReplCommand::Sessions);
        assert_eq!(ReplCommand::parse("/q").unwrap(), ReplCommand::Quit);
        assert_eq!(
            ReplCommand::parse("/switch abc").unwrap(),
            ReplCommand::Switch("abc".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/assume Web only").unwrap(),
            ReplCommand::Assume("Web only".to_string())
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(ReplCommand::parse("/frobnicate").unwrap_err(), "Unknown command: /frobnicate");
    }
}
