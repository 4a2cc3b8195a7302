//! Clarification workflow errors

use thiserror::Error;

use crate::llm::LlmError;
use crate::state::StoreError;

/// Actionable category of a failed generator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    Authentication,
    RateLimit,
    ServiceUnavailable,
    Timeout,
    Other,
}

impl UpstreamKind {
    /// Classify a transport error
    ///
    /// Structured status codes win; the message text is only consulted when
    /// no status is available.
    pub fn classify(err: &LlmError) -> Self {
        match err {
            LlmError::MissingApiKey(_) => return Self::Authentication,
            LlmError::RateLimited { .. } => return Self::RateLimit,
            LlmError::Timeout(_) => return Self::Timeout,
            LlmError::Network(e) if e.is_timeout() => return Self::Timeout,
            _ => {}
        }

        if let Some(status) = err.status() {
            match status {
                401 | 403 => return Self::Authentication,
                408 => return Self::Timeout,
                429 => return Self::RateLimit,
                s if s >= 500 => return Self::ServiceUnavailable,
                _ => {}
            }
        }

        Self::from_message(&err.to_string())
    }

    /// Classify from free-form error text
    pub fn from_message(message: &str) -> Self {
        let m = message.to_lowercase();
        if m.contains("auth") || m.contains("api key") || m.contains("api_key") || m.contains("401") {
            Self::Authentication
        } else if m.contains("rate limit") || m.contains("rate_limit") || m.contains("429") {
            Self::RateLimit
        } else if m.contains("timeout") || m.contains("timed out") {
            Self::Timeout
        } else if m.contains("unavailable") || m.contains("overloaded") || m.contains("503") || m.contains("502") {
            Self::ServiceUnavailable
        } else {
            Self::Other
        }
    }

    /// What the caller can do about it
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Authentication => {
                "The API key may be invalid or expired. Check ANTHROPIC_API_KEY (or the configured api-key-env)."
            }
            Self::RateLimit => "Rate limit exceeded. Wait a few moments and try again.",
            Self::ServiceUnavailable => "The generation service is temporarily unavailable. Retry shortly.",
            Self::Timeout => "The generation call timed out. Retry, or raise llm.timeout-ms in the config.",
            Self::Other => "The generation call failed. Your session is unchanged, so the operation can be retried.",
        }
    }
}

impl std::fmt::Display for UpstreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::Timeout => write!(f, "timeout"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Errors reported by clarification operations
#[derive(Debug, Error)]
pub enum ClarifyError {
    #[error("Session not found: {session_id}")]
    NotFound { session_id: String },

    #[error("Failed to parse generator output: {message}")]
    GenerationParse { message: String, raw: String },

    #[error("Generation failed ({kind}): {message}")]
    Upstream { kind: UpstreamKind, message: String },

    #[error("Session store error: {0}")]
    Store(StoreError),
}

impl ClarifyError {
    pub fn not_found(session_id: impl Into<String>) -> Self {
        Self::NotFound {
            session_id: session_id.into(),
        }
    }

    pub fn parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::GenerationParse {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Remediation hint shown alongside the error
    pub fn hint(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Use /sessions to see available sessions, or /start to create a new one.",
            Self::GenerationParse { .. } => "Try again. Your session progress is saved.",
            Self::Upstream { kind, .. } => kind.hint(),
            Self::Store(_) => "The session store stopped responding. Restart si.",
        }
    }
}

impl From<LlmError> for ClarifyError {
    fn from(err: LlmError) -> Self {
        Self::Upstream {
            kind: UpstreamKind::classify(&err),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ClarifyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(session_id) => Self::NotFound { session_id },
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn api(status: u16, message: &str) -> LlmError {
        LlmError::ApiError {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_classify_by_status() {
        assert_eq!(UpstreamKind::classify(&api(401, "nope")), UpstreamKind::Authentication);
        assert_eq!(UpstreamKind::classify(&api(403, "nope")), UpstreamKind::Authentication);
        assert_eq!(UpstreamKind::classify(&api(429, "slow")), UpstreamKind::RateLimit);
        assert_eq!(UpstreamKind::classify(&api(503, "down")), UpstreamKind::ServiceUnavailable);
        assert_eq!(UpstreamKind::classify(&api(529, "overloaded")), UpstreamKind::ServiceUnavailable);
        assert_eq!(UpstreamKind::classify(&api(400, "bad request")), UpstreamKind::Other);
    }

    #[test]
    fn test_classify_structured_variants() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(5),
        };
        assert_eq!(UpstreamKind::classify(&err), UpstreamKind::RateLimit);
        assert_eq!(
            UpstreamKind::classify(&LlmError::Timeout(Duration::from_secs(1))),
            UpstreamKind::Timeout
        );
        assert_eq!(
            UpstreamKind::classify(&LlmError::MissingApiKey("ANTHROPIC_API_KEY".to_string())),
            UpstreamKind::Authentication
        );
    }

    #[test]
    fn test_classify_falls_back_to_message() {
        let err = LlmError::InvalidResponse("upstream said: rate limit reached".to_string());
        assert_eq!(UpstreamKind::classify(&err), UpstreamKind::RateLimit);

        let err = LlmError::InvalidResponse("Service Unavailable".to_string());
        assert_eq!(UpstreamKind::classify(&err), UpstreamKind::ServiceUnavailable);

        let err = LlmError::InvalidResponse("connection timed out".to_string());
        assert_eq!(UpstreamKind::classify(&err), UpstreamKind::Timeout);

        let err = LlmError::InvalidResponse("something odd".to_string());
        assert_eq!(UpstreamKind::classify(&err), UpstreamKind::Other);
    }

    #[test]
    fn test_from_store_not_found_echoes_id() {
        let err: ClarifyError = StoreError::NotFound("abc".to_string()).into();
        assert!(matches!(err, ClarifyError::NotFound { session_id } if session_id == "abc"));

        let err: ClarifyError = StoreError::ChannelError.into();
        assert!(matches!(err, ClarifyError::Store(StoreError::ChannelError)));
    }

    #[test]
    fn test_upstream_hint_follows_kind() {
        let err: ClarifyError = api(401, "invalid x-api-key").into();
        assert!(matches!(
            err,
            ClarifyError::Upstream {
                kind: UpstreamKind::Authentication,
                ..
            }
        ));
        assert!(err.hint().contains("API key"));
    }
}
