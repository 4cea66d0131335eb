#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named step in the fixed, linear screening conversation.
///
/// Variants are declared in conversation order; `ordinal` follows that order
/// and only ever increases over a session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Greeting,
    CollectingName,
    CollectingEmail,
    CollectingPhone,
    CollectingExperience,
    CollectingPosition,
    CollectingStack,
    GeneratingQuestions,
    Asking,
    Concluded,
}

impl Stage {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Greeting => "GREETING",
            Stage::CollectingName => "COLLECTING_NAME",
            Stage::CollectingEmail => "COLLECTING_EMAIL",
            Stage::CollectingPhone => "COLLECTING_PHONE",
            Stage::CollectingExperience => "COLLECTING_EXPERIENCE",
            Stage::CollectingPosition => "COLLECTING_POSITION",
            Stage::CollectingStack => "COLLECTING_STACK",
            Stage::GeneratingQuestions => "GENERATING_QUESTIONS",
            Stage::Asking => "ASKING",
            Stage::Concluded => "CONCLUDED",
        }
    }
}

/// Contact details and role preferences, filled one field at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub years_experience: Option<f32>,
    pub desired_position: Option<String>,
}

/// Deduplicated technology labels in dictionary order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechStack(Vec<String>);

impl TechStack {
    /// Builds a stack, dropping repeated labels while keeping first-seen order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !out.contains(&label) {
                out.push(label);
            }
        }
        TechStack(out)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedQuestion {
    pub technology: String,
    pub text: String,
    pub source: QuestionSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub technology: String,
    pub question: String,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// What kind of message the display surface is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Prompt,
    ValidationError,
    Clarification,
    Question,
    Closing,
}

/// Exactly one of these is emitted per accepted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    pub fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Read-only progress indicator shown alongside every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub stage: Stage,
    pub answered: usize,
    pub total: usize,
}

/// Everything one conversation owns. Never shared between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub stage: Stage,
    pub profile: CandidateProfile,
    pub tech_stack: TechStack,
    pub questions: Vec<QueuedQuestion>,
    pub current_index: usize,
    pub answers: Vec<AnswerRecord>,
    pub transcript: Vec<TranscriptEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            stage: Stage::Greeting,
            profile: CandidateProfile::default(),
            tech_stack: TechStack::default(),
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            stage: self.stage,
            answered: self.answers.len(),
            total: self.questions.len(),
        }
    }

    pub fn current_question(&self) -> Option<&QueuedQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn record(&mut self, role: Role, content: &str) {
        self.transcript.push(TranscriptEntry {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordinals_follow_conversation_order() {
        let order = [
            Stage::Greeting,
            Stage::CollectingName,
            Stage::CollectingEmail,
            Stage::CollectingPhone,
            Stage::CollectingExperience,
            Stage::CollectingPosition,
            Stage::CollectingStack,
            Stage::GeneratingQuestions,
            Stage::Asking,
            Stage::Concluded,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
    }

    #[test]
    fn test_stage_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&Stage::CollectingExperience).unwrap();
        assert_eq!(json, r#""COLLECTING_EXPERIENCE""#);
        assert_eq!(Stage::CollectingExperience.name(), "COLLECTING_EXPERIENCE");
    }

    #[test]
    fn test_tech_stack_dedups_preserving_order() {
        let stack = TechStack::from_labels(["Python", "Docker", "Python"]);
        assert_eq!(stack.labels(), &["Python".to_string(), "Docker".to_string()]);
        assert!(stack.contains("Docker"));
    }

    #[test]
    fn test_new_session_starts_in_greeting() {
        let session = SessionState::new();
        assert_eq!(session.stage, Stage::Greeting);
        assert_eq!(
            session.progress(),
            Progress {
                stage: Stage::Greeting,
                answered: 0,
                total: 0
            }
        );
        assert!(session.current_question().is_none());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(SessionState::new().id, SessionState::new().id);
    }
}
