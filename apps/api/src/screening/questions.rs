//! Question generation — pluggable, trait-based generator behind a bounded wait.
//!
//! Default: `LlmQuestionGenerator` (hosted model via `llm_client`).
//! Tests swap in a scripted fake through the same `QuestionGenerator` seam.
//!
//! `QuestionService` owns the fallback policy: any failure or timeout for one
//! technology substitutes the generic question for that technology only.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{question_prompt, INTERVIEWER_SYSTEM, QUESTION_CALL_OPTIONS};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::session::{QuestionSource, QueuedQuestion, TechStack};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("model returned no usable question")]
    Empty,
}

/// The fixed two-part prompt sent for one technology.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPrompt {
    pub technology: String,
    pub system: String,
    pub user: String,
}

impl QuestionPrompt {
    pub fn for_technology(technology: &str) -> Self {
        Self {
            technology: technology.to_string(),
            system: INTERVIEWER_SYSTEM.to_string(),
            user: question_prompt(technology),
        }
    }
}

/// Implement this to swap the question backend without touching the state machine.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, prompt: &QuestionPrompt) -> Result<String, GenerationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmQuestionGenerator — hosted model backend
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmQuestionGenerator(pub LlmClient);

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, prompt: &QuestionPrompt) -> Result<String, GenerationError> {
        let raw = self
            .0
            .call_text(&prompt.user, &prompt.system, QUESTION_CALL_OPTIONS)
            .await?;
        let question = clean_question(&raw);
        if question.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(question)
    }
}

/// Strips the decoration models like to add around a single question.
fn clean_question(raw: &str) -> String {
    let mut text = raw.trim();
    for label in ["Question:", "**Question:**", "Q:"] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim_start();
        }
    }
    text.trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim()
        .to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback
// ────────────────────────────────────────────────────────────────────────────

/// Generic question used when generation fails for `technology`.
pub fn fallback_question(technology: &str) -> String {
    format!(
        "Describe a real project where you used {technology}. What problem were you solving, \
         what trade-offs did you weigh, and what would you do differently today?"
    )
}

// ────────────────────────────────────────────────────────────────────────────
// QuestionService — queue builder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct QuestionService {
    generator: Arc<dyn QuestionGenerator>,
    timeout: Duration,
}

impl QuestionService {
    pub fn new(generator: Arc<dyn QuestionGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Builds one question per technology, sequentially and in stack order.
    /// Never fails: the result always has `stack.len()` entries.
    pub async fn build_queue(&self, stack: &TechStack) -> Vec<QueuedQuestion> {
        let mut queue = Vec::with_capacity(stack.len());

        for technology in stack.labels() {
            let prompt = QuestionPrompt::for_technology(technology);
            let outcome = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(GenerationError::TimedOut(self.timeout)),
            };

            let queued = match outcome {
                Ok(text) => QueuedQuestion {
                    technology: technology.clone(),
                    text,
                    source: QuestionSource::Generated,
                },
                Err(e) => {
                    warn!("Question generation failed for {technology}, using fallback: {e}");
                    QueuedQuestion {
                        technology: technology.clone(),
                        text: fallback_question(technology),
                        source: QuestionSource::Fallback,
                    }
                }
            };
            queue.push(queued);
        }

        let fallbacks = queue
            .iter()
            .filter(|q| q.source == QuestionSource::Fallback)
            .count();
        info!(
            "Built question queue: {} questions ({} fallback)",
            queue.len(),
            fallbacks
        );

        queue
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    /// Deterministic generator: fails for listed technologies, answers the rest.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        failing: HashSet<String>,
        stalled: HashSet<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_for(mut self, technology: &str) -> Self {
            self.failing.insert(technology.to_string());
            self
        }

        pub fn stalling_for(mut self, technology: &str) -> Self {
            self.stalled.insert(technology.to_string());
            self
        }

        pub fn question_for(technology: &str) -> String {
            format!("How would you debug a production issue involving {technology}?")
        }
    }

    #[async_trait]
    impl QuestionGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &QuestionPrompt) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push(prompt.technology.clone());
            if self.stalled.contains(&prompt.technology) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.failing.contains(&prompt.technology) {
                return Err(GenerationError::Llm(LlmError::RateLimited));
            }
            Ok(Self::question_for(&prompt.technology))
        }
    }

    pub fn service(generator: ScriptedGenerator) -> QuestionService {
        QuestionService::new(Arc::new(generator), Duration::from_secs(5))
    }
}
