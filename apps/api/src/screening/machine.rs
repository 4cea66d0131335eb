//! Conversation State Machine — the screening orchestrator.
//!
//! Every transition takes a `SessionState` by value and hands back the updated
//! state together with exactly one `Reply`. Nothing here is process-global, so
//! any number of sessions can run side by side.
//!
//! Stage order:
//! GREETING → COLLECTING_NAME → COLLECTING_EMAIL → COLLECTING_PHONE →
//! COLLECTING_EXPERIENCE → COLLECTING_POSITION → COLLECTING_STACK →
//! GENERATING_QUESTIONS → ASKING → CONCLUDED
//!
//! An exit phrase jumps straight to CONCLUDED from any stage.

use chrono::Utc;
use tracing::{debug, info};

use crate::models::session::{AnswerRecord, Reply, ReplyKind, Role, SessionState, Stage};
use crate::screening::messages;
use crate::screening::questions::QuestionService;
use crate::screening::tech_stack::extract_tech_stack;
use crate::screening::validation::{
    validate_email, validate_experience, validate_name, validate_phone, validate_position,
    ValidationFailure,
};

/// Whole-message exit phrases, compared after normalisation.
pub const EXIT_PHRASES: &[&str] = &[
    "stop",
    "end",
    "finish",
    "that's all",
    "thats all",
    "no more",
];

/// Words that end the conversation wherever they appear in a message.
pub const EXIT_WORDS: &[&str] = &["bye", "goodbye", "exit", "quit"];

/// While answering questions, an exit word only counts in a message this short.
pub const ASKING_EXIT_MAX_WORDS: usize = 3;

/// The result of one transition.
#[derive(Debug, Clone)]
pub struct Turn {
    pub session: SessionState,
    pub reply: Reply,
}

/// True when the candidate is asking to leave.
///
/// A message exits when it is one of `EXIT_PHRASES` as a whole, or when it
/// contains one of `EXIT_WORDS` as a word ("I want to quit", "Goodbye, thanks").
/// During `Asking` the word rule is limited to short messages, so an answer
/// like "I would quit the process and exit cleanly" stays an answer.
pub fn is_exit_request(text: &str, stage: Stage) -> bool {
    let normalized = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect::<String>();
    let words: Vec<&str> = normalized.split_whitespace().collect();

    if EXIT_PHRASES.contains(&words.join(" ").as_str()) {
        return true;
    }
    if stage == Stage::Asking && words.len() > ASKING_EXIT_MAX_WORDS {
        return false;
    }
    words.iter().any(|word| EXIT_WORDS.contains(word))
}

/// Opens a session: emits the greeting and waits for the name.
pub fn start(mut session: SessionState) -> Turn {
    let reply = if session.stage == Stage::Greeting {
        advance(&mut session, Stage::CollectingName);
        Reply::new(ReplyKind::Prompt, messages::GREETING)
    } else {
        Reply::new(ReplyKind::Prompt, messages::ALREADY_ENDED)
    };
    session.record(Role::Assistant, &reply.text);
    Turn { session, reply }
}

/// Processes one inbound candidate message to completion.
pub async fn handle_message(
    mut session: SessionState,
    text: &str,
    questions: &QuestionService,
) -> Turn {
    if session.stage == Stage::Concluded {
        let reply = Reply::new(ReplyKind::Closing, messages::ALREADY_ENDED);
        return Turn { session, reply };
    }

    session.record(Role::Candidate, text);

    let reply = if is_exit_request(text, session.stage) {
        info!(session_id = %session.id, "Exit requested during {}", session.stage.name());
        advance(&mut session, Stage::Concluded);
        Reply::new(ReplyKind::Closing, messages::FAREWELL)
    } else {
        dispatch(&mut session, text, questions).await
    };

    session.record(Role::Assistant, &reply.text);
    Turn { session, reply }
}

async fn dispatch(session: &mut SessionState, text: &str, questions: &QuestionService) -> Reply {
    match session.stage {
        Stage::Greeting => {
            // No explicit start: the first message is the name.
            advance(session, Stage::CollectingName);
            collect_name(session, text)
        }
        Stage::CollectingName => collect_name(session, text),
        Stage::CollectingEmail => match validate_email(text) {
            Ok(email) => {
                session.profile.email = Some(email);
                advance(session, Stage::CollectingPhone);
                Reply::new(ReplyKind::Prompt, messages::ASK_PHONE)
            }
            Err(failure) => rejected(session, failure),
        },
        Stage::CollectingPhone => match validate_phone(text) {
            Ok(phone) => {
                session.profile.phone = Some(phone);
                advance(session, Stage::CollectingExperience);
                Reply::new(ReplyKind::Prompt, messages::ASK_EXPERIENCE)
            }
            Err(failure) => rejected(session, failure),
        },
        Stage::CollectingExperience => match validate_experience(text) {
            Ok(years) => {
                session.profile.years_experience = Some(years);
                advance(session, Stage::CollectingPosition);
                Reply::new(ReplyKind::Prompt, messages::ASK_POSITION)
            }
            Err(failure) => rejected(session, failure),
        },
        Stage::CollectingPosition => match validate_position(text) {
            Ok(position) => {
                session.profile.desired_position = Some(position);
                advance(session, Stage::CollectingStack);
                Reply::new(ReplyKind::Prompt, messages::ASK_STACK)
            }
            Err(failure) => rejected(session, failure),
        },
        Stage::CollectingStack => {
            let stack = extract_tech_stack(text);
            if stack.is_empty() {
                debug!(session_id = %session.id, "No technologies recognised");
                return Reply::new(ReplyKind::Clarification, messages::clarify_stack());
            }
            session.tech_stack = stack;
            advance(session, Stage::GeneratingQuestions);

            let summary = messages::profile_summary(&session.profile, &session.tech_stack);
            let mut reply = generate_and_ask(session, questions).await;
            reply.text = format!("{summary}\n\n{}", reply.text);
            reply
        }
        Stage::GeneratingQuestions => generate_and_ask(session, questions).await,
        Stage::Asking => record_answer(session, text),
        Stage::Concluded => Reply::new(ReplyKind::Closing, messages::ALREADY_ENDED),
    }
}

fn collect_name(session: &mut SessionState, text: &str) -> Reply {
    match validate_name(text) {
        Ok(name) => {
            let prompt = messages::ask_email(&name);
            session.profile.name = Some(name);
            advance(session, Stage::CollectingEmail);
            Reply::new(ReplyKind::Prompt, prompt)
        }
        Err(failure) => rejected(session, failure),
    }
}

fn rejected(session: &SessionState, failure: ValidationFailure) -> Reply {
    debug!(session_id = %session.id, field = ?failure.field, "Rejected field input");
    Reply::new(
        ReplyKind::ValidationError,
        messages::invalid_field(&failure.reason),
    )
}

/// Fills the question queue and moves to ASKING at index 0.
async fn generate_and_ask(session: &mut SessionState, questions: &QuestionService) -> Reply {
    session.questions = questions.build_queue(&session.tech_stack).await;
    session.current_index = 0;

    match session.questions.first() {
        Some(first) => {
            let text = messages::question(0, session.questions.len(), first);
            advance(session, Stage::Asking);
            Reply::new(ReplyKind::Question, text)
        }
        None => {
            // Only reachable with an empty stack, which COLLECTING_STACK never stores.
            advance(session, Stage::Concluded);
            Reply::new(
                ReplyKind::Closing,
                messages::completion(session.profile.name.as_deref(), 0),
            )
        }
    }
}

fn record_answer(session: &mut SessionState, text: &str) -> Reply {
    let Some(current) = session.current_question().cloned() else {
        advance(session, Stage::Concluded);
        return Reply::new(ReplyKind::Closing, messages::FAREWELL);
    };

    session.answers.push(AnswerRecord {
        technology: current.technology,
        question: current.text,
        answer: text.trim().to_string(),
        answered_at: Utc::now(),
    });
    session.current_index += 1;

    let total = session.questions.len();
    match session.current_question() {
        Some(next) => Reply::new(
            ReplyKind::Question,
            messages::question(session.current_index, total, next),
        ),
        None => {
            advance(session, Stage::Concluded);
            Reply::new(
                ReplyKind::Closing,
                messages::completion(session.profile.name.as_deref(), session.answers.len()),
            )
        }
    }
}

/// Moves forward only; stages are never revisited.
fn advance(session: &mut SessionState, to: Stage) {
    debug_assert!(
        to.ordinal() > session.stage.ordinal(),
        "backward transition {:?} -> {:?}",
        session.stage,
        to
    );
    info!(
        session_id = %session.id,
        "Stage {} -> {}",
        session.stage.name(),
        to.name()
    );
    session.stage = to;
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
