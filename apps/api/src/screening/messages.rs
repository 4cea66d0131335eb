// Candidate-facing message texts for each conversation step.

use crate::models::session::{CandidateProfile, QueuedQuestion, TechStack};
use crate::screening::tech_stack::CLARIFICATION_EXAMPLES;

pub const GREETING: &str = "Welcome to the technical screening assistant!\n\n\
    I'll collect a few details about you, learn about your technical expertise, \
    and then ask one question per technology you work with.\n\n\
    You can type 'bye' or 'exit' at any time to end the conversation.\n\n\
    Let's begin! Could you please tell me your **full name**?";

pub const ASK_PHONE: &str = "Perfect! Now, could you please provide your **phone number**?";

pub const ASK_EXPERIENCE: &str = "Great! How many **years of professional experience** do you have?\n\n\
    *Please provide a number (e.g., '3 years' or '5')*";

pub const ASK_POSITION: &str = "Excellent! What **position(s)** are you interested in?\n\n\
    *Examples: Software Engineer, Data Scientist, Full Stack Developer*";

pub const ASK_STACK: &str = "Finally, let's discuss your technical expertise!\n\n\
    Please list your **technical skills and tech stack**.\n\n\
    **Example:** \"Python, Django, React, PostgreSQL, AWS, Docker\"";

pub const FAREWELL: &str = "Thank you for your time and interest! Our team will be in touch soon.\n\n\
    *This conversation has ended. Start a new session to begin again.*";

pub const ALREADY_ENDED: &str =
    "This conversation has ended. Please start a new session to begin again.";

pub fn ask_email(name: &str) -> String {
    format!("Nice to meet you, **{name}**!\n\nCould you please provide your **email address**?")
}

/// Re-asks for the same field after a rejected answer.
pub fn invalid_field(reason: &str) -> String {
    format!("That doesn't look right. {reason}")
}

pub fn clarify_stack() -> String {
    format!(
        "I couldn't recognise any technologies in that answer. \
         Please list the languages, frameworks, databases or tools you use, \
         for example: {}.",
        CLARIFICATION_EXAMPLES.join(", ")
    )
}

pub fn profile_summary(profile: &CandidateProfile, stack: &TechStack) -> String {
    let experience = profile
        .years_experience
        .map(|y| format!("{y} years"))
        .unwrap_or_default();
    format!(
        "**Information collection complete!**\n\n\
         - **Name:** {}\n\
         - **Email:** {}\n\
         - **Position:** {}\n\
         - **Experience:** {}\n\
         - **Tech Stack:** {}",
        profile.name.as_deref().unwrap_or_default(),
        profile.email.as_deref().unwrap_or_default(),
        profile.desired_position.as_deref().unwrap_or_default(),
        experience,
        stack.labels().join(", ")
    )
}

/// Renders question `index` (zero-based) of `total`.
pub fn question(index: usize, total: usize, question: &QueuedQuestion) -> String {
    format!(
        "**Question {} of {}:**\n**{}**: {}\n\n*Please answer based on your own experience.*",
        index + 1,
        total,
        question.technology,
        question.text
    )
}

pub fn completion(name: Option<&str>, answered: usize) -> String {
    let thanks = match name {
        Some(name) => format!("Thank you, {name}!"),
        None => "Thank you!".to_string(),
    };
    format!(
        "**Technical questions complete!** {thanks} You answered {answered} question(s).\n\n\
         **Next steps:**\n\
         - Our team will review your responses within 2-3 business days\n\
         - You'll receive an email update about the next phase\n\
         - If selected, we'll schedule a detailed technical interview"
    )
}
