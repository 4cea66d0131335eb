// Candidate screening: field validation, tech-stack extraction, question
// generation and the conversation state machine that ties them together.
// All model calls go through llm_client via questions.rs.

pub mod handlers;
pub mod machine;
pub mod messages;
pub mod questions;
pub mod store;
pub mod tech_stack;
pub mod validation;
