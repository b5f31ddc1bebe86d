//! Thin client for the OpenAI Responses API plus the parsing layer that
//! turns free-form model text into typed commit plans.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompts;

pub use client::{OpenAiClient, Oracle, OPENAI_MODEL};
pub use error::OracleError;
pub use parse::extract_json;
