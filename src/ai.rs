//! AI-backed shelf-life pipeline: prompt, completion call, JSON recovery and
//! date enrichment.

pub mod common;
pub mod config;
pub mod enrich;
pub mod extract;
pub mod prompts;
pub mod shelf_life;

pub use common::{ChatClient, OPENAI_CHAT_URL};
pub use config::AiConfig;
pub use prompts::{build_prompt, Intent};
