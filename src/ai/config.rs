use std::env;

pub const DEFAULT_GPT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub api_key: String,
    pub gpt_model: String,
    pub openai_chat_url: Option<String>,
}

impl AiConfig {
    /// `None` when `OPENAI_API_KEY` is unset; the AI routes then report that
    /// the service is not configured.
    pub fn from_env() -> Option<Self> {
        let api_key = match env::var("OPENAI_API_KEY") {
            Ok(k) if !k.trim().is_empty() => k,
            _ => return None,
        };
        Some(Self {
            api_key,
            gpt_model: env::var("OPENAI_GPT_MODEL").unwrap_or_else(|_| DEFAULT_GPT_MODEL.to_string()),
            openai_chat_url: env::var("OPENAI_CHAT_URL").ok(),
        })
    }
}
