use expiry_tracker::ai::config::{AiConfig, DEFAULT_GPT_MODEL};
use expiry_tracker::Config;
use serial_test::serial;

fn clear_ai_env() {
    std::env::remove_var("OPENAI_API_KEY");
    std::env::remove_var("OPENAI_GPT_MODEL");
    std::env::remove_var("OPENAI_CHAT_URL");
}

#[test]
#[serial]
fn ai_config_from_env_missing_key() {
    clear_ai_env();
    assert!(AiConfig::from_env().is_none());

    std::env::set_var("OPENAI_API_KEY", "   ");
    assert!(AiConfig::from_env().is_none());
    clear_ai_env();
}

#[test]
#[serial]
fn ai_config_from_env_defaults() {
    clear_ai_env();
    std::env::set_var("OPENAI_API_KEY", "k");
    let cfg = AiConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "k");
    assert_eq!(cfg.gpt_model, DEFAULT_GPT_MODEL);
    assert!(cfg.openai_chat_url.is_none());
    clear_ai_env();
}

#[test]
#[serial]
fn ai_config_from_env_custom_model_and_url() {
    clear_ai_env();
    std::env::set_var("OPENAI_API_KEY", "k");
    std::env::set_var("OPENAI_GPT_MODEL", "g");
    std::env::set_var("OPENAI_CHAT_URL", "http://localhost:9/v1/chat/completions");
    let cfg = AiConfig::from_env().unwrap();
    assert_eq!(cfg.gpt_model, "g");
    assert_eq!(
        cfg.openai_chat_url.as_deref(),
        Some("http://localhost:9/v1/chat/completions")
    );
    clear_ai_env();
}

#[test]
#[serial]
fn config_from_env_reads_listen_address() {
    clear_ai_env();
    std::env::set_var("APP_HOST", "127.0.0.1");
    std::env::set_var("APP_PORT", "3100");
    std::env::set_var("OPENAI_API_KEY", "k");
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.addr().unwrap().to_string(), "127.0.0.1:3100");
    assert_eq!(cfg.ai.unwrap().gpt_model, DEFAULT_GPT_MODEL);
    std::env::remove_var("APP_HOST");
    std::env::remove_var("APP_PORT");
    clear_ai_env();
}

#[test]
#[serial]
fn config_defaults_and_bad_port() {
    clear_ai_env();
    std::env::remove_var("APP_HOST");
    std::env::remove_var("APP_PORT");
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.host, "0.0.0.0");
    assert!(cfg.ai.is_none());

    std::env::set_var("APP_PORT", "not-a-port");
    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("APP_PORT"));
    std::env::remove_var("APP_PORT");
}
