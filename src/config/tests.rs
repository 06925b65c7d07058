#[cfg(test)]
mod tests {
    use crate::config::{CacheConfig, Config, LLMConfig, LLMProvider, SessionConfig};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(!config.verbose);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.search_depth, "advanced");
        assert_eq!(config.dns.whois_server, "whois.iana.org");
        assert_eq!(config.dns.timeout_seconds, 10);
        assert_eq!(config.shell.timeout_seconds, 120);
        assert_eq!(config.sources.pubmed_max_results, 3);
        assert_eq!(config.sources.youtube_languages, vec!["bn", "en", "ar"]);
        assert_eq!(config.user_file(), PathBuf::from("tmp/user.json"));
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "Claude".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "OLLAMA".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("bedrock".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::Anthropic.to_string(), "anthropic");
        assert_eq!(LLMProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::OpenAI);
        // api_key may be empty if env var is not set
        assert!(!config.api_base_url.is_empty());
        assert!(!config.model_efficient.is_empty());
        assert!(!config.model_powerful.is_empty());
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.retry_base_delay_ms, 100);
        assert_eq!(config.max_iterations, 10);
    }

    #[test]
    fn test_session_and_cache_defaults() {
        let session = SessionConfig::default();
        assert_eq!(session.state_dir, PathBuf::from("tmp"));
        assert_eq!(session.db_file, PathBuf::from("tmp/agent_sessions.db"));
        assert_eq!(session.history_turns, 3);

        let cache = CacheConfig::default();
        assert!(cache.enabled);
        assert_eq!(cache.cache_dir, PathBuf::from(".agent-lab/cache"));
        assert_eq!(cache.expire_hours, 168);
    }

    #[test]
    fn test_from_file_partial_sections_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("agent-lab.toml");

        let content = r#"verbose = true

[llm]
provider = "ollama"
model_efficient = "qwen3:latest"
retry_attempts = 2

[session]
history_turns = 5

[shell]
timeout_seconds = 30
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();

        assert!(config.verbose);
        assert_eq!(config.llm.provider, LLMProvider::Ollama);
        assert_eq!(config.llm.model_efficient, "qwen3:latest");
        assert_eq!(config.llm.retry_attempts, 2);
        assert_eq!(config.llm.max_iterations, 10);
        assert_eq!(config.session.history_turns, 5);
        assert_eq!(config.session.state_dir, PathBuf::from("tmp"));
        assert_eq!(config.shell.timeout_seconds, 30);
        assert_eq!(config.llm.timeout_seconds, 300);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_from_file_missing_and_invalid() {
        let temp_dir = TempDir::new().unwrap();

        assert!(Config::from_file(&temp_dir.path().join("missing.toml")).is_err());

        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "[llm\nprovider = ").unwrap();
        assert!(Config::from_file(&broken).is_err());
    }

    #[test]
    fn test_load_prefers_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        std::fs::write(&config_path, "[cache]\nenabled = false\n").unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert!(!config.cache.enabled);
    }
}
