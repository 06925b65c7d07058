use crate::config::LLMConfig;

/// 超过该长度（字节）的prompt直接交给能力更强的模型
pub const EFFICIENT_MODEL_PROMPT_LIMIT: usize = 32 * 1024;

/// 根据prompt长度选择模型，返回 (首选模型, 备选模型)
pub fn evaluate_befitting_model(
    llm_config: &LLMConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> (String, Option<String>) {
    if system_prompt.len() + user_prompt.len() <= EFFICIENT_MODEL_PROMPT_LIMIT {
        return (
            llm_config.model_efficient.clone(),
            Some(llm_config.model_powerful.clone()),
        );
    }
    (llm_config.model_powerful.clone(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_prompts_use_efficient_model_with_fallover() {
        let config = LLMConfig::default();
        let (model, fallover) = evaluate_befitting_model(&config, "system", "user");
        assert_eq!(model, config.model_efficient);
        assert_eq!(fallover, Some(config.model_powerful.clone()));
    }

    #[test]
    fn test_long_prompts_go_straight_to_powerful_model() {
        let config = LLMConfig::default();
        let long = "x".repeat(EFFICIENT_MODEL_PROMPT_LIMIT);
        let (model, fallover) = evaluate_befitting_model(&config, "s", &long);
        assert_eq!(model, config.model_powerful);
        assert!(fallover.is_none());
    }
}
