use std::{env, path::PathBuf, time::Duration};

use secrecy::{ExposeSecret, SecretString};

use crate::{
    errors::{AppError, AppResult},
    services::{
        model_service::ModelPricing,
        question_synthesis::{GenerationSettings, OptionCountPolicy},
        text_sampler::SamplerSettings,
    },
};

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub openai_api_key: SecretString,
    pub openai_api_base: Option<String>,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub model_pricing: Option<ModelPricing>,
    pub wikipedia_api_url: String,
    pub prompt_templates_dir: Option<PathBuf>,
    pub default_sample_length: usize,
    pub points_per_question: u32,
    pub max_generation_attempts: u32,
    pub attempt_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    pub strict_option_count: bool,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        let model_pricing = match (
            env_parse::<f64>("MODEL_INPUT_USD_PER_MILLION"),
            env_parse::<f64>("MODEL_OUTPUT_USD_PER_MILLION"),
        ) {
            (Some(input), Some(output)) => Some(ModelPricing {
                input_usd_per_million: input,
                output_usd_per_million: output,
            }),
            _ => None,
        };

        Self {
            mongo_conn_string: env_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: env_or("MONGO_DB_NAME", "quiz-forge-local"),
            web_server_host: env_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env_parse("WEB_SERVER_PORT").unwrap_or(8080),
            openai_api_key: SecretString::from(env_or("OPENAI_API_KEY", "")),
            openai_api_base: env::var("OPENAI_API_BASE").ok().filter(|s| !s.is_empty()),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_temperature: env_parse("OPENAI_TEMPERATURE").unwrap_or(0.7),
            model_pricing,
            wikipedia_api_url: env_or(
                "WIKIPEDIA_API_URL",
                "https://{language}.wikipedia.org/w/api.php",
            ),
            prompt_templates_dir: env::var("PROMPT_TEMPLATES_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            default_sample_length: env_parse("DEFAULT_SAMPLE_LENGTH").unwrap_or(6000),
            points_per_question: env_parse("POINTS_PER_QUESTION").unwrap_or(1000),
            max_generation_attempts: env_parse("MAX_GENERATION_ATTEMPTS").unwrap_or(3),
            attempt_timeout_secs: env_parse("ATTEMPT_TIMEOUT_SECS").unwrap_or(60),
            generation_timeout_secs: env_parse("GENERATION_TIMEOUT_SECS").unwrap_or(180),
            strict_option_count: env_parse("STRICT_OPTION_COUNT").unwrap_or(false),
        }
    }

    /// Rejects configuration that cannot serve real traffic.
    pub fn validate_for_production(&self) -> AppResult<()> {
        if self.openai_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ValidationError(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }

        if self.max_generation_attempts == 0 {
            return Err(AppError::ValidationError(
                "MAX_GENERATION_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        SamplerSettings::default()
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_attempts: self.max_generation_attempts.max(1),
            points_per_question: self.points_per_question,
            attempt_timeout: Some(Duration::from_secs(self.attempt_timeout_secs)),
            option_count_policy: if self.strict_option_count {
                OptionCountPolicy::Exact
            } else {
                OptionCountPolicy::AcceptFewer
            },
            pricing: self.model_pricing,
            ..GenerationSettings::default()
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quiz-forge-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            openai_api_key: SecretString::from("test_api_key".to_string()),
            openai_api_base: None,
            openai_model: "test-model".to_string(),
            openai_temperature: 0.0,
            model_pricing: None,
            wikipedia_api_url: "http://localhost/{language}/api.php".to_string(),
            prompt_templates_dir: None,
            default_sample_length: 6000,
            points_per_question: 1000,
            max_generation_attempts: 3,
            attempt_timeout_secs: 5,
            generation_timeout_secs: 30,
            strict_option_count: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(config.wikipedia_api_url.contains("api.php"));
    }

    #[test]
    fn test_test_config_passes_production_validation() {
        let config = Config::test_config();

        assert_eq!(config.mongo_db_name, "quiz-forge-test");
        assert!(config.validate_for_production().is_ok());
    }

    #[test]
    fn test_missing_api_key_fails_production_validation() {
        let mut config = Config::test_config();
        config.openai_api_key = SecretString::from(String::new());

        assert!(matches!(
            config.validate_for_production(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_generation_settings_follow_config() {
        let mut config = Config::test_config();
        config.max_generation_attempts = 5;
        config.strict_option_count = true;

        let settings = config.generation_settings();
        assert_eq!(settings.max_attempts, 5);
        assert_eq!(settings.points_per_question, 1000);
        assert_eq!(settings.option_count_policy, OptionCountPolicy::Exact);
        assert_eq!(settings.attempt_timeout, Some(Duration::from_secs(5)));
    }
}
