//! Configuration from `.env` and the process environment.
//!
//! Database and model settings load separately so commands that only talk
//! to one side do not require the other's variables.

use std::path::Path;

use runlog_core::PromptTemplates;
use runlog_llm::ModelConfig;
use runlog_storage::MySqlConfig;

pub const DEFAULT_DB_PORT: u16 = 3306;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0} (or set DATABASE_URL)")]
    Missing(&'static str),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },

    #[error(transparent)]
    Template(#[from] runlog_core::TemplateError),
}

/// Load `.env` from the working directory, if present.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Read a non-empty variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Database settings: `DATABASE_URL`, or the `DB_*` parts.
///
/// The parts are joined as-is; credentials with URL-reserved characters
/// must use `DATABASE_URL` with percent-encoding.
pub fn database_config<F>(env: F) -> Result<MySqlConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match env("DATABASE_URL") {
        Some(url) => MySqlConfig::new(url),
        None => {
            let host = env("DB_HOST").ok_or(ConfigError::Missing("DB_HOST"))?;
            let user = env("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
            let name = env("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
            let password = env("DB_PASSWORD").unwrap_or_default();
            let port = parse_or("DB_PORT", env("DB_PORT"), DEFAULT_DB_PORT)?;
            MySqlConfig::new(format!(
                "mysql://{}:{}@{}:{}/{}",
                user, password, host, port, name
            ))
        }
    };
    config.connect_timeout_secs = parse_or(
        "DB_CONNECT_TIMEOUT",
        env("DB_CONNECT_TIMEOUT"),
        config.connect_timeout_secs,
    )?;
    Ok(config)
}

/// Model provider settings. A missing `DEEPSEEK_API_KEY` is not an error
/// here; the client reports it when a call is made.
pub fn model_config<F>(env: F) -> Result<ModelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = ModelConfig::default();
    Ok(ModelConfig {
        api_key: env("DEEPSEEK_API_KEY"),
        api_base: env("DEEPSEEK_API_BASE").unwrap_or(defaults.api_base),
        model: env("DEEPSEEK_MODEL").unwrap_or(defaults.model),
        temperature: parse_or(
            "DEEPSEEK_TEMPERATURE",
            env("DEEPSEEK_TEMPERATURE"),
            defaults.temperature,
        )?,
        max_tokens: parse_or(
            "DEEPSEEK_MAX_TOKENS",
            env("DEEPSEEK_MAX_TOKENS"),
            defaults.max_tokens,
        )?,
        ..defaults
    })
}

/// Prompt templates from a TOML file, or the built-in defaults.
pub fn prompt_templates(path: Option<&Path>) -> Result<PromptTemplates, ConfigError> {
    match path {
        Some(path) => Ok(PromptTemplates::from_toml_file(path)?),
        None => Ok(PromptTemplates::default()),
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: format!("{:?}: {}", raw, e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn database_url_wins() {
        let config = database_config(env(&[
            ("DATABASE_URL", "mysql://a:b@c:1/d"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.url, "mysql://a:b@c:1/d");
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn database_parts_default_port() {
        let config = database_config(env(&[
            ("DB_HOST", "db.local"),
            ("DB_USER", "runner"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "ops"),
        ]))
        .unwrap();
        assert_eq!(config.url, "mysql://runner:pw@db.local:3306/ops");
    }

    #[test]
    fn database_missing_host_is_reported() {
        let err = database_config(env(&[("DB_USER", "u"), ("DB_NAME", "n")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DB_HOST")));
    }

    #[test]
    fn database_bad_port_is_invalid() {
        let err = database_config(env(&[
            ("DB_HOST", "h"),
            ("DB_USER", "u"),
            ("DB_NAME", "n"),
            ("DB_PORT", "mysql"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_PORT", .. }));
    }

    #[test]
    fn model_defaults_without_key() {
        let config = model_config(env(&[])).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_base, "https://api.deepseek.com");
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.max_tokens, 2000);
        assert!(config.stream);
    }

    #[test]
    fn model_overrides_apply() {
        let config = model_config(env(&[
            ("DEEPSEEK_API_KEY", "sk-1"),
            ("DEEPSEEK_API_BASE", "http://localhost:8080"),
            ("DEEPSEEK_TEMPERATURE", "0.2"),
            ("DEEPSEEK_MAX_TOKENS", "512"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-1"));
        assert_eq!(config.api_base, "http://localhost:8080");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 512);
    }

    #[test]
    fn model_bad_max_tokens_is_invalid() {
        let err = model_config(env(&[("DEEPSEEK_MAX_TOKENS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("DEEPSEEK_MAX_TOKENS"));
    }

    #[test]
    fn prompt_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.toml");
        std::fs::write(
            &path,
            "system = \"terse\"\nuser = \"Logs:\\n{log_content}\"\n",
        )
        .unwrap();

        let templates = prompt_templates(Some(&path)).unwrap();
        assert_eq!(templates.system(), "terse");
        assert_eq!(templates.render_user("x"), "Logs:\nx");
    }

    #[test]
    fn prompt_file_missing_is_error() {
        let err = prompt_templates(Some(Path::new("/nonexistent/prompts.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Template(_)));
    }
}
