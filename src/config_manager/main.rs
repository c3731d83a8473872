use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config_manager::agent::AgentConfig;
use crate::config_manager::stateless_llm::OpenAICompatibleConfig;
use crate::config_manager::system::SystemConfig;
use crate::config_manager::utils::{file_format, read_config_text};

/// Prefix for environment overrides, e.g. `SOLI__SYSTEM_CONFIG__PORT=9000`
pub const ENV_PREFIX: &str = "SOLI";

/// Main configuration for the application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "system_config")]
    pub system_config: SystemConfig,

    #[serde(rename = "agent_config")]
    pub agent_config: AgentConfig,
}

impl Config {
    /// Load configuration from a YAML or JSON file, layered under environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_config_text(path)?;
        let settings = config::Config::builder()
            .add_source(File::from_str(&content, file_format(path)))
            .add_source(env_overrides())
            .build()
            .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;

        let config: Config = settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults plus environment overrides, used when no file is found
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(env_overrides())
            .build()
            .context("Failed to read configuration from environment")?;
        let config: Config = settings
            .try_deserialize()
            .context("Invalid configuration in environment")?;
        config.validate()?;
        Ok(config)
    }

    /// Try each candidate path in order, falling back to defaults
    pub fn discover() -> Result<(Self, Option<PathBuf>)> {
        for path in candidate_paths() {
            if !path.exists() {
                debug!("No configuration at {}", path.display());
                continue;
            }
            let config = Self::load(&path)?;
            return Ok((config, Some(path)));
        }
        Ok((Self::from_env()?, None))
    }

    /// The settings of the selected LLM provider
    pub fn llm_settings(&self) -> Result<&OpenAICompatibleConfig> {
        let provider = &self.agent_config.llm_provider;
        self.agent_config
            .llm_configs
            .get(provider)
            .ok_or_else(|| anyhow::anyhow!("Configuration not found for LLM provider: {}", provider))
    }

    pub fn validate(&self) -> Result<()> {
        let agent = &self.agent_config;
        if agent.personas.is_empty() {
            anyhow::bail!("agent_config.personas must name at least one persona");
        }
        if agent.max_rounds() == 0 {
            anyhow::bail!("agent_config.max_rounds must be at least 1");
        }
        if agent.turn_timeout_secs == 0 || agent.conversation_timeout_secs == 0 {
            anyhow::bail!("agent_config timeouts must be greater than zero");
        }
        if agent.termination_marker.trim().is_empty() {
            anyhow::bail!("agent_config.termination_marker must not be empty");
        }

        let llm = self.llm_settings()?;
        if llm.api_key_missing() && agent.llm_provider != "ollama_llm" {
            warn!(
                "No API key for {}; requests will fail until one is configured",
                agent.llm_provider
            );
        }
        info!(
            "Configuration valid: provider={}, model={}, personas={}",
            agent.llm_provider,
            llm.model,
            agent.personas.len()
        );
        Ok(())
    }
}

fn env_overrides() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn candidate_paths() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));

    let mut paths: Vec<PathBuf> = std::env::var("CONFIG_PATH").ok().map(PathBuf::from).into_iter().collect();
    for name in ["conf.yaml", "conf.yml", "conf.jsonld", "conf.json"] {
        paths.push(PathBuf::from(name));
        if let Some(dir) = &exe_dir {
            paths.push(dir.join(name));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// Serializes tests that load files, since loading also reads `SOLI__*` variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_yaml_with_defaults_for_missing_sections() {
        std::env::set_var("SOLI_TEST_GROQ_KEY", "gsk_from_env");
        let file = write_config(
            ".yaml",
            r#"
system_config:
  port: 9100
agent_config:
  max_rounds: 3
  llm_configs:
    groq_llm:
      base_url: https://api.groq.com/openai/v1
      llm_api_key: ${SOLI_TEST_GROQ_KEY}
      model: llama3-70b-8192
"#,
        );

        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.system_config.port, 9100);
        assert_eq!(config.system_config.host, "0.0.0.0");
        assert_eq!(config.agent_config.max_rounds(), 3);
        assert_eq!(config.agent_config.personas.len(), 5);

        let llm = config.llm_settings().unwrap();
        assert_eq!(llm.model, "llama3-70b-8192");
        assert_eq!(llm.llm_api_key, "gsk_from_env");
        assert!((llm.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn loads_json_persona_overrides() {
        let file = write_config(
            ".json",
            r#"{
  "agent_config": {
    "max_rounds": 1,
    "personas": [
      {"name": "Solar_Advisor", "instructions": "Answer and end with FINAL ANSWER:"}
    ]
  }
}"#,
        );

        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = Config::load(file.path()).unwrap();
        let personas = &config.agent_config.personas;
        assert_eq!(personas.len(), 1);
        assert_eq!(personas[0].name, "Solar_Advisor");
        assert!(personas[0].termination_marker.is_none());
    }

    #[test]
    fn round_limit_defaults_to_configured_roster() {
        let file = write_config(
            ".json",
            r#"{"agent_config": {"personas": [{"name": "Solar_Advisor", "instructions": "Answer."}]}}"#,
        );

        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.agent_config.personas.len(), 1);
        assert_eq!(config.agent_config.max_rounds(), 1);
    }

    #[test]
    fn environment_overrides_file_values() {
        let file = write_config(".yaml", "agent_config:\n  max_rounds: 3\n");

        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("SOLI__AGENT_CONFIG__MAX_ROUNDS", "2");
        let loaded = Config::load(file.path());
        std::env::remove_var("SOLI__AGENT_CONFIG__MAX_ROUNDS");

        assert_eq!(loaded.unwrap().agent_config.max_rounds(), 2);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let file = write_config(
            ".yaml",
            "agent_config:\n  llm_provider: claude_llm\n",
        );
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("claude_llm"));
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let file = write_config(".yaml", "agent_config:\n  max_rounds: 0\n");
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }
}
