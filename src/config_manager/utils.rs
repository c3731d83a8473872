use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use config::FileFormat;
use regex::Regex;
use tracing::debug;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(\w+)\}").expect("static regex"))
}

/// Replace `${VAR_NAME}` with the variable's value; unset variables are left untouched
pub fn substitute_env_vars(content: &str) -> Cow<'_, str> {
    env_var_pattern().replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
}

/// Pick the config file format from the extension, YAML unless it looks like JSON
pub fn file_format(path: &Path) -> FileFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") | Some("jsonld") => FileFormat::Json,
        _ => FileFormat::Yaml,
    }
}

/// Read a configuration file and resolve `${VAR}` placeholders
pub fn read_config_text(config_path: &Path) -> Result<String> {
    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }

    let bytes = fs::read(config_path)
        .with_context(|| format!("Failed to read configuration file: {}", config_path.display()))?;
    let content = decode_text(&bytes);
    if content.trim().is_empty() {
        anyhow::bail!("Configuration file is empty: {}", config_path.display());
    }

    debug!("Read {} bytes of configuration from {}", bytes.len(), config_path.display());
    Ok(substitute_env_vars(&content).into_owned())
}

/// Decode UTF-8 (with or without BOM), replacing invalid sequences
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        tracing::warn!("Configuration file contains invalid UTF-8; invalid bytes were replaced");
    }
    text.into_owned()
}
