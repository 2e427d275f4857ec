//! Configuration loading for the console host

use anyhow::{bail, Result};

use winkey_hook::HookOptions;

/// How delivered key events are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned human-readable line per event
    #[default]
    Text,
    /// One consumer record (JSON) per line
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown output format '{}', expected 'text' or 'json'", other),
        }
    }
}

/// Host configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Output format for key events (`WINKEY_OUTPUT`)
    pub output: OutputFormat,

    /// Name of the hook thread (`WINKEY_HOOK_THREAD`)
    pub hook_thread_name: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let output = match lookup("WINKEY_OUTPUT") {
            Some(value) => value.parse()?,
            None => OutputFormat::default(),
        };

        let hook_thread_name = lookup("WINKEY_HOOK_THREAD")
            .unwrap_or_else(|| HookOptions::default().hook_thread_name);

        Ok(Self {
            output,
            hook_thread_name,
        })
    }

    /// Options for the hook controller
    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn hook_options(&self) -> HookOptions {
        HookOptions {
            hook_thread_name: self.hook_thread_name.clone(),
            ..HookOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.hook_thread_name, "keyboard-hook");
    }

    #[test]
    fn test_config_from_env() {
        let config = load(&[("WINKEY_OUTPUT", "JSON"), ("WINKEY_HOOK_THREAD", "kb")]).unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.hook_options().hook_thread_name, "kb");
    }

    #[test]
    fn test_config_rejects_unknown_output() {
        assert!(load(&[("WINKEY_OUTPUT", "xml")]).is_err());
    }
}
