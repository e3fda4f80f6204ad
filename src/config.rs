use crate::log_debug;
use crate::providers::{Provider, ProviderConfig};

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration structure for the Scenesmith application
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    /// Default completion provider
    pub default_provider: String,
    /// Provider-specific configurations
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Load the configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load the configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let config_content = fs::read_to_string(config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            toml::from_str(&config_content).with_context(|| {
                format!(
                    "Invalid configuration file format: {}",
                    config_path.display()
                )
            })?
        } else {
            Self::default()
        };

        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Save the configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Save the configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let config_content = toml::to_string(self)?;
        fs::write(config_path, config_content).with_context(|| {
            format!("Failed to write config file: {}", config_path.display())
        })?;
        log_debug!("Configuration saved: {:?}", self);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("scenesmith");
        fs::create_dir_all(&path)?;
        path.push("config.toml");
        Ok(path)
    }

    /// Get the default provider as a parsed enum
    pub fn provider(&self) -> Result<Provider> {
        self.default_provider
            .parse()
            .map_err(|e| anyhow!("Invalid default provider: {e}"))
    }

    /// Get the configuration for a specific provider
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers
            .get(provider)
            .or_else(|| self.providers.get(&provider.to_lowercase()))
    }

    /// Resolve the API key for a provider: environment first, then config file.
    /// Returns `None` when neither source has a non-empty key.
    pub fn resolve_api_key(&self, provider: Provider) -> Option<String> {
        if let Ok(key) = std::env::var(provider.api_key_env())
            && !key.trim().is_empty()
        {
            log_debug!("Using API key from {}", provider.api_key_env());
            return Some(key.trim().to_string());
        }

        self.get_provider_config(provider.name())
            .filter(|p| p.has_api_key())
            .map(|p| p.api_key.clone())
    }

    /// Store an API key for a provider and persist the configuration
    pub fn store_api_key(&mut self, provider: Provider, api_key: &str) -> Result<()> {
        let entry = self
            .providers
            .entry(provider.name().to_string())
            .or_insert_with(|| ProviderConfig::with_defaults(provider));
        entry.api_key = api_key.to_string();
        self.save()
    }

    /// Update the configuration with new values
    pub fn update(
        &mut self,
        provider: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
        additional_params: Option<HashMap<String, String>>,
    ) -> Result<()> {
        if let Some(provider) = provider {
            let parsed: Provider = provider
                .parse()
                .map_err(|e| anyhow!("Invalid provider: {e}"))?;
            self.default_provider = parsed.name().to_string();
            if !self.providers.contains_key(parsed.name()) {
                self.providers
                    .insert(parsed.name().to_string(), ProviderConfig::with_defaults(parsed));
            }
        }

        let provider_config = self
            .providers
            .get_mut(&self.default_provider)
            .context("Could not get default provider")?;

        if let Some(key) = api_key {
            provider_config.api_key = key;
        }
        if let Some(model) = model {
            provider_config.model = model;
        }
        if let Some(params) = additional_params {
            provider_config.additional_params.extend(params);
        }

        log_debug!("Configuration updated: {:?}", self);
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = HashMap::new();
        for provider in Provider::ALL {
            providers.insert(
                provider.name().to_string(),
                ProviderConfig::with_defaults(*provider),
            );
        }

        Self {
            default_provider: Provider::default().name().to_string(),
            providers,
        }
    }
}
