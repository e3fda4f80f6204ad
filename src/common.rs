use crate::config::Config;
use crate::providers::{Provider, ProviderConfig};
use anyhow::Result;
use clap::Args;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Override default completion provider
    #[arg(long, help = "Override default completion provider", value_parser = available_providers_parser)]
    pub provider: Option<String>,

    /// Override the model for this run
    #[arg(short, long, help = "Override the model for this run")]
    pub model: Option<String>,
}

impl CommonParams {
    /// Apply these parameters onto a loaded config. Returns true if any
    /// change was made.
    pub fn apply_to_config(&self, config: &mut Config) -> Result<bool> {
        let mut changes_made = false;

        if let Some(provider_str) = &self.provider {
            let provider: Provider = provider_str.parse()?;
            let provider_name = provider.name().to_string();

            if config.default_provider != provider_name {
                if !config.providers.contains_key(&provider_name) {
                    config.providers.insert(
                        provider_name.clone(),
                        ProviderConfig::with_defaults(provider),
                    );
                }

                config.default_provider = provider_name;
                changes_made = true;
            }
        }

        if let Some(model) = &self.model
            && let Some(provider_config) = config.providers.get_mut(&config.default_provider)
            && provider_config.model != *model
        {
            provider_config.model.clone_from(model);
            changes_made = true;
        }

        Ok(changes_made)
    }
}

/// Validates that a provider name is available in the system
pub fn available_providers_parser(s: &str) -> Result<String, String> {
    match s.parse::<Provider>() {
        Ok(provider) => Ok(provider.name().to_string()),
        Err(_) => Err(format!(
            "Invalid provider '{}'. Available providers: {}",
            s,
            Provider::all_names().join(", ")
        )),
    }
}
