use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

use super::prompt::{
    animation_system_prompt, animation_user_prompt, narration_system_prompt, narration_user_prompt,
};
use super::types::{animation_filename, extract_scene_name, narration_filename, suggested_command};
use crate::config::Config;
use crate::llm;
use crate::log_debug;
use crate::providers::Provider;

/// Result of a successful generation run
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub animation_path: PathBuf,
    pub narration_path: PathBuf,
    pub scene_name: String,
    pub suggested_command: String,
}

/// Service orchestrating the two generation requests and the output files
pub struct ScriptService {
    config: Config,
    provider: Provider,
    output_dir: PathBuf,
}

impl ScriptService {
    /// Create a new `ScriptService` instance
    pub fn new(config: Config, provider: Provider, output_dir: &Path) -> Self {
        Self {
            config,
            provider,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Generate the Manim animation script for a topic
    pub async fn generate_animation_script(&self, topic: &str) -> Result<String> {
        llm::complete(
            &self.config,
            self.provider,
            &animation_system_prompt(),
            &animation_user_prompt(topic),
        )
        .await
    }

    /// Generate the narration script for a topic
    pub async fn generate_narration_script(&self, topic: &str) -> Result<String> {
        llm::complete(
            &self.config,
            self.provider,
            &narration_system_prompt(),
            &narration_user_prompt(topic),
        )
        .await
    }

    /// Run the full generation flow: two sequential requests, scene-name
    /// extraction, and the two output files.
    pub async fn run(&self, topic: &str) -> Result<GenerationOutcome> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(anyhow!("Topic must not be empty"));
        }

        log_debug!("Generating scripts for topic: {}", topic);

        let animation_script = self.generate_animation_script(topic).await?;
        let narration_script = self.generate_narration_script(topic).await?;

        let scene_name = extract_scene_name(&animation_script);
        log_debug!("Extracted scene name: {}", scene_name);

        let animation_path = self.output_dir.join(animation_filename(topic));
        let narration_path = self.output_dir.join(narration_filename(topic));

        fs::write(&animation_path, &animation_script).with_context(|| {
            format!("Failed to write animation script: {}", animation_path.display())
        })?;
        fs::write(&narration_path, &narration_script).with_context(|| {
            format!("Failed to write narration script: {}", narration_path.display())
        })?;

        let suggested = suggested_command(
            &animation_path.file_name().map_or_else(
                || animation_path.display().to_string(),
                |n| n.to_string_lossy().to_string(),
            ),
            &scene_name,
        );

        Ok(GenerationOutcome {
            animation_path,
            narration_path,
            scene_name,
            suggested_command: suggested,
        })
    }
}
