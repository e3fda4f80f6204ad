//! Scenesmith - AI-assisted Manim studio
//!
//! This library backs two thin flows: a content generator that turns a topic
//! into a Manim animation script plus a narration script, and a small login
//! relay that fronts an OpenID Connect provider for the hosted chat page.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod generate;
pub mod llm;
pub mod logger;
pub mod providers;
pub mod relay;
pub mod ui;

// Re-export important structs for easier testing
pub use config::Config;
pub use providers::{Provider, ProviderConfig};
