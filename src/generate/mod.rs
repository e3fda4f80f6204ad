//! Content generation: Manim animation scripts and narration scripts.

pub mod prompt;
pub mod service;
pub mod types;

pub use service::{GenerationOutcome, ScriptService};
pub use types::{DEFAULT_SCENE_NAME, extract_scene_name, slugify};
