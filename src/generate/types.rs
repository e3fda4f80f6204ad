//! Pure helpers for naming outputs and picking the scene class out of a
//! generated script.

/// Scene class name used when none can be found in the generated script
pub const DEFAULT_SCENE_NAME: &str = "Scene";

/// Turn a topic into a filename slug: lower-cased, spaces replaced with
/// underscores.
pub fn slugify(topic: &str) -> String {
    topic.trim().to_lowercase().replace(' ', "_")
}

/// Filename for the generated animation script
pub fn animation_filename(topic: &str) -> String {
    format!("derivative_{}_animation.py", slugify(topic))
}

/// Filename for the generated narration script
pub fn narration_filename(topic: &str) -> String {
    format!("derivative_{}_narration.txt", slugify(topic))
}

/// Best-effort extraction of the Manim scene class name from a generated
/// script. Looks for the first line starting with `class ` that declares a
/// scene (contains `Scene)`), and takes the text between `class ` and `(`.
/// Falls back to [`DEFAULT_SCENE_NAME`].
pub fn extract_scene_name(script: &str) -> String {
    for line in script.lines() {
        if let Some(rest) = line.strip_prefix("class ")
            && line.contains("Scene)")
            && let Some(paren) = rest.find('(')
        {
            let name = rest[..paren].trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    DEFAULT_SCENE_NAME.to_string()
}

/// Shell command suggested to the user for rendering the generated scene
pub fn suggested_command(animation_file: &str, scene_name: &str) -> String {
    format!("manim -pql {animation_file} {scene_name}")
}
