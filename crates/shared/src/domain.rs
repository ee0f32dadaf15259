use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One `guis` entry of a manifest, resolved against the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiDescriptor {
    pub name: String,
    /// Keeps widget names in the generated structure instead of positional indices.
    pub debug: bool,
    pub source_definition_file: PathBuf,
    /// Output-relative stylesheet reference embedded in the HTML shell.
    pub stylesheet_path: String,
    pub html_output_name: String,
    pub structure_output_name: Option<String>,
}

impl GuiDescriptor {
    pub fn new(
        name: impl Into<String>,
        source_definition_file: impl Into<PathBuf>,
        stylesheet_path: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let html_output_name = html_output_name(&name);
        Self {
            name,
            debug: false,
            source_definition_file: source_definition_file.into(),
            stylesheet_path: stylesheet_path.into(),
            html_output_name,
            structure_output_name: None,
        }
    }
}

pub fn html_output_name(gui_name: &str) -> String {
    format!("{gui_name}.html")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Reject dependencies whose destinations collide with generated or existing files.
    pub disallow_conflicts: bool,
    /// Stage dependencies by bare filename instead of their relative path.
    pub flatten_dependencies: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            disallow_conflicts: true,
            flatten_dependencies: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_output_name_is_derived_from_gui_name() {
        let gui = GuiDescriptor::new("settings", "/tmp/settings.yaml", "style.css");
        assert_eq!(gui.html_output_name, "settings.html");
        assert!(!gui.debug);
        assert!(gui.structure_output_name.is_none());
    }

    #[test]
    fn default_build_options_disallow_conflicts() {
        let options = BuildOptions::default();
        assert!(options.disallow_conflicts);
        assert!(!options.flatten_dependencies);
    }
}
