use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Component, Path, PathBuf},
};

use serde_yaml::Value;
use shared::{domain::GuiDescriptor, paths};
use structure::coerce::parse_bool;
use tracing::debug;

use crate::error::BuildError;

/// Absolute dependency source path to its output-relative destination.
pub type DependencyMap = BTreeMap<PathBuf, PathBuf>;

#[derive(Debug, Clone)]
pub struct Manifest {
    pub guis: Vec<GuiDescriptor>,
    pub dependencies: DependencyMap,
    pub configuration_directory: PathBuf,
    pub output_directory: PathBuf,
}

/// Read the manifest at `manifest_path`, resolve every file it references and
/// prepare `output_directory`.
pub fn load_manifest(manifest_path: &Path, output_directory: &Path) -> Result<Manifest, BuildError> {
    let manifest_path = paths::absolute(manifest_path).map_err(BuildError::io(manifest_path))?;
    let output_directory =
        paths::absolute(output_directory).map_err(BuildError::io(output_directory))?;
    let configuration_directory = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    let raw = fs::read_to_string(&manifest_path).map_err(|source| BuildError::ManifestRead {
        path: manifest_path.clone(),
        source,
    })?;
    let document: Value = serde_yaml::from_str(&raw).map_err(|source| BuildError::ManifestParse {
        path: manifest_path.clone(),
        source,
    })?;
    let Some(Value::Sequence(entries)) = document.get("guis") else {
        return Err(BuildError::MissingGuis);
    };

    let loader = GuiLoader {
        configuration_directory: &configuration_directory,
        output_directory: &output_directory,
    };
    let mut guis = Vec::with_capacity(entries.len());
    let mut names = HashSet::new();
    let mut dependencies = DependencyMap::new();
    for entry in entries {
        let gui = loader.load(entry, &mut dependencies)?;
        if !names.insert(gui.name.clone()) {
            return Err(BuildError::DuplicateGui { name: gui.name });
        }
        debug!(gui = %gui.name, source = %gui.source_definition_file.display(), "loaded GUI entry");
        guis.push(gui);
    }

    prepare_output_directory(&output_directory)?;

    Ok(Manifest {
        guis,
        dependencies,
        configuration_directory,
        output_directory,
    })
}

struct GuiLoader<'a> {
    configuration_directory: &'a Path,
    output_directory: &'a Path,
}

impl GuiLoader<'_> {
    fn load(&self, entry: &Value, dependencies: &mut DependencyMap) -> Result<GuiDescriptor, BuildError> {
        let name = required_string(entry, "name")?;
        if !is_plain_filename(&name) {
            return Err(BuildError::InvalidGuiName { name });
        }
        let config = required_string(entry, "config")?;
        let stylesheet = required_string(entry, "stylesheet")?;

        let source_definition_file = self.resolve(&config)?;
        if !source_definition_file.is_file() {
            return Err(BuildError::SourceNotFound {
                path: source_definition_file,
            });
        }

        let stylesheet_file = self.resolve(&stylesheet)?;
        if !stylesheet_file.exists() {
            return Err(BuildError::StylesheetNotFound {
                path: stylesheet_file,
            });
        }
        let stylesheet_destination = paths::relative_to(&stylesheet_file, self.configuration_directory);
        let stylesheet_path = paths::to_url_path(&stylesheet_destination);
        dependencies.insert(stylesheet_file, stylesheet_destination);

        let mut gui = GuiDescriptor::new(name, source_definition_file, stylesheet_path);
        if self.output_directory.join(&gui.html_output_name).exists() {
            return Err(BuildError::HtmlExists {
                file: gui.html_output_name,
            });
        }

        gui.debug = match entry.get("debug") {
            None => false,
            Some(Value::Bool(debug)) => *debug,
            Some(Value::String(text)) => {
                parse_bool(text).ok_or_else(|| BuildError::DebugNotBool { gui: gui.name.clone() })?
            }
            Some(_) => return Err(BuildError::DebugNotBool { gui: gui.name.clone() }),
        };

        match entry.get("dependencies") {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(patterns)) => {
                for pattern in patterns {
                    let pattern = scalar_text(pattern).ok_or_else(|| BuildError::DependencyNotString {
                        gui: gui.name.clone(),
                    })?;
                    self.add_dependencies(&pattern, dependencies)?;
                }
            }
            Some(_) => return Err(BuildError::DependenciesNotList { gui: gui.name }),
        }

        Ok(gui)
    }

    fn resolve(&self, target: &str) -> Result<PathBuf, BuildError> {
        paths::resolve_against(Path::new(target), self.configuration_directory)
            .map_err(BuildError::io(target))
    }

    fn add_dependencies(&self, pattern: &str, dependencies: &mut DependencyMap) -> Result<(), BuildError> {
        let resolved_pattern = self.resolve(pattern)?;
        let found = resolver::resolve(&resolved_pattern).map_err(|source| BuildError::Dependency {
            pattern: pattern.to_string(),
            source,
        })?;
        for source in found {
            let source = paths::absolute(&source).map_err(BuildError::io(&source))?;
            let destination = paths::relative_to(&source, self.configuration_directory);
            debug!(dependency = %source.display(), destination = %destination.display(), "registered dependency");
            dependencies.insert(source, destination);
        }
        Ok(())
    }
}

fn required_string(entry: &Value, field: &'static str) -> Result<String, BuildError> {
    let value = entry.get(field).ok_or(BuildError::MissingField { field })?;
    scalar_text(value).ok_or(BuildError::FieldNotString { field })
}

/// A single normal path component, so the HTML output stays in the output directory.
fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(component)), None) if component == name
    )
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        _ => None,
    }
}

fn prepare_output_directory(output_directory: &Path) -> Result<(), BuildError> {
    if !output_directory.exists() {
        fs::create_dir_all(output_directory).map_err(BuildError::io(output_directory))?;
    } else if !output_directory.is_dir() {
        return Err(BuildError::OutputNotDirectory {
            path: output_directory.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
