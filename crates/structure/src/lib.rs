//! Widget graph compiler.
//!
//! A [`Structure`] loads widget definitions spread over linked YAML files,
//! removes widgets unreachable from `main`, optionally turns `object`
//! references into positional indices and serializes the result as the JSON
//! structure consumed by the runtime script.

use std::{
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use shared::{
    paths,
    protocol::{StructureDocument, WidgetRef, WidgetTable},
};
use tracing::{debug, warn};

pub mod coerce;
mod error;

pub use error::StructureError;

pub const MAIN_WIDGET: &str = "main";
pub const MAX_DEPENDENCY_DEPTH: usize = 256;

const OBJECT_KEY: &str = "object";
const TYPE_KEY: &str = "type";
const DEPENDENCIES_KEY: &str = "dependencies";

pub type Result<T> = std::result::Result<T, StructureError>;

#[derive(Debug, Default)]
pub struct Structure {
    /// Only used to attribute log events.
    name: String,
    /// Widget name to type index; iteration order defines reference ordinals.
    widgets: BTreeMap<String, usize>,
    widget_types: Vec<String>,
    /// Widget content with the `type` key stripped.
    widget_contents: BTreeMap<String, Value>,
    parsed_files: HashSet<PathBuf>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load `file` and every definition file it transitively depends on.
    pub fn load(file: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        let mut structure = Self::new(name);
        structure.parse_file(file.as_ref())?;
        Ok(structure)
    }

    pub fn widget_names(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }

    pub fn widget_types(&self) -> &[String] {
        &self.widget_types
    }

    pub fn widget_type(&self, widget: &str) -> Option<&str> {
        self.widgets
            .get(widget)
            .and_then(|index| self.widget_types.get(*index))
            .map(String::as_str)
    }

    pub fn widget_content(&self, widget: &str) -> Option<&Value> {
        self.widget_contents.get(widget)
    }

    pub fn parsed_files(&self) -> &HashSet<PathBuf> {
        &self.parsed_files
    }

    /// Parse one definition file, recursing into its `dependencies`.
    ///
    /// Revisiting a file already parsed is a no-op so that circular
    /// dependencies load every file exactly once.
    pub fn parse_file(&mut self, file: &Path) -> Result<()> {
        self.parse_file_at_depth(file, 0)
    }

    fn parse_file_at_depth(&mut self, file: &Path, depth: usize) -> Result<()> {
        let file = paths::absolute(file).map_err(|source| StructureError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        if self.parsed_files.contains(&file) {
            debug!(
                gui = %self.name,
                file = %file.display(),
                "additional reference to an already parsed file, this could mean there are circular dependencies (ignored)"
            );
            return Ok(());
        }
        if !file.is_file() {
            return Err(StructureError::FileNotFound { path: file });
        }
        if depth > MAX_DEPENDENCY_DEPTH {
            return Err(StructureError::DependencyDepth {
                limit: MAX_DEPENDENCY_DEPTH,
                path: file,
            });
        }
        self.parsed_files.insert(file.clone());

        debug!(gui = %self.name, file = %file.display(), "parsing configuration dependency");
        let source = fs::read_to_string(&file).map_err(|source| StructureError::Read {
            path: file.clone(),
            source,
        })?;

        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(&source) {
            let value = Value::deserialize(document).map_err(|source| StructureError::Yaml {
                path: file.clone(),
                source,
            })?;
            if !value.is_null() {
                documents.push(value);
            }
        }
        if documents.is_empty() {
            warn!(gui = %self.name, file = %file.display(), "empty dependency file");
            return Ok(());
        }

        for document in documents {
            let Value::Mapping(entries) = untagged(document) else {
                return Err(StructureError::NonMappingDocument { path: file });
            };
            self.register_widgets(&entries, &file)?;
            for dependency in dependency_paths(&entries, &file)? {
                self.parse_file_at_depth(&dependency, depth + 1)?;
            }
        }
        Ok(())
    }

    fn register_widgets(&mut self, entries: &Mapping, file: &Path) -> Result<()> {
        for (key, value) in entries {
            let widget = scalar_text(key).ok_or_else(|| StructureError::InvalidWidgetName {
                path: file.to_path_buf(),
            })?;
            if widget == DEPENDENCIES_KEY {
                continue;
            }

            let Value::Mapping(mut content) = untagged(value.clone()) else {
                return Err(StructureError::MissingType {
                    widget,
                    path: file.to_path_buf(),
                });
            };
            let Some(widget_type) = content.remove(TYPE_KEY) else {
                return Err(StructureError::MissingType {
                    widget,
                    path: file.to_path_buf(),
                });
            };
            let Some(widget_type) = scalar_text(&widget_type) else {
                return Err(StructureError::InvalidType { widget });
            };
            self.add_widget(widget, widget_type, Value::Mapping(content), file)?;
        }
        Ok(())
    }

    fn add_widget(
        &mut self,
        widget: String,
        widget_type: String,
        content: Value,
        file: &Path,
    ) -> Result<()> {
        if widget.is_empty() {
            return Err(StructureError::EmptyWidgetName {
                path: file.to_path_buf(),
            });
        }
        if self.widgets.contains_key(&widget) {
            return Err(StructureError::DuplicateWidget {
                widget,
                path: file.to_path_buf(),
            });
        }

        let type_index = match self.widget_types.iter().position(|known| *known == widget_type) {
            Some(index) => index,
            None => {
                self.widget_types.push(widget_type);
                self.widget_types.len() - 1
            }
        };
        self.widgets.insert(widget.clone(), type_index);
        self.widget_contents.insert(widget, content);
        Ok(())
    }

    /// Remove every widget not reachable from `main` and compact the type table.
    ///
    /// Every `object` reference is validated, including those held by widgets
    /// that end up pruned.
    pub fn prune_references(&mut self) -> Result<()> {
        let mut references: HashMap<&str, Vec<String>> = HashMap::new();
        for (widget, content) in &self.widget_contents {
            let mut targets = Vec::new();
            self.collect_references(widget, content, &mut targets)?;
            references.insert(widget.as_str(), targets);
        }

        let mut reachable: HashSet<String> = HashSet::new();
        let mut pending: VecDeque<String> = VecDeque::new();
        if self.widgets.contains_key(MAIN_WIDGET) {
            pending.push_back(MAIN_WIDGET.to_string());
        }
        while let Some(widget) = pending.pop_front() {
            if !reachable.insert(widget.clone()) {
                continue;
            }
            if let Some(targets) = references.get(widget.as_str()) {
                pending.extend(targets.iter().cloned());
            }
        }
        drop(references);

        let unreachable: Vec<String> = self
            .widgets
            .keys()
            .filter(|widget| !reachable.contains(*widget))
            .cloned()
            .collect();

        if unreachable.len() == self.widgets.len() {
            if !self.widgets.is_empty() {
                debug!(gui = %self.name, count = self.widgets.len(), "pruning all widgets");
            }
            self.widgets.clear();
            self.widget_contents.clear();
            self.widget_types.clear();
            return Ok(());
        }
        if !unreachable.is_empty() {
            debug!(gui = %self.name, count = unreachable.len(), "pruning widgets");
        }
        for widget in &unreachable {
            self.widgets.remove(widget);
            self.widget_contents.remove(widget);
            debug!(gui = %self.name, widget = %widget, "pruned");
        }

        self.compact_types();
        Ok(())
    }

    fn collect_references(&self, widget: &str, node: &Value, targets: &mut Vec<String>) -> Result<()> {
        match node {
            Value::Sequence(items) => {
                for item in items {
                    self.collect_references(widget, item, targets)?;
                }
            }
            Value::Mapping(entries) => {
                for (key, value) in entries {
                    let key = key_text(key).ok_or_else(|| StructureError::InvalidKey {
                        widget: widget.to_string(),
                    })?;
                    let value = untagged_ref(value);
                    match scalar_text(value) {
                        Some(target) if key == OBJECT_KEY => {
                            if !self.widgets.contains_key(&target) {
                                return Err(StructureError::DanglingReference {
                                    widget: widget.to_string(),
                                    target,
                                });
                            }
                            targets.push(target);
                        }
                        _ if value.is_mapping() || value.is_sequence() => {
                            self.collect_references(widget, value, targets)?;
                        }
                        _ => {}
                    }
                }
            }
            Value::Tagged(tagged) => self.collect_references(widget, &tagged.value, targets)?,
            _ => {}
        }
        Ok(())
    }

    /// Keep only the types still used, keeping their relative order.
    fn compact_types(&mut self) {
        let used: HashSet<usize> = self.widgets.values().copied().collect();
        let mut renumbered = vec![None; self.widget_types.len()];
        let mut retained = Vec::with_capacity(used.len());
        for (index, widget_type) in self.widget_types.drain(..).enumerate() {
            if used.contains(&index) {
                renumbered[index] = Some(retained.len());
                retained.push(widget_type);
            }
        }
        for type_index in self.widgets.values_mut() {
            if let Some(new_index) = renumbered[*type_index] {
                *type_index = new_index;
            }
        }
        self.widget_types = retained;
    }

    /// Replace every `object` reference with the target's position in name order.
    pub fn number_references(&mut self) -> Result<()> {
        debug!(gui = %self.name, "updating references for numeric positioning");
        let ordinals: HashMap<&str, usize> = self
            .widgets
            .keys()
            .enumerate()
            .map(|(ordinal, widget)| (widget.as_str(), ordinal))
            .collect();

        let mut numbered = BTreeMap::new();
        for (widget, content) in &self.widget_contents {
            numbered.insert(widget.clone(), self.numbered(widget, content, &ordinals)?);
        }
        self.widget_contents = numbered;
        Ok(())
    }

    fn numbered(&self, widget: &str, node: &Value, ordinals: &HashMap<&str, usize>) -> Result<Value> {
        match node {
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(position, item)| match untagged_ref(item) {
                    Value::Null => Err(StructureError::NullProperty {
                        widget: widget.to_string(),
                        key: format!("[{position}]"),
                    }),
                    item => self.numbered(widget, item, ordinals),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            Value::Mapping(entries) => {
                let mut rewritten = Mapping::with_capacity(entries.len());
                for (key, value) in entries {
                    let key_name = key_text(key).ok_or_else(|| StructureError::InvalidKey {
                        widget: widget.to_string(),
                    })?;
                    let value = untagged_ref(value);
                    let value = match scalar_text(value) {
                        Some(target) if key_name == OBJECT_KEY => {
                            let Some(ordinal) = ordinals.get(target.as_str()) else {
                                return Err(StructureError::UnresolvedReference {
                                    widget: widget.to_string(),
                                    target,
                                });
                            };
                            debug!(gui = %self.name, object = %target, index = ordinal, "resolved reference");
                            Value::from(*ordinal as u64)
                        }
                        _ if value.is_null() => {
                            return Err(StructureError::NullProperty {
                                widget: widget.to_string(),
                                key: key_name,
                            });
                        }
                        _ => self.numbered(widget, value, ordinals)?,
                    };
                    rewritten.insert(key.clone(), value);
                }
                Ok(Value::Mapping(rewritten))
            }
            Value::Tagged(tagged) => self.numbered(widget, &tagged.value, ordinals),
            other => Ok(other.clone()),
        }
    }

    /// Assemble the structure document from the current registry state.
    pub fn document(&self, numeric_references: bool) -> Result<StructureDocument> {
        let Some(main) = self.widgets.keys().position(|widget| widget == MAIN_WIDGET) else {
            return Err(StructureError::NoMain);
        };

        let mut indexed = Vec::with_capacity(self.widgets.len());
        let mut named = BTreeMap::new();
        for (widget, type_index) in &self.widgets {
            let content = match self.widget_contents.get(widget) {
                Some(content) => to_json(widget, content)?,
                None => serde_json::Value::Object(serde_json::Map::new()),
            };
            if numeric_references {
                indexed.push((*type_index, content));
            } else {
                named.insert(widget.clone(), (*type_index, content));
            }
        }

        let (main, widgets) = if numeric_references {
            debug!(gui = %self.name, index = main, "resolved reference to object `main`");
            (WidgetRef::Index(main), WidgetTable::Indexed(indexed))
        } else {
            (WidgetRef::Name(MAIN_WIDGET.to_string()), WidgetTable::Named(named))
        };
        Ok(StructureDocument {
            main,
            widgets,
            types: self.widget_types.clone(),
        })
    }

    /// Prune, optionally number references, and serialize to a JSON string.
    pub fn build(&mut self, numeric_references: bool) -> Result<String> {
        self.prune_references()?;
        if numeric_references {
            self.number_references()?;
        }
        let document = self.document(numeric_references)?;
        Ok(serde_json::to_string(&document)?)
    }
}

fn dependency_paths(entries: &Mapping, file: &Path) -> Result<Vec<PathBuf>> {
    let Some(dependencies) = entries.get(DEPENDENCIES_KEY) else {
        return Ok(Vec::new());
    };
    let items = match untagged_ref(dependencies) {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        _ => {
            return Err(StructureError::DependenciesNotList {
                path: file.to_path_buf(),
            })
        }
    };

    let parent = file.parent().unwrap_or(Path::new("/"));
    items
        .iter()
        .map(|item| {
            let relative = scalar_text(untagged_ref(item)).ok_or_else(|| {
                StructureError::InvalidDependency {
                    path: file.to_path_buf(),
                }
            })?;
            Ok(parent.join(relative))
        })
        .collect()
}

fn untagged(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => untagged(tagged.value),
        other => other,
    }
}

fn untagged_ref(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged_ref(&tagged.value),
        other => other,
    }
}

/// Text of a string, number or boolean scalar.
fn scalar_text(value: &Value) -> Option<String> {
    match untagged_ref(value) {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        _ => None,
    }
}

fn key_text(key: &Value) -> Option<String> {
    match untagged_ref(key) {
        Value::Null => Some("null".to_string()),
        other => scalar_text(other),
    }
}

fn to_json(widget: &str, node: &Value) -> Result<serde_json::Value> {
    Ok(match node {
        Value::Null => serde_json::Value::Null,
        Value::Bool(boolean) => serde_json::Value::Bool(*boolean),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                serde_json::Value::from(integer)
            } else if let Some(integer) = number.as_u64() {
                serde_json::Value::from(integer)
            } else {
                let float = number.as_f64().and_then(serde_json::Number::from_f64).ok_or_else(|| {
                    StructureError::UnrepresentableNumber {
                        widget: widget.to_string(),
                        value: number.to_string(),
                    }
                })?;
                serde_json::Value::Number(float)
            }
        }
        Value::String(text) => coerce::coerce_scalar(text),
        Value::Sequence(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| to_json(widget, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Mapping(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (key, value) in entries {
                let key = key_text(key).ok_or_else(|| StructureError::InvalidKey {
                    widget: widget.to_string(),
                })?;
                object.insert(key, to_json(widget, value)?);
            }
            serde_json::Value::Object(object)
        }
        Value::Tagged(tagged) => to_json(widget, &tagged.value)?,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
