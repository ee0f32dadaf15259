//! Copying dependency files into the output tree.

use std::{
    collections::{BTreeMap, HashSet},
    fs, io,
    path::{Component, Path, PathBuf},
};

use tracing::debug;
use walkdir::WalkDir;

use crate::{config::DependencyMap, error::BuildError};

/// Drop every dependency nested below another dependency, keeping the shallowest.
///
/// Returns the removed source paths.
pub fn remove_nested_dependencies(dependencies: &mut DependencyMap) -> Vec<PathBuf> {
    let mut kept: Option<&Path> = None;
    let mut nested = Vec::new();
    // Map keys are ordered component-wise, so descendants directly follow their ancestor.
    for source in dependencies.keys() {
        match kept {
            Some(ancestor) if source.starts_with(ancestor) && source != ancestor => {
                nested.push(source.clone());
            }
            _ => kept = Some(source),
        }
    }
    for source in &nested {
        dependencies.remove(source);
    }
    nested
}

/// Output-relative location a dependency is staged to.
pub fn destination(relative: &Path, flatten: bool) -> PathBuf {
    if flatten {
        relative
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| relative.to_path_buf())
    } else {
        relative.to_path_buf()
    }
}

/// Reject unflattened destinations that would land outside the output directory.
pub fn check_contained(dependencies: &DependencyMap, flatten: bool) -> Result<(), BuildError> {
    for relative in dependencies.values() {
        let destination = destination(relative, flatten);
        let escapes = destination.is_absolute()
            || destination
                .components()
                .any(|component| matches!(component, Component::ParentDir));
        if escapes {
            return Err(BuildError::OutsideOutput { destination });
        }
    }
    Ok(())
}

/// Conflicts between dependency destinations, generated files and existing files.
pub fn check_conflicts(
    dependencies: &DependencyMap,
    generated_files: &[String],
    output_directory: &Path,
    flatten: bool,
) -> Result<(), BuildError> {
    let mut flattened: BTreeMap<PathBuf, &Path> = BTreeMap::new();
    for (source, relative) in dependencies {
        let destination = destination(relative, flatten);
        if generated_files
            .iter()
            .any(|generated| Path::new(generated) == destination)
        {
            return Err(BuildError::GeneratedConflict { destination });
        }
        if output_directory.join(&destination).exists() {
            return Err(BuildError::ExistingConflict {
                source_path: source.clone(),
            });
        }
        if flatten && flattened.insert(destination.clone(), source).is_some() {
            return Err(BuildError::FlattenedConflict {
                filename: destination.to_string_lossy().into_owned(),
            });
        }
    }
    Ok(())
}

/// Filenames any generated artifact must avoid.
pub fn destination_filenames(dependencies: &DependencyMap) -> HashSet<String> {
    dependencies
        .values()
        .filter_map(|relative| relative.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

/// Copy every dependency below `output_directory`, returning the staged destinations.
///
/// Existing files are replaced only when `overwrite` is set; otherwise finding
/// one is an error.
pub fn stage_dependencies(
    dependencies: &DependencyMap,
    output_directory: &Path,
    flatten: bool,
    overwrite: bool,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut staged = Vec::with_capacity(dependencies.len());
    for (source, relative) in dependencies {
        let target = output_directory.join(destination(relative, flatten));
        debug!(source = %source.display(), target = %target.display(), "staging dependency");
        copy_recursive(source, &target, overwrite)?;
        staged.push(target);
    }
    Ok(staged)
}

fn copy_recursive(source: &Path, target: &Path, overwrite: bool) -> Result<(), BuildError> {
    if !source.is_dir() {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
        }
        return copy_file(source, target, overwrite);
    }

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|error| BuildError::Io {
            path: error.path().unwrap_or(source).to_path_buf(),
            source: error.into(),
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let destination = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(BuildError::io(&destination))?;
        } else {
            copy_file(entry.path(), &destination, overwrite)?;
        }
    }
    Ok(())
}

fn copy_file(source: &Path, target: &Path, overwrite: bool) -> Result<(), BuildError> {
    if !overwrite && target.exists() {
        return Err(BuildError::Io {
            path: target.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        });
    }
    fs::copy(source, target).map_err(BuildError::io(source))?;
    Ok(())
}
