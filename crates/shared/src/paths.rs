//! Lexical path helpers shared by the loader and the compiler.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Make `path` absolute against the current directory and drop `.` / `..` components.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}

/// Resolve `target` against `base_directory` unless it is already absolute.
pub fn resolve_against(target: &Path, base_directory: &Path) -> io::Result<PathBuf> {
    if target.is_absolute() {
        absolute(target)
    } else {
        absolute(&base_directory.join(target))
    }
}

pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Express `path` relative to `base`; both are expected to be absolute and normalized.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base.components().collect();
    let shared = path_components
        .iter()
        .zip(&base_components)
        .take_while(|(left, right)| left == right)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[shared..] {
        relative.push(component);
    }
    relative
}

/// Render a relative path with `/` separators, as used in URLs.
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_current_and_parent_components() {
        assert_eq!(
            normalize(Path::new("/srv/app/./ui/../styles/main.css")),
            PathBuf::from("/srv/app/styles/main.css")
        );
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }

    #[test]
    fn resolve_against_keeps_absolute_targets() {
        let resolved = resolve_against(Path::new("/opt/style.css"), Path::new("/srv")).expect("abs");
        assert_eq!(resolved, PathBuf::from("/opt/style.css"));
        let resolved = resolve_against(Path::new("ui/main.yaml"), Path::new("/srv")).expect("abs");
        assert_eq!(resolved, PathBuf::from("/srv/ui/main.yaml"));
    }

    #[test]
    fn relative_to_walks_up_when_needed() {
        assert_eq!(
            relative_to(Path::new("/srv/app/styles/a.css"), Path::new("/srv/app")),
            PathBuf::from("styles/a.css")
        );
        assert_eq!(
            relative_to(Path::new("/srv/shared/a.css"), Path::new("/srv/app")),
            PathBuf::from("../shared/a.css")
        );
    }

    #[test]
    fn url_paths_use_forward_slashes() {
        assert_eq!(to_url_path(Path::new("styles/themes/dark.css")), "styles/themes/dark.css");
    }
}
