use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("unable to find dependency file of \"{}\"", path.display())]
    FileNotFound { path: PathBuf },
    #[error("unable to read dependency file of \"{}\": {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse dependency file of \"{}\": {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unable to parse non-mappable structure within \"{}\"", path.display())]
    NonMappingDocument { path: PathBuf },
    #[error("failed to parse the name (string) of a widget within \"{}\"", path.display())]
    InvalidWidgetName { path: PathBuf },
    #[error("failed to parse a widget with an empty name within \"{}\"", path.display())]
    EmptyWidgetName { path: PathBuf },
    #[error("the widget `{widget}` within \"{}\" has no `type` definition", path.display())]
    MissingType { widget: String, path: PathBuf },
    #[error("failed to parse the type (string) of widget `{widget}`")]
    InvalidType { widget: String },
    #[error("the widget `{widget}` already was defined (again within \"{}\")", path.display())]
    DuplicateWidget { widget: String, path: PathBuf },
    #[error("expected a string path for a dependency in \"{}\"", path.display())]
    InvalidDependency { path: PathBuf },
    #[error("unable to parse `dependencies` in \"{}\" since a list is expected", path.display())]
    DependenciesNotList { path: PathBuf },
    #[error("dependency chain deeper than {limit} files when reaching \"{}\"", path.display())]
    DependencyDepth { limit: usize, path: PathBuf },
    #[error("failed to parse the key for a property of `{widget}`")]
    InvalidKey { widget: String },
    #[error("child object reference from `{widget}` to `{target}` does not relate to any known widgets")]
    DanglingReference { widget: String, target: String },
    #[error("unresolved reference to object `{target}` from `{widget}` after pruning")]
    UnresolvedReference { widget: String, target: String },
    #[error("failed to parse property `{key}` of `{widget}` (considered `None`)")]
    NullProperty { widget: String, key: String },
    #[error("property of `{widget}` holds the number {value}, which JSON cannot represent")]
    UnrepresentableNumber { widget: String, value: String },
    #[error("no `main` widget was found")]
    NoMain,
    #[error("failed to serialize structure: {0}")]
    Json(#[from] serde_json::Error),
}
