use std::path::PathBuf;

use resolver::ResolveError;
use structure::StructureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read configuration file `{}`: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load descriptive YAML file `{}`: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("expected list of `guis` in configuration")]
    MissingGuis,
    #[error("required field of `{field}` is missing")]
    MissingField { field: &'static str },
    #[error("unable to parse required field of `{field}` since a string is expected")]
    FieldNotString { field: &'static str },
    #[error("the GUI name `{name}` must be a plain filename")]
    InvalidGuiName { name: String },
    #[error("the GUI `{name}` is defined more than once")]
    DuplicateGui { name: String },
    #[error("unable to find a source config file of `{}`", path.display())]
    SourceNotFound { path: PathBuf },
    #[error("unable to find the stylesheet `{}`", path.display())]
    StylesheetNotFound { path: PathBuf },
    #[error("unable to generate source for `{file}` as a file already exists with that name")]
    HtmlExists { file: String },
    #[error("unable to parse `debug` of `{gui}` since a boolean value is expected")]
    DebugNotBool { gui: String },
    #[error("unable to parse `dependencies` of `{gui}` since a list is expected")]
    DependenciesNotList { gui: String },
    #[error("expected a string path for a dependency of `{gui}`")]
    DependencyNotString { gui: String },
    #[error("no file(s) exists for dependency `{pattern}` within the configuration directory: {source}")]
    Dependency {
        pattern: String,
        #[source]
        source: ResolveError,
    },
    #[error("there is already a file located as the output directory location `{}`", path.display())]
    OutputNotDirectory { path: PathBuf },
    #[error("a dependency of `{}` lies outside of the output directory", destination.display())]
    OutsideOutput { destination: PathBuf },
    #[error("a dependency of `{}` will conflict with an automatically generated file", destination.display())]
    GeneratedConflict { destination: PathBuf },
    #[error("a dependency of `{}` will conflict with an already existing file", source_path.display())]
    ExistingConflict { source_path: PathBuf },
    #[error("conflicting filename of `{filename}` between flattened dependencies")]
    FlattenedConflict { filename: String },
    #[error("{gui}: {source}")]
    Compile {
        gui: String,
        #[source]
        source: StructureError,
    },
    #[error("{gui}: generation task failed: {source}")]
    Task {
        gui: String,
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("dependency staging task failed: {0}")]
    StagingTask(#[source] tokio::task::JoinError),
    #[error("failed to serialize GUI information: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
